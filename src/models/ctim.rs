//! CTIM entities emitted by the relay

use serde::Serialize;

use super::Observable;

pub const SCHEMA_VERSION: &str = "1.1.3";
pub const PRODUCER: &str = "StealthMole";

/// Interval with optional bounds; serializes to `{}` when both are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservedTime {
    pub start_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Indicator {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub schema_version: &'static str,
    pub producer: &'static str,
    pub tlp: &'static str,
    pub valid_time: ValidTime,
    pub tags: Vec<&'static str>,
    pub confidence: String,
    pub source: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sighting {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub schema_version: &'static str,
    pub count: u32,
    pub confidence: String,
    pub severity: String,
    pub source: String,
    pub observed_time: ObservedTime,
    pub observables: Vec<Observable>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relationship {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub schema_version: &'static str,
    pub relationship_type: &'static str,
    pub source_ref: String,
    pub target_ref: String,
}

/// Deliberation outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Clean,
    Malicious,
}

impl Disposition {
    /// CTIM numeric disposition
    pub fn code(&self) -> u8 {
        match self {
            Disposition::Clean => 1,
            Disposition::Malicious => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Disposition::Clean => "Clean",
            Disposition::Malicious => "Malicious",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub schema_version: &'static str,
    pub observable: Observable,
    pub disposition: u8,
    pub disposition_name: &'static str,
    pub valid_time: ValidTime,
}

impl Verdict {
    pub fn new(observable: Observable, disposition: Disposition, start_time: String) -> Self {
        Self {
            kind: "verdict",
            schema_version: SCHEMA_VERSION,
            observable,
            disposition: disposition.code(),
            disposition_name: disposition.name(),
            valid_time: ValidTime {
                start_time: Some(start_time),
                end_time: None,
            },
        }
    }
}

/// `{count, docs}` wrapper used for every entity list in a response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Docs<T> {
    pub count: usize,
    pub docs: Vec<T>,
}

impl<T> From<Vec<T>> for Docs<T> {
    fn from(docs: Vec<T>) -> Self {
        Self {
            count: docs.len(),
            docs,
        }
    }
}
