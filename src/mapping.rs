//! Provider result to CTIM mapping
//!
//! One non-empty search result becomes an indicator ("N credentials leaked
//! from <source>"), a sighting of the observable, and the `sighting-of`
//! relationship joining them.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use crate::ids::IdGenerator;
use crate::models::{
    Bundle, Indicator, Module, Observable, ObservedTime, Relationship, Sighting, ValidTime,
    PRODUCER, SCHEMA_VERSION,
};
use crate::provider::SearchResult;

/// Start time used when no record timestamp can be parsed
pub const FALLBACK_START_TIME: &str = "2016-01-01T00:00:00Z";

/// Entities produced for one (observable, module) pair
#[derive(Debug, Clone, PartialEq)]
pub struct MappedResult {
    pub indicator: Indicator,
    pub sighting: Sighting,
    pub relationship: Relationship,
}

impl MappedResult {
    /// Append all three entities to the bundle and hand it back.
    pub fn into_bundle(self, mut bundle: Bundle) -> Bundle {
        bundle.add(self.indicator);
        bundle.add(self.sighting);
        bundle.add(self.relationship);
        bundle
    }
}

/// Map a search result; `None` when the provider reported nothing.
pub fn map_result(
    module: &Module,
    observable: &Observable,
    result: &SearchResult,
    ids: &dyn IdGenerator,
) -> Option<MappedResult> {
    if result.total_count == 0 {
        return None;
    }

    let indicator = map_indicator(module, result, ids);
    let sighting = map_sighting(module, observable, result, ids);
    let relationship = map_relationship(&indicator, &sighting, ids);

    Some(MappedResult {
        indicator,
        sighting,
        relationship,
    })
}

pub fn map_indicator(module: &Module, result: &SearchResult, ids: &dyn IdGenerator) -> Indicator {
    Indicator {
        id: ids.transient_id("indicator"),
        kind: "indicator",
        schema_version: SCHEMA_VERSION,
        producer: PRODUCER,
        tlp: "red",
        valid_time: ValidTime::default(),
        tags: vec!["darkweb", "leaked"],
        confidence: module.confidence.clone(),
        source: module.source_label(),
        title: format!(
            "{} Credentials leaked from {}",
            format_count(result.total_count),
            module.source
        ),
    }
}

pub fn map_sighting(
    module: &Module,
    observable: &Observable,
    result: &SearchResult,
    ids: &dyn IdGenerator,
) -> Sighting {
    Sighting {
        id: ids.transient_id("sighting"),
        kind: "sighting",
        schema_version: SCHEMA_VERSION,
        count: 1,
        confidence: module.confidence.clone(),
        severity: module.confidence.clone(),
        source: module.source_label(),
        observed_time: ObservedTime {
            start_time: sighting_start_time(module, result),
        },
        observables: vec![observable.clone()],
    }
}

pub fn map_relationship(indicator: &Indicator, sighting: &Sighting, ids: &dyn IdGenerator) -> Relationship {
    Relationship {
        id: ids.transient_id("relationship"),
        kind: "relationship",
        schema_version: SCHEMA_VERSION,
        relationship_type: "sighting-of",
        source_ref: sighting.id.clone(),
        target_ref: indicator.id.clone(),
    }
}

/// Leak date of the first record, else its registration date, else the fallback.
fn sighting_start_time(module: &Module, result: &SearchResult) -> String {
    let Some(record) = result.data.first() else {
        return FALLBACK_START_TIME.to_string();
    };

    let leak_date = record.get(module.leak_date_key()).filter(|v| is_truthy(v));
    let timestamp = match leak_date {
        Some(value) => value,
        None => record.get("regdate").unwrap_or(&Value::Null),
    };

    unix_to_iso8601(timestamp).unwrap_or_else(|| FALLBACK_START_TIME.to_string())
}

/// Epoch seconds (integer or float) to `YYYY-MM-DDTHH:MM:SSZ`.
pub fn unix_to_iso8601(value: &Value) -> Option<String> {
    let datetime: DateTime<Utc> = match value {
        Value::Number(n) => match n.as_i64() {
            Some(secs) => DateTime::from_timestamp(secs, 0)?,
            None => {
                let secs = n.as_f64()?;
                if !secs.is_finite() {
                    return None;
                }
                let micros = (secs * 1_000_000.0).round();
                if micros.abs() >= i64::MAX as f64 {
                    return None;
                }
                DateTime::from_timestamp_micros(micros as i64)?
            }
        },
        _ => return None,
    };

    let format = if datetime.timestamp_subsec_nanos() == 0 {
        SecondsFormat::Secs
    } else {
        SecondsFormat::Micros
    };
    Some(datetime.to_rfc3339_opts(format, true))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// `1234567` -> `1,234,567`
fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
