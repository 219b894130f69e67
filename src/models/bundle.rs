//! Request-scoped CTIM bundle

use std::collections::HashSet;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use super::ctim::{Indicator, Relationship, Sighting};

/// Any entity a bundle can hold
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Indicator(Indicator),
    Sighting(Sighting),
    Relationship(Relationship),
}

impl Entity {
    pub fn id(&self) -> &str {
        match self {
            Entity::Indicator(e) => &e.id,
            Entity::Sighting(e) => &e.id,
            Entity::Relationship(e) => &e.id,
        }
    }
}

impl From<Indicator> for Entity {
    fn from(e: Indicator) -> Self {
        Entity::Indicator(e)
    }
}

impl From<Sighting> for Entity {
    fn from(e: Sighting) -> Self {
        Entity::Sighting(e)
    }
}

impl From<Relationship> for Entity {
    fn from(e: Relationship) -> Self {
        Entity::Relationship(e)
    }
}

/// Borrowed `{count, docs}` view of one entity list
#[derive(Serialize)]
struct DocsView<'a, T> {
    count: usize,
    docs: &'a [T],
}

impl<'a, T> From<&'a [T]> for DocsView<'a, T> {
    fn from(docs: &'a [T]) -> Self {
        Self {
            count: docs.len(),
            docs,
        }
    }
}

/// Append-only collector; serializes as `{indicators, sightings, relationships}`
/// with empty kinds left out.
#[derive(Debug, Default)]
pub struct Bundle {
    indicators: Vec<Indicator>,
    sightings: Vec<Sighting>,
    relationships: Vec<Relationship>,
    ids: HashSet<String>,
}

impl Bundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity. Returns false if an entity with the same id is already present.
    pub fn add(&mut self, entity: impl Into<Entity>) -> bool {
        let entity = entity.into();
        if !self.ids.insert(entity.id().to_string()) {
            return false;
        }

        match entity {
            Entity::Indicator(e) => self.indicators.push(e),
            Entity::Sighting(e) => self.sightings.push(e),
            Entity::Relationship(e) => self.relationships.push(e),
        }
        true
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn indicators(&self) -> &[Indicator] {
        &self.indicators
    }

    pub fn sightings(&self) -> &[Sighting] {
        &self.sightings
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }
}

impl Serialize for Bundle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let kinds = [
            !self.indicators.is_empty(),
            !self.sightings.is_empty(),
            !self.relationships.is_empty(),
        ];
        let mut map = serializer.serialize_map(Some(kinds.iter().filter(|k| **k).count()))?;

        if !self.indicators.is_empty() {
            map.serialize_entry("indicators", &DocsView::from(self.indicators.as_slice()))?;
        }
        if !self.sightings.is_empty() {
            map.serialize_entry("sightings", &DocsView::from(self.sightings.as_slice()))?;
        }
        if !self.relationships.is_empty() {
            map.serialize_entry("relationships", &DocsView::from(self.relationships.as_slice()))?;
        }

        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ctim::{SCHEMA_VERSION, ValidTime};
    use serde_json::json;

    fn indicator(id: &str) -> Indicator {
        Indicator {
            id: id.to_string(),
            kind: "indicator",
            schema_version: SCHEMA_VERSION,
            producer: "StealthMole",
            tlp: "red",
            valid_time: ValidTime::default(),
            tags: vec!["darkweb", "leaked"],
            confidence: "High".to_string(),
            source: "StealthMole Compromised Data Set".to_string(),
            title: "1 Credentials leaked from Infosteatler Malwares".to_string(),
        }
    }

    fn relationship(id: &str) -> Relationship {
        Relationship {
            id: id.to_string(),
            kind: "relationship",
            schema_version: SCHEMA_VERSION,
            relationship_type: "sighting-of",
            source_ref: "transient:sighting-1".to_string(),
            target_ref: "transient:indicator-1".to_string(),
        }
    }

    #[test]
    fn test_empty_bundle_serializes_to_empty_object() {
        let bundle = Bundle::new();
        assert!(bundle.is_empty());
        assert_eq!(serde_json::to_value(&bundle).unwrap(), json!({}));
    }

    #[test]
    fn test_add_ignores_repeated_ids() {
        let mut bundle = Bundle::new();
        assert!(bundle.add(indicator("transient:indicator-1")));
        assert!(!bundle.add(indicator("transient:indicator-1")));
        assert!(bundle.add(indicator("transient:indicator-2")));

        assert_eq!(bundle.len(), 2);
        assert_eq!(bundle.indicators().len(), 2);
    }

    #[test]
    fn test_serializes_only_present_kinds_in_order() {
        let mut bundle = Bundle::new();
        bundle.add(indicator("transient:indicator-1"));
        bundle.add(relationship("transient:relationship-1"));
        bundle.add(indicator("transient:indicator-2"));

        let value = serde_json::to_value(&bundle).unwrap();

        assert!(value.get("sightings").is_none());
        assert_eq!(value["indicators"]["count"], 2);
        assert_eq!(value["indicators"]["docs"][0]["id"], "transient:indicator-1");
        assert_eq!(value["indicators"]["docs"][1]["id"], "transient:indicator-2");
        assert_eq!(value["relationships"]["count"], 1);
        assert_eq!(value["relationships"]["docs"][0]["relationship_type"], "sighting-of");
    }
}
