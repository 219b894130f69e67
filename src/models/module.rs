//! Provider module descriptors

use serde::{Deserialize, Serialize};

/// One StealthMole sub-service and the observable types it answers for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    /// Path segment in the search URL (`cds`, `cl`, ...)
    pub code: String,
    /// Display name, used in `source` labels
    pub name: String,
    /// Where the leaked credentials came from, used in indicator titles
    pub source: String,
    /// CTIM confidence (`High`, `Medium`, `Low`)
    pub confidence: String,
    pub observable_types: Vec<String>,
    /// Record field carrying the leak timestamp; derived from `code` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leak_date_field: Option<String>,
}

impl Module {
    pub fn new(code: &str, name: &str, source: &str, confidence: &str, observable_types: &[&str]) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            source: source.to_string(),
            confidence: confidence.to_string(),
            observable_types: observable_types.iter().map(|t| t.to_string()).collect(),
            leak_date_field: None,
        }
    }

    /// Built-in module set
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("cds", "Compromised Data Set", "Infosteatler Malwares", "High", &["email", "domain", "ip", "url"]),
            Self::new("cl", "Credential Lookout", "Data Breaches", "High", &["email", "domain"]),
            Self::new("cb", "Combo Binder", "Combo Lists", "Medium", &["email", "domain"]),
            Self::new("ul", "ULP Binder", "URL-Login-Password Lists", "Medium", &["domain", "url"]),
        ]
    }

    pub fn supports(&self, observable_type: &str) -> bool {
        self.observable_types.iter().any(|t| t == observable_type)
    }

    /// Name of the leak-date field in this module's result records
    pub fn leak_date_key(&self) -> &str {
        match &self.leak_date_field {
            Some(field) => field,
            None => match self.code.as_str() {
                "cds" | "cl" => "leaked_date",
                _ => "leakeddate",
            },
        }
    }

    /// `source` label shared by indicators and sightings
    pub fn source_label(&self) -> String {
        format!("StealthMole {}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leak_date_key_by_family() {
        let modules = Module::defaults();
        let keys: Vec<(&str, &str)> = modules
            .iter()
            .map(|m| (m.code.as_str(), m.leak_date_key()))
            .collect();

        assert_eq!(
            keys,
            vec![
                ("cds", "leaked_date"),
                ("cl", "leaked_date"),
                ("cb", "leakeddate"),
                ("ul", "leakeddate"),
            ]
        );
    }

    #[test]
    fn test_leak_date_override() {
        let mut module = Module::new("cb", "Combo Binder", "Combo Lists", "Medium", &["email"]);
        module.leak_date_field = Some("leaked_at".to_string());
        assert_eq!(module.leak_date_key(), "leaked_at");
    }

    #[test]
    fn test_supports() {
        let module = Module::new("cl", "Credential Lookout", "Data Breaches", "High", &["email", "domain"]);
        assert!(module.supports("email"));
        assert!(!module.supports("ip"));
        assert_eq!(module.source_label(), "StealthMole Credential Lookout");
    }
}
