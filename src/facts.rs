//! Device facts container

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Facts gathered from a switch, in gathering order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactSet {
    data: IndexMap<String, serde_json::Value>,
}

impl FactSet {
    /// Create empty facts
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a fact
    pub fn set(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.data.insert(key.into(), value);
    }

    /// Set a fact only when a value was parsed
    pub fn set_opt<T: Into<serde_json::Value>>(&mut self, key: impl Into<String>, value: Option<T>) {
        if let Some(value) = value {
            self.set(key, value.into());
        }
    }

    /// Get a fact
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// Check whether a fact was gathered
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Render as the `ansible_`-prefixed mapping reported to callers
    pub fn to_prefixed_json(&self, prefix: &str) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .data
            .iter()
            .map(|(k, v)| (format!("{}{}", prefix, k), v.clone()))
            .collect();
        serde_json::Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_opt_skips_none() {
        let mut facts = FactSet::new();
        facts.set_opt("net_model", Some("ICX7150"));
        facts.set_opt::<String>("net_version", None);

        assert!(facts.contains("net_model"));
        assert!(!facts.contains("net_version"));
        assert_eq!(facts.len(), 1);
    }

    #[test]
    fn test_prefixed_json_keeps_gathering_order() {
        let mut facts = FactSet::new();
        facts.set("net_model", json!("a"));
        facts.set("net_version", json!("1"));
        facts.set("net_model", json!("b"));

        let prefixed = facts.to_prefixed_json("ansible_");
        let keys: Vec<&String> = prefixed.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["ansible_net_model", "ansible_net_version"]);
        assert_eq!(prefixed["ansible_net_model"], json!("b"));
    }

    #[test]
    fn test_prefixed_json() {
        let mut facts = FactSet::new();
        facts.set("net_model", json!("Stackable ICX7150-C12-POE"));
        assert_eq!(
            facts.to_prefixed_json("ansible_"),
            json!({"ansible_net_model": "Stackable ICX7150-C12-POE"})
        );
    }
}
