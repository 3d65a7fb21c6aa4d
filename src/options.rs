use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};

use crate::document::ConfigDocument;
use crate::types::OptValue;

/// Result of one parse: option values keyed by identifier, the raw config
/// document, and leftover non-option arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedOptions {
    values: BTreeMap<String, OptValue>,
    document: ConfigDocument,
    operands: Vec<String>,
}

impl MergedOptions {
    pub(crate) fn new(
        values: BTreeMap<String, OptValue>,
        document: ConfigDocument,
        operands: Vec<String>,
    ) -> Self {
        Self {
            values,
            document,
            operands,
        }
    }

    pub fn get(&self, id: &str) -> Option<&OptValue> {
        self.values.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.values.contains_key(id)
    }

    /// True when a switch was given (its value is boolean `true`).
    pub fn is_set(&self, id: &str) -> bool {
        self.get(id).and_then(OptValue::as_bool).unwrap_or(false)
    }

    pub fn get_str(&self, id: &str) -> Option<&str> {
        self.get(id).and_then(OptValue::as_str)
    }

    pub fn get_integer(&self, id: &str) -> Option<i64> {
        self.get(id).and_then(OptValue::as_integer)
    }

    pub fn get_time(&self, id: &str) -> Option<&DateTime<FixedOffset>> {
        self.get(id).and_then(OptValue::as_time)
    }

    pub fn get_list(&self, id: &str) -> Option<&[String]> {
        self.get(id).and_then(OptValue::as_list)
    }

    pub fn get_seq(&self, id: &str) -> Option<&[OptValue]> {
        self.get(id).and_then(OptValue::as_seq)
    }

    /// Set a value. Meant for post-merge hooks.
    pub fn insert<V: Into<OptValue>>(&mut self, id: &str, value: V) -> Option<OptValue> {
        self.values.insert(id.to_string(), value.into())
    }

    pub fn remove(&mut self, id: &str) -> Option<OptValue> {
        self.values.remove(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The raw config document as loaded (after the pre-merge hook), or an
    /// empty one when none was supplied.
    pub fn config_document(&self) -> &ConfigDocument {
        &self.document
    }

    /// Non-option arguments, in order.
    pub fn operands(&self) -> &[String] {
        &self.operands
    }

    pub fn into_values(self) -> BTreeMap<String, OptValue> {
        self.values
    }

    /// Values as a JSON object.
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(&self.values)
    }
}
