//! The structured configuration document and its key spellings.
//!
//! A document key matches an option identifier under three spellings: as
//! given, dash-separated, and underscore-separated. `output_file`,
//! `output-file` and `output_file` all reach the option `output_file`.
//!
//! Documents are TOML; paths ending in `.json` are read as JSON. JSON `null`
//! has no TOML counterpart and is dropped on load.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use toml::{Table, Value};

use crate::error::OptError;

/// Dash-separated spelling of a key: `output_file` → `output-file`.
pub fn dash_form(key: &str) -> String {
    key.replace('_', "-")
}

/// Underscore-separated spelling of a key: `output-file` → `output_file`.
pub fn underscore_form(key: &str) -> String {
    key.replace('-', "_")
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDocument {
    table: Table,
    /// Keys inserted as symbolic identifiers; rewritten to their dash form
    /// before option lookup.
    symbols: BTreeSet<String>,
    source: Option<PathBuf>,
}

impl ConfigDocument {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_table(table: Table) -> Self {
        Self {
            table,
            ..Self::default()
        }
    }

    /// Read and parse the document at `path`.
    pub fn load(path: &Path) -> Result<Self, OptError> {
        let content = std::fs::read_to_string(path).map_err(|e| OptError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let table = if is_json {
            parse_json(&content, path)?
        } else {
            toml::from_str(&content).map_err(|e| OptError::TomlParse {
                path: path.to_path_buf(),
                source: e,
            })?
        };
        tracing::debug!(path = %path.display(), keys = table.len(), "loaded config document");
        Ok(Self {
            table,
            symbols: BTreeSet::new(),
            source: Some(path.to_path_buf()),
        })
    }

    /// The file this document was read from; `None` for synthesized ones.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.table.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.table.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Insert under a free-form string key, exactly as given.
    pub fn insert<V: Into<Value>>(&mut self, key: &str, value: V) -> Option<Value> {
        self.symbols.remove(key);
        self.table.insert(key.to_string(), value.into())
    }

    /// Insert under a symbolic identifier. The key is rewritten to its
    /// dash-separated form before options are resolved.
    pub fn insert_symbol<V: Into<Value>>(&mut self, ident: &str, value: V) -> Option<Value> {
        self.symbols.insert(ident.to_string());
        self.table.insert(ident.to_string(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.symbols.remove(key);
        self.table.remove(key)
    }

    /// Rewrite every symbolic key to its dash-separated string form.
    pub(crate) fn normalize_symbols(&mut self) {
        for ident in std::mem::take(&mut self.symbols) {
            let dashed = dash_form(&ident);
            if dashed == ident {
                continue;
            }
            if let Some(value) = self.table.remove(&ident) {
                self.table.insert(dashed, value);
            }
        }
    }

    /// Find the value for option `id`, trying the identifier as given, then
    /// its dash form, then its underscore form. Returns the matching key.
    pub(crate) fn lookup(&self, id: &str) -> Option<(String, &Value)> {
        [id.to_string(), dash_form(id), underscore_form(id)]
            .into_iter()
            .find_map(|key| self.table.get(&key).map(|value| (key, value)))
    }
}

fn parse_json(content: &str, path: &Path) -> Result<Table, OptError> {
    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|e| OptError::JsonParse {
            path: path.to_path_buf(),
            source: e,
        })?;
    match json_to_toml(value) {
        Some(Value::Table(table)) => Ok(table),
        _ => Err(OptError::NotATable {
            path: path.to_path_buf(),
        }),
    }
}

fn json_to_toml(value: serde_json::Value) -> Option<Value> {
    use serde_json::Value as Json;
    match value {
        Json::Null => None,
        Json::Bool(b) => Some(Value::Boolean(b)),
        Json::Number(n) => n
            .as_i64()
            .map(Value::Integer)
            .or_else(|| n.as_f64().map(Value::Float)),
        Json::String(s) => Some(Value::String(s)),
        Json::Array(items) => Some(Value::Array(
            items.into_iter().filter_map(json_to_toml).collect(),
        )),
        Json::Object(map) => Some(Value::Table(
            map.into_iter()
                .filter_map(|(k, v)| json_to_toml(v).map(|v| (k, v)))
                .collect(),
        )),
    }
}
