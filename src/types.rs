use chrono::{DateTime, FixedOffset};
use serde::Serialize;

/// Declared type of an option. Drives coercion of raw text tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionType {
    /// Argument-less switch. Presence yields `true`.
    Flag,
    String,
    /// Integer literal: decimal, `0x` hex, `0b` binary, `0o`/leading-zero octal.
    Integer,
    /// Date or date-time in one of the accepted formats.
    Time,
    /// Comma-separated list of strings.
    List,
    /// One of a fixed, case-sensitive set of symbols.
    OneOf(Vec<String>),
}

impl OptionType {
    /// Build a [`OptionType::OneOf`] from any list of allowed names.
    pub fn one_of<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        OptionType::OneOf(allowed.into_iter().map(Into::into).collect())
    }
}

/// A resolved option value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OptValue {
    Bool(bool),
    Str(String),
    Integer(i64),
    Float(f64),
    Time(DateTime<FixedOffset>),
    List(Vec<String>),
    Symbol(String),
    /// Accumulated values of a `multiple` option, or a document array.
    Seq(Vec<OptValue>),
    /// A nested table carried over verbatim from the config document.
    Table(toml::Table),
}

impl OptValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// String content of `Str` and `Symbol` values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptValue::Str(s) | OptValue::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            OptValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            OptValue::Time(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            OptValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[OptValue]> {
        match self {
            OptValue::Seq(items) => Some(items),
            _ => None,
        }
    }
}

impl From<bool> for OptValue {
    fn from(b: bool) -> Self {
        OptValue::Bool(b)
    }
}

impl From<i64> for OptValue {
    fn from(i: i64) -> Self {
        OptValue::Integer(i)
    }
}

impl From<i32> for OptValue {
    fn from(i: i32) -> Self {
        OptValue::Integer(i64::from(i))
    }
}

impl From<&str> for OptValue {
    fn from(s: &str) -> Self {
        OptValue::Str(s.to_string())
    }
}

impl From<String> for OptValue {
    fn from(s: String) -> Self {
        OptValue::Str(s)
    }
}

impl From<Vec<String>> for OptValue {
    fn from(items: Vec<String>) -> Self {
        OptValue::List(items)
    }
}

impl From<Vec<&str>> for OptValue {
    fn from(items: Vec<&str>) -> Self {
        OptValue::List(items.into_iter().map(String::from).collect())
    }
}

impl From<DateTime<FixedOffset>> for OptValue {
    fn from(t: DateTime<FixedOffset>) -> Self {
        OptValue::Time(t)
    }
}

/// Document values carry over structurally; datetimes keep their TOML text.
impl From<toml::Value> for OptValue {
    fn from(value: toml::Value) -> Self {
        match value {
            toml::Value::String(s) => OptValue::Str(s),
            toml::Value::Integer(i) => OptValue::Integer(i),
            toml::Value::Float(f) => OptValue::Float(f),
            toml::Value::Boolean(b) => OptValue::Bool(b),
            toml::Value::Datetime(dt) => OptValue::Str(dt.to_string()),
            toml::Value::Array(items) => {
                OptValue::Seq(items.into_iter().map(OptValue::from).collect())
            }
            toml::Value::Table(table) => OptValue::Table(table),
        }
    }
}
