use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Category of a parse failure.
///
/// The first seven kinds mirror the classic getopt-style failure classes;
/// `Generic` carries a caller-chosen reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    AmbiguousOption,
    NeedlessArgument,
    MissingArgument,
    InvalidOption,
    InvalidArgument,
    AmbiguousArgument,
    NotGiven,
    Generic(String),
}

impl ParseErrorKind {
    /// Human-readable reason used as the message prefix.
    pub fn reason(&self) -> &str {
        match self {
            ParseErrorKind::AmbiguousOption => "ambiguous option",
            ParseErrorKind::NeedlessArgument => "needless argument",
            ParseErrorKind::MissingArgument => "missing argument",
            ParseErrorKind::InvalidOption => "invalid option",
            ParseErrorKind::InvalidArgument => "invalid argument",
            ParseErrorKind::AmbiguousArgument => "ambiguous argument",
            ParseErrorKind::NotGiven => "required option was not given",
            ParseErrorKind::Generic(reason) => reason,
        }
    }
}

/// A categorized parse failure, tagged with the raw tokens that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub args: Vec<String>,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, args: Vec<String>) -> Self {
        Self { kind, args }
    }

    /// Re-tag an error raised while processing a config document value so
    /// the message names the document key and the raw value.
    pub(crate) fn in_document(mut self, source: Option<&str>, key: &str, raw: &str) -> Self {
        self.args.clear();
        if let Some(source) = source {
            self.args.push(source.to_string());
        }
        self.args.push(format!("({key}: {raw})"));
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.reason())?;
        if !self.args.is_empty() {
            write!(f, ": {}", self.args.join(" "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Error)]
pub enum OptError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Two or more config file flags declared")]
    DuplicateConfigFlag,

    #[error("Option '{0}' declared more than once")]
    DuplicateOption(String),

    #[error("Invalid flag spec '{token}' for '{option}': {reason}")]
    InvalidFlagSpec {
        option: String,
        token: String,
        reason: String,
    },

    #[error("Invalid default for '{option}': {reason}")]
    InvalidDefault { option: String, reason: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    JsonParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Config document {path} is not a key/value table")]
    NotATable { path: PathBuf },

    /// Help or version text was requested. Not a failure; the caller prints
    /// the text and exits successfully.
    #[error("{0}")]
    Display(String),
}

impl OptError {
    /// The categorized parse failure, if this is one.
    pub fn parse_error(&self) -> Option<&ParseError> {
        match self {
            OptError::Parse(e) => Some(e),
            _ => None,
        }
    }

    pub fn kind(&self) -> Option<&ParseErrorKind> {
        self.parse_error().map(|e| &e.kind)
    }

    pub fn is_display(&self) -> bool {
        matches!(self, OptError::Display(_))
    }
}
