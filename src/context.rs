//! The restricted environment handed to validators and hooks.
//!
//! A [`ValidationContext`] remembers the raw token(s) that produced the value
//! under validation and offers one constructor per failure category. Each
//! returns `Err`, so a validator rejects a value with
//! `return ctx.invalid_argument();`.

use crate::error::{ParseError, ParseErrorKind};

#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    args: Vec<String>,
}

impl ValidationContext {
    pub(crate) fn new(args: Vec<String>) -> Self {
        Self { args }
    }

    /// The raw tokens failures will be tagged with.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    fn fail<T>(&self, kind: ParseErrorKind) -> Result<T, ParseError> {
        Err(ParseError::new(kind, self.args.clone()))
    }

    pub fn generic_error<T>(&self, reason: impl Into<String>) -> Result<T, ParseError> {
        self.fail(ParseErrorKind::Generic(reason.into()))
    }

    pub fn ambiguous_option<T>(&self) -> Result<T, ParseError> {
        self.fail(ParseErrorKind::AmbiguousOption)
    }

    pub fn needless_argument<T>(&self) -> Result<T, ParseError> {
        self.fail(ParseErrorKind::NeedlessArgument)
    }

    pub fn missing_argument<T>(&self) -> Result<T, ParseError> {
        self.fail(ParseErrorKind::MissingArgument)
    }

    pub fn invalid_option<T>(&self) -> Result<T, ParseError> {
        self.fail(ParseErrorKind::InvalidOption)
    }

    pub fn invalid_argument<T>(&self) -> Result<T, ParseError> {
        self.fail(ParseErrorKind::InvalidArgument)
    }

    pub fn ambiguous_argument<T>(&self) -> Result<T, ParseError> {
        self.fail(ParseErrorKind::AmbiguousArgument)
    }

    pub fn not_given<T>(&self) -> Result<T, ParseError> {
        self.fail(ParseErrorKind::NotGiven)
    }
}
