use std::fmt;

use crate::context::ValidationContext;
use crate::error::ParseError;
use crate::flag::FlagSpec;
use crate::types::{OptValue, OptionType};

/// Per-value validation callback. Runs once per value (once per element for
/// `multiple` options) and rejects through the context's failure primitives.
pub type Validator = Box<dyn Fn(&OptValue, &ValidationContext) -> Result<(), ParseError>>;

/// Declaration of one command-line option.
///
/// ```ignore
/// OptionSpec::new("tries", ["-t", "--tries NUMBER"])
///     .describe("set number of retries to NUMBER (0 unlimits)")
///     .kind(OptionType::Integer)
///     .default_value(0)
///     .validate(|value, ctx| match value.as_integer() {
///         Some(n) if n < 0 => ctx.invalid_argument(),
///         _ => Ok(()),
///     })
/// ```
pub struct OptionSpec {
    pub(crate) id: String,
    pub(crate) tokens: Vec<String>,
    pub(crate) description: Option<String>,
    pub(crate) kind: Option<OptionType>,
    pub(crate) default: Option<OptValue>,
    pub(crate) required: bool,
    pub(crate) multiple: bool,
    pub(crate) validator: Option<Validator>,
}

impl OptionSpec {
    pub fn new<I, S>(id: &str, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.to_string(),
            tokens: flags.into_iter().map(Into::into).collect(),
            description: None,
            kind: None,
            default: None,
            required: false,
            multiple: false,
            validator: None,
        }
    }

    /// Help text shown next to the flag.
    pub fn describe(mut self, text: &str) -> Self {
        self.description = Some(text.to_string());
        self
    }

    /// Declared type. Without one, options with an argument placeholder are
    /// strings and options without one are presence flags.
    pub fn kind(mut self, kind: OptionType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn default_value<V: Into<OptValue>>(mut self, value: V) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Fail with "not given" unless some source supplies a value.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Accumulate repeated occurrences into a sequence.
    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn validate<F>(mut self, f: F) -> Self
    where
        F: Fn(&OptValue, &ValidationContext) -> Result<(), ParseError> + 'static,
    {
        self.validator = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for OptionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionSpec")
            .field("id", &self.id)
            .field("tokens", &self.tokens)
            .field("kind", &self.kind)
            .field("default", &self.default)
            .field("required", &self.required)
            .field("multiple", &self.multiple)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

/// An [`OptionSpec`] after its flags have been parsed and its type settled.
pub(crate) struct ResolvedSpec {
    pub id: String,
    pub flags: FlagSpec,
    pub description: Option<String>,
    pub kind: OptionType,
    pub default: Option<OptValue>,
    pub required: bool,
    pub multiple: bool,
    pub validator: Option<Validator>,
}

impl ResolvedSpec {
    pub fn takes_argument(&self) -> bool {
        self.flags.takes_argument() || self.kind != OptionType::Flag
    }

    /// Run the validator, if any, against one value.
    pub fn check(&self, value: &OptValue, ctx: &ValidationContext) -> Result<(), ParseError> {
        match &self.validator {
            Some(validator) => validator(value, ctx),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for ResolvedSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedSpec")
            .field("id", &self.id)
            .field("flags", &self.flags)
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("multiple", &self.multiple)
            .finish_non_exhaustive()
    }
}
