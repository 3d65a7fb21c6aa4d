//! Declared command-line options merged with a config document.
//!
//! Optmerge keeps a registry of declared options and turns an argument vector
//! into one map of typed values. Each option has an identifier, one or more
//! flag spellings, a type, an optional default and an optional validator. A
//! designated config file flag names a TOML (or JSON) document whose keys
//! supply option values alongside the command line.
//!
//! ```ignore
//! let opts = Optmerge::builder()
//!     .program_name("fetch")
//!     .declare(OptionSpec::new("tries", ["-t", "--tries NUMBER"])
//!         .kind(OptionType::Integer)
//!         .default_value(0))
//!     .config_flag(["-c", "--config-file FILE"], None)
//!     .try_parse_from(["fetch", "-c", "fetch.toml", "--tries", "3"])?;
//!
//! assert_eq!(opts.get_integer("tries"), Some(3));
//! ```
//!
//! # Declaring options
//!
//! [`OptionSpec::new`] takes an identifier and flag tokens: `-t` for a short
//! switch, `--tries NUMBER` for a long flag with a placeholder, `--level
//! [LEVEL]` for an optional argument. A placeholder on any token makes the
//! option take an argument. The type is inferred when omitted: switches are
//! [`OptionType::Flag`], the rest [`OptionType::String`].
//!
//! | Type | Accepts | Value |
//! |------|---------|-------|
//! | `Flag` | no argument | `Bool(true)` |
//! | `String` | any text | `Str` |
//! | `Integer` | decimal, `0x`, `0b`, `0o`, leading-zero octal | `Integer` |
//! | `Time` | RFC 3339, RFC 2822, common date forms | `Time` |
//! | `List` | comma-separated text | `List` |
//! | `OneOf` | one of a closed set | `Symbol` |
//!
//! Options marked [`multiple`](OptionSpec::multiple) collect every
//! occurrence into a sequence. Options marked
//! [`required`](OptionSpec::required) fail with "not given" when no source
//! supplied them.
//!
//! # Source precedence
//!
//! ```text
//! Declared defaults      .default_value(...)
//!        ↑ overridden by
//! Flags and document     in command-line order
//!        ↑ never overridden by
//! Residual document keys keys naming no declared option
//! ```
//!
//! The command line is replayed left to right. The config document is
//! applied at the position of its flag: it overwrites values set by flags
//! before it, and flags after it overwrite the document. Document keys are
//! matched against an option identifier as written, in dash form and in
//! underscore form, so `output_file`, `output-file` and `"output_file"` all
//! reach the same option.
//!
//! Keys that match no option are carried into the result under their
//! underscore spelling, unless a value with that name already exists.
//!
//! # Hooks
//!
//! - [`before`](OptmergeBuilder::before) sees the loaded document and may
//!   edit it before it is applied. With no config flag declared, it runs once
//!   on an empty document before the command line is read.
//! - [`after`](OptmergeBuilder::after) sees the merged options and may edit
//!   them or reject the run.
//!
//! Both receive a [`ValidationContext`] whose primitives produce the standard
//! parse failures (`invalid_argument`, `not_given`, ...).
//!
//! # Error handling
//!
//! Every failure during a parse is an [`OptError`]. Parse failures carry a
//! [`ParseErrorKind`] and the offending arguments, and print the way a
//! command-line user expects:
//!
//! ```text
//! invalid argument: --tries -1
//! ```
//!
//! An [`on_error`](OptmergeBuilder::on_error) handler receives every parse
//! time failure and decides the outcome. Help and version requests surface as
//! [`OptError::Display`] and bypass the handler.

pub mod error;
pub mod types;

mod builder;
mod cli;
mod coerce;
mod context;
mod document;
mod flag;
mod merge;
mod options;
mod resolve;
mod spec;

#[cfg(test)]
mod fixtures;

pub use builder::{AfterHook, BeforeHook, ErrorHandler, OptionTable, Optmerge, OptmergeBuilder};
pub use coerce::{parse_integer, parse_time};
pub use context::ValidationContext;
pub use document::ConfigDocument;
pub use error::{OptError, ParseError, ParseErrorKind};
pub use flag::FlagSpec;
pub use options::MergedOptions;
pub use spec::{OptionSpec, Validator};
pub use types::{OptValue, OptionType};
