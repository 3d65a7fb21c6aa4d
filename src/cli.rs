//! Clap adapter: the argument tokenizer behind the merge engine.
//!
//! Every declared option becomes a runtime [`clap::Arg`] that collects raw
//! `String` values; coercion and validation stay in the merge engine. Clap
//! records the position of each occurrence, so the matches are flattened
//! back into [`Event`]s in command-line order. That order is what gives the
//! config file flag its position-dependent precedence.
//!
//! Argument-less switches use [`ArgAction::Count`]; clap keeps one index per
//! occurrence, so each repetition becomes its own event.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};

use crate::builder::OptionTable;
use crate::error::{OptError, ParseError, ParseErrorKind};
use crate::flag::FlagSpec;

const CONFIG_ID: &str = "@config";
const HELP_ID: &str = "@help";
const VERSION_ID: &str = "@version";
const OPERANDS_ID: &str = "@operands";

/// Stands in for an omitted optional argument (`--level` for `--level[=N]`).
/// NUL cannot appear in a process argument.
const NO_ARGUMENT: &str = "\u{0}";

/// One matched flag, in command-line order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Event {
    /// Option at `spec` (index into the table) with its raw argument.
    Option { spec: usize, raw: Option<String> },
    ConfigFile(PathBuf),
}

#[derive(Debug, Default)]
pub(crate) struct Tokenized {
    pub events: Vec<Event>,
    pub operands: Vec<String>,
    pub version_requested: bool,
}

/// Build the clap command for a table: one arg per option, the config file
/// flag, hidden operands, and `-h`/`-v` unless a declared flag claims them.
pub(crate) fn build_command(table: &OptionTable) -> Command {
    let mut cmd = Command::new(table.program_name.clone())
        .disable_help_flag(true)
        .disable_version_flag(true)
        .infer_long_args(true)
        .arg(
            Arg::new(OPERANDS_ID)
                .num_args(0..)
                .action(ArgAction::Append)
                .value_parser(value_parser!(String))
                .hide(true),
        );
    if let Some(banner) = &table.banner {
        cmd = cmd.override_usage(banner.clone());
    }

    for spec in &table.specs {
        let mut arg = with_flags(Arg::new(spec.id.clone()), &spec.flags);
        if let Some(description) = &spec.description {
            arg = arg.help(description.clone());
        }
        arg = if spec.takes_argument() {
            with_value(arg, &spec.flags)
        } else {
            arg.action(ArgAction::Count)
        };
        cmd = cmd.arg(arg);
    }

    if let Some(config) = &table.config_flag {
        let arg = with_flags(Arg::new(CONFIG_ID), &config.flags).help(config.description.clone());
        cmd = cmd.arg(with_value(arg, &config.flags));
    }

    if !table.claims_flag('h', "help") {
        cmd = cmd.arg(
            Arg::new(HELP_ID)
                .short('h')
                .long("help")
                .action(ArgAction::Help)
                .help("show this message"),
        );
    }
    if !table.claims_flag('v', "version") {
        cmd = cmd.arg(
            Arg::new(VERSION_ID)
                .short('v')
                .long("version")
                .action(ArgAction::Count)
                .help("show version"),
        );
    }
    cmd
}

fn with_flags(mut arg: Arg, flags: &FlagSpec) -> Arg {
    if let Some(short) = flags.short {
        arg = arg.short(short);
    }
    if let Some(long) = &flags.long {
        arg = arg.long(long.clone());
    }
    arg
}

fn with_value(arg: Arg, flags: &FlagSpec) -> Arg {
    let arg = arg
        .action(ArgAction::Append)
        .value_parser(value_parser!(String))
        .value_name(flags.placeholder.clone().unwrap_or_else(|| "VALUE".to_string()));
    if flags.optional_arg {
        arg.num_args(0..=1).default_missing_value(NO_ARGUMENT)
    } else {
        arg.num_args(1).allow_hyphen_values(true)
    }
}

/// Run clap over `args` (program name first) and flatten the matches into
/// ordered events.
pub(crate) fn tokenize<I, T>(table: &OptionTable, args: I) -> Result<Tokenized, OptError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = build_command(table)
        .try_get_matches_from(args)
        .map_err(|e| from_clap(e, table))?;

    let mut events: Vec<(usize, Event)> = Vec::new();
    for (pos, spec) in table.specs.iter().enumerate() {
        let id = spec.id.as_str();
        if spec.takes_argument() {
            for (index, value) in indexed_values(&matches, id) {
                let raw = (value != NO_ARGUMENT).then_some(value);
                events.push((index, Event::Option { spec: pos, raw }));
            }
        } else {
            for index in matches.indices_of(id).into_iter().flatten() {
                events.push((index, Event::Option { spec: pos, raw: None }));
            }
        }
    }
    if table.config_flag.is_some() {
        for (index, value) in indexed_values(&matches, CONFIG_ID) {
            events.push((index, Event::ConfigFile(PathBuf::from(value))));
        }
    }
    events.sort_by_key(|(index, _)| *index);

    let operands = matches
        .get_many::<String>(OPERANDS_ID)
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let version_requested = matches!(matches.try_get_one::<u8>(VERSION_ID), Ok(Some(n)) if *n > 0);

    Ok(Tokenized {
        events: events.into_iter().map(|(_, event)| event).collect(),
        operands,
        version_requested,
    })
}

fn indexed_values(matches: &ArgMatches, id: &str) -> Vec<(usize, String)> {
    match (matches.indices_of(id), matches.get_many::<String>(id)) {
        (Some(indices), Some(values)) => indices.zip(values.cloned()).collect(),
        _ => Vec::new(),
    }
}

/// Map a clap failure onto the parse-error categories. Help and version
/// requests become [`OptError::Display`].
fn from_clap(err: clap::Error, table: &OptionTable) -> OptError {
    let mut kind = match err.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            return OptError::Display(err.to_string());
        }
        ErrorKind::UnknownArgument => ParseErrorKind::InvalidOption,
        ErrorKind::InvalidValue | ErrorKind::TooFewValues | ErrorKind::WrongNumberOfValues => {
            ParseErrorKind::MissingArgument
        }
        ErrorKind::TooManyValues | ErrorKind::NoEquals => ParseErrorKind::NeedlessArgument,
        ErrorKind::InvalidUtf8 | ErrorKind::ValueValidation => ParseErrorKind::InvalidArgument,
        other => ParseErrorKind::Generic(other.to_string()),
    };
    let args = match err.get(ContextKind::InvalidArg) {
        Some(ContextValue::String(arg)) => vec![arg.clone()],
        _ => Vec::new(),
    };

    // Clap rejects a long-flag prefix shared by several options as unknown.
    if kind == ParseErrorKind::InvalidOption
        && let Some(prefix) = args.first().and_then(|a| a.strip_prefix("--"))
    {
        let prefix = prefix.split('=').next().unwrap_or(prefix);
        if !prefix.is_empty() && table.longs_with_prefix(prefix) > 1 {
            kind = ParseErrorKind::AmbiguousOption;
        }
    }
    ParseError::new(kind, args).into()
}
