use std::collections::HashSet;
use std::ffi::OsString;

use crate::context::ValidationContext;
use crate::document::ConfigDocument;
use crate::error::{OptError, ParseError};
use crate::flag::FlagSpec;
use crate::options::MergedOptions;
use crate::resolve;
use crate::spec::{OptionSpec, ResolvedSpec};
use crate::types::{OptValue, OptionType};

/// Runs on the config document before options are resolved from it.
pub type BeforeHook =
    Box<dyn Fn(&mut ConfigDocument, &ValidationContext) -> Result<(), ParseError>>;

/// Runs on the final options map.
pub type AfterHook = Box<dyn Fn(&mut MergedOptions, &ValidationContext) -> Result<(), ParseError>>;

/// Receives any failure raised while parsing. Its result replaces the
/// parse result; aborting the process is the usual choice.
pub type ErrorHandler = Box<dyn Fn(OptError) -> Result<MergedOptions, OptError>>;

const CONFIG_FLAG_DESCRIPTION: &str = "reading config file";

/// Entry point for declaring options.
pub struct Optmerge;

impl Optmerge {
    pub fn builder() -> OptmergeBuilder {
        OptmergeBuilder::new()
    }
}

/// Declaration phase: collects option specs, the config file flag, hooks and
/// program metadata. [`build()`](Self::build) validates everything and
/// produces the [`OptionTable`] that parses arguments.
pub struct OptmergeBuilder {
    program_name: Option<String>,
    banner: Option<String>,
    version: Option<String>,
    release: Option<String>,
    default_argv: Option<Vec<String>>,
    options: Vec<OptionSpec>,
    config_flag: Option<(Vec<String>, String)>,
    config_flag_count: usize,
    before: Option<BeforeHook>,
    after: Option<AfterHook>,
    on_error: Option<ErrorHandler>,
}

impl OptmergeBuilder {
    fn new() -> Self {
        Self {
            program_name: None,
            banner: None,
            version: None,
            release: None,
            default_argv: None,
            options: Vec::new(),
            config_flag: None,
            config_flag_count: 0,
            before: None,
            after: None,
            on_error: None,
        }
    }

    /// Program name shown in help and version output (default: the
    /// executable's file name).
    pub fn program_name(mut self, name: &str) -> Self {
        self.program_name = Some(name.to_string());
        self
    }

    /// Replace the usage line of the help text.
    pub fn banner(mut self, banner: &str) -> Self {
        self.banner = Some(banner.to_string());
        self
    }

    pub fn version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    /// Release label appended to the version output.
    pub fn release(mut self, release: &str) -> Self {
        self.release = Some(release.to_string());
        self
    }

    /// Arguments [`OptionTable::parse`] reads instead of the process
    /// arguments. Excludes the program name.
    pub fn default_argv<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_argv = Some(args.into_iter().map(Into::into).collect());
        self
    }

    /// Declare an option. Declaration order is kept for help output only.
    pub fn declare(mut self, spec: OptionSpec) -> Self {
        self.options.push(spec);
        self
    }

    /// Declare the flag that names a config document to merge, e.g.
    /// `["-c", "--config-file FILE"]`. Only one may be declared; a second one
    /// makes [`build()`](Self::build) fail with
    /// [`OptError::DuplicateConfigFlag`].
    pub fn config_flag<I, S>(mut self, flags: I, description: Option<&str>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config_flag_count += 1;
        if self.config_flag.is_none() {
            let description = description.unwrap_or(CONFIG_FLAG_DESCRIPTION).to_string();
            self.config_flag = Some((flags.into_iter().map(Into::into).collect(), description));
        }
        self
    }

    /// Hook run on the config document before options are resolved from it.
    /// Without a config file flag, the hook runs on an empty document before
    /// any command-line flag is applied.
    pub fn before<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut ConfigDocument, &ValidationContext) -> Result<(), ParseError> + 'static,
    {
        self.before = Some(Box::new(hook));
        self
    }

    /// Hook run on the merged options, after the required-option check.
    pub fn after<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut MergedOptions, &ValidationContext) -> Result<(), ParseError> + 'static,
    {
        self.after = Some(Box::new(hook));
        self
    }

    /// Handler receiving every parse failure instead of the caller.
    pub fn on_error<F>(mut self, handler: F) -> Self
    where
        F: Fn(OptError) -> Result<MergedOptions, OptError> + 'static,
    {
        self.on_error = Some(Box::new(handler));
        self
    }

    /// Validate the declarations and produce the parser.
    pub fn build(self) -> Result<OptionTable, OptError> {
        if self.config_flag_count > 1 {
            return Err(OptError::DuplicateConfigFlag);
        }

        let mut ids = HashSet::new();
        let mut specs = Vec::with_capacity(self.options.len());
        for spec in self.options {
            if !ids.insert(spec.id.clone()) {
                return Err(OptError::DuplicateOption(spec.id));
            }
            specs.push(resolve_spec(spec)?);
        }

        let config_flag = match self.config_flag {
            Some((tokens, description)) => {
                let flags = FlagSpec::parse("config file", &tokens)?;
                if !flags.takes_argument() || flags.optional_arg {
                    return Err(OptError::InvalidFlagSpec {
                        option: "config file".into(),
                        token: flags.primary,
                        reason: "the config file flag needs a required argument".into(),
                    });
                }
                Some(ConfigFlag { flags, description })
            }
            None => None,
        };

        check_flag_collisions(
            specs
                .iter()
                .map(|s| &s.flags)
                .chain(config_flag.iter().map(|c| &c.flags)),
        )?;

        Ok(OptionTable {
            program_name: self.program_name.unwrap_or_else(default_program_name),
            banner: self.banner,
            version: self.version,
            release: self.release,
            default_argv: self.default_argv,
            specs,
            config_flag,
            before: self.before,
            after: self.after,
            on_error: self.on_error,
        })
    }

    /// Shorthand for `build()?.try_parse_from(args)`.
    pub fn try_parse_from<I, T>(self, args: I) -> Result<MergedOptions, OptError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        self.build()?.try_parse_from(args)
    }
}

/// Settle an option's type and check its default against it.
fn resolve_spec(spec: OptionSpec) -> Result<ResolvedSpec, OptError> {
    let flags = FlagSpec::parse(&spec.id, &spec.tokens)?;
    let kind = match spec.kind {
        Some(OptionType::Flag) if flags.takes_argument() => {
            return Err(OptError::InvalidFlagSpec {
                option: spec.id,
                token: flags.primary,
                reason: "a presence flag takes no argument".into(),
            });
        }
        Some(kind) => kind,
        None if flags.takes_argument() => OptionType::String,
        None => OptionType::Flag,
    };

    let default = match (spec.default, &kind) {
        (Some(OptValue::Str(name)), OptionType::OneOf(allowed)) => {
            if !allowed.contains(&name) {
                return Err(OptError::InvalidDefault {
                    option: spec.id,
                    reason: format!("'{name}' is not one of {}", allowed.join(", ")),
                });
            }
            Some(OptValue::Symbol(name))
        }
        (default, _) => default,
    };

    Ok(ResolvedSpec {
        id: spec.id,
        flags,
        description: spec.description,
        kind,
        default,
        required: spec.required,
        multiple: spec.multiple,
        validator: spec.validator,
    })
}

fn check_flag_collisions<'a>(flags: impl Iterator<Item = &'a FlagSpec>) -> Result<(), OptError> {
    let mut shorts = HashSet::new();
    let mut longs = HashSet::new();
    for spec in flags {
        let short_taken = spec.short.is_some_and(|c| !shorts.insert(c));
        let long_taken = spec.long.as_ref().is_some_and(|l| !longs.insert(l.clone()));
        if short_taken || long_taken {
            return Err(OptError::InvalidFlagSpec {
                option: spec.primary.clone(),
                token: spec.primary.clone(),
                reason: "flag already declared by another option".into(),
            });
        }
    }
    Ok(())
}

fn default_program_name() -> String {
    std::env::args_os()
        .next()
        .as_deref()
        .map(std::path::Path::new)
        .and_then(|path| path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "program".to_string())
}

pub(crate) struct ConfigFlag {
    pub flags: FlagSpec,
    pub description: String,
}

/// The validated option table. Consumed by parsing.
pub struct OptionTable {
    pub(crate) program_name: String,
    pub(crate) banner: Option<String>,
    pub(crate) version: Option<String>,
    pub(crate) release: Option<String>,
    pub(crate) default_argv: Option<Vec<String>>,
    pub(crate) specs: Vec<ResolvedSpec>,
    pub(crate) config_flag: Option<ConfigFlag>,
    pub(crate) before: Option<BeforeHook>,
    pub(crate) after: Option<AfterHook>,
    pub(crate) on_error: Option<ErrorHandler>,
}

impl OptionTable {
    /// Rendered help listing.
    pub fn help(&self) -> String {
        crate::cli::build_command(self).render_help().to_string()
    }

    /// `"<program> <version>"`, plus ` (<release>)` when a release is set.
    pub fn version_text(&self) -> Option<String> {
        let version = self.version.as_ref()?;
        Some(match &self.release {
            Some(release) => format!("{} {version} ({release})", self.program_name),
            None => format!("{} {version}", self.program_name),
        })
    }

    /// Parse `args` (program name first) and merge all sources.
    ///
    /// Help and version requests come back as [`OptError::Display`] and never
    /// reach the error handler.
    pub fn try_parse_from<I, T>(self, args: I) -> Result<MergedOptions, OptError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        resolve::run(&self, args)
    }

    /// Parse the process arguments (or the configured default argv). Help
    /// and version text is printed and the process exits successfully.
    pub fn parse(self) -> Result<MergedOptions, OptError> {
        let args: Vec<OsString> = match &self.default_argv {
            Some(argv) => std::iter::once(self.program_name.clone())
                .chain(argv.iter().cloned())
                .map(OsString::from)
                .collect(),
            None => std::env::args_os().collect(),
        };
        match self.try_parse_from(args) {
            Err(OptError::Display(text)) => {
                println!("{}", text.trim_end());
                std::process::exit(0);
            }
            other => other,
        }
    }

    /// Whether a declared flag already uses `-<short>` or `--<long>`.
    pub(crate) fn claims_flag(&self, short: char, long: &str) -> bool {
        self.all_flags()
            .any(|f| f.short == Some(short) || f.long.as_deref() == Some(long))
    }

    /// Number of declared long flags starting with `prefix`.
    pub(crate) fn longs_with_prefix(&self, prefix: &str) -> usize {
        self.all_flags()
            .filter_map(|f| f.long.as_deref())
            .filter(|long| long.starts_with(prefix))
            .count()
    }

    fn all_flags(&self) -> impl Iterator<Item = &FlagSpec> {
        self.specs
            .iter()
            .map(|s| &s.flags)
            .chain(self.config_flag.iter().map(|c| &c.flags))
    }
}
