//! The merge engine: turn a table and an argument vector into one options map.
//!
//! Steps:
//!
//! 1. Seed declared defaults
//! 2. Without a config file flag but with a pre-merge hook, apply an empty
//!    synthesized document up front
//! 3. Tokenize, then replay matched flags in command-line order. Option
//!    flags coerce, validate and store their value. The config file flag
//!    loads the document, runs the pre-merge hook and overwrites every
//!    option the document names
//! 4. Fail with "not given" for any required option still absent
//! 5. Merge residual document keys that match no option, never overwriting
//! 6. Run the post-merge hook
//!
//! Any failure goes to the error handler when one is declared.

use std::collections::{BTreeMap, HashSet};
use std::ffi::OsString;

use toml::Value;

use crate::builder::OptionTable;
use crate::cli::{self, Event};
use crate::coerce::coerce;
use crate::context::ValidationContext;
use crate::document::{ConfigDocument, underscore_form};
use crate::error::{OptError, ParseError, ParseErrorKind};
use crate::merge::merge_residual;
use crate::options::MergedOptions;
use crate::spec::ResolvedSpec;
use crate::types::{OptValue, OptionType};

/// Parse and merge, routing failures through the table's error handler.
pub(crate) fn run<I, T>(table: &OptionTable, args: I) -> Result<MergedOptions, OptError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match merge(table, args) {
        Err(err) if !err.is_display() => match &table.on_error {
            Some(handler) => {
                tracing::debug!(error = %err, "parse failed, invoking error handler");
                handler(err)
            }
            None => Err(err),
        },
        result => result,
    }
}

fn merge<I, T>(table: &OptionTable, args: I) -> Result<MergedOptions, OptError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut state = MergeState::new(table);
    state.seed_defaults();

    if table.config_flag.is_none() && table.before.is_some() {
        state.apply_document(ConfigDocument::empty())?;
    }

    let tokens = cli::tokenize(table, args)?;
    if tokens.version_requested {
        return match table.version_text() {
            Some(text) => Err(OptError::Display(text)),
            None => Err(ParseError::new(
                ParseErrorKind::Generic(format!("{}: version unknown", table.program_name)),
                Vec::new(),
            )
            .into()),
        };
    }

    for event in tokens.events {
        match event {
            Event::Option { spec, raw } => state.apply_flag(&table.specs[spec], raw)?,
            Event::ConfigFile(path) => state.apply_document(ConfigDocument::load(&path)?)?,
        }
    }

    state.check_required()?;
    let mut options = state.finish(tokens.operands);

    if let Some(after) = &table.after {
        after(&mut options, &ValidationContext::default())?;
    }
    Ok(options)
}

struct MergeState<'a> {
    table: &'a OptionTable,
    values: BTreeMap<String, OptValue>,
    document: Option<ConfigDocument>,
}

impl<'a> MergeState<'a> {
    fn new(table: &'a OptionTable) -> Self {
        Self {
            table,
            values: BTreeMap::new(),
            document: None,
        }
    }

    fn seed_defaults(&mut self) {
        for spec in &self.table.specs {
            if let Some(default) = &spec.default {
                self.values.insert(spec.id.clone(), default.clone());
            }
        }
    }

    /// Handle one command-line occurrence of an option.
    fn apply_flag(&mut self, spec: &ResolvedSpec, raw: Option<String>) -> Result<(), ParseError> {
        let flag = spec.flags.display_flag();
        let (value, ctx) = match raw {
            None => (OptValue::Bool(true), ValidationContext::new(vec![flag])),
            Some(raw) => {
                let ctx = ValidationContext::new(vec![flag, raw.clone()]);
                let value = coerce(&spec.kind, &raw).ok_or_else(|| {
                    ParseError::new(ParseErrorKind::InvalidArgument, ctx.args().to_vec())
                })?;
                (value, ctx)
            }
        };
        spec.check(&value, &ctx)?;
        self.store(spec, value);
        Ok(())
    }

    /// Store a command-line value: appended for `multiple` options (a
    /// scalar already present becomes the first element), overwritten
    /// otherwise.
    fn store(&mut self, spec: &ResolvedSpec, value: OptValue) {
        if !spec.multiple {
            self.values.insert(spec.id.clone(), value);
            return;
        }
        let items = match self.values.remove(&spec.id) {
            Some(OptValue::Seq(mut items)) => {
                items.push(value);
                items
            }
            Some(existing) => vec![existing, value],
            None => vec![value],
        };
        self.values.insert(spec.id.clone(), OptValue::Seq(items));
    }

    /// Run the pre-merge hook on `document`, then let it overwrite every
    /// option it names.
    fn apply_document(&mut self, mut document: ConfigDocument) -> Result<(), OptError> {
        if let Some(before) = &self.table.before {
            before(&mut document, &ValidationContext::default())?;
        }
        document.normalize_symbols();
        let source = document.source().map(|p| p.display().to_string());

        for spec in &self.table.specs {
            let Some((key, raw)) = document.lookup(&spec.id) else {
                continue;
            };
            let Some(value) = document_value(spec, &key, raw, source.as_deref())? else {
                continue;
            };
            if self.values.contains_key(&spec.id) {
                tracing::trace!(option = %spec.id, key = %key, "config document overwrites value");
            }
            self.values.insert(spec.id.clone(), value);
        }

        self.document = Some(document);
        Ok(())
    }

    fn check_required(&self) -> Result<(), ParseError> {
        match self
            .table
            .specs
            .iter()
            .find(|spec| spec.required && !self.values.contains_key(&spec.id))
        {
            Some(spec) => Err(ParseError::new(
                ParseErrorKind::NotGiven,
                vec![spec.flags.primary.clone()],
            )),
            None => Ok(()),
        }
    }

    fn finish(mut self, operands: Vec<String>) -> MergedOptions {
        let document = self.document.take().unwrap_or_default();
        let declared: HashSet<String> = self
            .table
            .specs
            .iter()
            .map(|spec| underscore_form(&spec.id))
            .collect();
        merge_residual(&mut self.values, &document, &declared);
        MergedOptions::new(self.values, document, operands)
    }
}

/// Resolve a document value for `spec`. `multiple` options take an array
/// element-wise (a scalar counts as one element). `Ok(None)` means the
/// option is left alone.
fn document_value(
    spec: &ResolvedSpec,
    key: &str,
    raw: &Value,
    source: Option<&str>,
) -> Result<Option<OptValue>, ParseError> {
    if !spec.multiple {
        return document_element(spec, key, raw, source);
    }
    let elements: Vec<&Value> = match raw {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };
    let mut values = Vec::with_capacity(elements.len());
    for element in elements {
        if let Some(value) = document_element(spec, key, element, source)? {
            values.push(value);
        }
    }
    Ok(Some(OptValue::Seq(values)))
}

fn document_element(
    spec: &ResolvedSpec,
    key: &str,
    raw: &Value,
    source: Option<&str>,
) -> Result<Option<OptValue>, ParseError> {
    let shown = scalar_text(raw).unwrap_or_else(|| raw.to_string());
    let invalid = || {
        ParseError::new(ParseErrorKind::InvalidArgument, Vec::new())
            .in_document(source, key, &shown)
    };

    let value = match (&spec.kind, raw) {
        (OptionType::Flag, Value::Boolean(false)) => return Ok(None),
        (OptionType::Flag, Value::Boolean(true)) => OptValue::Bool(true),
        (OptionType::Flag, _) => return Err(invalid()),
        (OptionType::List, Value::Array(items)) => OptValue::List(
            items
                .iter()
                .map(scalar_text)
                .collect::<Option<Vec<_>>>()
                .ok_or_else(invalid)?,
        ),
        (kind, raw) => {
            let text = scalar_text(raw).ok_or_else(invalid)?;
            coerce(kind, &text).ok_or_else(invalid)?
        }
    };

    let ctx = ValidationContext::new(vec![shown.clone()]);
    spec.check(&value, &ctx)
        .map_err(|e| e.in_document(source, key, &shown))?;
    Ok(Some(value))
}

/// Textual form of a scalar document value; `None` for arrays and tables.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Integer(i) => Some(i.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Boolean(b) => Some(b.to_string()),
        Value::Datetime(dt) => Some(dt.to_string()),
        Value::Array(_) | Value::Table(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Optmerge;
    use crate::fixtures::test::{fetch_builder, write_config};
    use crate::spec::OptionSpec;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Result<MergedOptions, OptError> {
        fetch_builder().try_parse_from(args.iter().copied())
    }

    // --- defaults ---

    #[test]
    fn defaults_survive_when_nothing_given() {
        let opts = parse(&["fetch"]).unwrap();
        assert_eq!(opts.get_str("output_file"), Some("/var/log/xxx.log"));
        assert_eq!(opts.get_integer("tries"), Some(0));
        assert_eq!(opts.get_list("accept"), Some(&[][..]));
        assert!(!opts.contains("debug"));
        assert!(!opts.contains("protocol"));
    }

    // --- command line ---

    #[test]
    fn command_line_values_coerced() {
        let opts = parse(&[
            "fetch", "-d", "--tries", "3", "-A", "jpg,png", "-P", "ftp", "-T", "2024-03-01",
        ])
        .unwrap();
        assert!(opts.is_set("debug"));
        assert_eq!(opts.get_integer("tries"), Some(3));
        assert_eq!(
            opts.get_list("accept"),
            Some(&["jpg".to_string(), "png".to_string()][..])
        );
        assert_eq!(opts.get("protocol"), Some(&OptValue::Symbol("ftp".into())));
        assert!(opts.get_time("timestamp").is_some());
    }

    #[test]
    fn validator_rejects_negative_tries() {
        let err = parse(&["fetch", "--tries", "-5"]).unwrap_err();
        assert_eq!(err.kind(), Some(&ParseErrorKind::InvalidArgument));
        assert!(err.to_string().contains("tries"));
        assert!(err.to_string().contains("-5"));
    }

    #[test]
    fn non_numeric_integer_is_invalid_argument() {
        let err = parse(&["fetch", "--tries", "many"]).unwrap_err();
        assert_eq!(err.kind(), Some(&ParseErrorKind::InvalidArgument));
        assert_eq!(err.to_string(), "invalid argument: --tries many");
    }

    #[test]
    fn unknown_enum_value_rejected() {
        let err = parse(&["fetch", "--protocol", "smtp"]).unwrap_err();
        assert_eq!(err.kind(), Some(&ParseErrorKind::InvalidArgument));
    }

    #[test]
    fn bad_time_rejected() {
        let err = parse(&["fetch", "-T", "someday"]).unwrap_err();
        assert_eq!(err.kind(), Some(&ParseErrorKind::InvalidArgument));
    }

    #[test]
    fn multiple_accumulates_in_order() {
        let opts = parse(&["fetch", "-R", "a", "-R", "b,c", "--record", "d"]).unwrap();
        assert_eq!(
            opts.get_seq("record"),
            Some(
                &[
                    OptValue::List(vec!["a".into()]),
                    OptValue::List(vec!["b".into(), "c".into()]),
                    OptValue::List(vec!["d".into()]),
                ][..]
            )
        );
    }

    #[test]
    fn multiple_appends_to_seeded_default() {
        let opts = Optmerge::builder()
            .program_name("t")
            .declare(
                OptionSpec::new("tag", ["--tag T"])
                    .multiple()
                    .default_value(OptValue::Seq(vec!["base".into()])),
            )
            .try_parse_from(["t", "--tag", "x", "--tag", "y"])
            .unwrap();
        assert_eq!(
            opts.get_seq("tag"),
            Some(
                &[
                    OptValue::Str("base".into()),
                    OptValue::Str("x".into()),
                    OptValue::Str("y".into()),
                ][..]
            )
        );
    }

    #[test]
    fn multiple_wraps_scalar_default() {
        let opts = Optmerge::builder()
            .program_name("t")
            .declare(OptionSpec::new("tag", ["--tag T"]).multiple().default_value("base"))
            .try_parse_from(["t", "--tag", "x"])
            .unwrap();
        assert_eq!(
            opts.get_seq("tag"),
            Some(&[OptValue::Str("base".into()), OptValue::Str("x".into())][..])
        );
    }

    #[test]
    fn last_occurrence_wins_for_single_value() {
        let opts = parse(&["fetch", "-t", "1", "-t", "2"]).unwrap();
        assert_eq!(opts.get_integer("tries"), Some(2));
    }

    #[test]
    fn validator_runs_per_element() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        Optmerge::builder()
            .program_name("t")
            .declare(
                OptionSpec::new("n", ["-n N"])
                    .kind(OptionType::Integer)
                    .multiple()
                    .validate(move |value, _| {
                        log.borrow_mut().push(value.clone());
                        Ok(())
                    }),
            )
            .try_parse_from(["t", "-n", "1", "-n", "2", "-n", "3"])
            .unwrap();
        assert_eq!(
            *seen.borrow(),
            vec![OptValue::Integer(1), OptValue::Integer(2), OptValue::Integer(3)]
        );
    }

    #[test]
    fn optional_argument_absent_is_true() {
        let table = || {
            Optmerge::builder()
                .program_name("t")
                .declare(OptionSpec::new("level", ["--level[=N]"]).kind(OptionType::Integer))
        };
        let opts = table().try_parse_from(["t", "--level"]).unwrap();
        assert_eq!(opts.get("level"), Some(&OptValue::Bool(true)));
        let opts = table().try_parse_from(["t", "--level=4"]).unwrap();
        assert_eq!(opts.get_integer("level"), Some(4));
    }

    // --- required ---

    #[test]
    fn required_missing_is_not_given() {
        let err = Optmerge::builder()
            .program_name("t")
            .declare(
                OptionSpec::new("timestamp", ["-T", "--timestamp TIME"])
                    .kind(OptionType::Time)
                    .required(),
            )
            .try_parse_from(["t"])
            .unwrap_err();
        assert_eq!(err.kind(), Some(&ParseErrorKind::NotGiven));
        assert_eq!(err.to_string(), "required option was not given: -T");
    }

    #[test]
    fn required_satisfied_by_document() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "app.toml", "timestamp = \"2024-01-02\"\n");
        let opts = Optmerge::builder()
            .program_name("t")
            .declare(OptionSpec::new("timestamp", ["-T TIME"]).kind(OptionType::Time).required())
            .config_flag(["-c FILE"], None)
            .try_parse_from(["t", "-c", path.as_str()])
            .unwrap();
        assert!(opts.get_time("timestamp").is_some());
    }

    // --- config document ---

    #[test]
    fn document_overrides_default() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "app.toml", "\"output-file\" = \"/tmp/x.log\"\n");
        let opts = parse(&["fetch", "-c", path.as_str()]).unwrap();
        assert_eq!(opts.get_str("output_file"), Some("/tmp/x.log"));
    }

    #[test]
    fn document_key_spellings_equivalent() {
        for content in [
            "\"output-file\" = \"/tmp/x\"\n",
            "\"output_file\" = \"/tmp/x\"\n",
            "output_file = \"/tmp/x\"\n",
        ] {
            let dir = TempDir::new().unwrap();
            let path = write_config(&dir, "app.toml", content);
            let opts = parse(&["fetch", "-c", path.as_str()]).unwrap();
            assert_eq!(opts.get_str("output_file"), Some("/tmp/x"), "{content}");
        }
    }

    #[test]
    fn document_values_coerced_by_type() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "app.toml",
            concat!(
                "tries = 4\n",
                "accept = [\"gif\", \"bmp\"]\n",
                "protocol = \"http\"\n",
                "debug = true\n",
                "record = [\"a,b\", \"c\"]\n",
                "timestamp = 2024-05-01T10:00:00Z\n",
            ),
        );
        let opts = parse(&["fetch", "-c", path.as_str()]).unwrap();
        assert_eq!(opts.get_integer("tries"), Some(4));
        assert_eq!(
            opts.get_list("accept"),
            Some(&["gif".to_string(), "bmp".to_string()][..])
        );
        assert_eq!(opts.get("protocol"), Some(&OptValue::Symbol("http".into())));
        assert!(opts.is_set("debug"));
        assert_eq!(opts.get_seq("record").map(<[OptValue]>::len), Some(2));
        assert!(opts.get_time("timestamp").is_some());
    }

    #[test]
    fn document_integer_from_string() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "app.toml", "tries = \"0x10\"\n");
        let opts = parse(&["fetch", "-c", path.as_str()]).unwrap();
        assert_eq!(opts.get_integer("tries"), Some(16));
    }

    #[test]
    fn document_false_flag_left_unset() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "app.toml", "debug = false\n");
        let opts = parse(&["fetch", "-c", path.as_str()]).unwrap();
        assert!(!opts.contains("debug"));
    }

    #[test]
    fn document_bad_value_names_key_and_value() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "app.toml", "tries = \"lots\"\n");
        let err = parse(&["fetch", "-c", path.as_str()]).unwrap_err();
        assert_eq!(err.kind(), Some(&ParseErrorKind::InvalidArgument));
        assert!(err.to_string().contains("(tries: lots)"));
    }

    #[test]
    fn document_validator_failure_rewrapped() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "app.toml", "tries = -2\n");
        let err = parse(&["fetch", "-c", path.as_str()]).unwrap_err();
        assert_eq!(err.kind(), Some(&ParseErrorKind::InvalidArgument));
        assert!(err.to_string().contains("(tries: -2)"));
    }

    #[test]
    fn document_enum_outside_set_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "app.toml", "protocol = \"smtp\"\n");
        let err = parse(&["fetch", "-c", path.as_str()]).unwrap_err();
        assert_eq!(err.kind(), Some(&ParseErrorKind::InvalidArgument));
    }

    #[test]
    fn document_overwrites_earlier_flags_only() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "app.toml", "tries = 7\nprotocol = \"http\"\n");
        let opts = parse(&["fetch", "-t", "1", "-c", path.as_str(), "-P", "ftp"]).unwrap();
        // -t came before the document, -P after it.
        assert_eq!(opts.get_integer("tries"), Some(7));
        assert_eq!(opts.get_str("protocol"), Some("ftp"));
    }

    #[test]
    fn multiple_flags_after_document_append() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "app.toml", "record = \"a\"\n");
        let opts = parse(&["fetch", "-c", path.as_str(), "-R", "b"]).unwrap();
        assert_eq!(opts.get_seq("record").map(<[OptValue]>::len), Some(2));
    }

    #[test]
    fn multiple_switch_around_document() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "app.toml", "x = true\n");
        let opts = Optmerge::builder()
            .program_name("t")
            .declare(OptionSpec::new("x", ["-x"]).multiple())
            .config_flag(["-c FILE"], None)
            .try_parse_from(["t", "-x", "-c", path.as_str(), "-x"])
            .unwrap();
        // The document replaces the first -x; the second one appends.
        assert_eq!(
            opts.get_seq("x"),
            Some(&[OptValue::Bool(true), OptValue::Bool(true)][..])
        );
    }

    fn level_table() -> crate::builder::OptmergeBuilder {
        Optmerge::builder()
            .program_name("t")
            .declare(OptionSpec::new("level", ["--level[=N]"]).kind(OptionType::Integer))
            .config_flag(["-c FILE"], None)
    }

    #[test]
    fn optional_argument_before_document_is_overwritten() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "app.toml", "level = 2\n");
        let opts = level_table()
            .try_parse_from(["t", "--level", "-c", path.as_str()])
            .unwrap();
        assert_eq!(opts.get("level"), Some(&OptValue::Integer(2)));
    }

    #[test]
    fn optional_argument_after_document_wins() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "app.toml", "level = 2\n");
        let opts = level_table()
            .try_parse_from(["t", "-c", path.as_str(), "--level"])
            .unwrap();
        assert_eq!(opts.get("level"), Some(&OptValue::Bool(true)));
    }

    #[test]
    fn residual_keys_merged() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "app.toml", "extra_flag = \"y\"\n\"other-key\" = 1\n");
        let opts = parse(&["fetch", "-c", path.as_str()]).unwrap();
        assert_eq!(opts.get_str("extra_flag"), Some("y"));
        assert_eq!(opts.get_integer("other_key"), Some(1));
    }

    #[test]
    fn raw_document_exposed() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "app.toml", "tries = 2\n");
        let opts = parse(&["fetch", "-c", path.as_str()]).unwrap();
        assert!(opts.config_document().contains_key("tries"));
        assert!(opts.config_document().source().is_some());
    }

    #[test]
    fn no_document_means_empty_document() {
        let opts = parse(&["fetch"]).unwrap();
        assert!(opts.config_document().is_empty());
    }

    #[test]
    fn unreadable_document_aborts() {
        let err = parse(&["fetch", "-c", "/nonexistent/optmerge/app.toml"]).unwrap_err();
        assert!(matches!(err, OptError::Io { .. }));
    }

    // --- hooks ---

    #[test]
    fn before_hook_without_config_flag_runs_on_empty_document() {
        let opts = Optmerge::builder()
            .program_name("t")
            .declare(
                OptionSpec::new("protocol", ["-P PROTO"]).kind(OptionType::one_of(["http", "ftp"])),
            )
            .before(|doc, _| {
                assert!(doc.is_empty());
                doc.insert_symbol("protocol", "ftp");
                doc.insert_symbol("extra_table", toml::Value::Table(toml::Table::new()));
                Ok(())
            })
            .try_parse_from(["t"])
            .unwrap();
        assert_eq!(opts.get("protocol"), Some(&OptValue::Symbol("ftp".into())));
        assert!(matches!(opts.get("extra_table"), Some(OptValue::Table(_))));
    }

    #[test]
    fn synthesized_document_precedes_command_line() {
        let opts = Optmerge::builder()
            .program_name("t")
            .declare(OptionSpec::new("protocol", ["-P PROTO"]))
            .before(|doc, _| {
                doc.insert("protocol", "ftp");
                Ok(())
            })
            .try_parse_from(["t", "-P", "http"])
            .unwrap();
        assert_eq!(opts.get_str("protocol"), Some("http"));
    }

    #[test]
    fn before_hook_sees_loaded_document() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "app.toml", "tries = 2\n");
        let opts = fetch_builder()
            .before(|doc, _| {
                assert_eq!(doc.get("tries").and_then(toml::Value::as_integer), Some(2));
                doc.insert("tries", 9i64);
                Ok(())
            })
            .try_parse_from(["fetch", "-c", path.as_str()])
            .unwrap();
        assert_eq!(opts.get_integer("tries"), Some(9));
    }

    #[test]
    fn before_hook_failure_propagates() {
        let err = Optmerge::builder()
            .program_name("t")
            .before(|_, ctx| ctx.generic_error("no config allowed"))
            .try_parse_from(["t"])
            .unwrap_err();
        assert_eq!(err.to_string(), "no config allowed");
    }

    #[test]
    fn after_hook_mutates_result() {
        let opts = fetch_builder()
            .after(|opts, _| {
                let tries = opts.get_integer("tries").unwrap_or(0);
                opts.insert("tries", tries + 10);
                Ok(())
            })
            .try_parse_from(["fetch", "-t", "1"])
            .unwrap();
        assert_eq!(opts.get_integer("tries"), Some(11));
    }

    #[test]
    fn after_hook_can_reject() {
        let err = fetch_builder()
            .after(|opts, ctx| {
                if opts.is_set("debug") && opts.is_set("info") {
                    return ctx.ambiguous_option();
                }
                Ok(())
            })
            .try_parse_from(["fetch", "-d", "-I"])
            .unwrap_err();
        assert_eq!(err.kind(), Some(&ParseErrorKind::AmbiguousOption));
    }

    // --- error handler ---

    #[test]
    fn error_handler_receives_failure() {
        let seen = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&seen);
        let result = fetch_builder()
            .on_error(move |err| {
                *slot.borrow_mut() = err.kind().cloned();
                Ok(MergedOptions::default())
            })
            .try_parse_from(["fetch", "--tries", "x"]);
        assert_eq!(result.unwrap(), MergedOptions::default());
        assert_eq!(*seen.borrow(), Some(ParseErrorKind::InvalidArgument));
    }

    #[test]
    fn error_handler_skipped_for_help() {
        let result = fetch_builder()
            .on_error(|_| panic!("help is not a failure"))
            .try_parse_from(["fetch", "--help"]);
        assert!(matches!(result, Err(OptError::Display(_))));
    }

    // --- version ---

    #[test]
    fn version_flag_reports_version() {
        let err = fetch_builder()
            .version("2.0")
            .try_parse_from(["fetch", "--version"])
            .unwrap_err();
        assert!(matches!(err, OptError::Display(ref text) if text == "fetch 2.0"));
    }

    #[test]
    fn version_flag_without_version_fails() {
        let err = parse(&["fetch", "-v"]).unwrap_err();
        assert_eq!(err.to_string(), "fetch: version unknown");
    }

    #[test]
    fn declared_v_takes_precedence_over_version() {
        let opts = Optmerge::builder()
            .program_name("t")
            .declare(OptionSpec::new("verbose", ["-v", "--verbose"]))
            .try_parse_from(["t", "-v"])
            .unwrap();
        assert!(opts.is_set("verbose"));
    }
}
