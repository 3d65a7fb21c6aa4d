#[cfg(test)]
pub mod test {
    use std::fs;

    use tempfile::TempDir;

    use crate::builder::{Optmerge, OptmergeBuilder};
    use crate::spec::OptionSpec;
    use crate::types::OptionType;

    /// A download tool's option table covering every option type.
    pub fn fetch_builder() -> OptmergeBuilder {
        Optmerge::builder()
            .program_name("fetch")
            .declare(OptionSpec::new("info", ["-I"]).describe("program information"))
            .declare(
                OptionSpec::new("debug", ["-d", "--debug"])
                    .describe("print lots of debugging information"),
            )
            .declare(
                OptionSpec::new("output_file", ["-o", "--output-file FILE"])
                    .describe("log messages to FILE")
                    .default_value("/var/log/xxx.log"),
            )
            .declare(
                OptionSpec::new("tries", ["-t", "--tries NUMBER"])
                    .describe("set number of retries to NUMBER (0 unlimits)")
                    .kind(OptionType::Integer)
                    .default_value(0)
                    .validate(|value, ctx| match value.as_integer() {
                        Some(n) if n < 0 => ctx.invalid_argument(),
                        _ => Ok(()),
                    }),
            )
            .declare(
                OptionSpec::new("accept", ["-A", "--accept LIST"])
                    .describe("comma-separated list of accepted extensions")
                    .kind(OptionType::List)
                    .default_value(Vec::<String>::new()),
            )
            .declare(
                OptionSpec::new("protocol", ["-P", "--protocol PROTO"])
                    .describe("access protocol")
                    .kind(OptionType::one_of(["http", "ftp"])),
            )
            .declare(
                OptionSpec::new("timestamp", ["-T", "--timestamp TIME"])
                    .describe("access timestamp")
                    .kind(OptionType::Time),
            )
            .declare(
                OptionSpec::new("record", ["-R", "--record RECORD"])
                    .describe("resource record")
                    .kind(OptionType::List)
                    .multiple(),
            )
            .config_flag(["-c", "--config-file FILE"], None)
    }

    /// Write a config document into `dir` and return its path.
    pub fn write_config(dir: &TempDir, name: &str, content: &str) -> String {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn fixture_builds() {
        assert!(fetch_builder().build().is_ok());
    }
}
