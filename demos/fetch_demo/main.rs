//! # optmerge demo application
//!
//! A pretend download tool that declares one option of every type, a config
//! file flag and both hooks. It exists to exercise optmerge by hand.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example fetch_demo -- --help
//! cargo run --example fetch_demo -- -t 3 -A jpg,png host.example
//! cargo run --example fetch_demo -- -c fetch.toml --tries 5
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature              | How to exercise it                                          |
//! |----------------------|-------------------------------------------------------------|
//! | Defaults             | `cargo run --example fetch_demo`                            |
//! | Integer coercion     | `cargo run --example fetch_demo -- --tries 0x10`            |
//! | Validator            | `cargo run --example fetch_demo -- --tries -1`              |
//! | Closed set           | `cargo run --example fetch_demo -- -P gopher`               |
//! | Repeated option      | `cargo run --example fetch_demo -- -R a -R b,c`             |
//! | Config document      | `cargo run --example fetch_demo -- -c fetch.toml`           |
//! | Flag after document  | `cargo run --example fetch_demo -- -c fetch.toml -t 9`      |
//! | Version              | `cargo run --example fetch_demo -- --version`               |
//!
//! A `fetch.toml` to try:
//!
//! ```toml
//! tries = 4
//! output-file = "/tmp/fetch.log"
//! accept = ["jpg", "gif"]
//! mirror = "https://mirror.example"
//! ```

use std::process;

use optmerge::{MergedOptions, OptionSpec, OptionTable, OptionType, Optmerge, OptmergeBuilder};

fn make_builder() -> OptmergeBuilder {
    Optmerge::builder()
        .program_name("fetch")
        .banner("Usage: fetch [options] URL...")
        .version("1.2.0")
        .release("demo")
        .declare(OptionSpec::new("info", ["-I"]).describe("program information"))
        .declare(
            OptionSpec::new("debug", ["-d", "--debug"])
                .describe("print lots of debugging information"),
        )
        .declare(
            OptionSpec::new("output_file", ["-o", "--output-file FILE"])
                .describe("log messages to FILE")
                .default_value("/var/log/fetch.log"),
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
                .describe("only fetch resources newer than TIME")
                .kind(OptionType::Time),
        )
        .declare(
            OptionSpec::new("record", ["-R", "--record RECORD"])
                .describe("resource record, repeatable")
                .kind(OptionType::List)
                .multiple(),
        )
        .config_flag(["-c", "--config-file FILE"], None)
        .before(|document, _ctx| {
            if !document.contains_key("output-file") && !document.contains_key("output_file") {
                document.insert_symbol("output_file", "/tmp/fetch.log");
            }
            Ok(())
        })
        .after(|options, ctx| {
            if options.is_set("info") && options.is_set("debug") {
                return ctx.generic_error("-I and --debug are exclusive");
            }
            Ok(())
        })
        .on_error(|err| {
            eprintln!("fetch: {err}");
            process::exit(1);
        })
}

fn report(options: &MergedOptions) -> Result<(), serde_json::Error> {
    let values = serde_json::to_string_pretty(&options.to_json()?)?;
    println!("{values}");

    let document = options.config_document();
    match document.source() {
        Some(path) => println!("config: {} ({} keys)", path.display(), document.len()),
        None => println!("config: none"),
    }
    println!("operands: {:?}", options.operands());
    Ok(())
}

fn main() {
    let options = match make_builder().build().and_then(OptionTable::parse) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("fetch: {err}");
            process::exit(1);
        }
    };
    if let Err(err) = report(&options) {
        eprintln!("fetch: {err}");
        process::exit(1);
    }
}
