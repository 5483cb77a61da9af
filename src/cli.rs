//! Command-line interface: argument definitions and command execution.
//!
//! ```text
//! marcdo do <RULE_SET> [-i FILE] [-l LOADER] [-d DUMPER] [--strict]
//! marcdo missing <RULE_SET> [-i FILE] [-l LOADER]
//! marcdo list [RULE_SET]
//! ```
//!
//! [`run`] executes a parsed [`Command`] against any writer and returns the
//! process exit code, so commands can be exercised without spawning a process.

use crate::config::OverdoConfig;
use crate::error::Result;
use crate::formats;
use crate::logging::{LogConfig, LogFormat};
use crate::record::RawRecord;
use crate::rules;
use clap::{Parser, Subcommand, ValueEnum};
use indexmap::IndexSet;
use std::fs::File;
use std::io::{self, BufReader, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use tracing::Level;

/// Top-level arguments.
#[derive(Debug, Parser)]
#[command(
    name = "marcdo",
    version,
    about = "Transform MARC21 records with named rule sets",
    long_about = "Transform MARC21 records into semantic key-value records and back.\n\n\
                  Records are read with a loader (json, marcxml), run through a rule set\n\
                  (marc21, to_marc21, ...) and written with a dumper."
)]
pub struct Cli {
    /// Command to run.
    #[command(subcommand)]
    pub command: Command,

    /// Log level for this crate (overridden by `RUST_LOG`).
    #[arg(long = "log-level", value_enum, default_value = "warn", global = true)]
    pub log_level: LogLevelArg,

    /// Log output format.
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Transform records with a rule set.
    Do(DoArgs),

    /// List tags no rule of a rule set matches.
    Missing(MissingArgs),

    /// List available rule sets, loaders and dumpers, or the rules of one set.
    List(ListArgs),
}

/// Arguments of `marcdo do`.
#[derive(Debug, Parser)]
pub struct DoArgs {
    /// Rule set to apply.
    #[arg(value_name = "RULE_SET")]
    pub rule_set: String,

    /// Input file (default: stdin).
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Loader for the input.
    #[arg(short = 'l', long = "loader", default_value = "json")]
    pub loader: String,

    /// Dumper for the output.
    #[arg(short = 'd', long = "dumper", default_value = "json")]
    pub dumper: String,

    /// Fail on unmatched tags and duplicate rule names.
    #[arg(long = "strict")]
    pub strict: bool,
}

/// Arguments of `marcdo missing`.
#[derive(Debug, Parser)]
pub struct MissingArgs {
    /// Rule set to check against.
    #[arg(value_name = "RULE_SET")]
    pub rule_set: String,

    /// Input file (default: stdin).
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Loader for the input.
    #[arg(short = 'l', long = "loader", default_value = "json")]
    pub loader: String,
}

/// Arguments of `marcdo list`.
#[derive(Debug, Parser)]
pub struct ListArgs {
    /// Rule set whose rules to print.
    #[arg(value_name = "RULE_SET")]
    pub rule_set: Option<String>,
}

/// CLI log level choices.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    /// Errors only.
    Error,
    /// Warnings and errors.
    Warn,
    /// Progress information.
    Info,
    /// Dispatch decisions.
    Debug,
    /// Everything.
    Trace,
}

/// CLI log format choices.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    /// Human-readable.
    Pretty,
    /// Single-line.
    Compact,
    /// JSON lines.
    Json,
}

impl Cli {
    /// Logging configuration implied by the global flags.
    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        let level = match self.log_level {
            LogLevelArg::Error => Level::ERROR,
            LogLevelArg::Warn => Level::WARN,
            LogLevelArg::Info => Level::INFO,
            LogLevelArg::Debug => Level::DEBUG,
            LogLevelArg::Trace => Level::TRACE,
        };
        let format = match self.log_format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        };
        LogConfig::default()
            .with_level(level)
            .with_format(format)
            .with_target(level >= Level::DEBUG)
            .with_ansi(io::stderr().is_terminal())
    }
}

/// Execute `command`, writing its output to `out`.
///
/// Returns the process exit code: `marcdo missing` exits 1 when it finds
/// unmatched tags, everything else exits 0 on success.
///
/// # Errors
///
/// Returns an error for unknown rule set, loader or dumper names, unreadable or
/// malformed input, and failing rules.
pub fn run<W: Write>(command: &Command, out: &mut W) -> Result<i32> {
    match command {
        Command::Do(args) => run_do(args, out),
        Command::Missing(args) => run_missing(args, out),
        Command::List(args) => run_list(args, out),
    }
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn Read>> {
    Ok(match path {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(io::stdin().lock()),
    })
}

fn load(path: Option<&Path>, loader: &str) -> Result<Vec<RawRecord>> {
    let loader = formats::loader(loader)?;
    let mut input = open_input(path)?;
    let records = loader.load(&mut input)?;
    tracing::info!(records = records.len(), "records loaded");
    Ok(records)
}

fn run_do<W: Write>(args: &DoArgs, out: &mut W) -> Result<i32> {
    let config = if args.strict {
        OverdoConfig::strict()
    } else {
        OverdoConfig::default()
    };
    let registry = rules::build_with_config(&args.rule_set, config)?;
    let dumper = formats::dumper(&args.dumper)?;
    let records = load(args.input.as_deref(), &args.loader)?;

    let outputs = registry.transform_batch(&records)?;
    dumper.dump_to(&outputs, out)?;
    tracing::info!(
        rule_set = %args.rule_set,
        records = outputs.len(),
        "records transformed"
    );
    Ok(0)
}

fn run_missing<W: Write>(args: &MissingArgs, out: &mut W) -> Result<i32> {
    let registry = rules::build(&args.rule_set)?;
    let records = load(args.input.as_deref(), &args.loader)?;

    let mut missing = IndexSet::new();
    for record in &records {
        missing.extend(registry.missing(record));
    }
    if missing.is_empty() {
        return Ok(0);
    }

    let tags: Vec<_> = missing.into_iter().collect();
    writeln!(out, "{}", tags.join(","))?;
    Ok(1)
}

fn run_list<W: Write>(args: &ListArgs, out: &mut W) -> Result<i32> {
    if let Some(name) = &args.rule_set {
        let registry = rules::build(name)?;
        for rule in registry.rule_names().filter_map(|name| registry.rule(name)) {
            writeln!(out, "{}\t{}", rule.name(), rule.pattern())?;
        }
        return Ok(0);
    }

    let rule_sets = rules::rule_sets();
    let loaders = formats::loaders();
    let dumpers = formats::dumpers();

    writeln!(out, "rule sets: {}", rule_sets.names().collect::<Vec<_>>().join(", "))?;
    writeln!(out, "loaders: {}", loaders.names().collect::<Vec<_>>().join(", "))?;
    writeln!(out, "dumpers: {}", dumpers.names().collect::<Vec<_>>().join(", "))?;
    Ok(0)
}
