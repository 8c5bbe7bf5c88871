//! DDIFF command-line interface.
//!
//! Parses two structured data files, computes the deep diff between them and
//! renders it. Exit code 0 means no differences, 1 means differences were
//! found, 2 means an error occurred.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ddiff_rs::filter::{filter_diff, FilterConfig};
use ddiff_rs::{compute_diff, format_diff, parse_file, DiffConfig, OutputFormat, OutputOptions, PathScheme, Segment};
use std::path::PathBuf;
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// DDIFF - Deep structural diff for structured data
///
/// Compares JSON, YAML and TOML files as object graphs and reports the
/// records needed to turn the first into the second.
#[derive(Parser)]
#[command(name = "ddiff-rs")]
#[command(version)]
#[command(about = "Deep structural diff for structured data", long_about = None)]
struct Cli {
    /// First file to compare (the subject)
    #[arg(value_name = "FILE1")]
    file1: PathBuf,

    /// Second file to compare (the comparand)
    #[arg(value_name = "FILE2")]
    file2: PathBuf,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "terminal")]
    format: OutputFormatArg,

    /// Path notation used in the output
    #[arg(long, value_enum, default_value = "dotted")]
    scheme: SchemeArg,

    /// Include replaced values in the json and patch formats
    #[arg(long)]
    audit: bool,

    /// Show full values instead of previews
    #[arg(long)]
    show_values: bool,

    /// Maximum length for displayed values
    #[arg(long, default_value = "80")]
    max_value_length: usize,

    /// Ignore whitespace differences in strings
    #[arg(long)]
    ignore_whitespace: bool,

    /// Compare arrays as multisets
    #[arg(long)]
    ignore_order: bool,

    /// Skip properties whose path matches PATTERN during comparison (repeatable)
    #[arg(long, value_name = "PATTERN")]
    ignore: Vec<String>,

    /// Skip properties with this name at any depth (repeatable)
    #[arg(long, value_name = "NAME")]
    ignore_property: Vec<String>,

    /// Only report changes under paths matching PATTERN (repeatable)
    #[arg(long, value_name = "PATTERN")]
    only: Vec<String>,

    /// Detect moved array elements, identifying objects by this property
    #[arg(long, value_name = "NAME")]
    identity_key: Option<String>,

    /// Verbose output (show parsing progress)
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (only show changes, suppress summary)
    #[arg(short, long)]
    quiet: bool,
}

/// Output format argument for clap
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum OutputFormatArg {
    /// Colored terminal output
    Terminal,
    /// JSON representation
    Json,
    /// Plain text (no colors)
    Plain,
    /// Length-prefixed records
    Patch,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Terminal => OutputFormat::Terminal,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Plain => OutputFormat::Plain,
            OutputFormatArg::Patch => OutputFormat::Patch,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum SchemeArg {
    /// RFC 6901 fragment pointers (#/a/0)
    Pointer,
    /// Dotted paths (.a.[0])
    Dotted,
    /// JSON arrays of segments (["a",0])
    Json,
}

impl From<SchemeArg> for PathScheme {
    fn from(arg: SchemeArg) -> Self {
        match arg {
            SchemeArg::Pointer => PathScheme::Pointer,
            SchemeArg::Dotted => PathScheme::Dotted,
            SchemeArg::Json => PathScheme::Json,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(exit_code) => process::exit(exit_code),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            process::exit(2);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "warn,ddiff_rs=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn diff_config(cli: &Cli) -> DiffConfig {
    let mut config = DiffConfig {
        ignore_whitespace: cli.ignore_whitespace,
        ignore_array_order: cli.ignore_order,
        ..DiffConfig::default()
    };
    for pattern in &cli.ignore {
        config = config.ignore_pattern(pattern);
    }
    for name in &cli.ignore_property {
        config = config.ignore_property(name.clone());
    }
    if let Some(key) = cli.identity_key.clone() {
        let segment = Segment::from(key);
        config = config.with_identity(move |value| {
            let id = value.get(&segment);
            if id.is_undefined() {
                None
            } else {
                Some(id.preview(usize::MAX))
            }
        });
    }
    config
}

fn run(cli: Cli) -> Result<i32> {
    info!("Parsing {}...", cli.file1.display());
    let old = parse_file(&cli.file1)
        .with_context(|| format!("Failed to parse first file: {}", cli.file1.display()))?;

    info!("Parsing {}...", cli.file2.display());
    let new = parse_file(&cli.file2)
        .with_context(|| format!("Failed to parse second file: {}", cli.file2.display()))?;

    info!("Computing diff...");
    let config = diff_config(&cli);
    let diff = compute_diff(&old, &new, &config).context("Failed to compute diff")?;

    let filter = cli
        .only
        .iter()
        .fold(FilterConfig::new(), |filter, pattern| filter.only(pattern));
    let diff = filter_diff(&diff, &filter);

    info!("Formatting output...");
    let output_options = OutputOptions {
        show_values: cli.show_values,
        max_value_length: cli.max_value_length,
        scheme: cli.scheme.into(),
        audit: cli.audit,
    };

    let output_format: OutputFormat = cli.format.into();
    let output = format_diff(&diff, &output_format, &output_options).context("Failed to format diff output")?;

    if !cli.quiet {
        print!("{}", output);
        if !output.ends_with('\n') {
            println!();
        }
    } else {
        for line in output.lines() {
            if !line.starts_with("Summary:") && !line.trim().is_empty() {
                println!("{}", line);
            }
        }
    }

    if diff.is_empty() {
        Ok(0)
    } else {
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddiff_rs::Value;
    use serde_json::json;

    #[test]
    fn test_output_format_conversion() {
        assert_eq!(OutputFormat::from(OutputFormatArg::Terminal), OutputFormat::Terminal);
        assert_eq!(OutputFormat::from(OutputFormatArg::Json), OutputFormat::Json);
        assert_eq!(OutputFormat::from(OutputFormatArg::Patch), OutputFormat::Patch);
    }

    #[test]
    fn test_identity_key_enables_moves() {
        let cli = Cli::parse_from(["ddiff-rs", "a.json", "b.json", "--identity-key", "id"]);
        let config = diff_config(&cli);
        let subject = Value::from(json!([{"id": 1}, {"id": 2}, {"id": 3}, {"id": 4}]));
        let comparand = Value::from(json!([{"id": 2}, {"id": 3}, {"id": 1}]));
        let diff = compute_diff(&subject, &comparand, &config).unwrap();
        assert_eq!(diff.stats.moved, 1);
    }
}
