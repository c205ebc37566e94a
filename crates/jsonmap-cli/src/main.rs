//! `jsonmap` CLI: check, compact and inspect JSON documents from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Validate a document (stdin), reporting where the first error is
//! echo '{"name":"Alice","age":30}' | jsonmap check
//!
//! # Re-serialize in compact form, file to file
//! jsonmap fmt -i data.json -o data.min.json
//!
//! # Count values per kind and report nesting depth
//! jsonmap stats -i data.json
//!
//! # Tighter nesting limit, debug logging on stderr
//! jsonmap --verbose check --max-depth 16 -i data.json
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use jsonmap_core::{parse_with, ParseOptions, Value};
use std::collections::BTreeMap;
use std::io::{self, Read};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "jsonmap",
    version,
    about = "Check, compact and inspect JSON documents"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log parser activity to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse the input and report whether it is well formed
    Check {
        #[command(flatten)]
        source: Source,
    },
    /// Re-serialize the input in compact form
    Fmt {
        #[command(flatten)]
        source: Source,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Show value counts per kind, nesting depth and sizes
    Stats {
        #[command(flatten)]
        source: Source,
    },
}

#[derive(Args)]
struct Source {
    /// Input file (reads from stdin if omitted)
    #[arg(short, long)]
    input: Option<String>,
    /// Maximum nesting depth of arrays and objects
    #[arg(long, default_value_t = jsonmap_core::options::DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

impl Source {
    fn name(&self) -> &str {
        self.input.as_deref().unwrap_or("<stdin>")
    }

    /// Read and parse the input, returning the raw text alongside the tree.
    fn load(&self) -> Result<(String, Value)> {
        let text = read_input(self.input.as_deref())?;
        let options = ParseOptions {
            max_depth: self.max_depth,
        };
        debug!(source = self.name(), bytes = text.len(), "parsing input");
        let value = parse_with(&text, &options)
            .with_context(|| format!("Invalid JSON in {}", self.name()))?;
        Ok((text, value))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Check { source } => {
            let (_, value) = source.load()?;
            println!(
                "{}: ok ({}, {} values, depth {})",
                source.name(),
                value.kind_name(),
                Stats::collect(&value).total(),
                value.depth()
            );
        }
        Commands::Fmt { source, output } => {
            let (_, value) = source.load()?;
            let mut compact = value.to_text();
            compact.push('\n');
            write_output(output.as_deref(), &compact)?;
        }
        Commands::Stats { source } => {
            let (text, value) = source.load()?;
            let stats = Stats::collect(&value);
            let compact_bytes = value.to_text().len();
            for (kind, count) in &stats.counts {
                println!("{:<8}{}", format!("{kind}:"), count);
            }
            println!("Values:     {}", stats.total());
            println!("Max depth:  {}", value.depth());
            println!("Input size: {} bytes", text.len());
            println!("Compact:    {} bytes", compact_bytes);
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

/// Number of values of each kind in a tree, containers included.
#[derive(Debug, Default)]
struct Stats {
    counts: BTreeMap<&'static str, usize>,
}

impl Stats {
    fn collect(value: &Value) -> Self {
        let mut stats = Stats::default();
        stats.visit(value);
        stats
    }

    fn visit(&mut self, value: &Value) {
        *self.counts.entry(value.kind_name()).or_default() += 1;
        match value {
            Value::Array(items) => items.iter().for_each(|item| self.visit(item)),
            Value::Object(map) => map.values().for_each(|item| self.visit(item)),
            _ => {}
        }
    }

    fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
