//! json-relation: Flatten JSON documents into relational rows
//!
//! Usage:
//!   # Read a single document from a file, rows to stdout
//!   json-relation data.json
//!
//!   # Process NDJSON from stdin and save the discovered columns
//!   cat events.jsonl | json-relation --ndjson --schema-out columns.json
//!
//!   # Force column types
//!   json-relation --ndjson --hints hints.json events.jsonl
//!
//! Set RUST_LOG=debug to see column discovery and type conflicts.

// Use MiMalloc allocator for better performance
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::Parser;
use json_relation::schema::SchemaRegistry;
use json_relation::writer::{write_schema, RowWriter};
use json_relation::{flatten_json, FlattenConfig, Flattener, TypeHints};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "json-relation")]
#[command(about = "Flatten JSON documents into relational rows", long_about = None)]
struct Args {
    /// Input file (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Process newline-delimited JSON (one document per line)
    #[arg(long)]
    ndjson: bool,

    /// JSON file mapping column names to forced types, e.g. {"age": "SMALLINT"}
    #[arg(long, value_name = "FILE")]
    hints: Option<PathBuf>,

    /// Write the discovered column listing to this file
    #[arg(long, value_name = "FILE")]
    schema_out: Option<PathBuf>,

    /// Give each element of a scalar array its own column
    #[arg(long)]
    number_scalar_elements: bool,

    /// Path segment text used for array positions (default: "item")
    #[arg(long)]
    array_marker: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // Build config
    let mut config = FlattenConfig::default();
    config.number_scalar_elements = args.number_scalar_elements;
    if let Some(marker) = args.array_marker {
        config.array_marker = marker;
    }

    let mut flattener = Flattener::new(config);
    if let Some(path) = &args.hints {
        let hints = TypeHints::from_file(path)
            .with_context(|| format!("Failed to load type hints from {}", path.display()))?;
        flattener = flattener.with_hints(hints);
    }

    let reader: Box<dyn Read> = if let Some(path) = &args.input {
        let file = File::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        Box::new(BufReader::new(file))
    } else {
        Box::new(BufReader::new(std::io::stdin()))
    };

    let mut registry = SchemaRegistry::new();
    let mut writer = RowWriter::new(BufWriter::new(std::io::stdout()));

    let count = flatten_json(reader, args.ndjson, &flattener, &mut registry, &mut writer)?;
    writer.flush()?;

    if count == 0 {
        warn!("no JSON documents found in input");
    }

    if let Some(path) = &args.schema_out {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        write_schema(BufWriter::new(file), &registry)?;
    }

    Ok(())
}
