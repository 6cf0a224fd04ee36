//! # json-relation - JSON to relational rows
//!
//! Flattens self-contained JSON documents into positional rows for bulk
//! loading into a tabular store, discovering the column schema as
//! documents arrive.
//!
//! ## Modules
//!
//! - **flatten**: event model, array index tracking and the flattening engine
//! - **schema**: column registry, identifier sanitizing and type hints
//! - **row**: positional row construction with gap filling
//! - **store**: document database contract and an in-memory store
//! - **writer**: JSON Lines output for rows and the column listing
//!
//! ## Quick Start
//!
//! ```rust
//! use json_relation::{Flattener, SchemaRegistry};
//! use serde_json::json;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut registry = SchemaRegistry::new();
//! let flattener = Flattener::default();
//!
//! let row = flattener.flatten_value(&mut registry, &json!({"a": 1, "b": "x"}))?;
//! assert_eq!(row.len(), 2);
//! assert_eq!(registry.header(), vec!["a", "b"]);
//!
//! // A later document may add columns; earlier positions never move
//! let row = flattener.flatten_value(&mut registry, &json!({"c": true}))?;
//! assert_eq!(row.len(), 3);
//! # Ok(())
//! # }
//! ```
//!
//! Schema growth is not transactional: columns registered by a document
//! that later fails to flatten remain in the registry.

use anyhow::{Context, Result};
use serde_json::Value;
use std::io::{Read, Write};
use tracing::{debug, info};

pub mod error;
pub mod flatten;
pub mod row;
pub mod schema;
pub mod store;
pub mod writer;

// Re-export commonly used types for convenience
pub use error::FlattenError;
pub use flatten::{Event, EventKind, EventPath, FlattenConfig, Flattener, RawEvent, ScalarValue};
pub use row::{Row, RowValue};
pub use schema::{
    ColumnCatalog, ColumnSpec, ColumnType, SchemaRegistry, SharedSchemaRegistry, TypeHints,
};
pub use store::{DocumentStore, MemoryStore, Query, Target};
pub use writer::RowWriter;

/// Main entry point: flatten JSON from a reader, writing one row per document.
///
/// With `ndjson` every whitespace-separated document in the input is
/// processed; otherwise only the first. Returns the number of rows written.
pub fn flatten_json<R: Read, W: Write>(
    reader: R,
    ndjson: bool,
    flattener: &Flattener,
    registry: &mut SchemaRegistry,
    writer: &mut RowWriter<W>,
) -> Result<usize> {
    let stream = serde_json::Deserializer::from_reader(reader).into_iter::<Value>();
    let mut count = 0;

    for (index, result) in stream.enumerate() {
        let value = result.with_context(|| format!("Failed to parse document {}", index))?;
        let row = flattener
            .flatten_value(registry, &value)
            .with_context(|| format!("Failed to flatten document {}", index))?;
        writer.write_row(&row)?;
        count += 1;

        if !ndjson {
            break;
        }
    }

    info!(documents = count, columns = registry.len(), "flattened input");
    Ok(count)
}

/// Flatten every document a store returns for `query`
pub fn flatten_store<S: DocumentStore, C: ColumnCatalog>(
    store: &S,
    query: &Query,
    target: Option<&Target>,
    flattener: &Flattener,
    catalog: &mut C,
) -> Result<Vec<Row>> {
    let docs = store
        .select(query, target)
        .context("Failed to select documents")?;
    debug!(documents = docs.len(), "selected documents from store");

    docs.iter()
        .enumerate()
        .map(|(index, doc)| {
            flattener
                .flatten_value(&mut *catalog, doc)
                .with_context(|| format!("Failed to flatten stored document {}", index))
        })
        .collect()
}
