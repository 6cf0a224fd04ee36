//! Append-only column catalog shared across documents
//!
//! Positions are handed out in first-seen order and never change. The
//! first type recorded for a column wins; later sightings with a different
//! type only bump a per-column conflict counter.

use crate::error::{FlattenError, Result};
use crate::schema::types::{ColumnSpec, ColumnType};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Anything that can hand out stable column positions
pub trait ColumnCatalog {
    /// Return the position of `name`, registering it with `column_type`
    /// if it has not been seen before.
    fn ensure_column(&mut self, name: &str, column_type: ColumnType) -> Result<usize>;
}

#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    columns: Vec<ColumnSpec>,
    positions: HashMap<String, usize>,
    conflicts: HashMap<String, usize>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        SchemaRegistry::default()
    }

    /// Idempotent registration; see [`ColumnCatalog::ensure_column`]
    pub fn ensure_column(&mut self, name: &str, column_type: ColumnType) -> usize {
        if let Some(&position) = self.positions.get(name) {
            let existing = self.columns[position].column_type;
            if existing != column_type {
                *self.conflicts.entry(name.to_string()).or_insert(0) += 1;
                debug!(
                    column = name,
                    kept = %existing,
                    seen = %column_type,
                    "column type conflict, keeping first-seen type"
                );
            }
            return position;
        }

        let position = self.columns.len();
        self.columns.push(ColumnSpec {
            name: name.to_string(),
            position,
            column_type,
        });
        self.positions.insert(name.to_string(), position);
        debug!(column = name, position, column_type = %column_type, "new column");
        position
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.positions.get(name).map(|&position| &self.columns[position])
    }

    /// All columns, in position order
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// How many times `name` was seen again with a type other than its own
    pub fn conflicts(&self, name: &str) -> usize {
        self.conflicts.get(name).copied().unwrap_or(0)
    }

    /// Column names in position order, suitable for a header line
    pub fn header(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// `[{name, position, type}, ...]` listing of every column discovered
    pub fn to_json(&self) -> Value {
        serde_json::to_value(&self.columns).unwrap_or(Value::Null)
    }
}

impl ColumnCatalog for SchemaRegistry {
    fn ensure_column(&mut self, name: &str, column_type: ColumnType) -> Result<usize> {
        Ok(SchemaRegistry::ensure_column(self, name, column_type))
    }
}

/// A registry that several ingestion threads can grow concurrently.
///
/// Each `ensure_column` call takes the lock, so position allocation and
/// type assignment stay consistent across threads.
#[derive(Debug, Default, Clone)]
pub struct SharedSchemaRegistry {
    inner: Arc<Mutex<SchemaRegistry>>,
}

impl SharedSchemaRegistry {
    pub fn new() -> Self {
        SharedSchemaRegistry::default()
    }

    pub fn from_registry(registry: SchemaRegistry) -> Self {
        SharedSchemaRegistry {
            inner: Arc::new(Mutex::new(registry)),
        }
    }

    /// Copy of the registry state at this moment
    pub fn snapshot(&self) -> Result<SchemaRegistry> {
        let guard = self.inner.lock().map_err(|_| FlattenError::RegistryPoisoned)?;
        Ok(guard.clone())
    }
}

impl ColumnCatalog for SharedSchemaRegistry {
    fn ensure_column(&mut self, name: &str, column_type: ColumnType) -> Result<usize> {
        let mut guard = self.inner.lock().map_err(|_| FlattenError::RegistryPoisoned)?;
        Ok(guard.ensure_column(name, column_type))
    }
}
