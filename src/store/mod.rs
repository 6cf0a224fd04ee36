//! Upstream document database contract
//!
//! Flattening treats documents pulled from a store like any other input.
//! Every operation takes an optional [`Target`]; when given, it applies to
//! that call only and the store's default target is left untouched.

pub mod memory;

pub use memory::MemoryStore;

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("documents must be JSON objects, got {0}")]
    NotAnObject(String),
}

/// A database and collection pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    pub database: String,
    pub collection: String,
}

impl Target {
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Target {
            database: database.into(),
            collection: collection.into(),
        }
    }
}

impl Default for Target {
    fn default() -> Self {
        Target::new("test", "test_collection")
    }
}

/// Selection criteria for [`DocumentStore::select`]
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// Field equality conditions; keys may be dotted paths into nested maps
    pub filter: Map<String, Value>,

    /// Fields to return; dotted paths keep their nesting in the result.
    /// Empty returns whole documents. When non-empty, `_id` is only
    /// returned if listed.
    pub fields: Vec<String>,

    /// Maximum number of documents; 0 means no limit
    pub limit: usize,
}

impl Query {
    /// Match every document
    pub fn all() -> Self {
        Query::default()
    }

    pub fn filter(mut self, field: impl Into<String>, value: Value) -> Self {
        self.filter.insert(field.into(), value);
        self
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Whether `doc` satisfies every filter condition
    pub fn matches(&self, doc: &Map<String, Value>) -> bool {
        self.filter
            .iter()
            .all(|(field, expected)| lookup(doc, field) == Some(expected))
    }

    /// Apply the field projection to a matching document
    pub fn project(&self, doc: &Map<String, Value>) -> Map<String, Value> {
        if self.fields.is_empty() {
            return doc.clone();
        }

        let mut out = Map::new();
        for field in &self.fields {
            if let Some(value) = lookup(doc, field) {
                insert_path(&mut out, field, value.clone());
            }
        }
        out
    }
}

fn insert_path(out: &mut Map<String, Value>, field: &str, value: Value) {
    match field.split_once('.') {
        None => {
            out.insert(field.to_string(), value);
        }
        Some((head, rest)) => {
            let child = out
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            if let Value::Object(child) = child {
                insert_path(child, rest, value);
            }
        }
    }
}

fn lookup<'a>(doc: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    let mut parts = field.split('.');
    let mut current = doc.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

/// CRUD operations flattening callers use against a document database
pub trait DocumentStore {
    fn select(&self, query: &Query, target: Option<&Target>) -> Result<Vec<Value>, StoreError>;

    /// Insert a single object or an array of objects
    fn insert(&mut self, docs: Value, target: Option<&Target>) -> Result<usize, StoreError>;

    /// Remove every document in the target collection
    fn clear(&mut self, target: Option<&Target>) -> Result<(), StoreError>;

    fn default_target(&self) -> &Target;

    fn set_default_target(&mut self, target: Target);
}
