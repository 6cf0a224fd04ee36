use crate::store::{DocumentStore, Query, StoreError, Target};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

/// In-process document store, keyed by database and collection
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: HashMap<Target, Vec<Map<String, Value>>>,
    default: Target,
    next_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Create a store whose default target is `target`
    pub fn with_default(target: Target) -> Self {
        MemoryStore {
            default: target,
            ..MemoryStore::default()
        }
    }

    fn resolve<'a>(&'a self, target: Option<&'a Target>) -> &'a Target {
        target.unwrap_or(&self.default)
    }

    fn insert_one(&mut self, target: &Target, doc: Value) -> Result<(), StoreError> {
        let Value::Object(mut obj) = doc else {
            return Err(StoreError::NotAnObject(type_name(&doc).to_string()));
        };

        if !obj.contains_key("_id") {
            self.next_id += 1;
            obj.insert("_id".to_string(), Value::from(self.next_id));
        }

        self.collections.entry(target.clone()).or_default().push(obj);
        Ok(())
    }
}

impl DocumentStore for MemoryStore {
    fn select(&self, query: &Query, target: Option<&Target>) -> Result<Vec<Value>, StoreError> {
        let target = self.resolve(target);
        let Some(docs) = self.collections.get(target) else {
            return Ok(Vec::new());
        };

        let limit = if query.limit == 0 { usize::MAX } else { query.limit };
        Ok(docs
            .iter()
            .filter(|doc| query.matches(doc))
            .take(limit)
            .map(|doc| Value::Object(query.project(doc)))
            .collect())
    }

    fn insert(&mut self, docs: Value, target: Option<&Target>) -> Result<usize, StoreError> {
        let target = self.resolve(target).clone();

        let docs = match docs {
            Value::Array(arr) => arr,
            other => vec![other],
        };

        // Validate first so a bad batch inserts nothing
        if let Some(bad) = docs.iter().find(|d| !d.is_object()) {
            return Err(StoreError::NotAnObject(type_name(bad).to_string()));
        }

        let count = docs.len();
        for doc in docs {
            self.insert_one(&target, doc)?;
        }
        debug!(
            database = %target.database,
            collection = %target.collection,
            count,
            "inserted documents"
        );
        Ok(count)
    }

    fn clear(&mut self, target: Option<&Target>) -> Result<(), StoreError> {
        let target = self.resolve(target).clone();
        self.collections.remove(&target);
        Ok(())
    }

    fn default_target(&self) -> &Target {
        &self.default
    }

    fn set_default_target(&mut self, target: Target) {
        self.default = target;
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
