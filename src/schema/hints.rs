use crate::error::{FlattenError, Result};
use crate::schema::types::ColumnType;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Caller-supplied column types, keyed by final (sanitized) column name.
///
/// Consulted before the default per-kind inference.
#[derive(Debug, Clone, Default)]
pub struct TypeHints {
    hints: HashMap<String, ColumnType>,
}

impl TypeHints {
    pub fn new() -> Self {
        TypeHints::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, column_type: ColumnType) {
        self.hints.insert(name.into(), column_type);
    }

    pub fn get(&self, name: &str) -> Option<ColumnType> {
        self.hints.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.hints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hints.is_empty()
    }

    /// Build hints from a JSON object such as `{"age": "SMALLINT"}`
    pub fn from_json(value: &Value) -> Result<Self> {
        let Value::Object(obj) = value else {
            return Err(FlattenError::InvalidHints(
                "expected a JSON object of column name to type".to_string(),
            ));
        };

        let mut hints = TypeHints::new();
        for (name, type_name) in obj.iter() {
            let Some(type_name) = type_name.as_str() else {
                return Err(FlattenError::InvalidHints(format!(
                    "type for column `{}` must be a string",
                    name
                )));
            };
            let column_type = type_name
                .parse::<ColumnType>()
                .map_err(|e| FlattenError::InvalidHints(format!("column `{}`: {}", name, e)))?;
            hints.insert(name.clone(), column_type);
        }

        Ok(hints)
    }

    /// Load hints from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            FlattenError::InvalidHints(format!("failed to read {}: {}", path.display(), e))
        })?;
        let value: Value = serde_json::from_str(&content)?;
        Self::from_json(&value)
    }
}

impl<K: Into<String>> FromIterator<(K, ColumnType)> for TypeHints {
    fn from_iter<I: IntoIterator<Item = (K, ColumnType)>>(iter: I) -> Self {
        let mut hints = TypeHints::new();
        for (name, column_type) in iter {
            hints.insert(name, column_type);
        }
        hints
    }
}
