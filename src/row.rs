//! Positional row construction
//!
//! A row is index-aligned with the positions handed out by the schema
//! registry. Columns may be discovered by an earlier document, so a value
//! can land beyond the current end of the row; the skipped positions are
//! filled with [`RowValue::Gap`].

use serde::ser::{Serialize, Serializer};

/// Token written in place of a gap when rows are serialized
pub const GAP_TOKEN: &str = "null";

/// A single materialized cell
#[derive(Debug, Clone, PartialEq)]
pub enum RowValue {
    Text(String),
    SmallInt(i16),
    Double(f64),
    /// Position not supplied by this document
    Gap,
}

impl RowValue {
    pub fn is_gap(&self) -> bool {
        matches!(self, RowValue::Gap)
    }
}

impl From<&str> for RowValue {
    fn from(s: &str) -> Self {
        RowValue::Text(s.to_string())
    }
}

impl From<String> for RowValue {
    fn from(s: String) -> Self {
        RowValue::Text(s)
    }
}

impl From<f64> for RowValue {
    fn from(f: f64) -> Self {
        RowValue::Double(f)
    }
}

impl From<i16> for RowValue {
    fn from(i: i16) -> Self {
        RowValue::SmallInt(i)
    }
}

impl Serialize for RowValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RowValue::Text(s) => serializer.serialize_str(s),
            RowValue::SmallInt(i) => serializer.serialize_i16(*i),
            RowValue::Double(f) => serializer.serialize_f64(*f),
            RowValue::Gap => serializer.serialize_str(GAP_TOKEN),
        }
    }
}

/// One document's values, in column position order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: Vec<RowValue>,
}

impl Row {
    pub fn new() -> Self {
        Row::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[RowValue] {
        &self.values
    }

    pub fn get(&self, position: usize) -> Option<&RowValue> {
        self.values.get(position)
    }

    pub fn into_values(self) -> Vec<RowValue> {
        self.values
    }

    /// Place `value` at `position`, overwriting, appending or gap-filling.
    pub fn set_value(&mut self, position: usize, value: RowValue) {
        let len = self.values.len();
        if position < len {
            self.values[position] = value;
            return;
        }

        if position > len {
            self.values.resize(position, RowValue::Gap);
        }
        self.values.push(value);
    }
}

impl From<Vec<RowValue>> for Row {
    fn from(values: Vec<RowValue>) -> Self {
        Row { values }
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.values.serialize(serializer)
    }
}
