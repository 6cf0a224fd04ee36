use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Relational type of a flattened column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
    Text,
    SmallInt,
    Integer,
    Double,
    Date,
    DateTime,
}

impl ColumnType {
    pub fn as_sql(self) -> &'static str {
        match self {
            ColumnType::Text => "TEXT",
            ColumnType::SmallInt => "SMALLINT",
            ColumnType::Integer => "INTEGER",
            ColumnType::Double => "DOUBLE",
            ColumnType::Date => "DATE",
            ColumnType::DateTime => "DATETIME",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for ColumnType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TEXT" => Ok(ColumnType::Text),
            "SMALLINT" => Ok(ColumnType::SmallInt),
            "INT" | "INTEGER" => Ok(ColumnType::Integer),
            "DOUBLE" => Ok(ColumnType::Double),
            "DATE" => Ok(ColumnType::Date),
            "DATETIME" => Ok(ColumnType::DateTime),
            other => Err(format!("unknown column type `{}`", other)),
        }
    }
}

/// A discovered column: stable name, stable position, relational type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub position: usize,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}
