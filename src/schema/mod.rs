//! Column schema discovery
//!
//! This module owns the shared catalog of flattened columns, the rules
//! that turn path-derived names into legal identifiers, and caller-supplied
//! type hints.

pub mod types;
pub mod registry;
pub mod identifier;
pub mod hints;

pub use types::{ColumnSpec, ColumnType};
pub use registry::{ColumnCatalog, SchemaRegistry, SharedSchemaRegistry};
pub use identifier::sanitize_identifier;
pub use hints::TypeHints;
