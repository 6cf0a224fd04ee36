//! Streaming flattening of JSON documents into positional rows
//!
//! A document arrives as a sequence of structural events. Each scalar leaf
//! becomes a column whose name is derived from its nested path; inside
//! arrays of objects the element index is appended so sibling elements
//! land in distinct columns.

pub mod types;
pub mod index_stack;
pub mod source;
pub mod engine;

pub use types::{Event, EventKind, EventPath, FlattenConfig, PathSegment, RawEvent, ScalarValue};
pub use index_stack::ArrayIndexStack;
pub use source::{events_from_str, events_from_value};
pub use engine::{DocumentFlattener, Flattener};
