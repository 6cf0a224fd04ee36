use crate::error::{FlattenError, Result};
use serde_json::Value;
use std::fmt;

/// One segment of a nested event path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A map key
    Field(String),
    /// The position of an array element, whatever its index
    ArrayItem,
}

/// Structural location of an event within its document.
///
/// The root of the document has an empty path. Array elements are
/// represented by an explicit [`PathSegment::ArrayItem`] rather than by a
/// reserved word inside the text, so a key such as `lineitem` or even
/// `item` can never be mistaken for an array position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct EventPath {
    segments: Vec<PathSegment>,
}

impl EventPath {
    pub fn root() -> Self {
        EventPath::default()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether the path joins to empty text, as the root does and as a
    /// top-level empty key does in dotted form
    pub fn renders_empty(&self) -> bool {
        match self.segments.as_slice() {
            [] => true,
            [PathSegment::Field(name)] => name.is_empty(),
            _ => false,
        }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Path of a value stored under `key` in the map at this path
    pub fn field(&self, key: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Field(key.into()));
        EventPath { segments }
    }

    /// Path of the elements of the array at this path
    pub fn item(&self) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::ArrayItem);
        EventPath { segments }
    }

    /// Parse a dotted path as emitted by ijson-style parsers.
    ///
    /// Text carries no structure, so any segment equal to `marker` is read
    /// as an array position. Prefer building paths with [`EventPath::field`]
    /// and [`EventPath::item`] when the structure is known.
    pub fn parse(text: &str, marker: &str, separator: char) -> Self {
        if text.is_empty() {
            return EventPath::root();
        }

        let segments = text
            .split(separator)
            .map(|part| {
                if part == marker {
                    PathSegment::ArrayItem
                } else {
                    PathSegment::Field(part.to_string())
                }
            })
            .collect();

        EventPath { segments }
    }

    /// Drop the array marker sitting right before the final segment, if any.
    ///
    /// `employees.item.name` becomes `employees.name`; a path whose last
    /// segment is itself the marker (a scalar array element) is unchanged.
    pub fn without_trailing_marker(&self) -> Self {
        let len = self.segments.len();
        if len >= 2 && self.segments[len - 2] == PathSegment::ArrayItem {
            let mut segments = self.segments.clone();
            segments.remove(len - 2);
            return EventPath { segments };
        }
        self.clone()
    }

    /// Join the segments back into text
    pub fn render(&self, marker: &str, separator: char) -> String {
        let mut out = String::new();
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                out.push(separator);
            }
            match segment {
                PathSegment::Field(name) => out.push_str(name),
                PathSegment::ArrayItem => out.push_str(marker),
            }
        }
        out
    }

    pub(crate) fn ends_with_item(&self) -> bool {
        matches!(self.segments.last(), Some(PathSegment::ArrayItem))
    }
}

impl fmt::Display for EventPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(DEFAULT_ARRAY_MARKER, DEFAULT_PATH_SEPARATOR))
    }
}

/// Decoded scalar carried by a leaf event
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

/// What happened at a given path
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    StartMap,
    EndMap,
    StartArray,
    EndArray,
    MapKey(String),
    Scalar(ScalarValue),
}

/// A structural parse notification
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub path: EventPath,
    pub kind: EventKind,
}

impl Event {
    pub fn new(path: EventPath, kind: EventKind) -> Self {
        Event { path, kind }
    }

    pub fn scalar(path: EventPath, value: ScalarValue) -> Self {
        Event::new(path, EventKind::Scalar(value))
    }
}

/// An event as produced by an external parser: a dotted path, an event
/// name and a decoded value.
///
/// Event names follow the ijson vocabulary (`start_map`, `end_map`,
/// `start_array`, `end_array`, `map_key`, `string`, `number`, `boolean`,
/// `null`).
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent {
    pub path: String,
    pub kind: String,
    pub value: Value,
}

impl RawEvent {
    pub fn new(path: impl Into<String>, kind: impl Into<String>, value: Value) -> Self {
        RawEvent {
            path: path.into(),
            kind: kind.into(),
            value,
        }
    }

    /// Convert into a typed [`Event`], rejecting unknown event names
    pub fn into_event(self, config: &FlattenConfig) -> Result<Event> {
        let path = EventPath::parse(&self.path, &config.array_marker, config.path_separator);

        let kind = match (self.kind.as_str(), self.value) {
            ("start_map", _) => EventKind::StartMap,
            ("end_map", _) => EventKind::EndMap,
            ("start_array", _) => EventKind::StartArray,
            ("end_array", _) => EventKind::EndArray,
            ("map_key", Value::String(key)) => EventKind::MapKey(key),
            ("string", Value::String(s)) => EventKind::Scalar(ScalarValue::Text(s)),
            ("boolean", Value::Bool(b)) => EventKind::Scalar(ScalarValue::Bool(b)),
            ("number", Value::Number(n)) => match n.as_f64() {
                Some(f) => EventKind::Scalar(ScalarValue::Number(f)),
                None => return Err(unrecognized(self.path, format!("number {n}"))),
            },
            ("null", _) => EventKind::Scalar(ScalarValue::Null),
            (kind, value) => {
                let kind = if value.is_null() {
                    kind.to_string()
                } else {
                    format!("{kind} {value}")
                };
                return Err(unrecognized(self.path, kind));
            }
        };

        Ok(Event { path, kind })
    }
}

fn unrecognized(path: String, kind: String) -> FlattenError {
    FlattenError::UnrecognizedEvent { path, kind }
}

pub const DEFAULT_ARRAY_MARKER: &str = "item";
pub const DEFAULT_PATH_SEPARATOR: char = '.';

/// Configuration for flattening documents into rows
#[derive(Debug, Clone)]
pub struct FlattenConfig {
    /// Text used for array positions when rendering or parsing paths
    pub array_marker: String,

    /// Separator between path segments in column names
    pub path_separator: char,

    /// Joins a column's base path and its array index
    pub index_separator: String,

    /// Also advance the array index on scalars that are direct array
    /// elements. Off by default: only a new map inside an array advances
    /// it, so every element of a scalar array lands in the same column.
    pub number_scalar_elements: bool,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        FlattenConfig {
            array_marker: String::from(DEFAULT_ARRAY_MARKER),
            path_separator: DEFAULT_PATH_SEPARATOR,
            index_separator: String::from("_"),
            number_scalar_elements: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_marks_array_items() {
        let path = EventPath::parse("employees.item.name", "item", '.');
        assert_eq!(
            path.segments(),
            &[
                PathSegment::Field("employees".to_string()),
                PathSegment::ArrayItem,
                PathSegment::Field("name".to_string()),
            ]
        );
        assert!(EventPath::parse("", "item", '.').is_root());
    }

    #[test]
    fn test_renders_empty() {
        assert!(EventPath::root().renders_empty());
        assert!(EventPath::root().field("").renders_empty());
        assert!(!EventPath::root().field("").field("a").renders_empty());
        assert!(!EventPath::root().field("a").renders_empty());
    }

    #[test]
    fn test_strip_trailing_marker() {
        let path = EventPath::parse("employees.item.name", "item", '.');
        assert_eq!(path.without_trailing_marker().to_string(), "employees.name");

        // Only the marker right before the last segment goes
        let nested = EventPath::parse("a.item.b.item.c", "item", '.');
        assert_eq!(nested.without_trailing_marker().to_string(), "a.item.b.c");

        let scalar_element = EventPath::parse("tags.item", "item", '.');
        assert_eq!(scalar_element.without_trailing_marker().to_string(), "tags.item");
    }

    #[test]
    fn test_marker_substring_is_a_field() {
        // `lineitem` contains the marker text but is an ordinary key
        let path = EventPath::root().field("order").field("lineitem").field("sku");
        assert_eq!(path.without_trailing_marker().to_string(), "order.lineitem.sku");

        let path = EventPath::root().field("orders").item().field("item");
        assert_eq!(path.without_trailing_marker().to_string(), "orders.item");
    }

    #[test]
    fn test_raw_event_conversion() {
        let config = FlattenConfig::default();

        let event = RawEvent::new("a", "number", json!(1)).into_event(&config).unwrap();
        assert_eq!(event.kind, EventKind::Scalar(ScalarValue::Number(1.0)));

        let event = RawEvent::new("", "map_key", json!("a")).into_event(&config).unwrap();
        assert_eq!(event.kind, EventKind::MapKey("a".to_string()));
        assert!(event.path.is_root());

        let event = RawEvent::new("a", "null", Value::Null).into_event(&config).unwrap();
        assert_eq!(event.kind, EventKind::Scalar(ScalarValue::Null));
    }

    #[test]
    fn test_raw_event_unknown_kind() {
        let config = FlattenConfig::default();
        let err = RawEvent::new("a", "start_set", Value::Null)
            .into_event(&config)
            .unwrap_err();

        match err {
            FlattenError::UnrecognizedEvent { path, kind } => {
                assert_eq!(path, "a");
                assert_eq!(kind, "start_set");
            }
            other => panic!("Expected UnrecognizedEvent, got: {:?}", other),
        }
    }
}
