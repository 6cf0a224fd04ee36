//! Event emission from parsed JSON
//!
//! Produces the same event sequence an ijson-style pull parser would:
//! a map emits `StartMap`, then a `MapKey` and the value's events for each
//! entry, then `EndMap`; an array emits `StartArray`, its elements under
//! an array-item segment, then `EndArray`. Key order follows the document.

use crate::error::Result;
use crate::flatten::types::{Event, EventKind, EventPath, ScalarValue};
use serde_json::Value;

pub fn events_from_value(value: &Value) -> Vec<Event> {
    let mut events = Vec::new();
    emit(value, EventPath::root(), &mut events);
    events
}

pub fn events_from_str(text: &str) -> Result<Vec<Event>> {
    let value: Value = serde_json::from_str(text)?;
    Ok(events_from_value(&value))
}

fn emit(value: &Value, path: EventPath, events: &mut Vec<Event>) {
    match value {
        Value::Object(obj) => {
            events.push(Event::new(path.clone(), EventKind::StartMap));
            for (key, child) in obj.iter() {
                events.push(Event::new(path.clone(), EventKind::MapKey(key.clone())));
                emit(child, path.field(key.as_str()), events);
            }
            events.push(Event::new(path, EventKind::EndMap));
        }
        Value::Array(arr) => {
            events.push(Event::new(path.clone(), EventKind::StartArray));
            let item_path = path.item();
            for child in arr.iter() {
                emit(child, item_path.clone(), events);
            }
            events.push(Event::new(path, EventKind::EndArray));
        }
        Value::Null => events.push(Event::scalar(path, ScalarValue::Null)),
        Value::Bool(b) => events.push(Event::scalar(path, ScalarValue::Bool(*b))),
        Value::Number(n) => {
            // Always representable without arbitrary_precision
            let n = n.as_f64().unwrap_or(f64::NAN);
            events.push(Event::scalar(path, ScalarValue::Number(n)));
        }
        Value::String(s) => events.push(Event::scalar(path, ScalarValue::Text(s.clone()))),
    }
}
