use crate::error::{FlattenError, Result};
use crate::flatten::index_stack::ArrayIndexStack;
use crate::flatten::source::events_from_value;
use crate::flatten::types::{Event, EventKind, EventPath, FlattenConfig, RawEvent, ScalarValue};
use crate::row::{Row, RowValue};
use crate::schema::{sanitize_identifier, ColumnCatalog, ColumnType, TypeHints};
use serde_json::Value;
use tracing::warn;

/// Turns documents into flat rows, growing a column catalog as it goes
#[derive(Debug, Clone, Default)]
pub struct Flattener {
    config: FlattenConfig,
    hints: TypeHints,
}

impl Flattener {
    pub fn new(config: FlattenConfig) -> Self {
        Flattener {
            config,
            hints: TypeHints::new(),
        }
    }

    pub fn with_hints(mut self, hints: TypeHints) -> Self {
        self.hints = hints;
        self
    }

    pub fn config(&self) -> &FlattenConfig {
        &self.config
    }

    pub fn hints(&self) -> &TypeHints {
        &self.hints
    }

    /// Start flattening one document, feeding events one at a time
    pub fn document<'a, C: ColumnCatalog>(
        &'a self,
        catalog: &'a mut C,
    ) -> DocumentFlattener<'a, C> {
        DocumentFlattener {
            config: &self.config,
            hints: &self.hints,
            catalog,
            stack: ArrayIndexStack::new(),
            row: Row::new(),
        }
    }

    /// Flatten a complete event stream for one document
    pub fn flatten_events<C, I>(&self, catalog: &mut C, events: I) -> Result<Row>
    where
        C: ColumnCatalog,
        I: IntoIterator<Item = Event>,
    {
        let mut doc = self.document(catalog);
        for event in events {
            doc.feed(event)?;
        }
        Ok(doc.finish())
    }

    /// Flatten events produced by an external parser
    pub fn flatten_raw<C, I>(&self, catalog: &mut C, events: I) -> Result<Row>
    where
        C: ColumnCatalog,
        I: IntoIterator<Item = RawEvent>,
    {
        let mut doc = self.document(catalog);
        for raw in events {
            doc.feed_raw(raw)?;
        }
        Ok(doc.finish())
    }

    pub fn flatten_value<C: ColumnCatalog>(&self, catalog: &mut C, value: &Value) -> Result<Row> {
        self.flatten_events(catalog, events_from_value(value))
    }

    pub fn flatten_str<C: ColumnCatalog>(&self, catalog: &mut C, text: &str) -> Result<Row> {
        let value: Value = serde_json::from_str(text)?;
        self.flatten_value(catalog, &value)
    }
}

/// Flattening state for a single document.
///
/// Owns the array index stack and the row under construction; both are
/// dropped with the document. An error leaves the row as it was when the
/// failing event arrived.
pub struct DocumentFlattener<'a, C> {
    config: &'a FlattenConfig,
    hints: &'a TypeHints,
    catalog: &'a mut C,
    stack: ArrayIndexStack,
    row: Row,
}

impl<'a, C: ColumnCatalog> DocumentFlattener<'a, C> {
    pub fn feed(&mut self, event: Event) -> Result<()> {
        match event.kind {
            // A new map inside an array is a new element
            EventKind::StartMap => self.stack.advance(),
            _ if event.path.renders_empty() => {}
            EventKind::EndMap | EventKind::MapKey(_) => {}
            EventKind::StartArray => self.stack.push(),
            EventKind::EndArray => {
                if self.stack.pop().is_none() {
                    return Err(FlattenError::StackUnderflow {
                        path: self.render_path(&event.path),
                    });
                }
            }
            EventKind::Scalar(value) => self.place_scalar(&event.path, value)?,
        }
        Ok(())
    }

    pub fn feed_raw(&mut self, raw: RawEvent) -> Result<()> {
        let event = raw.into_event(self.config)?;
        self.feed(event)
    }

    pub fn row(&self) -> &Row {
        &self.row
    }

    pub fn array_depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn finish(self) -> Row {
        if !self.stack.is_empty() {
            warn!(open_arrays = self.stack.depth(), "document ended with arrays still open");
        }
        self.row
    }

    fn place_scalar(&mut self, path: &EventPath, value: ScalarValue) -> Result<()> {
        if self.config.number_scalar_elements && path.ends_with_item() {
            self.stack.advance();
        }

        let name = self.column_name(path)?;
        let (default_type, value) = materialize(value);
        let column_type = self.hints.get(&name).unwrap_or(default_type);

        let position = self.catalog.ensure_column(&name, column_type)?;
        self.row.set_value(position, value);
        Ok(())
    }

    fn render_path(&self, path: &EventPath) -> String {
        path.render(&self.config.array_marker, self.config.path_separator)
    }

    fn column_name(&self, path: &EventPath) -> Result<String> {
        let marker = self.config.array_marker.as_str();
        let separator = self.config.path_separator;

        if self.stack.is_empty() {
            return Ok(sanitize_identifier(&path.render(marker, separator)));
        }

        let index = self.stack.top().ok_or_else(|| FlattenError::StackUnderflow {
            path: self.render_path(path),
        })?;
        let base = path.without_trailing_marker().render(marker, separator);
        let name = format!("{}{}{}", base, self.config.index_separator, index);
        Ok(sanitize_identifier(&name))
    }
}

/// Default column type and row value for a scalar.
///
/// Null becomes empty text, not a structural null; downstream loaders
/// rely on that.
fn materialize(value: ScalarValue) -> (ColumnType, RowValue) {
    match value {
        ScalarValue::Text(s) => (ColumnType::Text, RowValue::Text(s)),
        ScalarValue::Bool(b) => (ColumnType::SmallInt, RowValue::SmallInt(i16::from(b))),
        ScalarValue::Number(n) => (ColumnType::Double, RowValue::Double(n)),
        ScalarValue::Null => (ColumnType::Text, RowValue::Text(String::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaRegistry;
    use serde_json::json;

    fn raw(path: &str, kind: &str, value: Value) -> RawEvent {
        RawEvent::new(path, kind, value)
    }

    #[test]
    fn test_flat_object() {
        let mut registry = SchemaRegistry::new();
        let flattener = Flattener::default();
        let row = flattener
            .flatten_value(&mut registry, &json!({"a": 1, "b": "x", "c": true, "d": null}))
            .unwrap();

        assert_eq!(
            row.values(),
            &[
                RowValue::Double(1.0),
                RowValue::from("x"),
                RowValue::SmallInt(1),
                RowValue::from(""),
            ]
        );
        assert_eq!(registry.header(), vec!["a", "b", "c", "d"]);
        assert_eq!(registry.column("c").unwrap().column_type, ColumnType::SmallInt);
        assert_eq!(registry.column("d").unwrap().column_type, ColumnType::Text);
    }

    #[test]
    fn test_false_is_zero() {
        let mut registry = SchemaRegistry::new();
        let row = Flattener::default()
            .flatten_value(&mut registry, &json!({"ok": false}))
            .unwrap();
        assert_eq!(row.values(), &[RowValue::SmallInt(0)]);
    }

    #[test]
    fn test_nested_object_path() {
        let mut registry = SchemaRegistry::new();
        Flattener::default()
            .flatten_value(&mut registry, &json!({"user": {"name": "Alice"}}))
            .unwrap();
        assert_eq!(registry.header(), vec!["`user.name`"]);
    }

    #[test]
    fn test_array_of_objects_indexed() {
        let mut registry = SchemaRegistry::new();
        let row = Flattener::default()
            .flatten_value(&mut registry, &json!({"items": [{"x": 1}, {"x": 2}]}))
            .unwrap();

        assert_eq!(registry.header(), vec!["`items.x_0`", "`items.x_1`"]);
        assert_eq!(row.values(), &[RowValue::Double(1.0), RowValue::Double(2.0)]);
    }

    #[test]
    fn test_type_hint_overrides_default() {
        let mut registry = SchemaRegistry::new();
        let hints: TypeHints = vec![("age", ColumnType::SmallInt)].into_iter().collect();
        let flattener = Flattener::default().with_hints(hints);

        let row = flattener.flatten_value(&mut registry, &json!({"age": 42})).unwrap();

        assert_eq!(registry.column("age").unwrap().column_type, ColumnType::SmallInt);
        // The hint changes the column type, not the materialized value
        assert_eq!(row.values(), &[RowValue::Double(42.0)]);
    }

    #[test]
    fn test_hint_keyed_by_sanitized_name() {
        let mut registry = SchemaRegistry::new();
        let hints: TypeHints = vec![("`user.age`", ColumnType::Integer)].into_iter().collect();
        Flattener::default()
            .with_hints(hints)
            .flatten_value(&mut registry, &json!({"user": {"age": 3}}))
            .unwrap();

        assert_eq!(registry.column("`user.age`").unwrap().column_type, ColumnType::Integer);
    }

    #[test]
    fn test_scalar_array_legacy_index() {
        let mut registry = SchemaRegistry::new();
        let row = Flattener::default()
            .flatten_value(&mut registry, &json!({"tags": ["a", "b"]}))
            .unwrap();

        // Without a map per element the index never advances
        assert_eq!(registry.header(), vec!["`tags.item_-1`"]);
        assert_eq!(row.values(), &[RowValue::from("b")]);
    }

    #[test]
    fn test_scalar_array_numbered() {
        let mut registry = SchemaRegistry::new();
        let config = FlattenConfig {
            number_scalar_elements: true,
            ..FlattenConfig::default()
        };
        let row = Flattener::new(config)
            .flatten_value(&mut registry, &json!({"tags": ["a", "b"]}))
            .unwrap();

        assert_eq!(registry.header(), vec!["`tags.item_0`", "`tags.item_1`"]);
        assert_eq!(row.values(), &[RowValue::from("a"), RowValue::from("b")]);
    }

    #[test]
    fn test_unrecognized_event_aborts() {
        let mut registry = SchemaRegistry::new();
        let flattener = Flattener::default();
        let mut doc = flattener.document(&mut registry);

        doc.feed_raw(raw("", "start_map", Value::Null)).unwrap();
        doc.feed_raw(raw("", "map_key", json!("a"))).unwrap();
        doc.feed_raw(raw("a", "number", json!(1))).unwrap();

        let err = doc.feed_raw(raw("b", "set_member", json!(2))).unwrap_err();
        assert!(matches!(err, FlattenError::UnrecognizedEvent { .. }));
        assert_eq!(doc.row().values(), &[RowValue::Double(1.0)]);
    }

    #[test]
    fn test_end_array_underflow() {
        let mut registry = SchemaRegistry::new();
        let events = vec![
            raw("", "start_map", Value::Null),
            raw("", "map_key", json!("a")),
            raw("a", "end_array", Value::Null),
        ];

        let err = Flattener::default().flatten_raw(&mut registry, events).unwrap_err();
        match err {
            FlattenError::StackUnderflow { path } => assert_eq!(path, "a"),
            other => panic!("Expected StackUnderflow, got: {:?}", other),
        }
    }

    #[test]
    fn test_root_events_ignored() {
        let mut registry = SchemaRegistry::new();
        // Root-level array open/close carry an empty path
        let events = vec![
            raw("", "start_array", Value::Null),
            raw("", "end_array", Value::Null),
        ];
        let row = Flattener::default().flatten_raw(&mut registry, events).unwrap();
        assert!(row.is_empty());
    }

    #[test]
    fn test_marker_text_in_field_name() {
        let mut registry = SchemaRegistry::new();
        Flattener::default()
            .flatten_value(&mut registry, &json!({"orders": [{"lineitem": {"sku": "A1"}}]}))
            .unwrap();

        // `lineitem` is a key, so only a real array marker is ever stripped.
        // Its map opens inside the array and advances the element index.
        assert_eq!(registry.header(), vec!["`orders.item.lineitem.sku_1`"]);
    }

    #[test]
    fn test_nested_map_advances_element_index() {
        let mut registry = SchemaRegistry::new();
        Flattener::default()
            .flatten_value(&mut registry, &json!({"a": [{"o": {"y": 2}, "z": 3}]}))
            .unwrap();

        // The element's own map reads 0, `o` opening bumps it to 1 for
        // every key that follows within the same element
        assert_eq!(registry.header(), vec!["`a.item.o.y_1`", "`a.z_1`"]);
    }

    #[test]
    fn test_empty_top_level_key_ignored() {
        let doc = json!({"": 1, "a": 2});

        let mut from_value = SchemaRegistry::new();
        let row = Flattener::default().flatten_value(&mut from_value, &doc).unwrap();
        assert_eq!(from_value.header(), vec!["a"]);
        assert_eq!(row.values(), &[RowValue::Double(2.0)]);

        let mut from_raw = SchemaRegistry::new();
        let events = vec![
            raw("", "start_map", Value::Null),
            raw("", "map_key", json!("")),
            raw("", "number", json!(1)),
            raw("", "map_key", json!("a")),
            raw("a", "number", json!(2)),
            raw("", "end_map", Value::Null),
        ];
        let raw_row = Flattener::default().flatten_raw(&mut from_raw, events).unwrap();

        assert_eq!(from_raw.header(), from_value.header());
        assert_eq!(raw_row, row);
    }

    #[test]
    fn test_underflow_path_uses_configured_marker() {
        let mut registry = SchemaRegistry::new();
        let config = FlattenConfig {
            array_marker: "elem".to_string(),
            path_separator: '/',
            ..FlattenConfig::default()
        };
        let flattener = Flattener::new(config);
        let mut doc = flattener.document(&mut registry);

        let path = EventPath::root().field("a").item().field("b");
        let err = doc.feed(Event::new(path, EventKind::EndArray)).unwrap_err();
        match err {
            FlattenError::StackUnderflow { path } => assert_eq!(path, "a/elem/b"),
            other => panic!("Expected StackUnderflow, got: {:?}", other),
        }
    }
}
