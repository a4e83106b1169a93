//! Column resolution for exported tables.

use indexmap::IndexMap;
use serde_json::Value;

/// A single exported record. Key order is insertion order.
pub type Record = serde_json::Map<String, Value>;

/// Source key → display label. Selects and orders the exported columns.
pub type HeaderMapping = IndexMap<String, String>;

/// Width used for every column without a header mapping, and the floor with one.
pub const DEFAULT_COLUMN_WIDTH: f64 = 20.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Record key the cell values come from.
    pub key: String,
    /// Label written in the header row.
    pub header: String,
    /// Spreadsheet column width in characters.
    pub width: f64,
}

/// Decide the exported columns.
///
/// With a mapping, its keys in order, labelled by its values. Without one,
/// the first record's keys in that record's order.
pub fn resolve_columns(records: &[Record], header_map: Option<&HeaderMapping>) -> Vec<Column> {
    match header_map {
        Some(map) => map
            .iter()
            .map(|(key, label)| Column {
                key: key.clone(),
                header: label.clone(),
                width: (label.chars().count() as f64).max(DEFAULT_COLUMN_WIDTH),
            })
            .collect(),
        None => records
            .first()
            .map(|sample| {
                sample
                    .keys()
                    .map(|key| Column {
                        key: key.clone(),
                        header: key.clone(),
                        width: DEFAULT_COLUMN_WIDTH,
                    })
                    .collect()
            })
            .unwrap_or_default(),
    }
}

/// Plain-text rendering of a cell. Missing and null cells are empty.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: Value) -> Record {
        match v {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_columns_from_first_record_order() {
        let records = vec![
            record(json!({"zeta": 1, "alpha": 2, "mid": 3})),
            record(json!({"other": 4})),
        ];
        let cols = resolve_columns(&records, None);
        let keys: Vec<_> = cols.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert!(cols.iter().all(|c| c.header == c.key && c.width == 20.0));
    }

    #[test]
    fn test_columns_from_header_map() {
        let records = vec![record(json!({"a": 1, "b": 2}))];
        let mut map = HeaderMapping::new();
        map.insert("b".to_string(), "A very long display label here".to_string());
        map.insert("a".to_string(), "Alpha".to_string());

        let cols = resolve_columns(&records, Some(&map));
        assert_eq!(
            cols,
            vec![
                Column {
                    key: "b".into(),
                    header: "A very long display label here".into(),
                    width: 30.0,
                },
                Column {
                    key: "a".into(),
                    header: "Alpha".into(),
                    width: 20.0,
                },
            ]
        );
    }

    #[test]
    fn test_no_records_no_columns() {
        assert!(resolve_columns(&[], None).is_empty());
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(None), "");
        assert_eq!(cell_text(Some(&Value::Null)), "");
        assert_eq!(cell_text(Some(&json!("x, y"))), "x, y");
        assert_eq!(cell_text(Some(&json!(1.5))), "1.5");
        assert_eq!(cell_text(Some(&json!(true))), "true");
        assert_eq!(cell_text(Some(&json!([1, 2]))), "[1,2]");
    }
}
