//! Best-effort column inference from one sampled row
//!
//! Used only when a table has no stored definition. One row cannot tell
//! "always null" from "wrong type", so every inferred column is nullable and
//! null values are typed as text.

use crate::column::{ColumnMetadata, STRUCTURAL_COLUMNS};
use serde_json::{Map, Value};

/// Backend type name for a JSON value
pub fn infer_type(value: &Value) -> &'static str {
    match value {
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() || n.is_u64() => "int8",
        Value::Number(_) => "numeric",
        Value::Array(_) | Value::Object(_) => "jsonb",
        Value::String(_) | Value::Null => "text",
    }
}

/// Infer columns from a sample row, in the row's key order.
///
/// Without a row only the structural columns are returned.
pub fn infer_columns(table: &str, sample: Option<&Map<String, Value>>) -> Vec<ColumnMetadata> {
    let Some(row) = sample else {
        tracing::warn!(table, "No rows to infer columns from, using structural columns");
        return STRUCTURAL_COLUMNS
            .iter()
            .map(|name| ColumnMetadata::new(*name, "text").nullable())
            .collect();
    };

    tracing::warn!(
        table,
        columns = row.len(),
        "Inferring columns from a single sampled row"
    );

    row.iter()
        .map(|(name, value)| ColumnMetadata::new(name, infer_type(value)).nullable())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::map_type;
    use pretty_assertions::assert_eq;
    use schemadash_core::UiKind;
    use serde_json::json;

    #[test]
    fn test_infer_type() {
        assert_eq!(infer_type(&json!("x")), "text");
        assert_eq!(infer_type(&json!(3)), "int8");
        assert_eq!(infer_type(&json!(3.5)), "numeric");
        assert_eq!(infer_type(&json!(true)), "bool");
        assert_eq!(infer_type(&json!({"a": 1})), "jsonb");
        assert_eq!(infer_type(&json!([1])), "jsonb");
        assert_eq!(infer_type(&Value::Null), "text");
    }

    #[test]
    fn test_inferred_types_are_mappable() {
        assert_eq!(map_type(infer_type(&json!(1))), UiKind::Number);
        assert_eq!(map_type(infer_type(&json!(false))), UiKind::Boolean);
        assert_eq!(map_type(infer_type(&json!([]))), UiKind::Json);
    }

    #[test]
    fn test_infer_columns_from_row() {
        let row = json!({"id": 7, "email": "a@b.co", "score": 1.5, "tags": ["x"], "deleted_at": null});
        let columns = infer_columns("users", row.as_object());

        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names.len(), 5);
        assert!(names.contains(&"email"));
        assert!(columns.iter().all(|c| c.is_nullable));

        let score = columns.iter().find(|c| c.name == "score").unwrap();
        assert_eq!(score.data_type, "numeric");
    }

    #[test]
    fn test_infer_columns_without_rows() {
        let columns = infer_columns("empty", None);
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "created_at", "updated_at"]);
    }
}
