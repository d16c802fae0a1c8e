//! Cell rendering for generated table columns

use crate::dates::parse_date;
use crate::table::TableColumnConfig;
use regex::{Captures, Regex};
use schemadash_core::UiKind;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// Shown for missing values
pub const EMPTY_CELL: &str = "N/A";

/// Shown for date cells that do not parse
pub const INVALID_DATE: &str = "Invalid Date";

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern compiles"));

/// Render the value of `column` in `row` as display text
pub fn format_cell(column: &TableColumnConfig, row: &Map<String, Value>) -> String {
    if let Some(compute) = &column.compute {
        let rendered = if compute.template.is_empty() {
            compute
                .source_fields
                .iter()
                .map(|field| row.get(field).map(plain_text).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(" ")
        } else {
            render_template(&compute.template, row)
        };
        let rendered = rendered.trim();
        return if rendered.is_empty() {
            EMPTY_CELL.to_string()
        } else {
            rendered.to_string()
        };
    }

    let value = row.get(&column.id).unwrap_or(&Value::Null);

    match column.kind {
        UiKind::Actions | UiKind::Checkbox => String::new(),
        UiKind::Boolean if truthy(value) => "Yes".to_string(),
        UiKind::Boolean => "No".to_string(),
        _ if is_blank(value) => EMPTY_CELL.to_string(),
        UiKind::Date => match parse_date(&plain_text(value)) {
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => INVALID_DATE.to_string(),
        },
        UiKind::Badge => {
            let raw = plain_text(value);
            column.option_label(&raw).to_string()
        }
        UiKind::Json => value.to_string(),
        UiKind::Text | UiKind::Number | UiKind::Relation | UiKind::Computed => plain_text(value),
    }
}

/// Substitute `${field}` placeholders with row values; missing fields become empty
pub fn render_template(template: &str, row: &Map<String, Value>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            row.get(caps[1].trim()).map(plain_text).unwrap_or_default()
        })
        .into_owned()
}

fn plain_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnMetadata;
    use crate::table::column_config;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn row(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("row must be an object"),
        }
    }

    #[test]
    fn test_computed_template() {
        let column = TableColumnConfig::computed(
            "customer",
            "Customer",
            ["first_name", "last_name"],
            "${first_name} ${last_name}",
        );
        let r = row(json!({"first_name": "Ada", "last_name": "Lovelace"}));
        assert_eq!(format_cell(&column, &r), "Ada Lovelace");
        assert_eq!(format_cell(&column, &row(json!({}))), "N/A");

        let priced = TableColumnConfig::computed("price", "Price", ["amount"], "$${amount}");
        assert_eq!(format_cell(&priced, &row(json!({"amount": 12.5}))), "$12.5");
    }

    #[test]
    fn test_computed_without_template_joins_fields() {
        let column = TableColumnConfig::computed("name", "Name", ["first", "last"], "");
        assert_eq!(
            format_cell(&column, &row(json!({"first": "Grace", "last": null}))),
            "Grace"
        );
    }

    #[test]
    fn test_dates() {
        let column = column_config(&ColumnMetadata::new("shipped_on", "timestamptz"));
        assert_eq!(
            format_cell(&column, &row(json!({"shipped_on": "2024-05-01T08:00:00Z"}))),
            "2024-05-01"
        );
        assert_eq!(
            format_cell(&column, &row(json!({"shipped_on": "soon"}))),
            "Invalid Date"
        );
        assert_eq!(format_cell(&column, &row(json!({"shipped_on": null}))), "N/A");
    }

    #[test]
    fn test_booleans() {
        let column = column_config(&ColumnMetadata::new("active", "bool"));
        assert_eq!(format_cell(&column, &row(json!({"active": true}))), "Yes");
        assert_eq!(format_cell(&column, &row(json!({"active": false}))), "No");
        assert_eq!(format_cell(&column, &row(json!({}))), "No");
    }

    #[test]
    fn test_badges_use_option_labels() {
        let column = column_config(&ColumnMetadata::enumeration("status", ["paid"]));
        assert_eq!(format_cell(&column, &row(json!({"status": "paid"}))), "Paid");
        assert_eq!(format_cell(&column, &row(json!({"status": "void"}))), "void");
    }

    #[test]
    fn test_plain_values() {
        let number = column_config(&ColumnMetadata::new("qty", "int4"));
        assert_eq!(format_cell(&number, &row(json!({"qty": 0}))), "0");

        let text = column_config(&ColumnMetadata::new("note", "text"));
        assert_eq!(format_cell(&text, &row(json!({"note": ""}))), "N/A");

        let json_column = column_config(&ColumnMetadata::new("meta", "jsonb"));
        assert_eq!(
            format_cell(&json_column, &row(json!({"meta": {"a": [1, 2]}}))),
            r#"{"a":[1,2]}"#
        );

        assert_eq!(format_cell(&TableColumnConfig::actions(), &row(json!({}))), "");
    }
}
