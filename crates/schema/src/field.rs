//! Field and form definitions
//!
//! A `FieldDefinition` describes one form input independent of its layout.
//! A `FormDefinition` is the stored list of fields for one form, which can be
//! derived from a table's column metadata when none has been written by hand.

use crate::column::{ColumnMetadata, is_structural};
use schemadash_core::{
    DashError, DashResult, FieldType, Rule, SelectOption, Validatable, to_title_case,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ============================================================================
// FieldDefinition
// ============================================================================

/// One form input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    /// Field name, the key of its value in submitted input
    pub name: String,

    /// Human label; the title-cased name is used when empty
    #[serde(default)]
    pub label: String,

    /// Semantic type driving coercion and the fallback input type
    #[serde(rename = "type", default)]
    pub field_type: FieldType,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    /// Rules applied in declaration order
    #[serde(
        default,
        alias = "validationRules",
        alias = "validation",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub validations: Vec<Rule>,

    /// Allowed values, for choice fields
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,

    /// Display order (lower numbers appear first)
    #[serde(default)]
    pub order: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,
}

impl FieldDefinition {
    /// Create an optional field
    pub fn new(name: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            field_type,
            required: false,
            placeholder: None,
            validations: Vec::new(),
            options: Vec::new(),
            order: 0,
            default_value: None,
        }
    }

    /// Create a field from one column of a table.
    ///
    /// The label is the title-cased column name, the field is required when
    /// the column is not nullable, enum values become the options, and a
    /// maximum length becomes a `max` rule.
    pub fn from_column(column: &ColumnMetadata, order: u32) -> Self {
        let mut field = Self::new(
            &column.name,
            to_title_case(&column.name),
            form_field_type(&column.data_type),
        )
        .with_order(order);

        field.required = !column.is_nullable;
        field.options = column.enums.clone().unwrap_or_default();

        if let Some(max_length) = column.max_length {
            field.validations.push(Rule::max(f64::from(max_length)));
        }

        field
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Mark the field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the placeholder
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Append a validation rule
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.validations.push(rule);
        self
    }

    /// Set the allowed values
    pub fn with_options<S: Into<String>>(mut self, options: impl IntoIterator<Item = S>) -> Self {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Set the display order
    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }

    /// Set the default value
    pub fn with_default(mut self, value: serde_json::Value) -> Self {
        self.default_value = Some(value);
        self
    }

    // ========================================================================
    // Utility methods
    // ========================================================================

    /// Label shown to users
    pub fn display_label(&self) -> String {
        if self.label.trim().is_empty() {
            to_title_case(&self.name)
        } else {
            self.label.clone()
        }
    }

    /// Options as label/value pairs
    pub fn select_options(&self) -> Vec<SelectOption> {
        self.options
            .iter()
            .map(|value| SelectOption::from_value(value.clone()))
            .collect()
    }

    /// Check if the field restricts its value to a fixed set
    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }
}

impl Validatable for FieldDefinition {
    fn validate(&self) -> DashResult<()> {
        if self.name.trim().is_empty() {
            return Err(DashError::validation("Field name cannot be empty"));
        }
        Ok(())
    }
}

/// Form field type for a backend column type
pub fn form_field_type(backend_type: &str) -> FieldType {
    match backend_type.trim().to_lowercase().as_str() {
        "integer" | "bigint" | "smallint" | "int2" | "int4" | "int8" | "decimal" | "numeric"
        | "real" | "double precision" | "float4" | "float8" => FieldType::Number,
        "bool" | "boolean" => FieldType::Boolean,
        "date" => FieldType::Date,
        "timestamp" | "timestamptz" | "timestamp with time zone"
        | "timestamp without time zone" => FieldType::DateTime,
        "time" => FieldType::Time,
        "json" | "jsonb" => FieldType::Json,
        _ => FieldType::Text,
    }
}

// ============================================================================
// FormDefinition
// ============================================================================

/// How fields of a form are arranged when no UI schema says otherwise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FormLayoutKind {
    Grid,
    #[default]
    Stack,
}

/// Form-level layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormLayout {
    #[serde(rename = "type", default)]
    pub kind: FormLayoutKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<u32>,
}

impl Default for FormLayout {
    fn default() -> Self {
        Self {
            kind: FormLayoutKind::Stack,
            columns: Some(1),
        }
    }
}

/// Stored definition of one form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDefinition {
    /// Identifier, usually the name of the table the form writes to
    pub form_name: String,

    /// Display name
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub fields: Vec<FieldDefinition>,

    #[serde(default)]
    pub layout: FormLayout,
}

impl FormDefinition {
    /// Create an empty form definition
    pub fn new(form_name: impl Into<String>) -> Self {
        let form_name = form_name.into();
        let name = to_title_case(&form_name);
        Self {
            description: Some(format!("Form for {}", name)),
            form_name,
            name,
            fields: Vec::new(),
            layout: FormLayout::default(),
        }
    }

    /// Derive a form from a table's columns.
    ///
    /// Structural columns are assigned by the store and get no field.
    pub fn from_columns(form_name: impl Into<String>, columns: &[ColumnMetadata]) -> DashResult<Self> {
        let mut form = Self::new(form_name);

        form.fields = columns
            .iter()
            .enumerate()
            .filter(|(_, column)| !is_structural(&column.name))
            .map(|(index, column)| FieldDefinition::from_column(column, index as u32))
            .collect();

        form.validate()?;

        tracing::debug!(
            form = %form.form_name,
            fields = form.fields.len(),
            "Generated form definition from columns"
        );

        Ok(form)
    }

    /// Add a field
    pub fn with_field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    /// Find a field by name
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl Validatable for FormDefinition {
    fn validate(&self) -> DashResult<()> {
        if self.form_name.trim().is_empty() {
            return Err(DashError::validation("Form name cannot be empty"));
        }
        if self.fields.is_empty() {
            return Err(DashError::EmptyFields(self.form_name.clone()));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            field.validate()?;
            if !seen.insert(field.name.as_str()) {
                return Err(DashError::field_validation(
                    &field.name,
                    format!("Duplicate field in form '{}'", self.form_name),
                ));
            }
        }

        Ok(())
    }

    fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.form_name.trim().is_empty() {
            errors.push("Form name cannot be empty".to_string());
        }
        if self.fields.is_empty() {
            errors.push(format!("Form '{}' has no fields configured", self.form_name));
        }
        let mut seen = HashSet::new();
        for field in &self.fields {
            if let Err(e) = field.validate() {
                errors.push(e.to_string());
            }
            if !seen.insert(field.name.as_str()) {
                errors.push(format!("Duplicate field '{}'", field.name));
            }
        }
        errors
    }
}

// ============================================================================
// FormConfig
// ============================================================================

/// A form definition prepared for rendering: fields sorted by `order`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormConfig {
    pub name: String,
    pub description: Option<String>,
    pub fields: Vec<FieldDefinition>,
    pub layout: FormLayout,
}

impl From<FormDefinition> for FormConfig {
    fn from(definition: FormDefinition) -> Self {
        let mut fields = definition.fields;
        fields.sort_by_key(|f| f.order);
        Self {
            name: definition.name,
            description: definition.description,
            fields,
            layout: definition.layout,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn product_columns() -> Vec<ColumnMetadata> {
        vec![
            ColumnMetadata::new("id", "uuid"),
            ColumnMetadata::new("name", "varchar").with_max_length(80),
            ColumnMetadata::new("price", "numeric"),
            ColumnMetadata::new("in_stock", "boolean").nullable(),
            ColumnMetadata::enumeration("category", ["tools", "toys"]),
            ColumnMetadata::new("created_at", "timestamp"),
        ]
    }

    #[test]
    fn test_field_from_column() {
        let column = ColumnMetadata::new("release_date", "date").nullable();
        let field = FieldDefinition::from_column(&column, 3);
        assert_eq!(field.name, "release_date");
        assert_eq!(field.label, "Release Date");
        assert_eq!(field.field_type, FieldType::Date);
        assert!(!field.required);
        assert_eq!(field.order, 3);
    }

    #[test]
    fn test_form_from_columns() {
        let form = FormDefinition::from_columns("products", &product_columns()).unwrap();
        assert_eq!(form.name, "Products");
        assert_eq!(form.description.as_deref(), Some("Form for Products"));

        let names: Vec<&str> = form.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["name", "price", "in_stock", "category"]);

        let name = form.field("name").unwrap();
        assert!(name.required);
        assert_eq!(name.validations, vec![Rule::max(80.0)]);

        assert_eq!(form.field("price").unwrap().field_type, FieldType::Number);
        assert_eq!(form.field("in_stock").unwrap().field_type, FieldType::Boolean);
        assert_eq!(form.field("category").unwrap().options, vec!["tools", "toys"]);
        assert_eq!(form.field("category").unwrap().order, 4);
    }

    #[test]
    fn test_form_from_structural_columns_only_fails() {
        let columns = vec![ColumnMetadata::new("id", "uuid")];
        let err = FormDefinition::from_columns("audit", &columns).unwrap_err();
        assert!(matches!(err, DashError::EmptyFields(_)));
    }

    #[test]
    fn test_form_validation_errors() {
        let form = FormDefinition::new("people")
            .with_field(FieldDefinition::new("email", "Email", FieldType::Email))
            .with_field(FieldDefinition::new("email", "Email again", FieldType::Email))
            .with_field(FieldDefinition::new("", "Nameless", FieldType::Text));
        assert!(!form.is_valid());
        assert_eq!(form.validation_errors().len(), 2);
    }

    #[test]
    fn test_form_config_sorts_by_order() {
        let form = FormDefinition::new("people")
            .with_field(FieldDefinition::new("c", "C", FieldType::Text).with_order(3))
            .with_field(FieldDefinition::new("a", "A", FieldType::Text).with_order(1))
            .with_field(FieldDefinition::new("b", "B", FieldType::Text).with_order(2));
        let config = FormConfig::from(form);
        let names: Vec<&str> = config.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(config.layout, FormLayout::default());
    }

    #[test]
    fn test_display_label_falls_back_to_name() {
        let field = FieldDefinition::new("first_name", "", FieldType::Text);
        assert_eq!(field.display_label(), "First Name");
    }

    #[test]
    fn test_field_deserialization() {
        let field: FieldDefinition = serde_json::from_str(
            r#"{
                "name": "password",
                "label": "Password",
                "type": "password",
                "required": true,
                "validationRules": [
                    {"type": "min", "value": 8},
                    {"type": "pattern", "regex": "\\d", "message": "Needs a digit"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(field.field_type, FieldType::Password);
        assert_eq!(field.validations.len(), 2);
        assert_eq!(field.order, 0);
    }
}
