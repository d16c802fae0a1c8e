//! Column metadata and backend type mapping
//!
//! This module contains `ColumnMetadata`, the description of one column as
//! read from a table definition, and the mapper from backend-native type
//! names to UI kinds.

use indexmap::IndexMap;
use schemadash_core::{DashError, DashResult, SelectOption, UiKind, Validatable, capitalize};
use serde::{Deserialize, Serialize};

/// Columns that describe row structure rather than row content
pub const STRUCTURAL_COLUMNS: &[&str] = &["id", "created_at", "updated_at"];

/// Check if a column name is one of the structural columns
pub fn is_structural(name: &str) -> bool {
    STRUCTURAL_COLUMNS.contains(&name)
}

// ============================================================================
// ColumnMetadata
// ============================================================================

/// One column of a backend table, as produced by schema introspection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    /// Column name, unique per table
    pub name: String,

    /// Backend-native type name (e.g. `int8`, `varchar`, `enum`)
    #[serde(rename = "type")]
    pub data_type: String,

    /// Whether the column accepts NULL
    #[serde(default, alias = "isNullable")]
    pub is_nullable: bool,

    /// Allowed values for enum columns
    #[serde(default, alias = "enum", skip_serializing_if = "Option::is_none")]
    pub enums: Option<Vec<String>>,

    /// Foreign key target, e.g. `users.id`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<String>,

    /// Maximum length for character columns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
}

impl ColumnMetadata {
    /// Create a new non-nullable column
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            is_nullable: false,
            enums: None,
            references: None,
            max_length: None,
        }
    }

    /// Create an enum column with its allowed values
    pub fn enumeration<S: Into<String>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::new(name, "enum").with_enums(values)
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Mark the column as nullable
    pub fn nullable(mut self) -> Self {
        self.is_nullable = true;
        self
    }

    /// Set the enum values
    pub fn with_enums<S: Into<String>>(mut self, values: impl IntoIterator<Item = S>) -> Self {
        self.enums = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Set the foreign key reference
    pub fn references(mut self, target: impl Into<String>) -> Self {
        self.references = Some(target.into());
        self
    }

    /// Set the maximum length
    pub fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }

    // ========================================================================
    // Utility methods
    // ========================================================================

    /// UI kind of this column's values
    pub fn ui_kind(&self) -> UiKind {
        map_type(&self.data_type)
    }

    /// Case-folded backend type name
    pub fn type_key(&self) -> String {
        self.data_type.trim().to_lowercase()
    }

    /// Check if the backend type is `enum`
    pub fn is_enum(&self) -> bool {
        self.type_key() == "enum"
    }

    /// Check if this column references another table
    pub fn is_fk(&self) -> bool {
        self.references.is_some()
    }

    /// Enum display labels keyed by value; empty when the column lists no values
    pub fn enum_options(&self) -> IndexMap<String, String> {
        self.enums
            .iter()
            .flatten()
            .map(|value| (value.clone(), capitalize(value)))
            .collect()
    }

    /// Enum values as select options, in declaration order
    pub fn select_options(&self) -> Vec<SelectOption> {
        self.enums
            .iter()
            .flatten()
            .map(|value| SelectOption::from_value(value.clone()))
            .collect()
    }
}

impl Validatable for ColumnMetadata {
    fn validate(&self) -> DashResult<()> {
        if self.name.trim().is_empty() {
            return Err(DashError::validation("Column name cannot be empty"));
        }
        if self.data_type.trim().is_empty() {
            return Err(DashError::validation(format!(
                "Column '{}' has no type",
                self.name
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Type Mapper
// ============================================================================

/// Map a backend-native type name to a UI kind.
///
/// Lookup is case-insensitive. Unknown types map to [`UiKind::Text`].
pub fn map_type(backend_type: &str) -> UiKind {
    match backend_type.trim().to_lowercase().as_str() {
        "text" | "varchar" | "character varying" | "char" | "character" | "uuid" | "citext" => {
            UiKind::Text
        }
        "int2" | "int4" | "int8" | "integer" | "smallint" | "bigint" | "numeric" | "decimal"
        | "real" | "double precision" | "float4" | "float8" | "serial" | "bigserial" => {
            UiKind::Number
        }
        "bool" | "boolean" => UiKind::Boolean,
        "date"
        | "timestamp"
        | "timestamptz"
        | "timestamp with time zone"
        | "timestamp without time zone" => UiKind::Date,
        "json" | "jsonb" => UiKind::Json,
        "enum" => UiKind::Badge,
        _ => UiKind::Text,
    }
}

// ============================================================================
// Tests
// ============================================================================
