//! Stored table and form definitions
//!
//! Definitions are JSON documents wrapped with a schema version:
//!
//! ```json
//! { "schema_version": 1, "kind": "table", "table_name": "orders", ... }
//! ```
//!
//! Bare documents without the wrapper are accepted too.

use crate::column::ColumnMetadata;
use crate::field::FormDefinition;
use crate::table::TableOptions;
use schemadash_core::{DashError, DashResult, Persistable, Validatable, to_title_case};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Current definition file schema version
pub const SCHEMA_VERSION: u32 = 1;

/// File extension of definition files
pub const DEFINITION_EXTENSION: &str = "json";

// ============================================================================
// TableDefinition
// ============================================================================

/// Stored column metadata of one table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDefinition {
    /// Physical table name
    pub table_name: String,

    /// Display name
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub columns: Vec<ColumnMetadata>,

    /// Generation options for this table
    #[serde(default)]
    pub options: TableOptions,
}

impl TableDefinition {
    /// Create a definition with a title-cased display name
    pub fn new(table_name: impl Into<String>) -> Self {
        let table_name = table_name.into();
        let name = to_title_case(&table_name);
        Self {
            description: format!("Table for {}", name),
            table_name,
            name,
            columns: Vec::new(),
            options: TableOptions::default(),
        }
    }

    /// Create a definition with columns
    pub fn with_columns(table_name: impl Into<String>, columns: Vec<ColumnMetadata>) -> Self {
        Self {
            columns,
            ..Self::new(table_name)
        }
    }

    /// Add a column
    pub fn with_column(mut self, column: ColumnMetadata) -> Self {
        self.columns.push(column);
        self
    }

    /// Set the generation options
    pub fn with_options(mut self, options: TableOptions) -> Self {
        self.options = options;
        self
    }
}

impl Validatable for TableDefinition {
    fn validate(&self) -> DashResult<()> {
        if self.table_name.trim().is_empty() {
            return Err(DashError::validation("Table name cannot be empty"));
        }
        if self.columns.is_empty() {
            return Err(DashError::EmptyColumns(self.table_name.clone()));
        }
        let mut seen = HashSet::new();
        for column in &self.columns {
            column.validate()?;
            if !seen.insert(column.name.as_str()) {
                return Err(DashError::DuplicateColumn {
                    table: self.table_name.clone(),
                    column: column.name.clone(),
                });
            }
        }
        Ok(())
    }
}

// ============================================================================
// Definition files
// ============================================================================

/// A stored definition of either kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Definition {
    Table(TableDefinition),
    Form(FormDefinition),
}

impl Definition {
    /// Name the definition is stored under
    pub fn key(&self) -> &str {
        match self {
            Definition::Table(table) => &table.table_name,
            Definition::Form(form) => &form.form_name,
        }
    }

    /// Lowercase kind name
    pub fn kind(&self) -> &'static str {
        match self {
            Definition::Table(_) => "table",
            Definition::Form(_) => "form",
        }
    }
}

impl Validatable for Definition {
    fn validate(&self) -> DashResult<()> {
        match self {
            Definition::Table(table) => table.validate(),
            Definition::Form(form) => form.validate(),
        }
    }
}

impl From<TableDefinition> for Definition {
    fn from(table: TableDefinition) -> Self {
        Definition::Table(table)
    }
}

impl From<FormDefinition> for Definition {
    fn from(form: FormDefinition) -> Self {
        Definition::Form(form)
    }
}

/// Versioned wrapper written to disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinitionFile {
    pub schema_version: u32,

    #[serde(flatten)]
    pub definition: Definition,
}

impl DefinitionFile {
    /// Wrap a definition with the current schema version
    pub fn new(definition: impl Into<Definition>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            definition: definition.into(),
        }
    }

    /// Check if the file predates the current schema
    pub fn needs_migration(&self) -> bool {
        self.schema_version < SCHEMA_VERSION
    }

    /// Bring an older file up to the current schema version
    pub fn migrate(&mut self) -> DashResult<()> {
        if self.schema_version > SCHEMA_VERSION {
            return Err(DashError::SchemaVersionMismatch {
                expected: SCHEMA_VERSION,
                found: self.schema_version,
            });
        }
        // Version 0 files differ only in the missing wrapper fields
        self.schema_version = SCHEMA_VERSION;
        Ok(())
    }
}

impl Persistable for DefinitionFile {
    fn file_extension() -> &'static str {
        DEFINITION_EXTENSION
    }
}

/// Parse a definition document, wrapped or bare, and validate it
pub fn load_definition_from_str(json: &str) -> DashResult<Definition> {
    let value: serde_json::Value = serde_json::from_str(json)?;

    let definition = if value.get("schema_version").is_some() {
        let mut file: DefinitionFile = serde_json::from_value(value)?;
        file.migrate()?;
        file.definition
    } else if value.get("kind").is_some() {
        serde_json::from_value(value)?
    } else if value.get("table_name").is_some() {
        Definition::Table(serde_json::from_value(value)?)
    } else {
        Definition::Form(serde_json::from_value(value)?)
    };

    definition.validate()?;
    Ok(definition)
}

/// Load and validate a definition file
pub fn load_definition(path: &Path) -> DashResult<Definition> {
    let json = std::fs::read_to_string(path).map_err(|e| DashError::FileRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    load_definition_from_str(&json).map_err(|e| match e {
        DashError::Json(je) => DashError::FileRead {
            path: path.to_path_buf(),
            message: format!("Invalid definition file: {}", je),
        },
        other => other,
    })
}

/// Save a definition with the version wrapper, creating parent directories
pub fn save_definition(definition: &Definition, path: &Path) -> DashResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| DashError::FileWrite {
            path: parent.to_path_buf(),
            message: e.to_string(),
        })?;
    }
    DefinitionFile::new(definition.clone()).save_to_file(path)
}

/// File name a definition is saved under, e.g. `orders.table.json`
pub fn definition_file_name(definition: &Definition) -> String {
    format!(
        "{}.{}.{}",
        definition.key(),
        definition.kind(),
        DefinitionFile::file_extension()
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldDefinition;
    use pretty_assertions::assert_eq;
    use schemadash_core::FieldType;

    fn orders() -> TableDefinition {
        TableDefinition::new("order_items")
            .with_column(ColumnMetadata::new("id", "uuid"))
            .with_column(ColumnMetadata::enumeration("status", ["new", "sent"]))
    }

    #[test]
    fn test_table_definition_defaults() {
        let def = orders();
        assert_eq!(def.name, "Order Items");
        assert_eq!(def.description, "Table for Order Items");
        assert!(def.options.include_select);
        assert!(def.is_valid());
    }

    #[test]
    fn test_table_definition_validation() {
        assert!(matches!(
            TableDefinition::new("empty").validate(),
            Err(DashError::EmptyColumns(_))
        ));
        let dup = orders().with_column(ColumnMetadata::new("status", "text"));
        assert!(matches!(dup.validate(), Err(DashError::DuplicateColumn { .. })));
    }

    #[test]
    fn test_save_and_load_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let definition = Definition::from(orders());
        let path = dir.path().join("nested").join(definition_file_name(&definition));

        save_definition(&definition, &path).unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["schema_version"], 1);
        assert_eq!(written["kind"], "table");

        assert_eq!(load_definition(&path).unwrap(), definition);
        assert!(path.ends_with("order_items.table.json"));
    }

    #[test]
    fn test_load_bare_documents() {
        let table = load_definition_from_str(
            r#"{"table_name":"users","name":"Users","columns":[{"name":"email","type":"text"}]}"#,
        )
        .unwrap();
        assert_eq!(table.kind(), "table");

        let form = load_definition_from_str(
            r#"{"form_name":"users","name":"Users","fields":[{"name":"email","type":"email"}]}"#,
        )
        .unwrap();
        let Definition::Form(form) = form else {
            panic!("expected form");
        };
        assert_eq!(form.fields[0].field_type, FieldType::Email);
    }

    #[test]
    fn test_newer_schema_version_rejected() {
        let err = load_definition_from_str(
            r#"{"schema_version":9,"kind":"form","form_name":"f","name":"F","fields":[{"name":"a"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DashError::SchemaVersionMismatch {
                expected: 1,
                found: 9
            }
        ));
    }

    #[test]
    fn test_older_schema_version_migrated() {
        let definition = load_definition_from_str(
            r#"{"schema_version":0,"kind":"table","table_name":"t","name":"T","columns":[{"name":"a","type":"text"}]}"#,
        )
        .unwrap();
        assert_eq!(definition.key(), "t");
    }

    #[test]
    fn test_invalid_definition_rejected_on_load() {
        let err = load_definition_from_str(r#"{"table_name":"t","name":"T","columns":[]}"#)
            .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_malformed_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.table.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = load_definition(&path).unwrap_err();
        assert!(matches!(err, DashError::FileRead { .. }));
    }

    #[test]
    fn test_form_definition_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let form = FormDefinition::new("contacts")
            .with_field(FieldDefinition::new("email", "Email", FieldType::Email).required());
        let definition = Definition::from(form);
        let path = dir.path().join(definition_file_name(&definition));
        save_definition(&definition, &path).unwrap();
        assert_eq!(load_definition(&path).unwrap(), definition);
    }
}
