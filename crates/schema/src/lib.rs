//! # SchemaDash Schema
//!
//! The configuration engine: turns backend column metadata into table
//! configurations, field definitions plus a UI schema into form render
//! trees, and field rules into a submission validator.
//!
//! ## Core Concepts
//!
//! - **ColumnMetadata**: one backend column (name, type, nullability, enum values, reference)
//! - **TableConfig**: ordered column configs and derived filters for a data table
//! - **FieldDefinition**: one form input, independent of layout
//! - **UiSchema**: layout nodes keyed by field or group name, expanded into `RenderNode`s
//! - **FormValidator**: per-field type coercion and rules, errors collected per field
//! - **ServerSideTableState**: page/sort state translated into offset/limit query params
//!

pub mod cell;
pub mod column;
pub mod dates;
pub mod definition;
pub mod field;
pub mod inference;
pub mod pagination;
pub mod table;
pub mod ui_schema;
pub mod validation;

// Re-export commonly used types at crate root
pub use cell::{format_cell, render_template};
pub use column::{ColumnMetadata, STRUCTURAL_COLUMNS, is_structural, map_type};
pub use definition::{
    Definition, DefinitionFile, SCHEMA_VERSION, TableDefinition, definition_file_name,
    load_definition, load_definition_from_str, save_definition,
};
pub use field::{FieldDefinition, FormConfig, FormDefinition, FormLayout, FormLayoutKind};
pub use inference::{infer_columns, infer_type};
pub use pagination::{
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, OrderBy, QueryParams, ServerSideTableState, SortSpec,
    TableStateOptions, page_count,
};
pub use table::{
    ACTIONS_COLUMN, ComputeSpec, FilterDescriptor, FilterKind, SELECT_COLUMN, TableColumnConfig,
    TableConfig, TableConfigGenerator, TableOptions, try_generate,
};
pub use ui_schema::{
    FieldNode, InputControl, LeafWidget, RenderNode, UiSchema, UiSchemaNode, default_ui_schema,
    expand, rendered_field_names,
};
pub use validation::{
    FieldErrors, FormInput, FormValidationState, FormValidator, ValidationOutcome,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Prelude Module
// ============================================================================

/// Convenient re-exports for common usage
pub mod prelude {
    pub use crate::{
        ColumnMetadata, Definition, FieldDefinition, FilterDescriptor, FormDefinition,
        FormValidator, RenderNode, ServerSideTableState, SortSpec, TableColumnConfig, TableConfig,
        TableConfigGenerator, TableDefinition, TableOptions, TableStateOptions, UiSchema,
        UiSchemaNode, expand, map_type,
    };
    pub use schemadash_core::{
        DashError, DashResult, ErrorReporter, FieldType, Layout, Rule, UiKind, Validatable,
        WidgetType,
    };
}
