//! Table configuration and its generator
//!
//! A `TableConfig` is everything a data table needs to render a backend
//! table without static knowledge of its columns: ordered column configs
//! (with a synthesized selection column and actions column) and the filters
//! derived from textual and enum columns.

use crate::column::{ColumnMetadata, is_structural, map_type};
use indexmap::IndexMap;
use schemadash_core::{
    DashError, DashResult, ErrorContext, ErrorReporter, SelectOption, UiKind, Validatable,
    to_title_case,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Id of the synthesized row selection column
pub const SELECT_COLUMN: &str = "select";

/// Id of the synthesized row actions column
pub const ACTIONS_COLUMN: &str = "actions";

fn default_true() -> bool {
    true
}

// ============================================================================
// TableColumnConfig
// ============================================================================

/// Rendering configuration for one table column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableColumnConfig {
    /// Column id, unique within a table config
    pub id: String,

    /// How cells of this column render
    #[serde(rename = "type")]
    pub kind: UiKind,

    /// Header title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Whether the column stays visible while scrolling horizontally
    #[serde(default)]
    pub sticky: bool,

    /// Maximum width in pixels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<u32>,

    #[serde(default = "default_true")]
    pub enable_sorting: bool,

    #[serde(default = "default_true")]
    pub enable_hiding: bool,

    /// Display labels keyed by value, for badge columns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<IndexMap<String, String>>,

    /// Template combining several source fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compute: Option<ComputeSpec>,
}

impl TableColumnConfig {
    /// Create a sortable, hideable column
    pub fn new(id: impl Into<String>, kind: UiKind) -> Self {
        Self {
            id: id.into(),
            kind,
            title: None,
            sticky: false,
            max_width: None,
            enable_sorting: true,
            enable_hiding: true,
            options: None,
            compute: None,
        }
    }

    /// The leading row selection column
    pub fn select() -> Self {
        Self {
            sticky: true,
            enable_sorting: false,
            enable_hiding: false,
            ..Self::new(SELECT_COLUMN, UiKind::Checkbox)
        }
    }

    /// The trailing row actions column
    pub fn actions() -> Self {
        Self {
            enable_sorting: false,
            enable_hiding: false,
            ..Self::new(ACTIONS_COLUMN, UiKind::Actions)
        }
    }

    /// A column whose value is computed from other fields of the row
    pub fn computed<S: Into<String>>(
        id: impl Into<String>,
        title: impl Into<String>,
        source_fields: impl IntoIterator<Item = S>,
        template: impl Into<String>,
    ) -> Self {
        Self {
            title: Some(title.into()),
            enable_sorting: false,
            compute: Some(ComputeSpec {
                source_fields: source_fields.into_iter().map(Into::into).collect(),
                template: template.into(),
            }),
            ..Self::new(id, UiKind::Computed)
        }
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Set the header title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the maximum width
    pub fn with_max_width(mut self, width: u32) -> Self {
        self.max_width = Some(width);
        self
    }

    /// Disable sorting
    pub fn unsortable(mut self) -> Self {
        self.enable_sorting = false;
        self
    }

    /// Header title, falling back to the column id
    pub fn display_title(&self) -> String {
        self.title.clone().unwrap_or_else(|| self.id.clone())
    }

    /// Display label for a badge value, falling back to the raw value
    pub fn option_label<'a>(&'a self, value: &'a str) -> &'a str {
        self.options
            .as_ref()
            .and_then(|options| options.get(value))
            .map(String::as_str)
            .unwrap_or(value)
    }
}

/// Computed column definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeSpec {
    /// Row fields the template reads
    #[serde(alias = "fields")]
    pub source_fields: Vec<String>,

    /// Template with `${field}` placeholders
    #[serde(alias = "format")]
    pub template: String,
}

// ============================================================================
// FilterDescriptor
// ============================================================================

/// Filter UI variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    /// Free-text search
    Text,
    /// Fixed set of selectable values
    Faceted,
}

/// Filter offered for one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDescriptor {
    pub column: String,

    #[serde(rename = "type")]
    pub kind: FilterKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<SelectOption>>,

    /// Take the options from the column config of the same id
    #[serde(default)]
    pub use_options_from_column: bool,
}

impl FilterDescriptor {
    /// Free-text filter with the standard placeholder
    pub fn text(column: impl Into<String>) -> Self {
        let column = column.into();
        Self {
            placeholder: Some(format!("Filter by {}...", column)),
            column,
            kind: FilterKind::Text,
            options: None,
            use_options_from_column: false,
        }
    }

    /// Faceted filter reading its options from the column
    pub fn faceted(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            kind: FilterKind::Faceted,
            placeholder: None,
            options: None,
            use_options_from_column: true,
        }
    }

    /// Faceted filter with explicit options
    pub fn faceted_with(column: impl Into<String>, options: Vec<SelectOption>) -> Self {
        Self {
            options: Some(options),
            use_options_from_column: false,
            ..Self::faceted(column)
        }
    }
}

// ============================================================================
// TableConfig
// ============================================================================

/// Full configuration of a generic data table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub columns: Vec<TableColumnConfig>,
    #[serde(default)]
    pub filters: Vec<FilterDescriptor>,
}

impl TableConfig {
    /// A valid config with no columns and no filters
    pub fn empty(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            columns: Vec::new(),
            filters: Vec::new(),
        }
    }

    /// Check if no columns are configured
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Find a column by id
    pub fn column(&self, id: &str) -> Option<&TableColumnConfig> {
        self.columns.iter().find(|c| c.id == id)
    }

    /// Ids of all columns, in order
    pub fn column_ids(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.id.as_str()).collect()
    }

    /// Fill faceted filters flagged `use_options_from_column` from their column
    pub fn resolve_filter_options(&mut self) {
        let columns = &self.columns;
        for filter in self
            .filters
            .iter_mut()
            .filter(|f| f.use_options_from_column && f.options.is_none())
        {
            if let Some(options) = columns
                .iter()
                .find(|c| c.id == filter.column)
                .and_then(|c| c.options.as_ref())
            {
                filter.options = Some(
                    options
                        .iter()
                        .map(|(value, label)| SelectOption::new(label.clone(), value.clone()))
                        .collect(),
                );
            }
        }
    }
}

impl Validatable for TableConfig {
    fn validate(&self) -> DashResult<()> {
        let mut seen: HashSet<&str> = HashSet::new();
        let last = self.columns.len().saturating_sub(1);

        for (index, column) in self.columns.iter().enumerate() {
            if column.id.trim().is_empty() {
                return Err(DashError::validation(format!(
                    "Column {} in table '{}' has an empty id",
                    index, self.name
                )));
            }
            if !seen.insert(column.id.as_str()) {
                return Err(DashError::DuplicateColumn {
                    table: self.name.clone(),
                    column: column.id.clone(),
                });
            }
            let misplaced = (column.id == SELECT_COLUMN && index != 0)
                || (column.id == ACTIONS_COLUMN && index != last);
            if misplaced {
                return Err(DashError::ReservedColumn {
                    table: self.name.clone(),
                    column: column.id.clone(),
                });
            }
        }

        Ok(())
    }
}

// ============================================================================
// TableOptions
// ============================================================================

/// Caller options for table config generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableOptions {
    /// Column names left out of the config
    pub exclude_columns: Vec<String>,

    /// Prepend the row selection column
    pub include_select: bool,

    /// Append the row actions column
    pub include_actions: bool,

    /// Columns appended verbatim after the generated ones
    pub custom_columns: Vec<TableColumnConfig>,

    /// Filters appended after the derived ones
    pub custom_filters: Vec<FilterDescriptor>,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            exclude_columns: Vec::new(),
            include_select: true,
            include_actions: true,
            custom_columns: Vec::new(),
            custom_filters: Vec::new(),
        }
    }
}

impl TableOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Leave a column out
    pub fn exclude(mut self, column: impl Into<String>) -> Self {
        self.exclude_columns.push(column.into());
        self
    }

    /// Toggle the selection column
    pub fn with_select(mut self, include: bool) -> Self {
        self.include_select = include;
        self
    }

    /// Toggle the actions column
    pub fn with_actions(mut self, include: bool) -> Self {
        self.include_actions = include;
        self
    }

    /// Append a caller-defined column
    pub fn with_custom_column(mut self, column: TableColumnConfig) -> Self {
        self.custom_columns.push(column);
        self
    }

    /// Append a caller-defined filter
    pub fn with_custom_filter(mut self, filter: FilterDescriptor) -> Self {
        self.custom_filters.push(filter);
        self
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.exclude_columns.iter().any(|c| c == name)
    }
}

// ============================================================================
// Generator
// ============================================================================

/// Builds table configs from column metadata, reporting failures instead of
/// returning them
#[derive(Clone)]
pub struct TableConfigGenerator {
    reporter: Arc<dyn ErrorReporter>,
}

impl TableConfigGenerator {
    /// Create a generator that reports through `reporter`
    pub fn new(reporter: Arc<dyn ErrorReporter>) -> Self {
        Self { reporter }
    }

    /// Generate a table config.
    ///
    /// Never fails: on any error the error is reported and an empty config
    /// with the same name and description is returned.
    pub fn generate(
        &self,
        table_name: &str,
        description: &str,
        columns: &[ColumnMetadata],
        options: &TableOptions,
    ) -> TableConfig {
        match try_generate(table_name, description, columns, options) {
            Ok(config) => config,
            Err(err) => {
                self.reporter.report(
                    &err,
                    &ErrorContext::new(
                        format!("table configuration generation for {}", table_name),
                        format!(
                            "Failed to generate table configuration for {}. Please check your configuration.",
                            table_name
                        ),
                    ),
                );
                TableConfig::empty(table_name, description)
            }
        }
    }
}

/// Generate a table config, returning configuration errors to the caller
pub fn try_generate(
    table_name: &str,
    description: &str,
    columns: &[ColumnMetadata],
    options: &TableOptions,
) -> DashResult<TableConfig> {
    if columns.is_empty() {
        return Err(DashError::EmptyColumns(table_name.to_string()));
    }
    for column in columns {
        column.validate()?;
    }
    // A custom column may take a reserved id only when the generated one is off
    for custom in &options.custom_columns {
        let clashes = (custom.id == SELECT_COLUMN && options.include_select)
            || (custom.id == ACTIONS_COLUMN && options.include_actions);
        if clashes {
            return Err(DashError::ReservedColumn {
                table: table_name.to_string(),
                column: custom.id.clone(),
            });
        }
    }

    let mut config = TableConfig::empty(table_name, description);

    if options.include_select {
        config.columns.push(TableColumnConfig::select());
    }

    for column in columns.iter().filter(|c| !options.is_excluded(&c.name)) {
        config.columns.push(column_config(column));
        if let Some(filter) = filter_for(column) {
            config.filters.push(filter);
        }
    }

    config.columns.extend(options.custom_columns.iter().cloned());

    if options.include_actions {
        config.columns.push(TableColumnConfig::actions());
    }

    config.filters.extend(options.custom_filters.iter().cloned());

    config.validate()?;

    tracing::debug!(
        table = table_name,
        columns = config.columns.len(),
        filters = config.filters.len(),
        "Generated table configuration"
    );

    Ok(config)
}

/// Column config for one metadata entry
pub fn column_config(column: &ColumnMetadata) -> TableColumnConfig {
    let title = to_title_case(&column.name);

    if is_structural(&column.name) {
        return TableColumnConfig::new(&column.name, UiKind::Text).with_title(title);
    }

    let mut config = TableColumnConfig::new(&column.name, map_type(&column.data_type))
        .with_title(title);

    if config.kind == UiKind::Badge {
        config.options = Some(column.enum_options());
    }

    // Sorting by a referenced row would need a join
    if column.is_fk() {
        config.kind = UiKind::Relation;
        config.enable_sorting = false;
        config.options = None;
    }

    config
}

/// Filter derived from one metadata entry, if the column is filterable
pub fn filter_for(column: &ColumnMetadata) -> Option<FilterDescriptor> {
    if is_structural(&column.name) {
        return None;
    }

    match column.type_key().as_str() {
        "enum" => Some(FilterDescriptor::faceted(&column.name)),
        "text" | "varchar" => Some(FilterDescriptor::text(&column.name)),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
