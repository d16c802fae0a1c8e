//! Server-side pagination and sort state
//!
//! Pure transitions over `ServerSideTableState` plus the translation of a
//! state into store query parameters.

use indexmap::IndexMap;
use schemadash_core::{DashError, DashResult, Validatable};
use serde::{Deserialize, Serialize};

/// Page size of a fresh table
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Largest page a client may request
pub const MAX_PAGE_SIZE: usize = 100;

// ============================================================================
// Options
// ============================================================================

/// Per-table paging limits and sort column aliases
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableStateOptions {
    pub default_page_size: usize,
    pub max_page_size: usize,
    /// UI column id to physical column name
    pub column_aliases: IndexMap<String, String>,
}

impl Default for TableStateOptions {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
            column_aliases: IndexMap::new(),
        }
    }
}

impl TableStateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_sizes(mut self, default_page_size: usize, max_page_size: usize) -> Self {
        self.default_page_size = default_page_size;
        self.max_page_size = max_page_size;
        self
    }

    /// Sort by `physical` when the UI asks for `column`
    pub fn with_alias(mut self, column: impl Into<String>, physical: impl Into<String>) -> Self {
        self.column_aliases.insert(column.into(), physical.into());
        self
    }

    /// Physical column for a UI column id
    pub fn physical_column<'a>(&'a self, column: &'a str) -> &'a str {
        self.column_aliases
            .get(column)
            .map(String::as_str)
            .unwrap_or(column)
    }

    /// Clamp a requested page size into `[1, max_page_size]`; sizes below 1
    /// get the default size
    pub fn clamp_page_size(&self, size: usize) -> usize {
        if size < 1 {
            self.default_page_size.min(self.max_page_size)
        } else {
            size.min(self.max_page_size)
        }
    }
}

impl Validatable for TableStateOptions {
    fn validate(&self) -> DashResult<()> {
        if self.max_page_size == 0 {
            return Err(DashError::InvalidConfig(
                "max page size must be at least 1".to_string(),
            ));
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(DashError::InvalidConfig(format!(
                "default page size {} must be between 1 and {}",
                self.default_page_size, self.max_page_size
            )));
        }
        Ok(())
    }
}

// ============================================================================
// State
// ============================================================================

/// One sort key as requested by the UI
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    #[serde(alias = "id")]
    pub column: String,
    #[serde(default, alias = "desc")]
    pub descending: bool,
}

impl SortSpec {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: false,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }
}

/// Pagination and sort state of one table view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSideTableState {
    pub page_index: usize,
    pub page_size: usize,
    #[serde(default)]
    pub sorting: Vec<SortSpec>,
}

impl Default for ServerSideTableState {
    fn default() -> Self {
        Self::new(&TableStateOptions::default())
    }
}

impl ServerSideTableState {
    /// First page, default size, unsorted
    pub fn new(options: &TableStateOptions) -> Self {
        Self {
            page_index: 0,
            page_size: options.clamp_page_size(options.default_page_size),
            sorting: Vec::new(),
        }
    }

    /// Replace the sorting and go back to the first page
    pub fn on_sort_change(&self, sorting: Vec<SortSpec>) -> Self {
        Self {
            page_index: 0,
            page_size: self.page_size,
            sorting,
        }
    }

    /// Move to a page, clamping the requested size
    pub fn on_page_change(&self, page_index: usize, page_size: usize, options: &TableStateOptions) -> Self {
        Self {
            page_index,
            page_size: options.clamp_page_size(page_size),
            sorting: self.sorting.clone(),
        }
    }

    /// Query parameters for the current page
    pub fn to_query_params(&self, options: &TableStateOptions) -> QueryParams {
        QueryParams {
            offset: self.page_index.saturating_mul(self.page_size),
            limit: self.page_size,
            order_by: self
                .sorting
                .iter()
                .map(|sort| OrderBy {
                    column: options.physical_column(&sort.column).to_string(),
                    ascending: !sort.descending,
                })
                .collect(),
        }
    }
}

// ============================================================================
// Query parameters
// ============================================================================

/// One order-by clause handed to the store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderBy {
    pub column: String,
    pub ascending: bool,
}

/// Offset/limit paging plus ordering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParams {
    pub offset: usize,
    pub limit: usize,
    #[serde(default)]
    pub order_by: Vec<OrderBy>,
}

impl QueryParams {
    /// Inclusive index of the last requested row; `None` for an empty page
    pub fn range_end(&self) -> Option<usize> {
        self.offset.saturating_add(self.limit).checked_sub(1).filter(|_| self.limit > 0)
    }
}

/// Number of pages needed for `total_rows`
pub fn page_count(total_rows: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_rows.div_ceil(page_size)
}

// ============================================================================
// Tests
// ============================================================================
