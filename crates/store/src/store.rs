//! The data store boundary
//!
//! Everything the engine reads or writes outside of pure configuration goes
//! through `DataStore`: stored definitions, sampled rows for inference, page
//! queries and form inserts.

use async_trait::async_trait;
use schemadash_core::DashResult;
use schemadash_schema::{FormDefinition, QueryParams, TableDefinition};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One table row keyed by column name
pub type Row = Map<String, Value>;

/// One page of rows plus the total row count of the table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub rows: Vec<Row>,
    pub total_rows: usize,
}

impl Page {
    pub fn new(rows: Vec<Row>, total_rows: usize) -> Self {
        Self { rows, total_rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Hosted backend as seen by the engine
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Names of all tables with a stored definition
    async fn list_tables(&self) -> DashResult<Vec<String>>;

    /// Stored definition of a table, `None` when none was written
    async fn table_definition(&self, table: &str) -> DashResult<Option<TableDefinition>>;

    async fn save_table_definition(&self, definition: &TableDefinition) -> DashResult<()>;

    /// Stored definition of a form, `None` when none was written
    async fn form_definition(&self, form: &str) -> DashResult<Option<FormDefinition>>;

    async fn save_form_definition(&self, definition: &FormDefinition) -> DashResult<()>;

    /// Any one row of a table, `None` when the table is empty
    async fn sample_row(&self, table: &str) -> DashResult<Option<Row>>;

    /// One page of a table
    async fn query(&self, table: &str, params: &QueryParams) -> DashResult<Page>;

    /// Insert a row, returning it as stored
    async fn insert(&self, table: &str, row: Row) -> DashResult<Row>;
}
