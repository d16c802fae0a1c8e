//! In-memory data store
//!
//! Holds definitions and rows behind a tokio `RwLock`. It can be seeded from
//! a definitions directory: `*.table.json` and `*.form.json` definition files
//! plus `<table>.rows.json` files holding a JSON array of rows. Other files
//! are ignored.

use crate::store::{DataStore, Page, Row};
use async_trait::async_trait;
use schemadash_core::error::CODE_UNDEFINED_TABLE;
use schemadash_core::{DashError, DashResult, ResultExt};
use schemadash_schema::{
    Definition, FormDefinition, OrderBy, QueryParams, TableDefinition, load_definition,
};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::Path;
use tokio::sync::RwLock;
use walkdir::WalkDir;

/// Suffix of seed row files
pub const ROWS_SUFFIX: &str = ".rows.json";

/// Suffixes of definition files
pub const DEFINITION_SUFFIXES: &[&str] = &[".table.json", ".form.json"];

#[derive(Debug, Default)]
struct Inner {
    tables: BTreeMap<String, TableDefinition>,
    forms: BTreeMap<String, FormDefinition>,
    rows: BTreeMap<String, Vec<Row>>,
}

impl Inner {
    fn with_definitions(definitions: impl IntoIterator<Item = Definition>) -> Self {
        let mut inner = Self::default();
        for definition in definitions {
            match definition {
                Definition::Table(table) => {
                    inner.tables.insert(table.table_name.clone(), table);
                }
                Definition::Form(form) => {
                    inner.forms.insert(form.form_name.clone(), form);
                }
            }
        }
        inner
    }

    fn rows_of(&self, table: &str) -> DashResult<&[Row]> {
        match self.rows.get(table) {
            Some(rows) => Ok(rows.as_slice()),
            None if self.tables.contains_key(table) => Ok(&[][..]),
            None => Err(undefined_table(table)),
        }
    }
}

fn undefined_table(table: &str) -> DashError {
    DashError::store(
        CODE_UNDEFINED_TABLE,
        format!("relation \"public.{}\" does not exist", table),
    )
}

/// Store keeping everything in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given definitions
    pub fn from_definitions(definitions: impl IntoIterator<Item = Definition>) -> Self {
        Self {
            inner: RwLock::new(Inner::with_definitions(definitions)),
        }
    }

    /// Load definitions and seed rows from a directory tree
    pub fn load_dir(dir: &Path) -> DashResult<Self> {
        if !dir.is_dir() {
            return Err(DashError::FileRead {
                path: dir.to_path_buf(),
                message: "not a directory".to_string(),
            });
        }

        let mut definitions = Vec::new();
        let mut seeds = Vec::new();

        for entry in WalkDir::new(dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            if let Some(table) = file_name.strip_suffix(ROWS_SUFFIX) {
                let json = std::fs::read_to_string(path)
                    .with_context(format!("Reading rows for '{}'", table))?;
                let rows: Vec<Row> = serde_json::from_str(&json)
                    .with_context(format!("Parsing {}", path.display()))?;
                seeds.push((table.to_string(), rows));
            } else if DEFINITION_SUFFIXES.iter().any(|s| file_name.ends_with(s)) {
                definitions.push(load_definition(path)?);
            } else {
                tracing::debug!(path = %path.display(), "Skipping file");
            }
        }

        tracing::info!(
            dir = %dir.display(),
            definitions = definitions.len(),
            seeded_tables = seeds.len(),
            "Loaded definitions directory"
        );

        let mut inner = Inner::with_definitions(definitions);
        inner.rows.extend(seeds);
        Ok(Self {
            inner: RwLock::new(inner),
        })
    }

    /// Replace the rows of a table, creating it if needed
    pub async fn seed_rows(&self, table: impl Into<String>, rows: Vec<Row>) {
        self.inner.write().await.rows.insert(table.into(), rows);
    }

    /// Number of rows stored for a table
    pub async fn row_count(&self, table: &str) -> usize {
        self.inner.read().await.rows.get(table).map_or(0, Vec::len)
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn list_tables(&self) -> DashResult<Vec<String>> {
        Ok(self.inner.read().await.tables.keys().cloned().collect())
    }

    async fn table_definition(&self, table: &str) -> DashResult<Option<TableDefinition>> {
        Ok(self.inner.read().await.tables.get(table).cloned())
    }

    async fn save_table_definition(&self, definition: &TableDefinition) -> DashResult<()> {
        self.inner
            .write()
            .await
            .tables
            .insert(definition.table_name.clone(), definition.clone());
        Ok(())
    }

    async fn form_definition(&self, form: &str) -> DashResult<Option<FormDefinition>> {
        Ok(self.inner.read().await.forms.get(form).cloned())
    }

    async fn save_form_definition(&self, definition: &FormDefinition) -> DashResult<()> {
        self.inner
            .write()
            .await
            .forms
            .insert(definition.form_name.clone(), definition.clone());
        Ok(())
    }

    async fn sample_row(&self, table: &str) -> DashResult<Option<Row>> {
        let inner = self.inner.read().await;
        Ok(inner.rows_of(table)?.first().cloned())
    }

    async fn query(&self, table: &str, params: &QueryParams) -> DashResult<Page> {
        let inner = self.inner.read().await;
        let rows = inner.rows_of(table)?;

        let mut sorted: Vec<&Row> = rows.iter().collect();
        if !params.order_by.is_empty() {
            sorted.sort_by(|a, b| compare_rows(a, b, &params.order_by));
        }

        let page = sorted
            .into_iter()
            .skip(params.offset)
            .take(params.limit)
            .cloned()
            .collect();

        Ok(Page::new(page, rows.len()))
    }

    async fn insert(&self, table: &str, mut row: Row) -> DashResult<Row> {
        let mut inner = self.inner.write().await;
        if !inner.tables.contains_key(table) && !inner.rows.contains_key(table) {
            return Err(undefined_table(table));
        }

        let now = chrono::Utc::now().to_rfc3339();
        row.entry("id")
            .or_insert_with(|| Value::String(uuid::Uuid::new_v4().to_string()));
        row.entry("created_at")
            .or_insert_with(|| Value::String(now.clone()));
        row.insert("updated_at".to_string(), Value::String(now));

        inner
            .rows
            .entry(table.to_string())
            .or_default()
            .push(row.clone());

        tracing::debug!(table, "Inserted row");
        Ok(row)
    }
}

fn compare_rows(a: &Row, b: &Row, order_by: &[OrderBy]) -> Ordering {
    order_by
        .iter()
        .map(|order| {
            let ordering = compare_values(
                a.get(&order.column).unwrap_or(&Value::Null),
                b.get(&order.column).unwrap_or(&Value::Null),
            );
            if order.ascending {
                ordering
            } else {
                ordering.reverse()
            }
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Nulls first, then booleans, numbers and strings in their natural order
fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(value: &Value) -> u8 {
        match value {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) | Value::Object(_) => 4,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use schemadash_core::StoreErrorKind;
    use schemadash_schema::{ColumnMetadata, ServerSideTableState, SortSpec, TableStateOptions};
    use serde_json::json;

    fn rows(values: Value) -> Vec<Row> {
        serde_json::from_value(values).unwrap()
    }

    async fn people_store() -> MemoryStore {
        let store = MemoryStore::from_definitions([Definition::Table(
            TableDefinition::new("people").with_column(ColumnMetadata::new("name", "text")),
        )]);
        store
            .seed_rows(
                "people",
                rows(json!([
                    {"id": 1, "name": "Carol", "age": 41},
                    {"id": 2, "name": "alice", "age": null},
                    {"id": 3, "name": "Bob", "age": 29},
                    {"id": 4, "name": "Dave", "age": 29}
                ])),
            )
            .await;
        store
    }

    #[tokio::test]
    async fn test_query_pages_and_sorts() {
        let store = people_store().await;
        let options = TableStateOptions::default();
        let state = ServerSideTableState::new(&options)
            .on_sort_change(vec![SortSpec::asc("age"), SortSpec::desc("name")])
            .on_page_change(0, 3, &options);

        let page = store.query("people", &state.to_query_params(&options)).await.unwrap();
        assert_eq!(page.total_rows, 4);
        let ids: Vec<&Value> = page.rows.iter().map(|r| &r["id"]).collect();
        assert_eq!(ids, vec![&json!(2), &json!(4), &json!(3)]);

        let second = state.on_page_change(1, 3, &options);
        let page = store.query("people", &second.to_query_params(&options)).await.unwrap();
        assert_eq!(page.rows.len(), 1);
        assert_eq!(page.rows[0]["id"], json!(1));
    }

    #[tokio::test]
    async fn test_unknown_table_is_undefined_relation() {
        let store = MemoryStore::new();
        let err = store
            .query("ghosts", &QueryParams {
                offset: 0,
                limit: 10,
                order_by: vec![],
            })
            .await
            .unwrap_err();
        assert_eq!(err.store_kind(), Some(StoreErrorKind::NotFound));
        assert!(store.sample_row("ghosts").await.is_err());
    }

    #[tokio::test]
    async fn test_defined_table_without_rows_is_empty() {
        let store = MemoryStore::from_definitions([Definition::Table(
            TableDefinition::new("notes").with_column(ColumnMetadata::new("body", "text")),
        )]);
        assert_eq!(store.sample_row("notes").await.unwrap(), None);
        let page = store
            .query("notes", &ServerSideTableState::default().to_query_params(&TableStateOptions::default()))
            .await
            .unwrap();
        assert_eq!(page, Page::default());
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_timestamps() {
        let store = people_store().await;
        let mut row = Row::new();
        row.insert("name".into(), json!("Eve"));

        let stored = store.insert("people", row).await.unwrap();
        assert!(stored["id"].is_string());
        assert!(stored.contains_key("created_at"));
        assert!(stored.contains_key("updated_at"));
        assert_eq!(store.row_count("people").await, 5);

        assert!(store.insert("nowhere", Row::new()).await.is_err());
    }

    #[tokio::test]
    async fn test_definitions_round_trip() {
        let store = MemoryStore::new();
        let table = TableDefinition::new("tags").with_column(ColumnMetadata::new("label", "text"));
        store.save_table_definition(&table).await.unwrap();
        assert_eq!(store.list_tables().await.unwrap(), vec!["tags"]);
        assert_eq!(store.table_definition("tags").await.unwrap(), Some(table));
        assert_eq!(store.form_definition("tags").await.unwrap(), None);
    }

    #[test]
    fn test_load_dir() {
        let dir = tempfile::tempdir().unwrap();
        let definition = Definition::Table(
            TableDefinition::new("orders").with_column(ColumnMetadata::new("total", "numeric")),
        );
        schemadash_schema::save_definition(
            &definition,
            &dir.path().join("tables").join("orders.table.json"),
        )
        .unwrap();
        std::fs::write(
            dir.path().join("orders.rows.json"),
            r#"[{"id": 1, "total": 9.5}]"#,
        )
        .unwrap();

        let store = MemoryStore::load_dir(dir.path()).unwrap();
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        runtime.block_on(async {
            assert_eq!(store.list_tables().await.unwrap(), vec!["orders"]);
            assert_eq!(store.row_count("orders").await, 1);
        });
    }

    #[test]
    fn test_load_dir_rejects_missing_directory() {
        let err = MemoryStore::load_dir(Path::new("/no/such/definitions")).unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn test_compare_values_orders_nulls_first() {
        assert_eq!(compare_values(&Value::Null, &json!(1)), Ordering::Less);
        assert_eq!(compare_values(&json!(2), &json!(10)), Ordering::Less);
        assert_eq!(compare_values(&json!("b"), &json!("a")), Ordering::Greater);
    }
}
