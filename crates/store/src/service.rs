//! Table and form services
//!
//! The services sit between the UI layer and a [`DataStore`]. They never
//! return errors: store and configuration failures go to the
//! [`ErrorReporter`] and the caller gets an empty config, `None`, or a failed
//! submission state.

use crate::store::{DataStore, Page};
use schemadash_core::{DashError, ErrorContext, ErrorReporter};
use schemadash_schema::{
    FormDefinition, FormInput, FormValidationState, FormValidator, ServerSideTableState,
    TableConfig, TableConfigGenerator, TableDefinition, TableOptions, TableStateOptions,
    infer_columns,
};
use std::sync::Arc;

// ============================================================================
// TableService
// ============================================================================

/// Loads table configs and pages of rows
#[derive(Clone)]
pub struct TableService {
    store: Arc<dyn DataStore>,
    reporter: Arc<dyn ErrorReporter>,
    generator: TableConfigGenerator,
    state_options: TableStateOptions,
    inference: bool,
}

impl TableService {
    pub fn new(store: Arc<dyn DataStore>, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self {
            generator: TableConfigGenerator::new(reporter.clone()),
            store,
            reporter,
            state_options: TableStateOptions::default(),
            inference: false,
        }
    }

    /// Set page size limits and column aliases
    pub fn with_state_options(mut self, options: TableStateOptions) -> Self {
        self.state_options = options;
        self
    }

    /// Infer columns from a sampled row when a table has no definition
    pub fn with_inference(mut self, enabled: bool) -> Self {
        self.inference = enabled;
        self
    }

    pub fn state_options(&self) -> &TableStateOptions {
        &self.state_options
    }

    /// Table config for `table`, empty when nothing usable is stored
    pub async fn load_config(&self, table: &str) -> TableConfig {
        let definition = match self.store.table_definition(table).await {
            Ok(Some(definition)) => definition,
            Ok(None) if self.inference => match self.infer_definition(table).await {
                Some(definition) => definition,
                None => return TableConfig::empty(table, ""),
            },
            Ok(None) => {
                self.report(
                    &DashError::TableNotFound(table.to_string()),
                    format!("fetching table definition for {}", table),
                    format!("No definition is stored for table {}.", table),
                );
                return TableConfig::empty(table, "");
            }
            Err(err) => {
                self.report(
                    &err,
                    format!("fetching table definition for {}", table),
                    format!("Failed to load table definition for {}.", table),
                );
                return TableConfig::empty(table, "");
            }
        };

        let mut config = self.generator.generate(
            &definition.table_name,
            &definition.description,
            &definition.columns,
            &definition.options,
        );
        config.resolve_filter_options();
        config
    }

    async fn infer_definition(&self, table: &str) -> Option<TableDefinition> {
        match self.store.sample_row(table).await {
            Ok(sample) => {
                let columns = infer_columns(table, sample.as_ref());
                Some(TableDefinition::with_columns(table, columns).with_options(TableOptions::default()))
            }
            Err(err) => {
                self.report(
                    &err,
                    format!("inferring columns for {}", table),
                    format!("Failed to inspect table {}.", table),
                );
                None
            }
        }
    }

    /// One page of rows for the given state
    pub async fn fetch_page(&self, table: &str, state: &ServerSideTableState) -> Option<Page> {
        let params = state.to_query_params(&self.state_options);
        tracing::debug!(
            table,
            offset = params.offset,
            limit = params.limit,
            "Fetching page"
        );

        match self.store.query(table, &params).await {
            Ok(page) => Some(page),
            Err(err) => {
                self.report(
                    &err,
                    format!("fetching data for {}", table),
                    format!("Failed to load rows of {}.", table),
                );
                None
            }
        }
    }

    fn report(&self, error: &DashError, context: String, fallback: String) {
        self.reporter.report(error, &ErrorContext::new(context, fallback));
    }
}

// ============================================================================
// FormService
// ============================================================================

/// Loads form definitions and stores submissions
#[derive(Clone)]
pub struct FormService {
    store: Arc<dyn DataStore>,
    reporter: Arc<dyn ErrorReporter>,
}

impl FormService {
    pub fn new(store: Arc<dyn DataStore>, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self { store, reporter }
    }

    /// Stored form definition, generated from the table definition and saved
    /// on first use
    pub async fn load_form(&self, form: &str) -> Option<FormDefinition> {
        match self.get_or_generate(form).await {
            Ok(definition) => Some(definition),
            Err(err) => {
                self.reporter.report(
                    &err,
                    &ErrorContext::new(
                        format!("loading form {}", form),
                        format!("Failed to load form {}.", form),
                    ),
                );
                None
            }
        }
    }

    async fn get_or_generate(&self, form: &str) -> Result<FormDefinition, DashError> {
        if let Some(definition) = self.store.form_definition(form).await? {
            return Ok(definition);
        }

        let table = self
            .store
            .table_definition(form)
            .await?
            .ok_or_else(|| DashError::FormNotFound(form.to_string()))?;

        let definition = FormDefinition::from_columns(form, &table.columns)?;
        self.store.save_form_definition(&definition).await?;
        tracing::info!(form, fields = definition.fields.len(), "Generated form definition");
        Ok(definition)
    }

    /// Validate a submission and insert it into the form's table.
    ///
    /// Field errors are returned in the state and never reported.
    pub async fn submit(&self, form: &FormDefinition, input: &FormInput) -> FormValidationState {
        let validator = FormValidator::build(&form.fields, self.reporter.as_ref());
        let outcome = validator.validate(input);
        if !outcome.valid {
            return FormValidationState::invalid(outcome.errors_by_field);
        }

        match self.store.insert(&form.form_name, outcome.data).await {
            Ok(row) => FormValidationState::submitted(row),
            Err(err) => {
                self.reporter.report(
                    &err,
                    &ErrorContext::new(
                        "form submission",
                        "An error occurred while processing your form.",
                    ),
                );
                FormValidationState::failed()
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::store::Row;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use schemadash_core::{CollectingReporter, DashResult, FieldType, Rule};
    use schemadash_schema::{
        ColumnMetadata, Definition, FieldDefinition, QueryParams, validation::MSG_SUBMIT_FAILED,
    };
    use serde_json::json;

    /// Store whose every call fails with the same backend code
    struct FailingStore(&'static str);

    impl FailingStore {
        fn error(&self) -> DashError {
            DashError::store(self.0, "backend unavailable")
        }
    }

    #[async_trait]
    impl DataStore for FailingStore {
        async fn list_tables(&self) -> DashResult<Vec<String>> {
            Err(self.error())
        }
        async fn table_definition(&self, _: &str) -> DashResult<Option<TableDefinition>> {
            Err(self.error())
        }
        async fn save_table_definition(&self, _: &TableDefinition) -> DashResult<()> {
            Err(self.error())
        }
        async fn form_definition(&self, _: &str) -> DashResult<Option<FormDefinition>> {
            Err(self.error())
        }
        async fn save_form_definition(&self, _: &FormDefinition) -> DashResult<()> {
            Err(self.error())
        }
        async fn sample_row(&self, _: &str) -> DashResult<Option<Row>> {
            Err(self.error())
        }
        async fn query(&self, _: &str, _: &QueryParams) -> DashResult<Page> {
            Err(self.error())
        }
        async fn insert(&self, _: &str, _: Row) -> DashResult<Row> {
            Err(self.error())
        }
    }

    fn orders() -> TableDefinition {
        TableDefinition::new("orders")
            .with_column(ColumnMetadata::new("id", "uuid"))
            .with_column(ColumnMetadata::enumeration("status", ["new", "shipped"]))
            .with_column(ColumnMetadata::new("total", "numeric"))
    }

    fn input(value: serde_json::Value) -> FormInput {
        serde_json::from_value(value).unwrap()
    }

    // ========================================================================
    // TableService
    // ========================================================================

    #[tokio::test]
    async fn test_load_config_from_definition() {
        let store = Arc::new(MemoryStore::from_definitions([Definition::from(orders())]));
        let reporter = Arc::new(CollectingReporter::new());
        let service = TableService::new(store, reporter.clone());

        let config = service.load_config("orders").await;
        assert_eq!(
            config.column_ids(),
            vec!["select", "id", "status", "total", "actions"]
        );
        let status = &config.filters[0];
        assert_eq!(status.column, "status");
        assert_eq!(status.options.as_ref().map(Vec::len), Some(2));
        assert!(reporter.is_empty());
    }

    #[tokio::test]
    async fn test_load_config_store_error_is_reported() {
        let reporter = Arc::new(CollectingReporter::new());
        let service = TableService::new(Arc::new(FailingStore("42P01")), reporter.clone());

        let config = service.load_config("orders").await;
        assert!(config.is_empty());
        assert!(config.filters.is_empty());

        let reports = reporter.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].message.title, "Database Error");
        assert_eq!(
            reports[0].context.context,
            "fetching table definition for orders"
        );
    }

    #[tokio::test]
    async fn test_load_config_missing_definition_without_inference() {
        let reporter = Arc::new(CollectingReporter::new());
        let service = TableService::new(Arc::new(MemoryStore::new()), reporter.clone());

        assert!(service.load_config("ghosts").await.is_empty());
        assert_eq!(reporter.reports()[0].error, "Table not found: ghosts");
    }

    #[tokio::test]
    async fn test_load_config_with_inference() {
        let store = Arc::new(MemoryStore::new());
        store
            .seed_rows(
                "events",
                vec![input(json!({"id": 1, "active": true, "payload": {"k": 1}}))],
            )
            .await;
        let reporter = Arc::new(CollectingReporter::new());
        let service = TableService::new(store, reporter.clone()).with_inference(true);

        let config = service.load_config("events").await;
        assert_eq!(
            config.column_ids(),
            vec!["select", "id", "active", "payload", "actions"]
        );
        assert!(reporter.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_page_reports_and_returns_none() {
        let reporter = Arc::new(CollectingReporter::new());
        let service = TableService::new(Arc::new(FailingStore("PGRST301")), reporter.clone());

        let page = service
            .fetch_page("orders", &ServerSideTableState::default())
            .await;
        assert_eq!(page, None);
        assert_eq!(reporter.reports()[0].message.title, "Connection Error");
    }

    #[tokio::test]
    async fn test_fetch_page_clamps_through_options() {
        let store = Arc::new(MemoryStore::from_definitions([Definition::from(orders())]));
        let rows = (0..30).map(|i| input(json!({"id": i}))).collect();
        store.seed_rows("orders", rows).await;

        let options = TableStateOptions::default().with_page_sizes(10, 20);
        let service = TableService::new(store, Arc::new(CollectingReporter::new()))
            .with_state_options(options.clone());
        let state = ServerSideTableState::new(&options).on_page_change(0, 500, &options);

        let page = service.fetch_page("orders", &state).await.unwrap();
        assert_eq!(page.rows.len(), 20);
        assert_eq!(page.total_rows, 30);
    }

    // ========================================================================
    // FormService
    // ========================================================================

    #[tokio::test]
    async fn test_load_form_generates_and_saves() {
        let store = Arc::new(MemoryStore::from_definitions([Definition::from(orders())]));
        let service = FormService::new(store.clone(), Arc::new(CollectingReporter::new()));

        let form = service.load_form("orders").await.unwrap();
        let names: Vec<&str> = form.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["status", "total"]);
        assert_eq!(store.form_definition("orders").await.unwrap(), Some(form));
    }

    #[tokio::test]
    async fn test_load_form_unknown_is_reported() {
        let reporter = Arc::new(CollectingReporter::new());
        let service = FormService::new(Arc::new(MemoryStore::new()), reporter.clone());

        assert_eq!(service.load_form("nothing").await, None);
        assert_eq!(reporter.reports()[0].error, "Form not found: nothing");
    }

    fn contact_form() -> FormDefinition {
        FormDefinition::new("contacts")
            .with_field(FieldDefinition::new("email", "Email", FieldType::Email).required())
            .with_field(
                FieldDefinition::new("age", "Age", FieldType::Number).with_rule(Rule::min(18.0)),
            )
    }

    #[tokio::test]
    async fn test_submit_invalid_is_not_reported() {
        let reporter = Arc::new(CollectingReporter::new());
        let service = FormService::new(Arc::new(FailingStore("23505")), reporter.clone());

        let state = service
            .submit(&contact_form(), &input(json!({"email": "nope", "age": "12"})))
            .await;
        assert!(!state.success);
        assert_eq!(state.errors_by_field.len(), 2);
        assert!(reporter.is_empty());
    }

    #[tokio::test]
    async fn test_submit_store_failure_is_reported() {
        let reporter = Arc::new(CollectingReporter::new());
        let service = FormService::new(Arc::new(FailingStore("23505")), reporter.clone());

        let state = service
            .submit(&contact_form(), &input(json!({"email": "a@b.co", "age": "30"})))
            .await;
        assert_eq!(state.message, MSG_SUBMIT_FAILED);
        assert!(state.errors_by_field.is_empty());

        let reports = reporter.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].message.description, "backend unavailable");
    }

    #[tokio::test]
    async fn test_submit_stores_coerced_row() {
        let store = Arc::new(MemoryStore::new());
        store.seed_rows("contacts", Vec::new()).await;
        let service = FormService::new(store.clone(), Arc::new(CollectingReporter::new()));

        let state = service
            .submit(&contact_form(), &input(json!({"email": "a@b.co", "age": "30"})))
            .await;
        assert!(state.success);
        let data = state.data.unwrap();
        assert_eq!(data["age"], json!(30.0));
        assert!(data.contains_key("id"));
        assert_eq!(store.row_count("contacts").await, 1);
    }
}
