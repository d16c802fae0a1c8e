//! Command implementations

use crate::cli::{Cli, Commands};
use crate::config::DashConfig;
use colored::Colorize;
use schemadash_core::{DashError, ErrorContext, ErrorReporter, classify};
use schemadash_schema::{
    ACTIONS_COLUMN, FormInput, FormValidator, SELECT_COLUMN, SortSpec, TableConfig, UiSchema,
    default_ui_schema, expand, format_cell, infer_columns,
};
use schemadash_store::{DataStore, FormService, MemoryStore, Page, TableService, TableView};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Failures the CLI turns into a non-zero exit
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0} error(s) reported")]
    Reported(usize),

    #[error("submission failed validation on {0} field(s)")]
    InvalidSubmission(usize),

    #[error("sample file holds no row object")]
    NoSampleRow,
}

// ============================================================================
// ConsoleReporter
// ============================================================================

/// Reporter that prints classified messages to stderr and counts them
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    count: AtomicUsize,
}

impl ConsoleReporter {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    fn check(&self) -> Result<(), CliError> {
        match self.count() {
            0 => Ok(()),
            n => Err(CliError::Reported(n)),
        }
    }
}

impl ErrorReporter for ConsoleReporter {
    fn report(&self, error: &DashError, ctx: &ErrorContext) {
        self.count.fetch_add(1, Ordering::Relaxed);
        let message = classify(error, ctx);
        eprintln!("{} {}", message.title.red().bold(), message.description);
        tracing::debug!(context = %ctx.context, "{}", error);
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// Run one parsed command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = DashConfig::discover(cli.config.as_deref())?;
    if let Some(dir) = cli.definitions {
        config.store.definitions_dir = dir;
    }

    // Inference reads a local file and needs no store
    if let Commands::Infer { file, json } = &cli.command {
        return infer(file, *json);
    }

    let store: Arc<dyn DataStore> = Arc::new(MemoryStore::load_dir(&config.store.definitions_dir)?);
    let reporter = Arc::new(ConsoleReporter::default());

    match cli.command {
        Commands::Tables => tables(store.as_ref()).await?,
        Commands::Table { name } => {
            let service = table_service(&config, store, reporter.clone());
            let table = service.load_config(&name).await;
            reporter.check()?;
            print_json(&table)?;
        }
        Commands::Form { name, ui_schema } => {
            let service = FormService::new(store, reporter.clone());
            let form = service.load_form(&name).await;
            reporter.check()?;
            if let Some(form) = form {
                let schema = match ui_schema {
                    Some(path) => read_json::<UiSchema>(&path)?,
                    None => default_ui_schema(&form.fields),
                };
                print_json(&expand(&form.fields, &schema))?;
            }
        }
        Commands::Validate { form, input } => {
            let service = FormService::new(store, reporter.clone());
            let form = service.load_form(&form).await;
            reporter.check()?;
            if let Some(form) = form {
                let input: FormInput = read_json(&input)?;
                validate(&form.fields, &input, reporter.as_ref())?;
            }
        }
        Commands::Query {
            table,
            page,
            size,
            sort,
            json,
        } => {
            let service = table_service(&config, store, reporter.clone());
            query(&service, &table, page, size, sort, json).await?;
            reporter.check()?;
        }
        Commands::Infer { .. } => {}
    }

    Ok(())
}

fn table_service(
    config: &DashConfig,
    store: Arc<dyn DataStore>,
    reporter: Arc<ConsoleReporter>,
) -> TableService {
    TableService::new(store, reporter)
        .with_state_options(config.table_state_options())
        .with_inference(config.inference.enabled)
}

// ============================================================================
// Commands
// ============================================================================

async fn tables(store: &dyn DataStore) -> anyhow::Result<()> {
    let names = store.list_tables().await?;
    if names.is_empty() {
        println!("{}", "No table definitions found".yellow());
        return Ok(());
    }
    for name in names {
        let columns = store
            .table_definition(&name)
            .await?
            .map_or(0, |definition| definition.columns.len());
        println!("{}  {}", name.bold(), format!("{} columns", columns).dimmed());
    }
    Ok(())
}

fn validate(
    fields: &[schemadash_schema::FieldDefinition],
    input: &FormInput,
    reporter: &ConsoleReporter,
) -> anyhow::Result<()> {
    let validator = FormValidator::build(fields, reporter);
    let outcome = validator.validate(input);

    if outcome.valid {
        println!("{}", "Submission is valid".green().bold());
        print_json(&outcome.data)?;
        return Ok(());
    }

    for (field, errors) in &outcome.errors_by_field {
        for error in errors {
            println!("{} {}", format!("{}:", field).red().bold(), error);
        }
    }
    Err(CliError::InvalidSubmission(outcome.errors_by_field.len()).into())
}

async fn query(
    service: &TableService,
    table: &str,
    page: usize,
    size: Option<usize>,
    sort: Vec<SortSpec>,
    json: bool,
) -> anyhow::Result<()> {
    let mut view = TableView::new(table, service.state_options().clone());
    if !sort.is_empty() {
        view.set_sorting(sort);
    }
    let page_size = size.unwrap_or(view.state().page_size);
    view.set_page(page, page_size);

    if !view.load(service).await {
        return Ok(());
    }

    if json {
        return print_json(&Page::new(view.rows().to_vec(), view.total_rows()));
    }

    let config = service.load_config(table).await;
    print_rows(&config, &view);
    println!(
        "{}",
        format!(
            "Page {} of {} ({} rows)",
            view.state().page_index.saturating_add(1),
            view.page_count().max(1),
            view.total_rows()
        )
        .dimmed()
    );
    Ok(())
}

fn print_rows(config: &TableConfig, view: &TableView) {
    let columns: Vec<_> = config
        .columns
        .iter()
        .filter(|c| c.id != SELECT_COLUMN && c.id != ACTIONS_COLUMN)
        .collect();

    if columns.is_empty() {
        for row in view.rows() {
            println!("{}", serde_json::Value::Object(row.clone()));
        }
        return;
    }

    let header: Vec<String> = columns.iter().map(|c| c.display_title()).collect();
    println!("{}", header.join(" | ").bold());
    for row in view.rows() {
        let cells: Vec<String> = columns.iter().map(|c| format_cell(c, row)).collect();
        println!("{}", cells.join(" | "));
    }
}

fn infer(file: &Path, json: bool) -> anyhow::Result<()> {
    let value: serde_json::Value = read_json(file)?;
    let row = match &value {
        serde_json::Value::Array(rows) => rows.first().and_then(|r| r.as_object()),
        other => other.as_object(),
    }
    .ok_or(CliError::NoSampleRow)?;

    let table = file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("sample");
    let columns = infer_columns(table, Some(row));

    if json {
        return print_json(&columns);
    }
    for column in &columns {
        println!(
            "{}  {}  {}",
            column.name.bold(),
            column.data_type,
            column.ui_kind().display_name().cyan()
        );
    }
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let json = std::fs::read_to_string(path).map_err(|e| DashError::FileRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(serde_json::from_str(&json).map_err(DashError::from)?)
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
