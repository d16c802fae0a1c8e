//! Command-line arguments

use clap::{Parser, Subcommand};
use schemadash_schema::SortSpec;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "schemadash",
    version,
    about = "Inspect schema-driven table and form configurations"
)]
pub struct Cli {
    /// Configuration file (defaults to ./schemadash.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Definitions directory, overrides the configured one
    #[arg(short, long, global = true, env = "SCHEMADASH_DEFINITIONS")]
    pub definitions: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List tables with a stored definition
    Tables,

    /// Print the generated table configuration
    Table {
        /// Table name
        name: String,
    },

    /// Print the render tree of a form
    Form {
        /// Form name, usually the table it writes to
        name: String,

        /// UI schema JSON file; a default layout is derived when omitted
        #[arg(long)]
        ui_schema: Option<PathBuf>,
    },

    /// Validate a submission against a form's fields
    Validate {
        /// Form name
        form: String,

        /// JSON object with the submitted values
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Print one page of a table
    Query {
        /// Table name
        table: String,

        /// Zero-based page index
        #[arg(short, long, default_value_t = 0)]
        page: usize,

        /// Page size, clamped to the configured maximum
        #[arg(short, long)]
        size: Option<usize>,

        /// Sort key as `column` or `column:desc`; repeatable
        #[arg(long, value_parser = parse_sort)]
        sort: Vec<SortSpec>,

        /// Print the raw page as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Infer column metadata from a sample row
    Infer {
        /// JSON file holding a row object or an array of rows
        file: PathBuf,

        /// Print the columns as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

/// Parse `column`, `column:asc` or `column:desc`
pub fn parse_sort(value: &str) -> Result<SortSpec, String> {
    let (column, direction) = match value.split_once(':') {
        Some((column, direction)) => (column, direction),
        None => (value, "asc"),
    };
    if column.trim().is_empty() {
        return Err(format!("missing column in sort key '{}'", value));
    }
    match direction.to_ascii_lowercase().as_str() {
        "asc" => Ok(SortSpec::asc(column.trim())),
        "desc" => Ok(SortSpec::desc(column.trim())),
        other => Err(format!("unknown sort direction '{}'", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_query() {
        let cli = Cli::parse_from([
            "schemadash", "query", "orders", "--page", "2", "--size", "25", "--sort", "total:desc",
            "--sort", "id",
        ]);
        match cli.command {
            Commands::Query {
                table,
                page,
                size,
                sort,
                json,
            } => {
                assert_eq!(table, "orders");
                assert_eq!(page, 2);
                assert_eq!(size, Some(25));
                assert_eq!(sort, vec![SortSpec::desc("total"), SortSpec::asc("id")]);
                assert!(!json);
            }
            other => panic!("Expected query subcommand, got {:?}", other),
        }
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::parse_from(["schemadash", "tables", "--definitions", "defs", "-v"]);
        assert_eq!(cli.definitions, Some(PathBuf::from("defs")));
        assert!(cli.verbose);
    }

    #[test]
    fn test_parse_sort_rejects_bad_keys() {
        assert!(parse_sort(":desc").is_err());
        assert!(parse_sort("name:sideways").is_err());
        assert_eq!(parse_sort("name:DESC").unwrap(), SortSpec::desc("name"));
    }
}
