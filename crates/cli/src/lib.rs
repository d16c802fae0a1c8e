//! # SchemaDash CLI
//!
//! Command-line interface for SchemaDash.
//!
//! Reads table, form and row files from a definitions directory and prints
//! what the engine derives from them.
//!
//! ## Commands
//!
//! - `tables` - List stored table definitions
//! - `table` - Print a generated table configuration
//! - `form` - Print a form's render tree
//! - `validate` - Validate a submission against a form
//! - `query` - Page through a table's rows
//! - `infer` - Infer columns from a sample row
//!

pub mod cli;
pub mod commands;
pub mod config;

pub use cli::{Cli, Commands};
pub use commands::{CliError, ConsoleReporter, run};
pub use config::{CONFIG_FILE_NAME, DashConfig};

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CLI name
pub const NAME: &str = env!("CARGO_PKG_NAME");
