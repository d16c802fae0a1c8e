//! # SchemaDash Store
//!
//! The async boundary between the configuration engine and a hosted
//! backend: the [`DataStore`] trait, an in-memory store seeded from a
//! definitions directory, and the table and form services that route every
//! failure to an `ErrorReporter`.

pub mod memory;
pub mod service;
pub mod store;
pub mod view;

pub use memory::{DEFINITION_SUFFIXES, MemoryStore, ROWS_SUFFIX};
pub use service::{FormService, TableService};
pub use store::{DataStore, Page, Row};
pub use view::{FetchTicket, TableView};
