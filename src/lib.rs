//! # SchemaDash
//!
//! Schema-driven table and form configuration for admin dashboards.
//!
//! Backend column metadata goes in; table configurations, form render trees,
//! submission validators and paging query parameters come out. Failures are
//! handed to an [`ErrorReporter`](schemadash_core::ErrorReporter) and callers
//! always receive a usable, possibly empty, result.
//!
//! ## Crates
//!
//! - [`core`] - kinds, validation rules, errors and error reporting
//! - [`schema`] - the configuration engine
//! - [`store`] - the data store boundary and the table/form services
//!
//! ## Example
//!
//! ```rust
//! use schemadash::prelude::*;
//! use std::sync::Arc;
//!
//! let generator = TableConfigGenerator::new(Arc::new(NoopReporter));
//! let columns = vec![
//!     ColumnMetadata::new("id", "text"),
//!     ColumnMetadata::enumeration("status", ["active", "inactive"]),
//! ];
//! let config = generator.generate("users", "All users", &columns, &TableOptions::default());
//!
//! assert_eq!(config.column_ids(), vec!["select", "id", "status", "actions"]);
//! ```

pub use schemadash_core as core;
pub use schemadash_schema as schema;
pub use schemadash_store as store;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Convenient re-exports for common usage
pub mod prelude {
    pub use schemadash_core::{CollectingReporter, NoopReporter, TracingReporter};
    pub use schemadash_schema::prelude::*;
    pub use schemadash_schema::{FormInput, QueryParams, ValidationOutcome, format_cell};
    pub use schemadash_store::{
        DataStore, FormService, MemoryStore, Page, TableService, TableView,
    };
}
