//! # SchemaDash Core
//!
//! Core types, traits, and error handling for SchemaDash.
//!
//! This crate provides the foundational building blocks used by the
//! schema, store and CLI crates:
//!
//! - **Types**: UI kinds, field and widget types, layouts, validation rules
//! - **Traits**: `Validatable` and `Persistable`
//! - **Errors**: `DashError` / `DashResult` and the `ErrorReporter` sink
//!

pub mod error;
pub mod report;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{DashError, DashResult, ResultExt, StoreErrorKind};
pub use report::{
    CollectingReporter, ErrorContext, ErrorReporter, NoopReporter, Report, TracingReporter,
    UserMessage, classify,
};
pub use traits::{Persistable, Validatable};
pub use types::{
    FieldType, Layout, Rule, SelectOption, UiKind, WidgetType, capitalize, format_bound,
    to_title_case,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
