//! Error types for SchemaDash
//!
//! This module provides unified error handling across the dashboard engine:
//! configuration errors, validation errors, data store errors, IO and
//! serialization errors.

use std::path::PathBuf;
use thiserror::Error;

/// Backend code for a relation that does not exist
pub const CODE_UNDEFINED_TABLE: &str = "42P01";

/// Backend code the hosted API returns when a row is not visible to the caller
pub const CODE_ACCESS_DENIED: &str = "PGRST116";

/// Backend code for a failed upstream connection
pub const CODE_CONNECTION: &str = "PGRST301";

/// The main error type for SchemaDash
#[derive(Debug, Error)]
pub enum DashError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// A table definition carries no columns
    #[error("Table '{0}' has no columns configured")]
    EmptyColumns(String),

    /// A form definition carries no fields
    #[error("Form '{0}' has no fields configured")]
    EmptyFields(String),

    /// Two columns share an id within one table config
    #[error("Duplicate column id '{column}' in table '{table}'")]
    DuplicateColumn { table: String, column: String },

    /// A caller-supplied column uses an id the generator reserves
    #[error("Column id '{column}' is reserved in table '{table}'")]
    ReservedColumn { table: String, column: String },

    /// A validation pattern does not compile
    #[error("Invalid pattern '{pattern}' on field '{field}': {message}")]
    InvalidPattern {
        field: String,
        pattern: String,
        message: String,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // Validation Errors
    // ========================================================================
    /// General validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Field validation failed
    #[error("Field validation failed for '{field}': {message}")]
    FieldValidation { field: String, message: String },

    // ========================================================================
    // Data Store Errors
    // ========================================================================
    /// Error returned by the data store, optionally carrying a backend code
    #[error("{message}")]
    Store {
        code: Option<String>,
        message: String,
    },

    /// Table not found in the store
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// Form definition not found in the store
    #[error("Form not found: {0}")]
    FormNotFound(String),

    /// The caller may not perform the operation
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The store could not be reached
    #[error("Connection failed: {0}")]
    Connection(String),

    // ========================================================================
    // IO Errors
    // ========================================================================
    /// File IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File read error
    #[error("Failed to read file '{path}': {message}")]
    FileRead { path: PathBuf, message: String },

    /// File write error
    #[error("Failed to write file '{path}': {message}")]
    FileWrite { path: PathBuf, message: String },

    // ========================================================================
    // Serialization Errors
    // ========================================================================
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Schema version mismatch
    #[error("Schema version mismatch: expected {expected}, found {found}")]
    SchemaVersionMismatch { expected: u32, found: u32 },

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },
}

/// Classification of data store failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreErrorKind {
    NotFound,
    PermissionDenied,
    Connection,
    Other,
}

impl StoreErrorKind {
    /// Classify a backend error code
    pub fn from_code(code: &str) -> Self {
        match code {
            CODE_UNDEFINED_TABLE => StoreErrorKind::NotFound,
            CODE_ACCESS_DENIED => StoreErrorKind::PermissionDenied,
            CODE_CONNECTION => StoreErrorKind::Connection,
            _ => StoreErrorKind::Other,
        }
    }
}

impl DashError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        DashError::Validation(msg.into())
    }

    /// Create a field validation error
    pub fn field_validation(field: impl Into<String>, msg: impl Into<String>) -> Self {
        DashError::FieldValidation {
            field: field.into(),
            message: msg.into(),
        }
    }

    /// Create a store error carrying a backend code
    pub fn store(code: impl Into<String>, msg: impl Into<String>) -> Self {
        DashError::Store {
            code: Some(code.into()),
            message: msg.into(),
        }
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        DashError::Internal(msg.into())
    }

    /// Create an error with context
    pub fn with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        DashError::WithContext {
            context: context.into(),
            message: msg.into(),
        }
    }

    /// Backend code, if the store supplied one
    pub fn code(&self) -> Option<&str> {
        match self {
            DashError::Store { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Check if this error is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DashError::Validation(_) | DashError::FieldValidation { .. }
        )
    }

    /// Check if this error is a configuration error
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            DashError::EmptyColumns(_)
                | DashError::EmptyFields(_)
                | DashError::DuplicateColumn { .. }
                | DashError::ReservedColumn { .. }
                | DashError::InvalidPattern { .. }
                | DashError::InvalidConfig(_)
        )
    }

    /// Check if this error is a not-found error
    pub fn is_not_found(&self) -> bool {
        self.store_kind() == Some(StoreErrorKind::NotFound)
    }

    /// Check if this error originated in the data store
    pub fn is_store(&self) -> bool {
        self.store_kind().is_some()
    }

    /// Classify a data store error; `None` for errors raised outside the store
    pub fn store_kind(&self) -> Option<StoreErrorKind> {
        match self {
            DashError::Store { code, .. } => Some(
                code.as_deref()
                    .map(StoreErrorKind::from_code)
                    .unwrap_or(StoreErrorKind::Other),
            ),
            DashError::TableNotFound(_) | DashError::FormNotFound(_) => {
                Some(StoreErrorKind::NotFound)
            }
            DashError::PermissionDenied(_) => Some(StoreErrorKind::PermissionDenied),
            DashError::Connection(_) => Some(StoreErrorKind::Connection),
            _ => None,
        }
    }

    /// Check if this error is an IO error
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            DashError::Io(_) | DashError::FileRead { .. } | DashError::FileWrite { .. }
        )
    }
}

/// Result type alias using DashError
pub type DashResult<T> = Result<T, DashError>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context<C: Into<String>>(self, context: C) -> DashResult<T>;
}

impl<T, E: Into<DashError>> ResultExt<T> for Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> DashResult<T> {
        self.map_err(|e| {
            let err: DashError = e.into();
            DashError::WithContext {
                context: context.into(),
                message: err.to_string(),
            }
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
