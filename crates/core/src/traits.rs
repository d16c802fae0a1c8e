//! Core traits for SchemaDash
//!
//! This module defines the traits that definitions and generated
//! configurations implement for consistency checks and persistence.

use crate::error::{DashError, DashResult};
use serde::{Serialize, de::DeserializeOwned};

// ============================================================================
// Validatable Trait
// ============================================================================

/// Trait for types that can check their own consistency
///
/// # Example
///
/// ```rust,ignore
/// use schemadash_core::{Validatable, DashResult, DashError};
///
/// struct Column {
///     name: String,
/// }
///
/// impl Validatable for Column {
///     fn validate(&self) -> DashResult<()> {
///         if self.name.is_empty() {
///             return Err(DashError::validation("Column name cannot be empty"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Validatable {
    /// Validate the current state of the object
    ///
    /// Returns `Ok(())` if valid, or a `DashError` describing the problem.
    fn validate(&self) -> DashResult<()>;

    /// Check if the object is valid without returning error details
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Get all validation errors (for types that can have multiple errors)
    fn validation_errors(&self) -> Vec<String> {
        match self.validate() {
            Ok(()) => vec![],
            Err(e) => vec![e.to_string()],
        }
    }
}

// ============================================================================
// Persistable Trait
// ============================================================================

/// Trait for definitions stored as JSON documents
pub trait Persistable: Serialize + DeserializeOwned + Sized {
    /// File name suffix for this type, e.g. `table.json`
    fn file_extension() -> &'static str;

    /// Save to a JSON string
    fn to_json(&self) -> DashResult<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }

    /// Load from a JSON string
    fn from_json(json: &str) -> DashResult<Self> {
        serde_json::from_str(json).map_err(Into::into)
    }

    /// Save to a file
    fn save_to_file(&self, path: &std::path::Path) -> DashResult<()> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|e| DashError::FileWrite {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load from a file
    fn load_from_file(path: &std::path::Path) -> DashResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| DashError::FileRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_json(&json)
    }
}

// ============================================================================
// Tests
// ============================================================================
