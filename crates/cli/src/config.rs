//! `schemadash.toml` configuration
//!
//! Every section is optional:
//!
//! ```toml
//! [store]
//! definitions_dir = "definitions"
//!
//! [table]
//! default_page_size = 10
//! max_page_size = 100
//! [table.column_aliases]
//! name = "first_name"
//!
//! [inference]
//! enabled = true
//! ```

use indexmap::IndexMap;
use schemadash_core::{DashError, DashResult, Validatable};
use schemadash_schema::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, TableStateOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File looked up in the working directory when no `--config` is given
pub const CONFIG_FILE_NAME: &str = "schemadash.toml";

/// Top-level CLI configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    pub store: StoreSection,
    pub table: TableSection,
    pub inference: InferenceSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// Directory of `*.table.json`, `*.form.json` and `*.rows.json` files
    pub definitions_dir: PathBuf,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            definitions_dir: PathBuf::from("definitions"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSection {
    pub default_page_size: usize,
    pub max_page_size: usize,
    pub column_aliases: IndexMap<String, String>,
}

impl Default for TableSection {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
            column_aliases: IndexMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceSection {
    /// Infer columns from a sampled row when a table has no definition
    pub enabled: bool,
}

impl DashConfig {
    /// Parse and validate a TOML document
    pub fn from_toml(toml: &str) -> DashResult<Self> {
        let config: DashConfig = toml::from_str(toml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file; relative paths inside it resolve against the
    /// file's directory
    pub fn load(path: &Path) -> DashResult<Self> {
        let toml = std::fs::read_to_string(path).map_err(|e| DashError::FileRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let mut config = Self::from_toml(&toml)?;

        if config.store.definitions_dir.is_relative() {
            if let Some(base) = path.parent() {
                config.store.definitions_dir = base.join(&config.store.definitions_dir);
            }
        }

        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load `path` if given, else `schemadash.toml` when present, else defaults
    pub fn discover(path: Option<&Path>) -> DashResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(CONFIG_FILE_NAME);
                if default.is_file() {
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Paging options for table views
    pub fn table_state_options(&self) -> TableStateOptions {
        TableStateOptions {
            default_page_size: self.table.default_page_size,
            max_page_size: self.table.max_page_size,
            column_aliases: self.table.column_aliases.clone(),
        }
    }
}

impl Validatable for DashConfig {
    fn validate(&self) -> DashResult<()> {
        self.table_state_options().validate()
    }
}
