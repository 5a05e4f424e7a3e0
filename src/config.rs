//! Application configuration
//!
//! The recording session consumes an application's name, language and
//! resource map through the [`ConfigReader`] collaborator. The file-backed
//! reader loads `app.json`, `app.yaml` or `app.yml` from the application
//! directory.

use crate::error::{Error, Result};
use crate::types::{Language, StringMap};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File names tried in an application directory, in order
pub const CONFIG_FILE_NAMES: [&str; 3] = ["app.json", "app.yaml", "app.yml"];

// ============================================================================
// App Config
// ============================================================================

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application name
    #[serde(default)]
    pub name: String,

    /// Target environment, if any
    #[serde(default)]
    pub environment: String,

    /// Pipeline name; defaults to `pipeline-<name>`
    #[serde(default)]
    pub pipeline: String,

    /// Logical resource name to fixture path, relative to the application
    #[serde(default)]
    pub resources: StringMap,

    /// Declared application language
    #[serde(default)]
    pub language: String,
}

impl AppConfig {
    /// Check required fields and the declared language
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::config(
                "application name is required to be specified in the app config",
            ));
        }
        self.language()?;
        Ok(())
    }

    /// Parsed application language
    pub fn language(&self) -> Result<Language> {
        self.language.parse()
    }

    /// Pipeline name, falling back to `pipeline-<name>`
    pub fn pipeline_name(&self) -> String {
        if self.pipeline.is_empty() {
            format!("pipeline-{}", self.name)
        } else {
            self.pipeline.clone()
        }
    }

    /// Fixture path for a logical resource, resolved against `app_path`
    pub fn resource_path(&self, app_path: &Path, resource: &str) -> Option<PathBuf> {
        self.resources.get(resource).map(|rel| app_path.join(rel))
    }

    fn finalize(mut self, app_name: Option<&str>) -> Result<Self> {
        if let Some(name) = app_name.filter(|n| !n.is_empty()) {
            self.name = name.to_string();
        }
        self.validate()?;
        self.pipeline = self.pipeline_name();
        Ok(self)
    }
}

// ============================================================================
// Config Reader
// ============================================================================

/// Yields an application's configuration given its path
pub trait ConfigReader: Send + Sync {
    /// Read and validate the configuration
    ///
    /// A non-empty `app_name` overrides the name found in the file.
    fn read_config(&self, app_name: Option<&str>, app_path: &Path) -> Result<AppConfig>;
}

/// Reads `app.json` / `app.yaml` / `app.yml` from disk
#[derive(Debug, Clone, Copy, Default)]
pub struct FileConfigReader;

impl FileConfigReader {
    /// Create a file config reader
    pub fn new() -> Self {
        Self
    }

    /// Locate the config file for an application path
    ///
    /// `app_path` may point at the file itself or at its directory.
    pub fn locate(app_path: &Path) -> Result<PathBuf> {
        if app_path.is_file() {
            return Ok(app_path.to_path_buf());
        }
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| app_path.join(name))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| Error::FileNotFound {
                path: app_path.join(CONFIG_FILE_NAMES[0]).display().to_string(),
            })
    }
}

impl ConfigReader for FileConfigReader {
    fn read_config(&self, app_name: Option<&str>, app_path: &Path) -> Result<AppConfig> {
        let path = Self::locate(app_path)?;
        let content = fs::read_to_string(&path)?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == "yaml" || ext == "yml");
        let config: AppConfig = if is_yaml {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };

        config.finalize(app_name)
    }
}
