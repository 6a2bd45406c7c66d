//! Page templates stored as `.html` files.
//!
//! Templates are looked up in priority order: the custom directory from
//! `CONF_TEMPLATES_DIR` first, then the builtin directory under the user's
//! data directory. A name found in a higher-priority directory shadows the
//! same name further down.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use rmcp::schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{Config, ConfigError};

const TEMPLATE_EXT: &str = "html";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Invalid template name: '{0}'")]
    InvalidName(String),

    #[error("Template I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Where a template was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TemplateSource {
    Custom,
    Builtin,
}

/// A template available for use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateInfo {
    pub name: String,
    pub path: PathBuf,
    pub source: TemplateSource,
}

/// Result of saving a template.
#[derive(Debug, Clone)]
pub struct SavedTemplate {
    pub path: PathBuf,
    pub directory: PathBuf,
}

#[derive(Debug, Clone)]
pub struct TemplateStore {
    custom_dir: Option<PathBuf>,
    builtin_dir: PathBuf,
}

impl TemplateStore {
    pub fn new(custom_dir: Option<PathBuf>, builtin_dir: impl Into<PathBuf>) -> Self {
        Self {
            custom_dir,
            builtin_dir: builtin_dir.into(),
        }
    }

    /// Builtin templates live in the platform data directory.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let dirs = directories::ProjectDirs::from("", "", "confluence-mcp")
            .ok_or(ConfigError::NoDataDir)?;
        Ok(Self::new(
            config.templates_dir.clone(),
            dirs.data_dir().join("templates"),
        ))
    }

    pub fn custom_dir(&self) -> Option<&Path> {
        self.custom_dir.as_deref()
    }

    /// Directories in lookup order.
    fn search_dirs(&self) -> Vec<(&Path, TemplateSource)> {
        let mut dirs = Vec::with_capacity(2);
        if let Some(ref custom) = self.custom_dir {
            dirs.push((custom.as_path(), TemplateSource::Custom));
        }
        dirs.push((self.builtin_dir.as_path(), TemplateSource::Builtin));
        dirs
    }

    /// List all templates, sorted by name.
    ///
    /// Unreadable directories are skipped with a warning.
    pub fn list(&self) -> Vec<TemplateInfo> {
        let mut templates = BTreeMap::new();

        for (dir, source) in self.search_dirs() {
            let entries = match std::fs::read_dir(dir) {
                Ok(entries) => entries,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => {
                    tracing::warn!("Failed to read template directory {}: {}", dir.display(), e);
                    continue;
                }
            };

            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some(TEMPLATE_EXT) {
                    continue;
                }
                let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                templates
                    .entry(name.to_string())
                    .or_insert_with(|| TemplateInfo {
                        name: name.to_string(),
                        path: path.clone(),
                        source,
                    });
            }
        }

        templates.into_values().collect()
    }

    /// Load a template's content by name.
    pub fn load(&self, name: &str) -> Result<String, TemplateError> {
        let file_name = template_file_name(name)?;

        for (dir, _) in self.search_dirs() {
            let path = dir.join(&file_name);
            match std::fs::read_to_string(&path) {
                Ok(content) => return Ok(content),
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(source) => return Err(TemplateError::Io { path, source }),
            }
        }

        Err(TemplateError::NotFound(name.to_string()))
    }

    /// Save a template into the custom directory, or the builtin one when
    /// no custom directory is configured. Existing files are overwritten.
    pub fn save(&self, name: &str, content: &str) -> Result<SavedTemplate, TemplateError> {
        let file_name = template_file_name(name)?;
        let directory = self
            .custom_dir
            .clone()
            .unwrap_or_else(|| self.builtin_dir.clone());

        std::fs::create_dir_all(&directory).map_err(|source| TemplateError::Io {
            path: directory.clone(),
            source,
        })?;

        let path = directory.join(file_name);
        std::fs::write(&path, content).map_err(|source| TemplateError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::info!("Saved template {} to {}", name, path.display());
        Ok(SavedTemplate { path, directory })
    }
}

/// Validate a template name and turn it into a file name.
fn template_file_name(name: &str) -> Result<String, TemplateError> {
    let invalid = name.trim().is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..");
    if invalid {
        return Err(TemplateError::InvalidName(name.to_string()));
    }
    Ok(format!("{}.{}", name, TEMPLATE_EXT))
}
