//! JSON configuration store.
//!
//! The configuration decides which extension goes to which folder, which
//! folders get organized, how name collisions are handled and which status
//! messages are printed while organizing.
//!
//! # Configuration File Format
//!
//! ```json
//! {
//!     "extension_to_folder": {
//!         ".pdf": "Documents/PDF",
//!         ".jpg": "Images"
//!     },
//!     "folder_paths": [
//!         "/home/user/Downloads"
//!     ],
//!     "keep_duplicates": true,
//!     "status_level": "failed"
//! }
//! ```
//!
//! Every key is required. `folder_paths` holds between 1 and [`MAX_FOLDERS`]
//! entries. The file is only changed through [`ConfigStore::update`], which
//! rewrites it entirely.

use crate::extension_map::ExtensionMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{info, warn};

/// Location of the configuration file when none is given.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.json";

/// Largest number of folders a configuration may list.
pub const MAX_FOLDERS: usize = 20;

/// Errors that can occur while loading or saving the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// A required field is missing or holds an unacceptable value.
    #[error("Invalid configuration: {0}")]
    Validation(String),
    /// The file is not well-formed JSON.
    #[error("Malformed configuration file {}: {source}", path.display())]
    Invalid {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// IO error while reading or writing the configuration.
    #[error("IO error on configuration file {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
}

/// Which status messages get printed while organizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    /// Print every message.
    All,
    /// Print successful moves only.
    Success,
    /// Print failed moves only.
    #[default]
    Failed,
}

impl StatusLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusLevel::All => "all",
            StatusLevel::Success => "success",
            StatusLevel::Failed => "failed",
        }
    }
}

impl fmt::Display for StatusLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when text does not name a [`StatusLevel`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid status '{0}'. Valid options are 'all', 'success' and 'failed'")]
pub struct ParseStatusLevelError(pub String);

impl FromStr for StatusLevel {
    type Err = ParseStatusLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(StatusLevel::All),
            "success" => Ok(StatusLevel::Success),
            "failed" => Ok(StatusLevel::Failed),
            other => Err(ParseStatusLevelError(other.to_string())),
        }
    }
}

/// The resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    pub extension_to_folder: ExtensionMap,
    pub folder_paths: Vec<PathBuf>,
    pub keep_duplicates: bool,
    pub status_level: StatusLevel,
}

/// On-disk shape, with every field optional so missing keys can be named.
#[derive(Deserialize)]
struct RawConfig {
    extension_to_folder: Option<ExtensionMap>,
    folder_paths: Option<Vec<PathBuf>>,
    keep_duplicates: Option<bool>,
    status_level: Option<StatusLevel>,
}

impl RawConfig {
    fn into_config(self) -> Result<Config, ConfigError> {
        let config = Config {
            extension_to_folder: self
                .extension_to_folder
                .ok_or_else(|| missing("extension_to_folder"))?,
            folder_paths: self.folder_paths.ok_or_else(|| missing("folder_paths"))?,
            keep_duplicates: self
                .keep_duplicates
                .ok_or_else(|| missing("keep_duplicates"))?,
            status_level: self.status_level.ok_or_else(|| missing("status_level"))?,
        };
        config.validate()?;
        Ok(config)
    }
}

fn missing(field: &str) -> ConfigError {
    ConfigError::Validation(format!("missing '{}'", field))
}

/// Partial changes for [`ConfigStore::update`]. `None` leaves a field as is.
///
/// Values arrive the way the command line provides them: extension entries as
/// `"ext folder"` strings, the duplicate policy as `"true"`/`"false"` and the
/// status level as its name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigUpdate {
    pub extension_to_folder: Option<Vec<String>>,
    pub folder_paths: Option<Vec<PathBuf>>,
    pub keep_duplicates: Option<String>,
    pub status_level: Option<String>,
}

impl Config {
    /// Checks the folder count invariant and that no extension maps to the
    /// organized folder itself.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.folder_paths.is_empty() {
            return Err(ConfigError::Validation(
                "'folder_paths' cannot be empty".to_string(),
            ));
        }
        if self.folder_paths.len() > MAX_FOLDERS {
            return Err(ConfigError::Validation(format!(
                "'folder_paths' is too large: {} folders, at most {} allowed",
                self.folder_paths.len(),
                MAX_FOLDERS
            )));
        }
        if let Some(extension) = self.extension_to_folder.root_targets().next() {
            return Err(ConfigError::Validation(format!(
                "'{}' maps to the organized folder itself",
                extension
            )));
        }
        Ok(())
    }

    /// Merges `update` into this configuration.
    ///
    /// Values that cannot be accepted are skipped with a warning and leave the
    /// current value untouched.
    pub fn apply(&mut self, update: ConfigUpdate) {
        if let Some(entries) = update.extension_to_folder {
            for (entry, reason) in self.extension_to_folder.merge_entries(&entries) {
                warn!("Ignoring extension entry '{}': {}", entry, reason);
            }
        }

        if let Some(folder_paths) = update.folder_paths {
            if (1..=MAX_FOLDERS).contains(&folder_paths.len()) {
                self.folder_paths = folder_paths;
            } else {
                warn!(
                    "Ignoring folder list with {} entries: expected 1 to {}",
                    folder_paths.len(),
                    MAX_FOLDERS
                );
            }
        }

        if let Some(keep_duplicates) = update.keep_duplicates {
            self.keep_duplicates = keep_duplicates == "true";
        }

        if let Some(status_level) = update.status_level {
            match status_level.parse() {
                Ok(level) => self.status_level = level,
                Err(e) => warn!("Ignoring status level: {}", e),
            }
        }
    }
}

/// Reads and writes the configuration file at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Creates a store for `path`, which must name a `.json` file.
    ///
    /// # Arguments
    ///
    /// * `path` - The configuration file, e.g. [`DEFAULT_CONFIG_PATH`]
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if `path` does not end in `.json`.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        if path.extension().is_none_or(|ext| ext != "json") {
            return Err(ConfigError::Validation(format!(
                "config file '{}' should be a JSON file",
                path.display()
            )));
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the file does not exist.
    /// Returns `ConfigError::Invalid` if the file is not JSON.
    /// Returns `ConfigError::Validation` if a key is missing, a value has the
    /// wrong type, or `folder_paths` has no entries or more than [`MAX_FOLDERS`].
    pub fn load(&self) -> Result<Config, ConfigError> {
        let content = fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ConfigError::NotFound(self.path.clone()),
            _ => ConfigError::Io {
                path: self.path.clone(),
                source: e,
            },
        })?;

        let value: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| ConfigError::Invalid {
                path: self.path.clone(),
                source: e,
            })?;

        let raw: RawConfig = serde_json::from_value(value)
            .map_err(|e| ConfigError::Validation(e.to_string()))?;

        raw.into_config()
    }

    /// Merges `update` into the stored configuration and rewrites the file.
    ///
    /// The file is re-read first, so this fails the same way [`Self::load`]
    /// does when the stored document is missing or invalid.
    ///
    /// # Arguments
    ///
    /// * `update` - The fields to change; invalid values are skipped with a warning
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use extsort::config::{ConfigStore, ConfigUpdate};
    ///
    /// let store = ConfigStore::new("config/config.json")?;
    /// let config = store.update(ConfigUpdate {
    ///     extension_to_folder: Some(vec![".pdf Documents".to_string()]),
    ///     status_level: Some("all".to_string()),
    ///     ..Default::default()
    /// })?;
    /// assert_eq!(config.extension_to_folder.get(".pdf"), Some("Documents"));
    /// # Ok::<(), extsort::config::ConfigError>(())
    /// ```
    pub fn update(&self, update: ConfigUpdate) -> Result<Config, ConfigError> {
        let mut config = self.load()?;
        config.apply(update);
        self.save(&config)?;
        info!("New configurations have been set successfully");
        Ok(config)
    }

    /// Overwrites the file with `config`, pretty-printed with 4-space indentation.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be written.
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        config
            .serialize(&mut serializer)
            .map_err(|e| ConfigError::Invalid {
                path: self.path.clone(),
                source: e,
            })?;

        fs::write(&self.path, buffer).map_err(|e| ConfigError::Io {
            path: self.path.clone(),
            source: e,
        })
    }
}
