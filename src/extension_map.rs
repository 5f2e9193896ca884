//! Extension to folder mapping used to decide where each file goes.
//!
//! Keys are extensions including the leading period (e.g. `".pdf"`), values are
//! folder paths relative to the folder being organized. Files whose extension is
//! not mapped go to [`FALLBACK_FOLDER`].
//!
//! # Examples
//!
//! ```
//! use extsort::extension_map::{ExtensionMap, FALLBACK_FOLDER};
//! use std::path::Path;
//!
//! let mut map = ExtensionMap::new();
//! map.insert(".pdf", "Documents/PDF");
//! assert_eq!(map.target_for(Path::new("report.pdf")), "Documents/PDF");
//! assert_eq!(map.target_for(Path::new("song.mp3")), FALLBACK_FOLDER);
//! ```
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Component, Path};
use thiserror::Error;

/// Folder used for files whose extension has no mapping.
pub const FALLBACK_FOLDER: &str = "OTHERS";

/// Reasons an `"ext folder"` entry is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("entry is empty")]
    Empty,
    #[error("entry '{0}' has no folder after the extension")]
    MissingFolder(String),
    #[error("'{0}' is not an extension: it must start with '.'")]
    InvalidExtension(String),
    #[error("folder '{0}' is the organized folder itself")]
    RootFolder(String),
}

/// Mapping from file extension to target folder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtensionMap(BTreeMap<String, String>);

impl ExtensionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `extension` to `folder`, returning the folder it replaced.
    pub fn insert(&mut self, extension: impl Into<String>, folder: impl Into<String>) -> Option<String> {
        self.0.insert(extension.into(), folder.into())
    }

    pub fn get(&self, extension: &str) -> Option<&str> {
        self.0.get(extension).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(ext, folder)| (ext.as_str(), folder.as_str()))
    }

    /// Returns the folder a file should be moved into.
    ///
    /// Matching is exact and case-sensitive on the last extension of the file
    /// name. Files without an extension, or with an unmapped one, resolve to
    /// [`FALLBACK_FOLDER`].
    pub fn target_for(&self, file: &Path) -> &str {
        extension_of(file)
            .and_then(|ext| self.get(&ext))
            .unwrap_or(FALLBACK_FOLDER)
    }

    /// Extensions whose folder is the organized folder itself.
    pub fn root_targets(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .filter(|(_, folder)| is_root_folder(folder))
            .map(|(extension, _)| extension)
    }

    /// Parses and merges `"ext folder"` entries. Later entries win.
    ///
    /// Invalid entries are skipped; they are returned together with the
    /// reason so callers can report them.
    ///
    /// # Arguments
    ///
    /// * `entries` - Entries such as `".pdf Documents"` or `".jpg My Pictures"`
    pub fn merge_entries<I, S>(&mut self, entries: I) -> Vec<(String, EntryError)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rejected = Vec::new();
        for entry in entries {
            let entry = entry.as_ref();
            match parse_entry(entry) {
                Ok((extension, folder)) => {
                    self.insert(extension, folder);
                }
                Err(e) => rejected.push((entry.to_string(), e)),
            }
        }
        rejected
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ExtensionMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Returns the extension of `path` with its leading period, e.g. `".txt"`.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy())
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{}", ext))
}

/// Whether `folder` names the organized folder itself (`""`, `"."`, `"./."`).
pub fn is_root_folder(folder: &str) -> bool {
    Path::new(folder)
        .components()
        .all(|component| component == Component::CurDir)
}

/// Splits an `"ext folder"` entry on its first whitespace run.
///
/// The folder part may itself contain spaces (`".jpg My Pictures"`).
///
/// # Errors
///
/// * `EntryError::Empty` for a blank entry
/// * `EntryError::MissingFolder` when nothing follows the extension
/// * `EntryError::InvalidExtension` when the first token is not `.` plus at
///   least one character
/// * `EntryError::RootFolder` when the folder resolves to the organized
///   folder itself
pub fn parse_entry(entry: &str) -> Result<(String, String), EntryError> {
    let entry = entry.trim();
    if entry.is_empty() {
        return Err(EntryError::Empty);
    }

    let Some((extension, folder)) = entry.split_once(char::is_whitespace) else {
        return Err(EntryError::MissingFolder(entry.to_string()));
    };

    let folder = folder.trim();
    if folder.is_empty() {
        return Err(EntryError::MissingFolder(entry.to_string()));
    }
    if !extension.starts_with('.') || extension.len() < 2 {
        return Err(EntryError::InvalidExtension(extension.to_string()));
    }
    if is_root_folder(folder) {
        return Err(EntryError::RootFolder(folder.to_string()));
    }

    Ok((extension.to_string(), folder.to_string()))
}
