//! File movement within a single root folder.
//!
//! This module lists the files directly under a root folder, creates target
//! subfolders on demand and moves files into them, renaming on collision when
//! duplicates are kept.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};

/// Errors that can occur while creating folders or moving files.
#[derive(Debug, Error)]
pub enum MoveError {
    /// The file to move does not exist or is not a regular file.
    #[error("No such file path: {}", .0.display())]
    NotFound(PathBuf),
    /// The root or target folder does not exist or is not a directory.
    #[error("No such folder path: {}", .0.display())]
    NotADirectory(PathBuf),
    /// A non-directory entry occupies the path of a folder to create.
    #[error("A file with the name '{}' already exists", .0.display())]
    AlreadyExistsAsFile(PathBuf),
    /// The operating system refused the operation.
    #[error("Permission denied for {}: {source}", path.display())]
    Permission { path: PathBuf, source: io::Error },
    /// Any other IO failure.
    #[error("IO error on {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
}

impl MoveError {
    /// Short name of the failure, used in status messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NotFound",
            Self::NotADirectory(_) => "NotADirectory",
            Self::AlreadyExistsAsFile(_) => "AlreadyExistsAsFile",
            Self::Permission { .. } => "Permission",
            Self::Io { .. } => "Io",
        }
    }

    fn from_io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::PermissionDenied => Self::Permission {
                path: path.to_path_buf(),
                source,
            },
            _ => Self::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }
}

/// Result type for file movement operations.
pub type MoveResult<T> = Result<T, MoveError>;

/// Moves files into subfolders of a root folder.
#[derive(Debug, Clone)]
pub struct FileMover {
    root: PathBuf,
}

impl FileMover {
    /// Creates a mover for `root`, resolved to an absolute path.
    ///
    /// # Arguments
    ///
    /// * `root` - The folder whose files get organized
    ///
    /// # Errors
    ///
    /// Returns `MoveError::NotADirectory` if `root` is not an existing directory.
    pub fn new(root: impl AsRef<Path>) -> MoveResult<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            error!("Invalid folder path provided: {}", root.display());
            return Err(MoveError::NotADirectory(root.to_path_buf()));
        }

        let root = fs::canonicalize(root).map_err(|e| MoveError::from_io(root, e))?;
        info!("Folder path set to: {}", root.display());
        Ok(Self { root })
    }

    /// The absolute root folder.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lists the regular files directly under the root, skipping dotfiles.
    ///
    /// The directory is read lazily and anew on every call; nothing is cached.
    /// Entries that cannot be inspected are skipped.
    ///
    /// # Errors
    ///
    /// Returns `MoveError::Permission` or `MoveError::Io` if the root cannot be
    /// read.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use extsort::file_mover::FileMover;
    ///
    /// let mover = FileMover::new("/path/to/downloads")?;
    /// for file in mover.list_files()? {
    ///     println!("{}", file.display());
    /// }
    /// # Ok::<(), extsort::file_mover::MoveError>(())
    /// ```
    pub fn list_files(&self) -> MoveResult<impl Iterator<Item = PathBuf> + use<>> {
        let entries = fs::read_dir(&self.root).map_err(|e| MoveError::from_io(&self.root, e))?;

        Ok(entries.flatten().filter_map(|entry| {
            if entry.file_name().to_string_lossy().starts_with('.') {
                return None;
            }
            let path = entry.path();
            // Follows symlinks, so a link to a regular file counts as a file.
            path.is_file().then_some(path)
        }))
    }

    /// Creates `root/name` and any missing parents.
    ///
    /// Succeeds without changes if the directory already exists. Returns the
    /// absolute path of the folder.
    ///
    /// # Arguments
    ///
    /// * `name` - Folder path relative to the root, e.g. `"Documents/PDF"`
    ///
    /// # Errors
    ///
    /// * `MoveError::AlreadyExistsAsFile` if a non-directory entry already
    ///   occupies the path
    /// * `MoveError::Permission` if the folder cannot be created for lack of
    ///   rights
    pub fn create_folder(&self, name: impl AsRef<Path>) -> MoveResult<PathBuf> {
        let name = name.as_ref();
        let target_path = self.root.join(name);

        // symlink_metadata also catches dangling links occupying the name
        let occupied = fs::symlink_metadata(&target_path).is_ok();
        if occupied && !target_path.is_dir() {
            info!("Folder or file with '{}' name already exists", name.display());
            return Err(MoveError::AlreadyExistsAsFile(target_path));
        }

        fs::create_dir_all(&target_path).map_err(|e| MoveError::from_io(&target_path, e))?;
        info!(
            "Successfully created folder: '{}' at path '{}'",
            name.display(),
            target_path.display()
        );
        Ok(target_path)
    }

    /// Moves `file` into the `target_folder` subfolder of the root.
    ///
    /// Both paths are resolved against the root. With `keep_duplicates` a
    /// name already taken at the destination gets a ` (N)` suffix before its
    /// extension, N counting up from 1 until the name is free. Without it the
    /// existing destination file is overwritten.
    ///
    /// Returns the final destination path.
    ///
    /// # Arguments
    ///
    /// * `file` - The file to move, absolute or relative to the root
    /// * `target_folder` - The destination folder, relative to the root
    /// * `keep_duplicates` - Rename instead of overwriting on a name collision
    ///
    /// # Errors
    ///
    /// * `MoveError::NotFound` if `file` is not a regular file
    /// * `MoveError::NotADirectory` if the target folder is not a directory
    /// * `MoveError::Permission` if the rename is denied; no retry is made
    /// * `MoveError::Io` for any other failure of the rename
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use extsort::file_mover::FileMover;
    ///
    /// let mover = FileMover::new("/path/to/downloads")?;
    /// mover.create_folder("Documents")?;
    /// let destination = mover.move_file("report.pdf", "Documents", true)?;
    /// println!("Moved to {}", destination.display());
    /// # Ok::<(), extsort::file_mover::MoveError>(())
    /// ```
    pub fn move_file(
        &self,
        file: impl AsRef<Path>,
        target_folder: impl AsRef<Path>,
        keep_duplicates: bool,
    ) -> MoveResult<PathBuf> {
        let file_path = self.root.join(file);
        let target_path = self.root.join(target_folder);

        if !file_path.is_file() {
            error!(
                "Cannot move file: '{}' is invalid or does not exist",
                file_path.display()
            );
            return Err(MoveError::NotFound(file_path));
        }
        if !target_path.is_dir() {
            error!(
                "Target folder '{}' is invalid or does not exist",
                target_path.display()
            );
            return Err(MoveError::NotADirectory(target_path));
        }

        let file_name = file_path
            .file_name()
            .ok_or_else(|| MoveError::NotFound(file_path.clone()))?;
        let mut destination = target_path.join(file_name);
        if keep_duplicates {
            destination = free_destination(&target_path, &file_path, destination);
        }

        fs::rename(&file_path, &destination).map_err(|e| {
            error!(
                "Failed to move '{}' to '{}': {}",
                file_path.display(),
                destination.display(),
                e
            );
            MoveError::from_io(&file_path, e)
        })?;

        info!(
            "Moved '{}' to '{}'",
            file_path.display(),
            destination.display()
        );
        Ok(destination)
    }
}

/// Finds the first of `name.ext`, `name (1).ext`, `name (2).ext`, ... that is
/// not taken in `target_path`.
///
/// The name is assembled from the raw `OsStr` parts so names that are not
/// valid UTF-8 keep their bytes.
fn free_destination(target_path: &Path, file_path: &Path, mut destination: PathBuf) -> PathBuf {
    let stem = file_path.file_stem().unwrap_or_default();
    let extension = file_path.extension();

    let mut counter = 1u32;
    while fs::symlink_metadata(&destination).is_ok() {
        let mut name = stem.to_os_string();
        name.push(format!(" ({})", counter));
        if let Some(extension) = extension {
            name.push(".");
            name.push(extension);
        }
        destination = target_path.join(name);
        counter += 1;
    }
    destination
}
