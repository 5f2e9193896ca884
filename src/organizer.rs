//! Organization run over every configured folder.
//!
//! Folders are processed one after another. Within a folder each file is
//! handled independently: a failure is recorded as a [`FileOutcome::Failed`]
//! and reported, then the next file is processed.

use crate::config::Config;
use crate::file_mover::{FileMover, MoveError};
use crate::output::{MessageCategory, StatusReporter, StatusSink};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Errors that stop an organization run.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// A configured folder cannot be opened or listed.
    #[error("Cannot organize '{}': {source}", path.display())]
    Folder { path: PathBuf, source: MoveError },
    /// Status output could not be written.
    #[error("Failed to write status output: {0}")]
    Output(#[from] io::Error),
}

/// What happened to a single file.
#[derive(Debug)]
pub enum FileOutcome {
    Moved {
        file: PathBuf,
        target_folder: String,
        destination: PathBuf,
    },
    Failed {
        file: PathBuf,
        target_folder: String,
        error: MoveError,
    },
}

impl FileOutcome {
    pub fn is_moved(&self) -> bool {
        matches!(self, FileOutcome::Moved { .. })
    }

    pub fn file(&self) -> &Path {
        match self {
            FileOutcome::Moved { file, .. } | FileOutcome::Failed { file, .. } => file,
        }
    }
}

/// Outcomes for one root folder.
#[derive(Debug)]
pub struct FolderReport {
    pub root: PathBuf,
    pub outcomes: Vec<FileOutcome>,
}

impl FolderReport {
    pub fn moved(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_moved()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.moved()
    }
}

/// Outcomes of a whole run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub folders: Vec<FolderReport>,
}

impl RunSummary {
    pub fn moved(&self) -> usize {
        self.folders.iter().map(FolderReport::moved).sum()
    }

    pub fn failed(&self) -> usize {
        self.folders.iter().map(FolderReport::failed).sum()
    }
}

/// Drives the file mover over every configured folder and reports outcomes.
pub struct Organizer<'a, S: StatusSink> {
    config: &'a Config,
    reporter: &'a mut StatusReporter<S>,
}

impl<'a, S: StatusSink> Organizer<'a, S> {
    /// Creates an organizer for `config` that reports through `reporter`.
    pub fn new(config: &'a Config, reporter: &'a mut StatusReporter<S>) -> Self {
        Self { config, reporter }
    }

    /// Organizes every folder in `folder_paths`, in order.
    ///
    /// Each file is reported as it is handled. A file that cannot be moved is
    /// reported as failed and the run goes on with the next one.
    ///
    /// # Errors
    ///
    /// Returns `OrganizeError::Folder` if a configured folder is not an
    /// existing directory or cannot be listed. Folders before it have already
    /// been organized; later ones are not touched.
    /// Returns `OrganizeError::Output` if the status output cannot be written.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use extsort::config::ConfigStore;
    /// use extsort::organizer::Organizer;
    /// use extsort::output::StatusReporter;
    ///
    /// let config = ConfigStore::new("config/config.json")?.load()?;
    /// let mut reporter = StatusReporter::stdout(config.status_level);
    /// let summary = Organizer::new(&config, &mut reporter).run()?;
    /// println!("{} moved, {} failed", summary.moved(), summary.failed());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn run(&mut self) -> Result<RunSummary, OrganizeError> {
        let mut summary = RunSummary::default();

        let config = self.config;
        for root in &config.folder_paths {
            let report = self.organize_folder(root)?;
            summary.folders.push(report);
        }

        self.reporter.print(
            "--- File organization completed for all folders ---",
            MessageCategory::None,
        )?;
        info!(
            "File organization completed for all folders: {} moved, {} failed",
            summary.moved(),
            summary.failed()
        );
        Ok(summary)
    }

    /// Organizes the top-level files of a single folder.
    ///
    /// # Arguments
    ///
    /// * `root` - The folder to organize
    ///
    /// # Errors
    ///
    /// Returns `OrganizeError::Folder` if `root` is not an existing directory
    /// or cannot be listed.
    pub fn organize_folder(&mut self, root: &Path) -> Result<FolderReport, OrganizeError> {
        let folder_error = |source: MoveError| OrganizeError::Folder {
            path: root.to_path_buf(),
            source,
        };
        let mover = FileMover::new(root).map_err(folder_error)?;
        let files = mover.list_files().map_err(folder_error)?;

        self.reporter.print(
            &format!(
                "--- Starting file organization for '{}'... ---",
                root.display()
            ),
            MessageCategory::None,
        )?;
        info!("Starting file organization for '{}'", root.display());

        let mut outcomes = Vec::new();
        for file in files {
            let outcome = self.organize_file(&mover, file);
            self.report(&outcome)?;
            outcomes.push(outcome);
        }

        self.reporter.print(
            &format!(
                "--- File organization completed for '{}' ---",
                root.display()
            ),
            MessageCategory::None,
        )?;
        info!("File organization completed for '{}'", root.display());

        Ok(FolderReport {
            root: root.to_path_buf(),
            outcomes,
        })
    }

    fn organize_file(&self, mover: &FileMover, file: PathBuf) -> FileOutcome {
        info!("Got new file: '{}'", display_name(&file));
        let target_folder = self
            .config
            .extension_to_folder
            .target_for(&file)
            .to_string();
        info!("File has been classified as - {}", target_folder);

        let moved = mover
            .create_folder(&target_folder)
            .and_then(|_| mover.move_file(&file, &target_folder, self.config.keep_duplicates));

        match moved {
            Ok(destination) => FileOutcome::Moved {
                file,
                target_folder,
                destination,
            },
            Err(error) => {
                warn!(
                    "An error occurred while processing '{}': {}",
                    display_name(&file),
                    error
                );
                FileOutcome::Failed {
                    file,
                    target_folder,
                    error,
                }
            }
        }
    }

    fn report(&mut self, outcome: &FileOutcome) -> io::Result<()> {
        match outcome {
            FileOutcome::Moved {
                file,
                target_folder,
                ..
            } => self.reporter.print(
                &format!(
                    "'{}' moved to '{}' folder",
                    display_name(file),
                    target_folder
                ),
                MessageCategory::Success,
            ),
            FileOutcome::Failed {
                file,
                target_folder,
                error,
            } => self.reporter.print(
                &format!(
                    "[{}] failed to move '{}' to '{}' folder",
                    error.kind_name(),
                    display_name(file),
                    target_folder
                ),
                MessageCategory::Failed,
            ),
        }
    }
}

fn display_name(file: &Path) -> String {
    file.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StatusLevel;
    use crate::extension_map::ExtensionMap;
    use std::fs;
    use tempfile::TempDir;

    fn config_for(root: &Path, keep_duplicates: bool) -> Config {
        Config {
            extension_to_folder: [(".txt", "Docs")].into_iter().collect::<ExtensionMap>(),
            folder_paths: vec![root.to_path_buf()],
            keep_duplicates,
            status_level: StatusLevel::All,
        }
    }

    #[test]
    fn test_organize_folder_moves_mapped_and_unmapped() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), "a").unwrap();
        fs::write(temp_dir.path().join("b.png"), "b").unwrap();
        let config = config_for(temp_dir.path(), true);
        let mut reporter = StatusReporter::new(StatusLevel::All, Vec::new());

        let summary = Organizer::new(&config, &mut reporter).run().unwrap();

        assert_eq!(summary.moved(), 2);
        assert_eq!(summary.failed(), 0);
        assert!(temp_dir.path().join("Docs").join("a.txt").is_file());
        assert!(temp_dir.path().join("OTHERS").join("b.png").is_file());
        assert_eq!(reporter.count(MessageCategory::Success), 2);
    }

    #[test]
    fn test_failed_file_does_not_stop_folder() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("Docs")).unwrap();
        fs::write(temp_dir.path().join("Docs").join("Text"), "blocking file").unwrap();
        fs::write(temp_dir.path().join("a.txt"), "a").unwrap();
        fs::write(temp_dir.path().join("b.png"), "b").unwrap();
        let mut config = config_for(temp_dir.path(), true);
        config.extension_to_folder.insert(".txt", "Docs/Text");
        let mut reporter = StatusReporter::new(StatusLevel::All, Vec::new());

        let summary = Organizer::new(&config, &mut reporter).run().unwrap();

        let report = &summary.folders[0];
        assert_eq!(report.failed(), 1);
        let failed = report.outcomes.iter().find(|o| !o.is_moved()).unwrap();
        assert_eq!(failed.file().file_name().unwrap(), "a.txt");
        assert!(matches!(
            failed,
            FileOutcome::Failed {
                error: MoveError::AlreadyExistsAsFile(_),
                ..
            }
        ));
        assert!(temp_dir.path().join("a.txt").is_file());
        assert!(temp_dir.path().join("OTHERS").join("b.png").is_file());
        assert_eq!(reporter.count(MessageCategory::Failed), 1);
        assert_eq!(reporter.count(MessageCategory::Success), 1);
    }

    #[test]
    fn test_missing_root_stops_run() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_for(&temp_dir.path().join("gone"), true);
        let mut reporter = StatusReporter::new(StatusLevel::All, Vec::new());

        let result = Organizer::new(&config, &mut reporter).run();
        assert!(matches!(
            result,
            Err(OrganizeError::Folder {
                source: MoveError::NotADirectory(_),
                ..
            })
        ));
    }

    #[test]
    fn test_permission_failure_is_reported_and_run_continues() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_for(temp_dir.path(), true);
        let mut reporter = StatusReporter::new(StatusLevel::All, Vec::new());
        let mut organizer = Organizer::new(&config, &mut reporter);

        let denied = FileOutcome::Failed {
            file: temp_dir.path().join("a.txt"),
            target_folder: "Docs".to_string(),
            error: MoveError::Permission {
                path: temp_dir.path().join("a.txt"),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            },
        };
        organizer.report(&denied).unwrap();

        fs::write(temp_dir.path().join("b.png"), "b").unwrap();
        let summary = organizer.run().unwrap();
        assert_eq!(summary.moved(), 1);

        let out = String::from_utf8_lossy(reporter.sink()).into_owned();
        assert!(out.contains("[Permission] failed to move 'a.txt' to 'Docs' folder"));
        assert_eq!(reporter.count(MessageCategory::Failed), 1);
        assert_eq!(reporter.count(MessageCategory::Success), 1);
    }

    #[test]
    fn test_banners_are_recorded() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_for(temp_dir.path(), true);
        let mut reporter = StatusReporter::new(StatusLevel::Failed, Vec::new());

        Organizer::new(&config, &mut reporter).run().unwrap();

        assert_eq!(reporter.count(MessageCategory::None), 3);
        let out = String::from_utf8_lossy(reporter.sink()).into_owned();
        assert!(out.contains("--- Starting file organization for"));
        assert!(out.contains("--- File organization completed for"));
        assert!(out.contains("--- File organization completed for all folders ---"));
    }
}
