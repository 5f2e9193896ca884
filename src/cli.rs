//! Command-line interface module for extsort.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing
//! - Folder selection, from arguments or an interactive picker
//! - Applying overrides to the stored configuration
//! - Running the organization and the post-run review prompt

use crate::config::{ConfigError, ConfigStore, ConfigUpdate, DEFAULT_CONFIG_PATH, MAX_FOLDERS, StatusLevel};
use crate::logging::DEFAULT_LOG_PATH;
use crate::organizer::{OrganizeError, Organizer, RunSummary};
use crate::output::{StatusReporter, StatusSink};
use clap::Parser;
use dialoguer::Input;
use dialoguer::theme::ColorfulTheme;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::error;

/// Prompt shown after a run to re-display recorded messages.
pub const REVIEW_PROMPT: &str = "Show messages [success|failed|all|cancel]: ";

/// Organize files into folders chosen by their extension.
#[derive(Debug, Clone, Parser)]
#[command(name = "extsort", version)]
pub struct Args {
    /// Folders to organize, at most 20. Defaults to the configured folders.
    #[arg(value_name = "FOLDER", conflicts_with = "pick")]
    pub folders: Vec<PathBuf>,

    /// Extension mapping in the form ".ext folder". May be repeated.
    #[arg(short, long, value_name = "MAPPING")]
    pub ext: Vec<String>,

    /// "true" renames duplicate files, "false" overwrites them.
    #[arg(short, long, value_parser = ["true", "false"], ignore_case = true)]
    pub dup: Option<String>,

    /// Which messages to print while organizing.
    #[arg(short, long, value_parser = ["all", "success", "failed"], ignore_case = true)]
    pub status: Option<String>,

    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// File the log is appended to.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_LOG_PATH)]
    pub log_file: PathBuf,

    /// Choose the folders to organize interactively.
    #[arg(short, long)]
    pub pick: bool,

    /// Skip the message review prompt after organizing.
    #[arg(long)]
    pub no_review: bool,
}

impl Args {
    /// The configuration overrides carried by these arguments.
    ///
    /// `folder_paths` is filled in separately since it may come from the picker.
    fn config_update(&self) -> ConfigUpdate {
        ConfigUpdate {
            extension_to_folder: (!self.ext.is_empty()).then(|| self.ext.clone()),
            folder_paths: None,
            keep_duplicates: self.dup.as_deref().map(str::to_lowercase),
            status_level: self.status.as_deref().map(str::to_lowercase),
        }
    }
}

/// Errors that end a CLI run.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Organize(#[from] OrganizeError),
    #[error("Too many folders: {given} given, at most {max} allowed")]
    TooManyFolders { given: usize, max: usize },
    #[error("There is no selected folder to organize")]
    NoFolderSelected,
    #[error("Folder prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
    #[error("Failed to write output: {0}")]
    Io(#[from] io::Error),
}

/// Runs the CLI application with parsed arguments.
///
/// Applies the argument overrides to the stored configuration, organizes
/// every configured folder and, unless disabled, offers the review prompt on
/// standard input.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use extsort::cli::{Args, run};
///
/// let args = Args::parse_from(["extsort", "/home/user/Downloads", "--no-review"]);
/// match run(&args) {
///     Ok(summary) => println!("{} files moved", summary.moved()),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run(args: &Args) -> Result<RunSummary, CliError> {
    let store = ConfigStore::new(&args.config)?;

    let mut update = args.config_update();
    update.folder_paths = if args.pick {
        Some(pick_folders()?)
    } else if args.folders.is_empty() {
        None
    } else {
        Some(collect_folders(&args.folders)?)
    };

    let config = store.update(update)?;

    let mut reporter = StatusReporter::stdout(config.status_level);
    let summary = Organizer::new(&config, &mut reporter).run()?;

    if !args.no_review {
        review_history(&mut reporter, io::stdin().lock())?;
    }

    Ok(summary)
}

/// Removes repeated folders, keeping the first occurrence of each.
///
/// # Arguments
///
/// * `folders` - Folders in the order they were given
///
/// # Errors
///
/// Returns `CliError::TooManyFolders` if more than [`MAX_FOLDERS`] remain.
pub fn collect_folders(folders: &[PathBuf]) -> Result<Vec<PathBuf>, CliError> {
    let mut unique: Vec<PathBuf> = Vec::with_capacity(folders.len());
    for folder in folders {
        if !unique.contains(folder) {
            unique.push(folder.clone());
        }
    }

    if unique.len() > MAX_FOLDERS {
        error!("Too many folders selected: {}", unique.len());
        return Err(CliError::TooManyFolders {
            given: unique.len(),
            max: MAX_FOLDERS,
        });
    }
    Ok(unique)
}

/// Asks for folders one at a time until an empty answer or [`MAX_FOLDERS`].
///
/// Repeated folders are skipped. Only existing directories are accepted.
///
/// # Errors
///
/// Returns `CliError::NoFolderSelected` if no folder was picked, or
/// `CliError::Prompt` if the terminal cannot be read.
pub fn pick_folders() -> Result<Vec<PathBuf>, CliError> {
    let theme = ColorfulTheme::default();
    let mut folders: Vec<PathBuf> = Vec::new();

    while folders.len() < MAX_FOLDERS {
        let answer = Input::<String>::with_theme(&theme)
            .with_prompt(format!(
                "Folder to organize ({}/{}, empty to finish)",
                folders.len() + 1,
                MAX_FOLDERS
            ))
            .allow_empty(true)
            .validate_with(|input: &String| -> Result<(), &'static str> {
                let input = input.trim();
                if input.is_empty() || Path::new(input).is_dir() {
                    Ok(())
                } else {
                    Err("Not an existing folder")
                }
            })
            .interact_text()?;

        let answer = answer.trim();
        if answer.is_empty() {
            break;
        }

        let folder = PathBuf::from(answer);
        if !folders.contains(&folder) {
            folders.push(folder);
        }
    }

    if folders.is_empty() {
        error!("There is no selected folder to organize");
        return Err(CliError::NoFolderSelected);
    }
    Ok(folders)
}

/// Repeatedly asks which recorded messages to show.
///
/// `success`, `failed` and `all` re-display the matching history; `cancel`,
/// anything unrecognized or the end of input stops the loop.
///
/// # Arguments
///
/// * `reporter` - The reporter holding the message history
/// * `input` - Where answers are read from, one per line
pub fn review_history<S: StatusSink, R: BufRead>(
    reporter: &mut StatusReporter<S>,
    input: R,
) -> io::Result<()> {
    let mut lines = input.lines();
    loop {
        reporter.prompt(REVIEW_PROMPT)?;
        let Some(line) = lines.next() else {
            break;
        };

        match line?.trim().to_lowercase().parse::<StatusLevel>() {
            Ok(filter) => reporter.filter_and_display(filter)?,
            Err(_) => break,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::MessageCategory;
    use std::io::Cursor;

    fn shown(reporter: &StatusReporter<Vec<u8>>) -> String {
        String::from_utf8_lossy(reporter.sink()).into_owned()
    }

    #[test]
    fn test_collect_folders_deduplicates_in_order() {
        let folders = vec![
            PathBuf::from("/b"),
            PathBuf::from("/a"),
            PathBuf::from("/b"),
        ];
        assert_eq!(
            collect_folders(&folders).unwrap(),
            vec![PathBuf::from("/b"), PathBuf::from("/a")]
        );
    }

    #[test]
    fn test_collect_folders_limit() {
        let twenty: Vec<PathBuf> = (0..20).map(|i| PathBuf::from(format!("/f{}", i))).collect();
        assert_eq!(collect_folders(&twenty).unwrap().len(), 20);

        let mut twenty_one = twenty.clone();
        twenty_one.push(PathBuf::from("/extra"));
        assert!(matches!(
            collect_folders(&twenty_one),
            Err(CliError::TooManyFolders { given: 21, max: 20 })
        ));
    }

    #[test]
    fn test_review_history_shows_requested_messages() {
        let mut reporter = StatusReporter::new(StatusLevel::Success, Vec::new());
        reporter.print("moved a.txt", MessageCategory::Success).unwrap();
        reporter.print("failed b.png", MessageCategory::Failed).unwrap();
        let before = reporter.sink().len();

        review_history(&mut reporter, Cursor::new("failed\ncancel\nall\n")).unwrap();

        let out = shown(&reporter)[before..].to_string();
        assert!(out.contains("failed b.png"));
        // "cancel" stops the loop before "all" is read
        assert!(!out.contains("moved a.txt"));
        assert_eq!(out.matches(REVIEW_PROMPT).count(), 2);
    }

    #[test]
    fn test_review_history_stops_on_invalid_input_and_eof() {
        let mut reporter = StatusReporter::new(StatusLevel::All, Vec::new());
        reporter.print("moved a.txt", MessageCategory::Success).unwrap();
        let before = reporter.sink().len();

        review_history(&mut reporter, Cursor::new("SUCCESS\nsomething\nall\n")).unwrap();
        let out = shown(&reporter)[before..].to_string();
        assert_eq!(out.matches("moved a.txt").count(), 1);

        let before = reporter.sink().len();
        review_history(&mut reporter, Cursor::new("")).unwrap();
        assert_eq!(shown(&reporter)[before..].to_string(), REVIEW_PROMPT);
    }

    #[test]
    fn test_args_parsing() {
        let args = Args::try_parse_from([
            "extsort",
            "/tmp/a",
            "/tmp/b",
            "--ext",
            ".pdf Documents",
            "-e",
            ".jpg My Pictures",
            "--dup",
            "FALSE",
            "--status",
            "all",
            "--no-review",
        ])
        .unwrap();

        assert_eq!(args.folders, vec![PathBuf::from("/tmp/a"), PathBuf::from("/tmp/b")]);
        assert_eq!(args.ext, vec![".pdf Documents", ".jpg My Pictures"]);
        assert_eq!(args.config, PathBuf::from(DEFAULT_CONFIG_PATH));
        assert!(args.no_review);

        let update = args.config_update();
        assert_eq!(update.keep_duplicates.as_deref(), Some("false"));
        assert_eq!(update.status_level.as_deref(), Some("all"));
        assert_eq!(update.extension_to_folder.map(|e| e.len()), Some(2));
    }

    #[test]
    fn test_args_reject_invalid_values() {
        assert!(Args::try_parse_from(["extsort", "--dup", "maybe"]).is_err());
        assert!(Args::try_parse_from(["extsort", "--status", "verbose"]).is_err());
        assert!(Args::try_parse_from(["extsort", "/tmp/a", "--pick"]).is_err());
    }

    #[test]
    fn test_args_without_overrides() {
        let args = Args::try_parse_from(["extsort"]).unwrap();
        assert_eq!(args.config_update(), ConfigUpdate::default());
    }
}
