//! extsort - Organize folders by file extension
//!
//! This library moves the top-level files of selected folders into subfolders
//! chosen by file extension, as described by a JSON configuration file. It
//! reports each move on the console, keeps the reported messages for later
//! review and logs every operation to a file.

pub mod cli;
pub mod config;
pub mod extension_map;
pub mod file_mover;
pub mod logging;
pub mod organizer;
pub mod output;

pub use config::{Config, ConfigError, ConfigStore, ConfigUpdate, StatusLevel};
pub use extension_map::{ExtensionMap, FALLBACK_FOLDER};
pub use file_mover::{FileMover, MoveError};
pub use logging::LogContext;
pub use organizer::{FileOutcome, OrganizeError, Organizer, RunSummary};
pub use output::{MessageCategory, StatusReporter, StatusSink};

pub use cli::{Args, CliError, run};
