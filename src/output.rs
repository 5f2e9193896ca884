//! Status output and message history.
//!
//! Every status message is rendered with a colored flag, kept in an in-memory
//! history and printed live only when the configured [`StatusLevel`] lets it
//! through. The history can be filtered and re-displayed after a run.

use crate::config::StatusLevel;
use colored::*;
use console::Term;
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;
use thiserror::Error;
use tracing::error;

/// Errors raised by the status reporter.
#[derive(Debug, Error)]
pub enum ReporterError {
    /// An unknown message category or filter name.
    #[error("Invalid status: '{0}'. Valid options are 'success', 'failed' and 'none'")]
    Validation(String),
}

/// Category of a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageCategory {
    Success,
    Failed,
    /// Informational lines such as banners; always printed.
    None,
}

impl MessageCategory {
    /// The colored flag printed in front of the message.
    fn flag(&self) -> String {
        match self {
            MessageCategory::Success => "●".green().to_string(),
            MessageCategory::Failed => "●".red().to_string(),
            MessageCategory::None => String::new(),
        }
    }

    fn matches(&self, level: StatusLevel) -> bool {
        match level {
            StatusLevel::All => true,
            StatusLevel::Success => *self == MessageCategory::Success,
            StatusLevel::Failed => *self == MessageCategory::Failed,
        }
    }
}

impl fmt::Display for MessageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MessageCategory::Success => "success",
            MessageCategory::Failed => "failed",
            MessageCategory::None => "none",
        })
    }
}

impl FromStr for MessageCategory {
    type Err = ReporterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(MessageCategory::Success),
            "failed" => Ok(MessageCategory::Failed),
            "none" => Ok(MessageCategory::None),
            other => {
                error!("Invalid status: '{}'", other);
                Err(ReporterError::Validation(other.to_string()))
            }
        }
    }
}

/// A rendered message and its category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub category: MessageCategory,
}

/// Where status output goes.
///
/// A terminal can be cleared before the history is re-displayed; in-memory
/// buffers ignore the request.
pub trait StatusSink: Write {
    fn clear(&mut self) -> io::Result<()>;
}

impl StatusSink for Term {
    fn clear(&mut self) -> io::Result<()> {
        self.clear_screen()
    }
}

impl StatusSink for Vec<u8> {
    fn clear(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Prints status messages filtered by level and keeps their history.
pub struct StatusReporter<S: StatusSink> {
    level: StatusLevel,
    history: Vec<StatusMessage>,
    sink: S,
}

impl StatusReporter<Term> {
    /// A reporter writing to standard output.
    pub fn stdout(level: StatusLevel) -> Self {
        Self::new(level, Term::stdout())
    }
}

impl<S: StatusSink> StatusReporter<S> {
    /// Creates a reporter with an empty history.
    ///
    /// # Arguments
    ///
    /// * `level` - Which categories are printed live
    /// * `sink` - Where messages are written
    pub fn new(level: StatusLevel, sink: S) -> Self {
        Self {
            level,
            history: Vec::new(),
            sink,
        }
    }

    pub fn level(&self) -> StatusLevel {
        self.level
    }

    /// Every message printed so far, in order.
    pub fn history(&self) -> &[StatusMessage] {
        &self.history
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Number of recorded messages in `category`.
    pub fn count(&self, category: MessageCategory) -> usize {
        self.history
            .iter()
            .filter(|message| message.category == category)
            .count()
    }

    /// Records `message` and prints it if the level allows.
    ///
    /// Messages in [`MessageCategory::None`] are always printed.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    /// * `category` - Decides the colored flag and whether the level lets it through
    ///
    /// # Example
    ///
    /// ```
    /// use extsort::config::StatusLevel;
    /// use extsort::output::{MessageCategory, StatusReporter};
    ///
    /// let mut reporter = StatusReporter::new(StatusLevel::Failed, Vec::new());
    /// reporter.print("'a.txt' moved to 'Docs' folder", MessageCategory::Success)?;
    /// assert!(reporter.sink().is_empty());
    /// assert_eq!(reporter.history().len(), 1);
    /// # Ok::<(), std::io::Error>(())
    /// ```
    pub fn print(&mut self, message: &str, category: MessageCategory) -> io::Result<()> {
        let text = format!("{} {}", category.flag(), message);
        let visible = category == MessageCategory::None || category.matches(self.level);

        if visible {
            writeln!(self.sink, "{}", text)?;
        }
        self.history.push(StatusMessage { text, category });
        Ok(())
    }

    /// Clears the screen and re-prints the recorded messages matching `filter`.
    ///
    /// Prints a placeholder line when nothing matches.
    ///
    /// # Arguments
    ///
    /// * `filter` - `all` shows every message, `success` and `failed` only their own
    pub fn filter_and_display(&mut self, filter: StatusLevel) -> io::Result<()> {
        self.sink.clear()?;

        let mut shown = 0;
        for message in &self.history {
            if message.category.matches(filter) {
                writeln!(self.sink, "{}", message.text)?;
                shown += 1;
            }
        }

        if shown == 0 {
            writeln!(self.sink, "-- There isn't any {} message to show. --", filter)?;
        }
        self.sink.flush()
    }

    /// Writes `text` without a newline, for interactive prompts.
    pub fn prompt(&mut self, text: &str) -> io::Result<()> {
        write!(self.sink, "{}", text)?;
        self.sink.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reporter(level: StatusLevel) -> StatusReporter<Vec<u8>> {
        StatusReporter::new(level, Vec::new())
    }

    fn output(reporter: &StatusReporter<Vec<u8>>) -> String {
        String::from_utf8_lossy(reporter.sink()).into_owned()
    }

    #[test]
    fn test_level_all_prints_everything() {
        let mut reporter = reporter(StatusLevel::All);
        reporter.print("moved a.txt", MessageCategory::Success).unwrap();
        reporter.print("could not move b.png", MessageCategory::Failed).unwrap();
        reporter.print("banner", MessageCategory::None).unwrap();

        let out = output(&reporter);
        assert!(out.contains("moved a.txt"));
        assert!(out.contains("could not move b.png"));
        assert!(out.contains("banner"));
    }

    #[test]
    fn test_level_filters_live_output_but_records_history() {
        let mut reporter = reporter(StatusLevel::Failed);
        reporter.print("moved a.txt", MessageCategory::Success).unwrap();
        reporter.print("could not move b.png", MessageCategory::Failed).unwrap();
        reporter.print("banner", MessageCategory::None).unwrap();

        let out = output(&reporter);
        assert!(!out.contains("moved a.txt"));
        assert!(out.contains("could not move b.png"));
        assert!(out.contains("banner"));

        assert_eq!(reporter.history().len(), 3);
        assert_eq!(reporter.count(MessageCategory::Success), 1);
        assert_eq!(reporter.count(MessageCategory::Failed), 1);
    }

    #[test]
    fn test_none_category_has_no_flag() {
        let mut reporter = reporter(StatusLevel::All);
        reporter.print("banner", MessageCategory::None).unwrap();

        assert_eq!(reporter.history()[0].text, " banner");
    }

    #[test]
    fn test_filter_and_display() {
        let mut reporter = reporter(StatusLevel::Success);
        reporter.print("first ok", MessageCategory::Success).unwrap();
        reporter.print("first bad", MessageCategory::Failed).unwrap();
        reporter.print("second ok", MessageCategory::Success).unwrap();

        let before = reporter.sink().len();
        reporter.filter_and_display(StatusLevel::Failed).unwrap();
        let shown = String::from_utf8_lossy(&reporter.sink()[before..]).into_owned();

        assert!(shown.contains("first bad"));
        assert!(!shown.contains("first ok"));
        assert!(!shown.contains("second ok"));
    }

    #[test]
    fn test_filter_all_shows_every_message() {
        let mut reporter = reporter(StatusLevel::Failed);
        reporter.print("banner", MessageCategory::None).unwrap();
        reporter.print("ok", MessageCategory::Success).unwrap();

        let before = reporter.sink().len();
        reporter.filter_and_display(StatusLevel::All).unwrap();
        let shown = String::from_utf8_lossy(&reporter.sink()[before..]).into_owned();

        assert_eq!(shown.lines().count(), 2);
    }

    #[test]
    fn test_filter_placeholder_when_empty() {
        let mut reporter = reporter(StatusLevel::All);
        reporter.print("ok", MessageCategory::Success).unwrap();

        let before = reporter.sink().len();
        reporter.filter_and_display(StatusLevel::Failed).unwrap();
        let shown = String::from_utf8_lossy(&reporter.sink()[before..]).into_owned();

        assert_eq!(shown, "-- There isn't any failed message to show. --\n");
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(
            "success".parse::<MessageCategory>().unwrap(),
            MessageCategory::Success
        );
        assert_eq!("none".parse::<MessageCategory>().unwrap(), MessageCategory::None);
        assert!(matches!(
            "warning".parse::<MessageCategory>(),
            Err(ReporterError::Validation(_))
        ));
    }
}
