//! Text channels for hosts.
//!
//! - The report channel gets one line per notable event (cash transfer,
//!   tile lay, round transition). Lines are also emitted as `tracing`
//!   events at `info` level under the `rust_18xx::report` target.
//! - The display channel holds the text of the most recent rejection and
//!   is cleared by the next successful action.
//!
//! Report lines are a narrative, not game state: undo does not retract them.

use im::Vector;

/// Report and display channels of one game session.
#[derive(Clone, Debug, Default)]
pub struct ReportLog {
    lines: Vector<String>,
    last_error: Option<String>,
}

impl ReportLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a report line.
    pub fn add(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::info!(target: "rust_18xx::report", "{line}");
        self.lines.push_back(line);
    }

    /// Record a rejection message.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// All report lines so far.
    #[must_use]
    pub fn lines(&self) -> &Vector<String> {
        &self.lines
    }

    /// The most recent line, if any.
    #[must_use]
    pub fn last(&self) -> Option<&String> {
        self.lines.last()
    }

    /// Text of the last rejected action, until the next success.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Check if any line contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }
}
