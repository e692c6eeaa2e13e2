//! Issue collection for netlist-reconstruction passes.
//!
//! Analysis passes report problems (an isolated contact, a transistor gate
//! with the wrong number of electrodes, an ambiguous LUT resistor) as typed
//! issues accumulated into an [`IssueSet`], decoupled from control flow.
//! Fatal conditions are represented by [`Severity::Fatal`]; a pass that
//! records one is expected to stop producing output.

#![warn(missing_docs)]

#[cfg(test)]
pub(crate) mod tests;

use std::fmt::{Debug, Display};

use serde::{Deserialize, Serialize};

/// A diagnostic issue that should be reported to users.
pub trait Diagnostic: Debug + Display {
    /// Returns an optional help message that should indicate
    /// what users need to do to resolve an issue.
    fn help(&self) -> Option<Box<dyn Display>> {
        None
    }

    /// Returns the severity of this issue.
    ///
    /// The default implementation returns [`Severity::default`].
    fn severity(&self) -> Severity {
        Default::default()
    }

    /// Logs this issue at the tracing level matching its severity.
    fn log(&self) {
        match self.severity() {
            Severity::Info => tracing::info!("{}", self),
            Severity::Warning => tracing::warn!("{}", self),
            Severity::Error => tracing::error!("{}", self),
            Severity::Fatal => tracing::error!("fatal: {}", self),
        }
    }
}

/// An enumeration of possible severity levels.
#[derive(
    Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize,
)]
pub enum Severity {
    /// An informational message.
    Info,
    /// A warning. The offending element is skipped; analysis continues.
    #[default]
    Warning,
    /// An error. The affected result is unreliable, but the run continues.
    Error,
    /// A run-terminating condition. No downstream output can be trusted.
    Fatal,
}

impl Severity {
    /// Returns the log level corresponding to this severity.
    ///
    /// [`Severity::Fatal`] maps to [`tracing::Level::ERROR`]; the
    /// run-terminating distinction is carried by the issue itself.
    #[inline]
    pub const fn as_tracing_level(&self) -> tracing::Level {
        match *self {
            Self::Info => tracing::Level::INFO,
            Self::Warning => tracing::Level::WARN,
            Self::Error | Self::Fatal => tracing::Level::ERROR,
        }
    }

    /// Returns `true` if the severity is [`Severity::Error`] or worse.
    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(*self, Self::Error | Self::Fatal)
    }

    /// Returns `true` if the severity is [`Severity::Fatal`].
    #[inline]
    pub fn is_fatal(&self) -> bool {
        matches!(*self, Self::Fatal)
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
            Self::Fatal => write!(f, "fatal"),
        }
    }
}

/// A collection of issues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueSet<T> {
    issues: Vec<T>,
    num_warnings: usize,
    num_errors: usize,
    num_fatal: usize,
}

impl<T> IssueSet<T> {
    /// Creates a new, empty issue set.
    #[inline]
    pub fn new() -> Self {
        Self {
            issues: Vec::new(),
            num_warnings: 0,
            num_errors: 0,
            num_fatal: 0,
        }
    }

    /// Returns an iterator over all issues in the set.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.issues.iter()
    }

    /// The number of issues in this issue set.
    #[inline]
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Returns `true` if this issue set is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

impl<T: Diagnostic> IssueSet<T> {
    /// Adds the given issue to the issue set.
    #[inline]
    pub fn add(&mut self, issue: T) {
        match issue.severity() {
            Severity::Warning => self.num_warnings += 1,
            Severity::Error => self.num_errors += 1,
            Severity::Fatal => self.num_fatal += 1,
            _ => (),
        };
        self.issues.push(issue);
    }

    /// Adds the given issue to the issue set and logs it immediately.
    pub fn add_and_log(&mut self, issue: T) {
        issue.log();
        self.add(issue);
    }

    /// Returns the worst severity present in this set, if the set is nonempty.
    pub fn worst_severity(&self) -> Option<Severity> {
        self.issues.iter().map(|i| i.severity()).max()
    }

    /// Returns `true` if this issue set contains an error or worse.
    pub fn has_error(&self) -> bool {
        self.num_errors > 0 || self.num_fatal > 0
    }

    /// The number of (non-fatal) errors in this issue set.
    #[inline]
    pub fn num_errors(&self) -> usize {
        self.num_errors
    }

    /// Returns `true` if this issue set contains a warning.
    pub fn has_warning(&self) -> bool {
        self.num_warnings > 0
    }

    /// The number of warnings in this issue set.
    #[inline]
    pub fn num_warnings(&self) -> usize {
        self.num_warnings
    }

    /// Returns `true` if this issue set contains a fatal issue.
    pub fn has_fatal(&self) -> bool {
        self.num_fatal > 0
    }

    /// The number of fatal issues in this issue set.
    #[inline]
    pub fn num_fatal(&self) -> usize {
        self.num_fatal
    }
}

impl<T> IntoIterator for IssueSet<T> {
    type Item = T;
    type IntoIter = <std::vec::Vec<T> as IntoIterator>::IntoIter;
    fn into_iter(self) -> Self::IntoIter {
        self.issues.into_iter()
    }
}

impl<T> Default for IssueSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Display> Display for IssueSet<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for issue in self.issues.iter() {
            writeln!(f, "{}", issue)?;
        }
        Ok(())
    }
}
