//! Diagnostics reported by a transport when a fetch fails.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a resource failed to load.
///
/// Transports fill in whatever the host reported; all fields are optional
/// because many hosts report nothing beyond the failure itself.
///
/// # Examples
///
/// ```
/// use core_types::LoadFailure;
///
/// let failure = LoadFailure::new("Unexpected token").at("app.js", 12);
/// assert_eq!(failure.to_string(), "Error in line 12: \"Unexpected token\"");
///
/// assert_eq!(LoadFailure::default().to_string(), "<no info>");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadFailure {
    /// Message reported by the host
    pub message: Option<String>,
    /// File the error was reported in
    pub file: Option<String>,
    /// Line number the error was reported at
    pub line: Option<u32>,
}

impl LoadFailure {
    /// Creates a failure with a message and no location.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            file: None,
            line: None,
        }
    }

    /// Attaches a location.
    pub fn at(mut self, file: impl Into<String>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }
}

impl fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.message, self.line) {
            (Some(message), Some(line)) => write!(f, "Error in line {}: \"{}\"", line, message),
            (Some(message), None) => write!(f, "Error: \"{}\"", message),
            (None, _) => write!(f, "<no info>"),
        }
    }
}
