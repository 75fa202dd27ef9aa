//! Severity levels for diagnostics, and the overall build status they imply.

use std::fmt;

use serde::Serialize;

/// The severity level of a diagnostic.
///
/// None of them stops a build; they grade how far the resolved model may
/// deviate from what the input describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Severity {
    /// A correction or a summary that needs no action.
    Info,

    /// A conflict resolved by a precedence rule, or a skipped step.
    #[serde(rename = "Warn")]
    Warning,

    /// A structural or reference problem in the model.
    Error,
}

impl Severity {
    /// Returns `true` if this is an error severity.
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }

    /// Returns `true` if this is a warning severity.
    pub fn is_warning(&self) -> bool {
        matches!(self, Severity::Warning)
    }

    /// The matching level of the `log` facade.
    pub fn log_level(&self) -> log::Level {
        match self {
            Severity::Info => log::Level::Info,
            Severity::Warning => log::Level::Warn,
            Severity::Error => log::Level::Error,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Overall health of a build, derived from the most severe diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Status {
    #[serde(rename = "OK")]
    Ok,
    Warning,
    Error,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ok => write!(f, "OK"),
            Status::Warning => write!(f, "Warning"),
            Status::Error => write!(f, "Error"),
        }
    }
}
