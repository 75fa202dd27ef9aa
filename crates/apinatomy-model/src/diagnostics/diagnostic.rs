//! A single diagnostic entry.

use std::fmt;

use serde::Serialize;

use crate::diagnostics::{LogCode, Severity};

/// One entry of the build log.
///
/// A diagnostic carries:
/// - A severity level, by default the one of its code
/// - A [`LogCode`] and the code's message
/// - Parameters naming the resources involved
///
/// # Example
///
/// ```text
/// error[CHAIN_LEVEL_ERROR]: A mismatch between link ends found at level (2, n2, n3)
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    #[serde(rename = "level")]
    severity: Severity,
    code: LogCode,
    #[serde(rename = "msg")]
    message: &'static str,
    params: Vec<String>,
}

impl Diagnostic {
    /// Create a diagnostic at the default severity of `code`.
    ///
    /// # Example
    ///
    /// ```
    /// # use apinatomy_model::diagnostics::{Diagnostic, LogCode, Severity};
    /// let diag = Diagnostic::new(LogCode::RefUndefined).with_param("lyph_7");
    /// assert_eq!(diag.severity(), Severity::Error);
    /// ```
    pub fn new(code: LogCode) -> Self {
        Self {
            severity: code.severity(),
            code,
            message: code.message(),
            params: Vec::new(),
        }
    }

    /// Create an error diagnostic regardless of the code's default severity.
    pub fn error(code: LogCode) -> Self {
        Self::new(code).with_severity(Severity::Error)
    }

    /// Create a warning diagnostic regardless of the code's default severity.
    pub fn warning(code: LogCode) -> Self {
        Self::new(code).with_severity(Severity::Warning)
    }

    /// Create an info diagnostic regardless of the code's default severity.
    pub fn info(code: LogCode) -> Self {
        Self::new(code).with_severity(Severity::Info)
    }

    /// Get the severity of this diagnostic.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Get the code.
    pub fn code(&self) -> LogCode {
        self.code
    }

    /// Get the message.
    pub fn message(&self) -> &str {
        self.message
    }

    /// Get the parameters.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Set the severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Append one parameter.
    pub fn with_param(mut self, param: impl ToString) -> Self {
        self.params.push(param.to_string());
        self
    }

    /// Append several parameters.
    pub fn with_params<I, P>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: ToString,
    {
        self.params
            .extend(params.into_iter().map(|param| param.to_string()));
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "warning[CHAIN_CONFLICT2]: message (param, ...)"
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)?;
        if !self.params.is_empty() {
            write!(f, " ({})", self.params.join(", "))?;
        }
        Ok(())
    }
}
