//! The append-only buffer of diagnostics for one build.

use log::{debug, log};
use serde_json::Value;

use crate::diagnostics::{Diagnostic, LogCode, Severity, Status};

/// Collects diagnostics while a model is built.
///
/// The logger is owned by the caller and passed into every construction
/// step. Clearing it between independent builds is the caller's choice.
/// Each entry is also forwarded to the `log` facade at the matching level.
///
/// # Example
///
/// ```
/// # use apinatomy_model::diagnostics::{LogCode, Logger, Status};
/// let mut logger = Logger::new();
///
/// logger.warn(LogCode::AutoGen, ["n1", "n2"]);
/// logger.error(LogCode::RefUndefined, ["lyph_9"]);
///
/// assert_eq!(logger.len(), 2);
/// assert_eq!(logger.status(), Status::Error);
/// ```
#[derive(Debug, Default)]
pub struct Logger {
    entries: Vec<Diagnostic>,
}

impl Logger {
    /// Create a new empty logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        log!(
            diagnostic.severity().log_level(),
            code = diagnostic.code().as_str(),
            params:? = diagnostic.params();
            "{}",
            diagnostic.message()
        );
        self.entries.push(diagnostic);
    }

    /// Record an info entry.
    pub fn info<I, P>(&mut self, code: LogCode, params: I)
    where
        I: IntoIterator<Item = P>,
        P: ToString,
    {
        self.emit(Diagnostic::info(code).with_params(params));
    }

    /// Record a warning entry.
    pub fn warn<I, P>(&mut self, code: LogCode, params: I)
    where
        I: IntoIterator<Item = P>,
        P: ToString,
    {
        self.emit(Diagnostic::warning(code).with_params(params));
    }

    /// Record an error entry.
    pub fn error<I, P>(&mut self, code: LogCode, params: I)
    where
        I: IntoIterator<Item = P>,
        P: ToString,
    {
        self.emit(Diagnostic::error(code).with_params(params));
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        debug!(entries = self.entries.len(); "Clearing diagnostics");
        self.entries.clear();
    }

    /// All entries in the order they were recorded.
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries at `severity`.
    pub fn count(&self, severity: Severity) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.severity() == severity)
            .count()
    }

    /// Entries carrying `code`.
    pub fn with_code(&self, code: LogCode) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |entry| entry.code() == code)
    }

    /// Overall status: `Error` if any error was logged, else `Warning` if any
    /// warning was, else `Ok`.
    pub fn status(&self) -> Status {
        if self.count(Severity::Error) > 0 {
            Status::Error
        } else if self.count(Severity::Warning) > 0 {
            Status::Warning
        } else {
            Status::Ok
        }
    }

    /// A serializable snapshot of the entries.
    pub fn print(&self) -> Value {
        serde_json::to_value(&self.entries).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_new_is_ok() {
        let logger = Logger::new();
        assert!(logger.is_empty());
        assert_eq!(logger.status(), Status::Ok);
    }

    #[test]
    fn test_logger_info_keeps_ok_status() {
        let mut logger = Logger::new();
        logger.info(LogCode::ResourceNum, ["nodes: 1"]);
        assert_eq!(logger.status(), Status::Ok);
        assert_eq!(logger.count(Severity::Info), 1);
    }

    #[test]
    fn test_logger_warning_status() {
        let mut logger = Logger::new();
        logger.info(LogCode::ChainSlice, ["C1"]);
        logger.warn(LogCode::ChainConflict, ["C2"]);
        assert_eq!(logger.status(), Status::Warning);
    }

    #[test]
    fn test_logger_error_wins() {
        let mut logger = Logger::new();
        logger.warn(LogCode::AutoGen, ["n1"]);
        logger.error(LogCode::CoalescenceSelf, ["L1", "L1"]);
        logger.warn(LogCode::AutoGen, ["n2"]);
        assert_eq!(logger.status(), Status::Error);
        assert_eq!(logger.with_code(LogCode::AutoGen).count(), 2);
    }

    #[test]
    fn test_logger_clear() {
        let mut logger = Logger::new();
        logger.error(LogCode::RefUndefined, ["x"]);
        logger.clear();
        assert!(logger.is_empty());
        assert_eq!(logger.status(), Status::Ok);
    }

    #[test]
    fn test_logger_print_snapshot() {
        let mut logger = Logger::new();
        logger.warn(LogCode::ChainConflict2, ["C1"]);
        let printed = logger.print();
        assert_eq!(printed[0]["level"], "Warn");
        assert_eq!(printed[0]["msg"], LogCode::ChainConflict2.message());
        assert_eq!(printed[0]["params"][0], "C1");
    }
}
