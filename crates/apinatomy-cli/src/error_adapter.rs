//! Error adapter for converting ApinatomyError and build diagnostics to
//! miette reports.
//!
//! This module bridges the library's error and diagnostic types and the
//! rich report formatting used in the CLI.
//!
//! # Multi-Error Support
//!
//! The diagnostics recorded by a build are rendered one report each, so a
//! model with several dangling references lists every one of them.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, Severity as MietteSeverity, SourceSpan};

use apinatomy::{
    ApinatomyError, ModelError,
    diagnostics::{Diagnostic, Logger, Severity},
};

/// Adapter for an error that stopped the build, with the model source.
pub struct SourceAdapter<'a> {
    err: &'a ModelError,
    src: &'a str,
}

impl<'a> SourceAdapter<'a> {
    pub fn new(err: &'a ModelError, src: &'a str) -> Self {
        Self { err, src }
    }

    fn span(&self) -> Option<(SourceSpan, &'static str)> {
        match self.err {
            ModelError::Json(err) if err.line() > 0 => {
                let offset = json_offset(self.src, err.line(), err.column());
                let len = usize::from(offset < self.src.len());
                Some((SourceSpan::new(offset.into(), len), "here"))
            }
            ModelError::InvalidField { id, .. } => {
                let needle = format!("\"{id}\"");
                self.src
                    .find(&needle)
                    .map(|offset| (SourceSpan::new(offset.into(), needle.len()), "in this resource"))
            }
            _ => None,
        }
    }
}

impl fmt::Debug for SourceAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceAdapter").field("err", &self.err).finish()
    }
}

impl fmt::Display for SourceAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.err, f)
    }
}

impl std::error::Error for SourceAdapter<'_> {}

impl MietteDiagnostic for SourceAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.err {
            ModelError::Json(_) => "apinatomy::json",
            _ => "apinatomy::model",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self.err {
            ModelError::NotAnObject { .. } => Some(Box::new(
                "a model is an object holding resource arrays such as `lyphs` or `chains`",
            )),
            ModelError::Cyclic { .. } => Some(Box::new(
                "raise `build.max_drain_passes` or check for references that keep generating resources",
            )),
            _ => None,
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let (span, message) = self.span()?;
        Some(Box::new(std::iter::once(LabeledSpan::new_primary_with_span(
            Some(message.to_string()),
            span,
        ))))
    }
}

/// Adapter for one entry of the build log.
pub struct LogAdapter<'a>(pub &'a Diagnostic);

impl fmt::Debug for LogAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for LogAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.message())
    }
}

impl std::error::Error for LogAdapter<'_> {}

impl MietteDiagnostic for LogAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.0.code().as_str()))
    }

    fn severity(&self) -> Option<MietteSeverity> {
        Some(match self.0.severity() {
            Severity::Info => MietteSeverity::Advice,
            Severity::Warning => MietteSeverity::Warning,
            Severity::Error => MietteSeverity::Error,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let params = self.0.params();
        if params.is_empty() {
            return None;
        }
        Some(Box::new(format!("involves {}", params.join(", "))))
    }
}

/// Adapter for [`ApinatomyError`] variants without source information.
pub struct ErrorAdapter<'a>(pub &'a ApinatomyError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(self.0)
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            ApinatomyError::Io(_) => "apinatomy::io",
            ApinatomyError::Model { .. } => "apinatomy::model",
            ApinatomyError::Edit(_) => "apinatomy::edit",
            ApinatomyError::Export(_) => "apinatomy::export",
            ApinatomyError::Config(_) => "apinatomy::config",
        };
        Some(Box::new(code))
    }
}

/// A reportable item that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A build failure pointing into the model source.
    Source(SourceAdapter<'a>),
    /// A diagnostic recorded during the build.
    Logged(LogAdapter<'a>),
    /// A simple error without source location.
    Error(ErrorAdapter<'a>),
}

impl Reportable<'_> {
    fn as_diagnostic(&self) -> &dyn MietteDiagnostic {
        match self {
            Reportable::Source(s) => s,
            Reportable::Logged(l) => l,
            Reportable::Error(e) => e,
        }
    }
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_diagnostic(), f)
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Error(e) => std::error::Error::source(e),
            _ => None,
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.as_diagnostic().code()
    }

    fn severity(&self) -> Option<MietteSeverity> {
        self.as_diagnostic().severity()
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.as_diagnostic().help()
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.as_diagnostic().source_code()
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        self.as_diagnostic().labels()
    }
}

/// Byte offset of a 1-based line and column in `src`.
fn json_offset(src: &str, line: usize, column: usize) -> usize {
    let line_start: usize = src
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(src.len())
}

/// Convert an [`ApinatomyError`] into a list of reportable errors.
pub fn to_reportables(err: &ApinatomyError) -> Vec<Reportable<'_>> {
    match err {
        ApinatomyError::Model { err, src } => vec![Reportable::Source(SourceAdapter::new(err, src))],
        _ => vec![Reportable::Error(ErrorAdapter(err))],
    }
}

/// One reportable per logged diagnostic of exactly `severity`.
pub fn log_reportables(logger: &Logger, severity: Severity) -> Vec<Reportable<'_>> {
    logger
        .entries()
        .iter()
        .filter(|diag| diag.severity() == severity)
        .map(|diag| Reportable::Logged(LogAdapter(diag)))
        .collect()
}
