//! Export functionality for built models.
//!
//! This module provides the [`Exporter`] trait that turns a resolved
//! [`Model`] into an output document. It is the last stage of the pipeline.
//!
//! # Pipeline Position
//!
//! ```text
//! JSON model
//!     ↓ normalize / register
//! Registry + waiting list
//!     ↓ expand templates and chains, resolve references
//! Graph
//!     ↓ export (this module)
//! Output file
//! ```
//!
//! # Available Backends
//!
//! - [`json`] - A resolved JSON document via [`JsonExporter`].
//!
//! [`Error`] converts into [`ApinatomyError::Export`] at the crate boundary.
//!
//! [`ApinatomyError::Export`]: crate::ApinatomyError::Export

/// JSON export backend.
pub mod json;

pub use json::JsonExporter;

use std::io::Write;

use crate::Model;

/// Abstraction for export backends.
pub trait Exporter {
    /// Renders `model` in the backend's output format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if the model cannot be converted.
    fn export_model(&self, model: &Model) -> Result<String, Error>;

    /// Renders `model` and writes it to `writer`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if writing fails, and any error of
    /// [`Exporter::export_model`].
    fn write_model(&self, model: &Model, writer: &mut dyn Write) -> Result<(), Error> {
        let output = self.export_model(model)?;
        writer.write_all(output.as_bytes()).map_err(Error::Io)
    }
}

/// Errors that can occur during export.
#[derive(Debug)]
pub enum Error {
    /// A conversion failure described by `message`.
    Render(String),
    /// An I/O error encountered while writing output.
    Io(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Render(msg) => write!(f, "Render error: {msg}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Render(_) => None,
            Self::Io(err) => Some(err),
        }
    }
}
