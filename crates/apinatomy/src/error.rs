//! Error types for building and exporting models.
//!
//! [`ApinatomyError`] collects everything that stops a build. Problems that
//! leave a usable model are not errors; they end up in the build's
//! [`Logger`](apinatomy_model::diagnostics::Logger).

use std::io;

use thiserror::Error;

use apinatomy_model::{edit::EditError, error::ModelError};

/// The main error type for model operations.
///
/// The `Model` variant keeps the source text next to the error so that a
/// reporter can point at the offending position.
#[derive(Debug, Error)]
pub enum ApinatomyError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Model { err: ModelError, src: String },

    #[error("Edit error: {0}")]
    Edit(#[from] EditError),

    #[error("Export error: {0}")]
    Export(#[from] crate::export::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApinatomyError {
    /// Create a new `Model` error with the associated source text.
    pub fn new_model_error(err: ModelError, src: impl Into<String>) -> Self {
        Self::Model {
            err,
            src: src.into(),
        }
    }
}
