//! Diagnostics collected while a model is built.
//!
//! Model construction degrades gracefully: dangling references, conflicting
//! chain specifications and similar problems are recorded and the build
//! goes on. This module provides:
//! - A closed catalogue of message codes ([`LogCode`])
//! - Severity levels ([`Severity`]) and the derived build [`Status`]
//! - The [`Diagnostic`] entry with its parameters
//! - The [`Logger`], an append-only buffer owned by the caller
//!
//! # Example
//!
//! ```
//! # use apinatomy_model::diagnostics::{Diagnostic, LogCode, Logger, Status};
//! let mut logger = Logger::new();
//!
//! logger.emit(Diagnostic::new(LogCode::ChainConflict2).with_param("C1"));
//! assert_eq!(logger.status(), Status::Warning);
//!
//! logger.clear();
//! assert_eq!(logger.status(), Status::Ok);
//! ```

mod diagnostic;
mod log_code;
mod logger;
mod severity;

pub use diagnostic::Diagnostic;
pub use log_code::LogCode;
pub use logger::Logger;
pub use severity::{Severity, Status};
