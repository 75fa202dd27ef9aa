//! ApiNATOMY model resolution engine.
//!
//! Turns a terse JSON model into a fully resolved graph of typed resources:
//! missing identifiers and referenced resources are generated, lyph
//! templates are expanded into their subtypes, chains are expanded into
//! nodes, links and conveying lyphs and embedded in their housing lyphs,
//! and inverse references are kept consistent. Everything that goes wrong
//! without corrupting the model is recorded in a [`diagnostics::Logger`].
//!
//! # Example
//!
//! ```
//! use apinatomy_model::{BuildConfig, build, diagnostics::{Logger, Status}};
//!
//! let json = r#"{
//!     "id": "demo",
//!     "chains": [{"id": "C1", "lyphs": ["A", "B"], "root": "n0", "leaf": "n3"}],
//!     "lyphs": [{"id": "A"}, {"id": "B"}]
//! }"#;
//!
//! let mut logger = Logger::new();
//! let graph = build(json, &BuildConfig::default(), &mut logger).unwrap();
//! let chain = graph.chains().next().unwrap();
//!
//! assert_eq!(chain.levels.len(), 2);
//! assert_ne!(logger.status(), Status::Error);
//! ```

pub mod chain;
pub mod config;
pub mod diagnostics;
pub mod edit;
pub mod error;
pub mod graph;
pub mod lyph;
mod normalize;
pub mod registry;
pub mod shape;
mod sync;

pub use config::BuildConfig;
pub use graph::{Graph, build, build_value};
pub use normalize::DEFAULT_GRAPH_ID;
