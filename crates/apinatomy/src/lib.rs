//! ApiNATOMY - Build resolved connectivity models from terse JSON descriptions
//!
//! This library wraps the resolution engine with application configuration,
//! error reporting and export. A [`ModelBuilder`] turns model text into a
//! [`Model`]: the resolved [`Graph`] together with the diagnostics of the
//! build.

pub mod config;
pub mod export;

mod error;

pub use apinatomy_core::{color, geometry, identifier, model as resources, schema};
pub use apinatomy_model::{Graph, diagnostics, edit, error::ModelError};

pub use error::ApinatomyError;

use std::{fs, path::Path};

use log::{debug, info};
use serde_json::Value;

use apinatomy_model::diagnostics::{Logger, Status};

use config::AppConfig;
use export::{Exporter, JsonExporter};

/// A built model and the diagnostics recorded while building it.
#[derive(Debug)]
pub struct Model {
    graph: Graph,
    logger: Logger,
}

impl Model {
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Mutable access for editing operations and scaling.
    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    pub fn diagnostics(&self) -> &Logger {
        &self.logger
    }

    /// The overall status, from the most severe diagnostic.
    pub fn status(&self) -> Status {
        self.logger.status()
    }

    pub fn into_parts(self) -> (Graph, Logger) {
        (self.graph, self.logger)
    }
}

/// Builder for resolving and exporting ApiNATOMY models.
///
/// # Examples
///
/// ```rust,no_run
/// use apinatomy::{ModelBuilder, config::AppConfig};
///
/// let source = r#"{"chains": [{"id": "C1", "numLevels": 3}]}"#;
///
/// // With custom config
/// let builder = ModelBuilder::new(AppConfig::default());
///
/// // Resolve the model
/// let model = builder.build(source)
///     .expect("Failed to build");
///
/// // Export it as JSON
/// let json = builder.export_json(&model)
///     .expect("Failed to export");
///
/// // Or use default config
/// let builder = ModelBuilder::default();
/// ```
#[derive(Debug, Default)]
pub struct ModelBuilder {
    config: AppConfig,
}

impl ModelBuilder {
    /// Create a new model builder with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration with build and export settings
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Build a model from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ApinatomyError::Model`] if the text is not valid JSON, is
    /// not an object, or holds a value of the wrong structural type. All
    /// other problems are recorded in the model's diagnostics.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use apinatomy::ModelBuilder;
    ///
    /// let model = ModelBuilder::default()
    ///     .build(r#"{"lyphs": [{"id": "L1"}]}"#)
    ///     .expect("Failed to build model");
    /// println!("{}", model.status());
    /// ```
    pub fn build(&self, source: &str) -> Result<Model, ApinatomyError> {
        info!(bytes = source.len(); "Building model");
        let mut logger = Logger::new();
        let graph = apinatomy_model::build(source, self.config.build(), &mut logger)
            .map_err(|err| ApinatomyError::new_model_error(err, source))?;
        debug!(graph:% = graph.id(), diagnostics = logger.len(); "Model built successfully");
        Ok(Model { graph, logger })
    }

    /// Build a model from an already parsed JSON value.
    ///
    /// # Errors
    ///
    /// Same as [`ModelBuilder::build`]; the source carried by
    /// [`ApinatomyError::Model`] is the value printed back to text.
    pub fn build_value(&self, value: Value) -> Result<Model, ApinatomyError> {
        let src = value.to_string();
        let mut logger = Logger::new();
        let graph = apinatomy_model::build_value(value, self.config.build(), &mut logger)
            .map_err(|err| ApinatomyError::new_model_error(err, src))?;
        Ok(Model { graph, logger })
    }

    /// Read and build the model stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ApinatomyError::Io`] if the file cannot be read, and any
    /// error of [`ModelBuilder::build`].
    pub fn build_file(&self, path: impl AsRef<Path>) -> Result<Model, ApinatomyError> {
        let source = fs::read_to_string(path)?;
        self.build(&source)
    }

    /// Export a model as a JSON document string.
    ///
    /// # Errors
    ///
    /// Returns [`ApinatomyError::Export`] if the document cannot be rendered.
    pub fn export_json(&self, model: &Model) -> Result<String, ApinatomyError> {
        let exporter = JsonExporter::new(self.config.export().clone());
        let output = exporter.export_model(model)?;
        info!(status:% = model.status(); "JSON exported");
        Ok(output)
    }

    /// Export a model as JSON into the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ApinatomyError::Io`] if the file cannot be written, and any
    /// error of [`ModelBuilder::export_json`].
    pub fn write_json(&self, model: &Model, path: impl AsRef<Path>) -> Result<(), ApinatomyError> {
        let output = self.export_json(model)?;
        fs::write(path, output)?;
        Ok(())
    }
}
