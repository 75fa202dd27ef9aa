//! Configuration types for building and exporting models.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from a
//! TOML or JSON file. Missing sections and fields keep their defaults.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration with a `[build]` and an `[export]` section.
//! - [`BuildConfig`] - Constants of the resolution engine.
//! - [`ExportConfig`] - Shape of the exported JSON document.
//!
//! # Example
//!
//! ```
//! # use apinatomy::config::AppConfig;
//! let config = AppConfig::default();
//! assert!(config.export().pretty());
//! assert_eq!(config.build().length_scale(), 2.0);
//! ```

use serde::Deserialize;

pub use apinatomy_model::BuildConfig;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    build: BuildConfig,

    #[serde(default)]
    export: ExportConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its two sections.
    pub fn new(build: BuildConfig, export: ExportConfig) -> Self {
        Self { build, export }
    }

    pub fn build(&self) -> &BuildConfig {
        &self.build
    }

    pub fn export(&self) -> &ExportConfig {
        &self.export
    }
}

/// Controls what the JSON exporter writes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Indent the output.
    pretty: bool,

    /// Keep resources created by the engine rather than declared in the model.
    include_generated: bool,

    /// Append the diagnostics of the build.
    include_diagnostics: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            include_generated: true,
            include_diagnostics: true,
        }
    }
}

impl ExportConfig {
    /// Creates a new [`ExportConfig`].
    ///
    /// # Arguments
    ///
    /// * `pretty` - Indent the output.
    /// * `include_generated` - Keep generated resources.
    /// * `include_diagnostics` - Append the build diagnostics.
    pub fn new(pretty: bool, include_generated: bool, include_diagnostics: bool) -> Self {
        Self {
            pretty,
            include_generated,
            include_diagnostics,
        }
    }

    pub fn pretty(&self) -> bool {
        self.pretty
    }

    pub fn include_generated(&self) -> bool {
        self.include_generated
    }

    pub fn include_diagnostics(&self) -> bool {
        self.include_diagnostics
    }
}
