//! Constants that steer a model build.
//!
//! [`BuildConfig`] implements [`serde::Deserialize`] so it can be loaded as
//! the `[build]` section of an application configuration file. Every field
//! is optional and falls back to the value in [`BuildConfig::default`].
//!
//! # Example
//!
//! ```
//! # use apinatomy_model::BuildConfig;
//! let config: BuildConfig = serde_json::from_str(r#"{"length_scale": 1.0}"#).unwrap();
//! assert_eq!(config.length_scale(), 1.0);
//! assert_eq!(config.default_link_length(), 4.0);
//! ```

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Length given to links that do not declare one.
    default_link_length: f64,
    /// Ratio of a generated axis to the axis of its container.
    internal_axis_factor: f64,
    /// Factor applied to every link length as the last step.
    length_scale: f64,
    /// Rotation in degrees of the non-primary lyphs of a coalescence.
    coalescence_angle: f64,
    /// Cap on waiting list passes before references count as cyclic.
    max_drain_passes: usize,
    resize_chain_lyphs: bool,
    same_width: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            default_link_length: 4.0,
            internal_axis_factor: 0.8,
            length_scale: 2.0,
            coalescence_angle: 180.0,
            max_drain_passes: 8,
            resize_chain_lyphs: false,
            same_width: true,
        }
    }
}

impl BuildConfig {
    pub fn default_link_length(&self) -> f64 {
        self.default_link_length
    }

    pub fn internal_axis_factor(&self) -> f64 {
        self.internal_axis_factor
    }

    pub fn length_scale(&self) -> f64 {
        self.length_scale
    }

    pub fn coalescence_angle(&self) -> f64 {
        self.coalescence_angle
    }

    pub fn max_drain_passes(&self) -> usize {
        self.max_drain_passes
    }

    /// Whether the lyphs of every chain are resized after the build.
    pub fn resize_chain_lyphs(&self) -> bool {
        self.resize_chain_lyphs
    }

    /// Whether resized chain lyphs all get the narrowest width.
    pub fn same_width(&self) -> bool {
        self.same_width
    }

    /// Returns the configuration with another final length factor.
    pub fn with_length_scale(mut self, length_scale: f64) -> Self {
        self.length_scale = length_scale;
        self
    }

    /// Returns the configuration with chain lyph resizing switched on or off.
    pub fn with_resize_chain_lyphs(mut self, resize: bool, same_width: bool) -> Self {
        self.resize_chain_lyphs = resize;
        self.same_width = same_width;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: BuildConfig =
            serde_json::from_str(r#"{"max_drain_passes": 2, "resize_chain_lyphs": true}"#).unwrap();
        assert_eq!(config.max_drain_passes(), 2);
        assert!(config.resize_chain_lyphs());
        assert!(config.same_width());
        assert_eq!(config.coalescence_angle(), 180.0);
    }

    #[test]
    fn test_builders() {
        let config = BuildConfig::default()
            .with_length_scale(1.0)
            .with_resize_chain_lyphs(true, false);
        assert_eq!(config.length_scale(), 1.0);
        assert!(config.resize_chain_lyphs());
        assert!(!config.same_width());
    }
}
