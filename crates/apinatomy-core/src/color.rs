//! Color handling for ApiNATOMY resources
//!
//! This module provides the [`Color`] type which wraps the `DynamicColor` type
//! from the color crate. Resources keep their colors as CSS strings; this type
//! is used to validate those strings and to build color ramps for groups.

use std::{
    hash::{Hash, Hasher},
    str::FromStr,
};

use color::{AlphaColor, DynamicColor, Srgb};

/// Default color of generated internal nodes.
pub const INTERNAL_NODE: &str = "#000";

/// Default color of generated chain links.
pub const LINK: &str = "#000";

/// Default color of generated axes and border helpers.
pub const HELPER: &str = "#ccc";

/// Wrapper around the `DynamicColor` type from the color crate
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Color {
    color: DynamicColor,
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

impl Color {
    /// Create a new `Color` from a string
    /// This will parse CSS color strings such as "#ff0000", "rgb(255, 0, 0)", "red", etc.
    ///
    /// # Examples
    ///
    /// ```
    /// use apinatomy_core::color::Color;
    ///
    /// let red = Color::new("#ff0000").unwrap();
    /// let grey = Color::new("#ccc").unwrap();
    /// ```
    pub fn new(color_str: &str) -> Result<Self, String> {
        match DynamicColor::from_str(color_str) {
            Ok(color) => Ok(Self { color }),
            Err(err) => Err(format!("invalid color `{color_str}`: {err}")),
        }
    }

    /// Linearly interpolates between this color and `other` in sRGB space.
    ///
    /// `t` is clamped to `[0, 1]`; `0` yields `self` and `1` yields `other`.
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let from = self.color.to_alpha_color::<Srgb>().components;
        let to = other.color.to_alpha_color::<Srgb>().components;
        let mut mixed = [0.0f32; 4];
        for (i, value) in mixed.iter_mut().enumerate() {
            *value = from[i] + (to[i] - from[i]) * t;
        }
        Color {
            color: DynamicColor::from_alpha_color(AlphaColor::<Srgb>::new(mixed)),
        }
    }

    /// Returns the color as a `#rrggbb` hex string, the form used in model files.
    pub fn to_hex(self) -> String {
        let rgba = self.color.to_alpha_color::<Srgb>().to_rgba8();
        format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b)
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.color)
    }
}
