//! Geometric value types carried by model resources.
//!
//! These are plain values: node layouts, region corner points, numeric ranges
//! and percentage scales. Rendering consumes them as-is.

use serde::{Deserialize, Serialize};

/// A point in model coordinates. Missing coordinates default to zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    /// Creates a point in the `z = 0` plane.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Returns this point with every coordinate multiplied by `factor`.
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
            z: self.z * factor,
        }
    }
}

/// An optional `[min, max]` interval, as used for lyph length and thickness.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Range {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl Range {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Mean of the bounds, where a missing or zero bound counts as 1.
    pub fn average(&self) -> f64 {
        let bound = |value: Option<f64>| value.filter(|v| *v != 0.0).unwrap_or(1.0);
        (bound(self.min) + bound(self.max)) / 2.0
    }

    /// Clamps the range to index bounds `[0, len]` and returns it as a slice range.
    pub fn clamp_to(&self, len: usize) -> std::ops::Range<usize> {
        let min = self.min.map_or(0.0, |v| v.max(0.0)) as usize;
        let max = self.max.map_or(len as f64, |v| v.min(len as f64).max(0.0)) as usize;
        let min = min.min(len);
        min..max.max(min)
    }
}

/// Width and height as percentages of the axis length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scale {
    pub width: f64,
    pub height: f64,
}

impl Default for Scale {
    fn default() -> Self {
        Self {
            width: 100.0,
            height: 100.0,
        }
    }
}

/// The square used for regions declared with fewer than three points.
pub fn default_region_points() -> Vec<Point> {
    vec![
        Point::new(-10.0, -10.0),
        Point::new(-10.0, 10.0),
        Point::new(10.0, 10.0),
        Point::new(10.0, -10.0),
    ]
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_range_average_defaults() {
        assert!(approx_eq!(f64, Range::default().average(), 1.0));
        assert!(approx_eq!(f64, Range::new(2.0, 4.0).average(), 3.0));
        let half = Range {
            min: None,
            max: Some(5.0),
        };
        assert!(approx_eq!(f64, half.average(), 3.0));
    }

    #[test]
    fn test_range_clamp() {
        assert_eq!(Range::new(-2.0, 10.0).clamp_to(4), 0..4);
        assert_eq!(Range::new(1.0, 3.0).clamp_to(4), 1..3);
        assert_eq!(Range::new(5.0, 2.0).clamp_to(4), 4..4);
    }

    proptest! {
        #[test]
        fn test_range_clamp_stays_in_bounds(min in -50.0f64..50.0, max in -50.0f64..50.0, len in 0usize..20) {
            let clamped = Range::new(min, max).clamp_to(len);
            prop_assert!(clamped.start <= clamped.end);
            prop_assert!(clamped.end <= len);
        }
    }

    #[test]
    fn test_point_scaled() {
        let p = Point { x: 1.0, y: -2.0, z: 0.5 }.scaled(2.0);
        assert_eq!(p, Point { x: 2.0, y: -4.0, z: 1.0 });
    }
}
