//! Shapes (lyphs and regions) and their borders.

use serde::{Deserialize, Serialize};

use super::{LyphTopology, ResourceInfo, is_false, relations};
use crate::{
    geometry::{Point, Range, Scale},
    identifier::Id,
};

/// Number of border segments of every lyph.
pub const LYPH_BORDERS: usize = 4;

/// A tissue compartment, possibly layered, possibly a template for subtypes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Lyph {
    #[serde(flatten)]
    pub info: ResourceInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topology: Option<LyphTopology>,
    #[serde(skip_serializing_if = "is_false")]
    pub is_template: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub layers: Vec<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer_in: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_in: Option<Id>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub internal_lyphs: Vec<Id>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub internal_nodes: Vec<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conveys: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supertype: Option<Id>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subtypes: Vec<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clone_of: Option<Id>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub clones: Vec<Id>,
    /// Links (chain levels) running through this lyph.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bundles: Vec<Id>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bundles_chains: Vec<Id>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub in_coalescences: Vec<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<Id>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub materials: Vec<Id>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub external: Vec<Id>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub channels: Vec<Id>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bundles_trees: Vec<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<Scale>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thickness: Option<Range>,
    /// Rotation hint in degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
    #[serde(skip_serializing_if = "is_false")]
    pub create3d: bool,
    /// Set once the lyph was expanded as a template.
    #[serde(skip)]
    pub inactive: bool,
}

relations!(Lyph {
    "layers" => many layers,
    "layerIn" => one layer_in,
    "internalIn" => one internal_in,
    "internalLyphs" => many internal_lyphs,
    "internalNodes" => many internal_nodes,
    "conveys" => one conveys,
    "supertype" => one supertype,
    "subtypes" => many subtypes,
    "cloneOf" => one clone_of,
    "clones" => many clones,
    "bundles" => many bundles,
    "bundlesChains" => many bundles_chains,
    "inCoalescences" => many in_coalescences,
    "border" => one border,
    "materials" => many materials,
    "external" => many external,
});

impl Lyph {
    pub fn new(info: ResourceInfo) -> Self {
        Self {
            info,
            ..Default::default()
        }
    }

    /// Mean thickness, counting a missing bound as 1.
    pub fn avg_thickness(&self) -> f64 {
        self.thickness.unwrap_or_default().average()
    }

    /// Mean length, counting a missing bound as 1.
    pub fn avg_length(&self) -> f64 {
        self.length.unwrap_or_default().average()
    }

    /// Width and height for an axis of `axis_length`, scaled by the lyph's percentages.
    pub fn size_for_axis(&self, axis_length: Option<f64>) -> (f64, f64) {
        let base = axis_length.filter(|length| *length != 0.0).unwrap_or(1.0);
        match self.scale {
            Some(scale) => (base * scale.width / 100.0, base * scale.height / 100.0),
            None => (base, base),
        }
    }
}

/// A flat polygonal area.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Region {
    #[serde(flatten)]
    pub info: ResourceInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub points: Vec<Point>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub internal_lyphs: Vec<Id>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub internal_nodes: Vec<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_in: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis: Option<Id>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub external: Vec<Id>,
}

relations!(Region {
    "internalLyphs" => many internal_lyphs,
    "internalNodes" => many internal_nodes,
    "internalIn" => one internal_in,
    "border" => one border,
    "axis" => one axis,
    "external" => many external,
});

impl Region {
    pub fn new(info: ResourceInfo) -> Self {
        Self {
            info,
            ..Default::default()
        }
    }
}

/// The boundary of one shape, made of segment links.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Border {
    #[serde(flatten)]
    pub info: ResourceInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<Id>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub borders: Vec<Id>,
}

relations!(Border {
    "host" => one host,
    "borders" => many borders,
});

impl Border {
    pub fn new(info: ResourceInfo) -> Self {
        Self {
            info,
            ..Default::default()
        }
    }
}
