//! Vertices: nodes, and the anchors and wires of scaffolds.

use serde::{Deserialize, Serialize};

use super::{LinkGeometry, ResourceInfo, is_false, relations};
use crate::{geometry::Point, identifier::Id};

/// A graph vertex shared by any number of links.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Node {
    #[serde(flatten)]
    pub info: ResourceInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub val: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,
    #[serde(skip_serializing_if = "is_false")]
    pub fixed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchored_to: Option<Id>,
    /// Border segment (or other link) the node sits on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosted_by: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_in: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clone_of: Option<Id>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub clones: Vec<Id>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub source_of: Vec<Id>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub target_of: Vec<Id>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub external: Vec<Id>,
}

relations!(Node {
    "anchoredTo" => one anchored_to,
    "hostedBy" => one hosted_by,
    "internalIn" => one internal_in,
    "cloneOf" => one clone_of,
    "clones" => many clones,
    "sourceOf" => many source_of,
    "targetOf" => many target_of,
    "external" => many external,
});

impl Node {
    pub fn new(info: ResourceInfo) -> Self {
        Self {
            info,
            ..Default::default()
        }
    }

    /// A copy of this node standing in for it at another position.
    ///
    /// The clone keeps the original's look but none of its relationships,
    /// and records where it came from in `cloneOf`.
    pub fn cloned_as(&self, id: Id) -> Self {
        Self {
            info: ResourceInfo {
                id,
                name: self.info.name.clone(),
                color: self.info.color.clone(),
                generated: true,
                skip_label: true,
                ..Default::default()
            },
            val: self.val,
            clone_of: Some(self.info.id),
            ..Default::default()
        }
    }
}

/// A fixed point of a scaffold that nodes can be anchored to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Anchor {
    #[serde(flatten)]
    pub info: ResourceInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchored_node: Option<Id>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub source_of: Vec<Id>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub target_of: Vec<Id>,
}

relations!(Anchor {
    "anchoredNode" => one anchored_node,
    "sourceOf" => many source_of,
    "targetOf" => many target_of,
});

impl Anchor {
    pub fn new(info: ResourceInfo) -> Self {
        Self {
            info,
            ..Default::default()
        }
    }
}

/// A scaffold edge between two anchors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Wire {
    #[serde(flatten)]
    pub info: ResourceInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<LinkGeometry>,
}

relations!(Wire {
    "source" => one source,
    "target" => one target,
});

impl Wire {
    pub fn new(info: ResourceInfo) -> Self {
        Self {
            info,
            ..Default::default()
        }
    }
}
