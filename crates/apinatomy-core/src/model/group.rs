//! Groups, chain templates, coalescences and the leaf classes they organize.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{CoalescenceTopology, ProcessType, ResourceInfo, is_false, relations};
use crate::{geometry::Range, identifier::Id};

/// A named collection of resources. The whole model is itself a group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Group {
    #[serde(flatten)]
    pub info: ResourceInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<Id>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Id>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lyphs: Vec<Id>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub regions: Vec<Id>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub chains: Vec<Id>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub coalescences: Vec<Id>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<Id>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub materials: Vec<Id>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub anchors: Vec<Id>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub wires: Vec<Id>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub externals: Vec<Id>,
    /// `{ "<array>": { field: value } }` defaults for the members of an array.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assign: Option<Value>,
    /// Color and offset ramps over group members.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpolate: Option<Value>,
}

relations!(Group {
    "nodes" => many nodes,
    "links" => many links,
    "lyphs" => many lyphs,
    "regions" => many regions,
    "chains" => many chains,
    "coalescences" => many coalescences,
    "groups" => many groups,
    "materials" => many materials,
    "anchors" => many anchors,
    "wires" => many wires,
    "externals" => many externals,
});

impl Group {
    pub fn new(info: ResourceInfo) -> Self {
        Self {
            info,
            ..Default::default()
        }
    }
}

/// A template for a linear sequence of links and their conveying lyphs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Chain {
    #[serde(flatten)]
    pub info: ResourceInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lyphs: Vec<Id>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub levels: Vec<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lyph_template: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_levels: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub housing_lyphs: Vec<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub housing_chain: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub housing_range: Option<Range>,
    /// Per-level index of the housing lyph layer to embed into.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub housing_layers: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leaf: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wired_to: Option<Id>,
    #[serde(skip_serializing_if = "is_false")]
    pub start_from_leaf: bool,
    /// Total length, divided evenly over the levels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conveying_type: Option<ProcessType>,
    /// Generated group holding the expanded resources.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<Id>,
}

relations!(Chain {
    "lyphs" => many lyphs,
    "levels" => many levels,
    "lyphTemplate" => one lyph_template,
    "housingLyphs" => many housing_lyphs,
    "housingChain" => one housing_chain,
    "root" => one root,
    "leaf" => one leaf,
    "wiredTo" => one wired_to,
    "group" => one group,
});

impl Chain {
    pub fn new(info: ResourceInfo) -> Self {
        Self {
            info,
            ..Default::default()
        }
    }

    /// Whether the chain carries enough to be expanded at all.
    pub fn is_expandable(&self) -> bool {
        self.num_levels.is_some_and(|n| n > 0)
            || !self.levels.is_empty()
            || !self.lyphs.is_empty()
            || !self.housing_lyphs.is_empty()
            || self.housing_chain.is_some()
    }
}

/// A declared adjacency between lyphs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Coalescence {
    #[serde(flatten)]
    pub info: ResourceInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topology: Option<CoalescenceTopology>,
    /// For an embedding, the first lyph houses the others.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lyphs: Vec<Id>,
}

relations!(Coalescence {
    "lyphs" => many lyphs,
});

impl Coalescence {
    pub fn new(info: ResourceInfo) -> Self {
        Self {
            info,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Material {
    #[serde(flatten)]
    pub info: ResourceInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub materials: Vec<Id>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub external: Vec<Id>,
}

relations!(Material {
    "materials" => many materials,
    "external" => many external,
});

impl Material {
    pub fn new(info: ResourceInfo) -> Self {
        Self {
            info,
            ..Default::default()
        }
    }
}

/// Reference to an external ontology term or document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct External {
    #[serde(flatten)]
    pub info: ResourceInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

relations!(External {});

impl External {
    pub fn new(info: ResourceInfo) -> Self {
        Self {
            info,
            ..Default::default()
        }
    }
}
