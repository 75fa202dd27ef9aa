//! Links: directed edges between nodes, optionally conveying a lyph.

use serde::{Deserialize, Serialize};

use super::{LinkGeometry, ProcessType, ResourceInfo, is_false, relations};
use crate::identifier::Id;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Link {
    #[serde(flatten)]
    pub info: ResourceInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conveying_lyph: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conveying_type: Option<ProcessType>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conveying_materials: Vec<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<LinkGeometry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<Id>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub level_in: Vec<Id>,
    /// Lyph that bundles this link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fasciculates_in: Option<Id>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hosted_nodes: Vec<Id>,
    /// Border this link is a segment of.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_border: Option<Id>,
    /// Zero-length link keeping two nodes coincident.
    #[serde(skip_serializing_if = "is_false")]
    pub collapsible: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub external: Vec<Id>,
}

relations!(Link {
    "source" => one source,
    "target" => one target,
    "conveyingLyph" => one conveying_lyph,
    "conveyingMaterials" => many conveying_materials,
    "next" => one next,
    "prev" => one prev,
    "levelIn" => many level_in,
    "fasciculatesIn" => one fasciculates_in,
    "hostedNodes" => many hosted_nodes,
    "onBorder" => one on_border,
    "external" => many external,
});

impl Link {
    pub fn new(info: ResourceInfo) -> Self {
        Self {
            info,
            ..Default::default()
        }
    }

    /// An engine-created link from `source` to `target`.
    pub fn generated(id: Id, source: Id, target: Id) -> Self {
        Self {
            info: ResourceInfo::generated(id),
            source: Some(source),
            target: Some(target),
            ..Default::default()
        }
    }

    /// The zero-length link `lnk_<source>_<target>` joining a node to its clone.
    pub fn collapsible(source: Id, target: Id) -> Self {
        let id = crate::gen_id!("lnk", source, target);
        Self {
            geometry: Some(LinkGeometry::Invisible),
            length: Some(0.0),
            collapsible: true,
            ..Self::generated(id, source, target)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapsible_link_id() {
        let link = Link::collapsible(Id::new("n1"), Id::new("n1_clone"));
        assert_eq!(link.info.id, "lnk_n1_n1_clone");
        assert!(link.collapsible);
        assert!(link.info.generated);
        assert_eq!(link.length, Some(0.0));
    }
}
