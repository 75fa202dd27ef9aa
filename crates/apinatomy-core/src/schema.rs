//! The closed class table.
//!
//! Every resource class is a [`ResourceClass`] variant with a static list of
//! [`FieldSpec`]s. The table drives JSON normalization, reference scanning,
//! auto-creation of missing resources, inverse synchronization and editing,
//! so all class-dependent dispatch goes through a single lookup.

use std::{fmt, str::FromStr};

use crate::model::{CoalescenceTopology, LinkGeometry, LyphTopology, ProcessType};

/// Concrete resource classes, plus the abstract `Shape`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceClass {
    Node,
    Link,
    Lyph,
    Region,
    Border,
    Chain,
    Group,
    Coalescence,
    Material,
    External,
    Anchor,
    Wire,
    /// Either a lyph or a region.
    Shape,
}

impl ResourceClass {
    /// All classes that can be instantiated, in export order.
    pub const CONCRETE: [ResourceClass; 12] = [
        ResourceClass::Group,
        ResourceClass::Node,
        ResourceClass::Link,
        ResourceClass::Lyph,
        ResourceClass::Region,
        ResourceClass::Border,
        ResourceClass::Chain,
        ResourceClass::Coalescence,
        ResourceClass::Material,
        ResourceClass::External,
        ResourceClass::Anchor,
        ResourceClass::Wire,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceClass::Node => "Node",
            ResourceClass::Link => "Link",
            ResourceClass::Lyph => "Lyph",
            ResourceClass::Region => "Region",
            ResourceClass::Border => "Border",
            ResourceClass::Chain => "Chain",
            ResourceClass::Group => "Group",
            ResourceClass::Coalescence => "Coalescence",
            ResourceClass::Material => "Material",
            ResourceClass::External => "External",
            ResourceClass::Anchor => "Anchor",
            ResourceClass::Wire => "Wire",
            ResourceClass::Shape => "Shape",
        }
    }

    pub fn is_abstract(&self) -> bool {
        matches!(self, ResourceClass::Shape)
    }

    /// Whether a resource of this class may stand where `expected` is required.
    pub fn is_a(&self, expected: ResourceClass) -> bool {
        *self == expected
            || (expected == ResourceClass::Shape
                && matches!(self, ResourceClass::Lyph | ResourceClass::Region))
    }

    /// Prefix of identifiers generated for resources that lack one.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            ResourceClass::Node => "node",
            ResourceClass::Link => "lnk",
            ResourceClass::Lyph => "lyph",
            ResourceClass::Region => "region",
            ResourceClass::Border => "border",
            ResourceClass::Chain => "chain",
            ResourceClass::Group => "group",
            ResourceClass::Coalescence => "clsn",
            ResourceClass::Material => "mat",
            ResourceClass::External => "ext",
            ResourceClass::Anchor => "anchor",
            ResourceClass::Wire => "wire",
            ResourceClass::Shape => "shape",
        }
    }

    /// The group array that holds members of this class.
    pub fn group_field(&self) -> Option<&'static str> {
        match self {
            ResourceClass::Node => Some("nodes"),
            ResourceClass::Link => Some("links"),
            ResourceClass::Lyph => Some("lyphs"),
            ResourceClass::Region => Some("regions"),
            ResourceClass::Chain => Some("chains"),
            ResourceClass::Group => Some("groups"),
            ResourceClass::Coalescence => Some("coalescences"),
            ResourceClass::Material => Some("materials"),
            ResourceClass::External => Some("externals"),
            ResourceClass::Anchor => Some("anchors"),
            ResourceClass::Wire => Some("wires"),
            ResourceClass::Border | ResourceClass::Shape => None,
        }
    }

    /// Class-specific fields, excluding the ones in [`COMMON_FIELDS`].
    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            ResourceClass::Node => NODE_FIELDS,
            ResourceClass::Link => LINK_FIELDS,
            ResourceClass::Lyph => LYPH_FIELDS,
            ResourceClass::Region => REGION_FIELDS,
            ResourceClass::Border => BORDER_FIELDS,
            ResourceClass::Chain => CHAIN_FIELDS,
            ResourceClass::Group => GROUP_FIELDS,
            ResourceClass::Coalescence => COALESCENCE_FIELDS,
            ResourceClass::Material => MATERIAL_FIELDS,
            ResourceClass::External => EXTERNAL_FIELDS,
            ResourceClass::Anchor => ANCHOR_FIELDS,
            ResourceClass::Wire => WIRE_FIELDS,
            ResourceClass::Shape => &[],
        }
    }

    /// Looks up a field by its model-file name.
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        COMMON_FIELDS
            .iter()
            .chain(self.fields())
            .find(|spec| spec.name == name)
    }

    /// Looks up a reference field by its model-file name.
    pub fn relation(&self, name: &str) -> Option<&'static RelationSpec> {
        match self.field(name).map(|spec| &spec.kind) {
            Some(FieldKind::Relation(relation)) => Some(relation),
            _ => None,
        }
    }

    /// Reference fields of this class, with their specs.
    pub fn relations(&self) -> impl Iterator<Item = (&'static str, &'static RelationSpec)> {
        self.fields().iter().filter_map(|spec| match &spec.kind {
            FieldKind::Relation(relation) => Some((spec.name, relation)),
            _ => None,
        })
    }
}

impl FromStr for ResourceClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceClass::CONCRETE
            .iter()
            .chain(std::iter::once(&ResourceClass::Shape))
            .find(|class| class.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown resource class `{s}`"))
    }
}

impl fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Enumerated field value sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    LyphTopology,
    LinkGeometry,
    ProcessType,
    CoalescenceTopology,
}

impl Choice {
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            Choice::LyphTopology => value.parse::<LyphTopology>().is_ok(),
            Choice::LinkGeometry => value.parse::<LinkGeometry>().is_ok(),
            Choice::ProcessType => value.parse::<ProcessType>().is_ok(),
            Choice::CoalescenceTopology => value.parse::<CoalescenceTopology>().is_ok(),
        }
    }
}

/// A reference field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationSpec {
    /// Class of the referenced resources; may be abstract.
    pub target: ResourceClass,
    pub many: bool,
    /// Field on the target that refers back.
    pub inverse: Option<&'static str>,
}

/// Shape of the value a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// A CSS color string.
    Color,
    Number,
    /// A non-negative integer.
    Count,
    Flag,
    Choice(Choice),
    Point,
    Points,
    Range,
    Scale,
    Integers,
    /// Free-form JSON kept as is.
    Opaque,
    /// Identifiers that are not resolved against the registry.
    OpaqueIds,
    Relation(RelationSpec),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn field(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { name, kind }
}

const fn one(name: &'static str, target: ResourceClass, inverse: Option<&'static str>) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::Relation(RelationSpec {
            target,
            many: false,
            inverse,
        }),
    }
}

const fn many(
    name: &'static str,
    target: ResourceClass,
    inverse: Option<&'static str>,
) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::Relation(RelationSpec {
            target,
            many: true,
            inverse,
        }),
    }
}

use FieldKind::{Color, Count, Flag, Integers, Number, Opaque, OpaqueIds, Points, Text};
use ResourceClass as C;

/// Fields every class carries. `id` is handled separately.
pub static COMMON_FIELDS: &[FieldSpec] = &[
    field("name", Text),
    field("color", Color),
    field("description", Text),
    field("generated", Flag),
    field("skipLabel", Flag),
];

static NODE_FIELDS: &[FieldSpec] = &[
    field("layout", FieldKind::Point),
    field("val", Number),
    field("offset", Number),
    field("fixed", Flag),
    one("anchoredTo", C::Anchor, Some("anchoredNode")),
    one("hostedBy", C::Link, Some("hostedNodes")),
    one("internalIn", C::Shape, Some("internalNodes")),
    one("cloneOf", C::Node, Some("clones")),
    many("clones", C::Node, Some("cloneOf")),
    many("sourceOf", C::Link, Some("source")),
    many("targetOf", C::Link, Some("target")),
    many("external", C::External, None),
];

static LINK_FIELDS: &[FieldSpec] = &[
    one("source", C::Node, Some("sourceOf")),
    one("target", C::Node, Some("targetOf")),
    one("conveyingLyph", C::Lyph, Some("conveys")),
    field("conveyingType", FieldKind::Choice(Choice::ProcessType)),
    many("conveyingMaterials", C::Material, None),
    field("length", Number),
    field("geometry", FieldKind::Choice(Choice::LinkGeometry)),
    one("next", C::Link, Some("prev")),
    one("prev", C::Link, Some("next")),
    many("levelIn", C::Chain, Some("levels")),
    one("fasciculatesIn", C::Lyph, Some("bundles")),
    many("hostedNodes", C::Node, Some("hostedBy")),
    one("onBorder", C::Border, Some("borders")),
    field("collapsible", Flag),
    many("external", C::External, None),
];

static LYPH_FIELDS: &[FieldSpec] = &[
    field("topology", FieldKind::Choice(Choice::LyphTopology)),
    field("isTemplate", Flag),
    many("layers", C::Lyph, Some("layerIn")),
    one("layerIn", C::Lyph, Some("layers")),
    one("internalIn", C::Shape, Some("internalLyphs")),
    many("internalLyphs", C::Shape, Some("internalIn")),
    many("internalNodes", C::Node, Some("internalIn")),
    one("conveys", C::Link, Some("conveyingLyph")),
    one("supertype", C::Lyph, Some("subtypes")),
    many("subtypes", C::Lyph, Some("supertype")),
    one("cloneOf", C::Lyph, Some("clones")),
    many("clones", C::Lyph, Some("cloneOf")),
    many("bundles", C::Link, Some("fasciculatesIn")),
    many("bundlesChains", C::Chain, None),
    many("inCoalescences", C::Coalescence, Some("lyphs")),
    one("border", C::Border, Some("host")),
    many("materials", C::Material, None),
    many("external", C::External, None),
    field("channels", OpaqueIds),
    field("bundlesTrees", OpaqueIds),
    field("scale", FieldKind::Scale),
    field("width", Number),
    field("height", Number),
    field("length", FieldKind::Range),
    field("thickness", FieldKind::Range),
    field("angle", Number),
    field("create3d", Flag),
];

static REGION_FIELDS: &[FieldSpec] = &[
    field("points", Points),
    many("internalLyphs", C::Shape, Some("internalIn")),
    many("internalNodes", C::Node, Some("internalIn")),
    one("internalIn", C::Shape, Some("internalLyphs")),
    one("border", C::Border, Some("host")),
    one("axis", C::Link, None),
    many("external", C::External, None),
];

static BORDER_FIELDS: &[FieldSpec] = &[
    one("host", C::Shape, Some("border")),
    many("borders", C::Link, Some("onBorder")),
];

static CHAIN_FIELDS: &[FieldSpec] = &[
    many("lyphs", C::Lyph, None),
    many("levels", C::Link, Some("levelIn")),
    one("lyphTemplate", C::Lyph, None),
    field("numLevels", Count),
    many("housingLyphs", C::Lyph, None),
    one("housingChain", C::Chain, None),
    field("housingRange", FieldKind::Range),
    field("housingLayers", Integers),
    one("root", C::Node, None),
    one("leaf", C::Node, None),
    one("wiredTo", C::Wire, None),
    field("startFromLeaf", Flag),
    field("length", Number),
    field("conveyingType", FieldKind::Choice(Choice::ProcessType)),
    one("group", C::Group, None),
];

static GROUP_FIELDS: &[FieldSpec] = &[
    many("nodes", C::Node, None),
    many("links", C::Link, None),
    many("lyphs", C::Lyph, None),
    many("regions", C::Region, None),
    many("chains", C::Chain, None),
    many("coalescences", C::Coalescence, None),
    many("groups", C::Group, None),
    many("materials", C::Material, None),
    many("anchors", C::Anchor, None),
    many("wires", C::Wire, None),
    many("externals", C::External, None),
    field("assign", Opaque),
    field("interpolate", Opaque),
];

static COALESCENCE_FIELDS: &[FieldSpec] = &[
    field("topology", FieldKind::Choice(Choice::CoalescenceTopology)),
    many("lyphs", C::Lyph, Some("inCoalescences")),
];

static MATERIAL_FIELDS: &[FieldSpec] = &[
    many("materials", C::Material, None),
    many("external", C::External, None),
];

static EXTERNAL_FIELDS: &[FieldSpec] = &[field("uri", Text), field("type", Text)];

static ANCHOR_FIELDS: &[FieldSpec] = &[
    field("layout", FieldKind::Point),
    one("anchoredNode", C::Node, Some("anchoredTo")),
    many("sourceOf", C::Wire, Some("source")),
    many("targetOf", C::Wire, Some("target")),
];

static WIRE_FIELDS: &[FieldSpec] = &[
    one("source", C::Anchor, Some("sourceOf")),
    one("target", C::Anchor, Some("targetOf")),
    field("geometry", FieldKind::Choice(Choice::LinkGeometry)),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        identifier::Id,
        model::{Relations, Resource},
    };

    #[test]
    fn test_class_round_trip_names() {
        for class in ResourceClass::CONCRETE {
            assert_eq!(class.as_str().parse::<ResourceClass>().unwrap(), class);
        }
        assert!("Villus".parse::<ResourceClass>().is_err());
    }

    #[test]
    fn test_shape_is_abstract() {
        assert!(ResourceClass::Shape.is_abstract());
        assert!(ResourceClass::Lyph.is_a(ResourceClass::Shape));
        assert!(ResourceClass::Region.is_a(ResourceClass::Shape));
        assert!(!ResourceClass::Node.is_a(ResourceClass::Shape));
    }

    #[test]
    fn test_inverse_fields_point_back() {
        for class in ResourceClass::CONCRETE {
            for (name, relation) in class.relations() {
                let Some(inverse) = relation.inverse else {
                    continue;
                };
                let targets: Vec<ResourceClass> = if relation.target.is_abstract() {
                    vec![ResourceClass::Lyph, ResourceClass::Region]
                } else {
                    vec![relation.target]
                };
                for target in targets {
                    let back = target
                        .relation(inverse)
                        .unwrap_or_else(|| panic!("{class}.{name} -> {target}.{inverse}"));
                    assert!(class.is_a(back.target), "{target}.{inverse} does not accept {class}");
                }
            }
        }
    }

    #[test]
    fn test_schema_matches_records() {
        for class in ResourceClass::CONCRETE {
            let resource = Resource::stub(class, Id::new("probe")).unwrap();
            for (name, _) in class.relations() {
                assert!(
                    resource.relation(name).is_some(),
                    "{class}.{name} has no record field"
                );
            }
        }
    }
}
