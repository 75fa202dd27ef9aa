//! Resource data model.
//!
//! Every resource is a plain record keyed by a globally unique [`Id`].
//! References between resources are stored as identifiers and resolved
//! through a registry, so back-references never own their targets.
//!
//! The [`Resource`] enum is the closed set of concrete classes. Each variant
//! exposes its reference fields by their model-file names through the
//! [`Relations`] trait, which is what generic passes (reference scanning,
//! inverse synchronization, editing) operate on.

mod group;
mod kinds;
mod link;
mod node;
mod shape;

pub use group::{Chain, Coalescence, External, Group, Material};
pub use kinds::{CoalescenceTopology, LinkGeometry, LyphTopology, ProcessType};
pub use link::Link;
pub use node::{Anchor, Node, Wire};
pub use shape::{Border, LYPH_BORDERS, Lyph, Region};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{identifier::Id, schema::ResourceClass};

pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}

/// Fields shared by every resource class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceInfo {
    pub id: Id,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Set on resources created by the engine rather than declared in the model.
    #[serde(skip_serializing_if = "is_false")]
    pub generated: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub skip_label: bool,
}

impl ResourceInfo {
    pub fn new(id: Id) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Info for an engine-created resource.
    pub fn generated(id: Id) -> Self {
        Self {
            id,
            generated: true,
            skip_label: true,
            ..Default::default()
        }
    }
}

/// Read access to a reference field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RelationView<'a> {
    One(Option<Id>),
    Many(&'a [Id]),
}

impl RelationView<'_> {
    /// All identifiers currently referenced by the field.
    pub fn ids(&self) -> Vec<Id> {
        match self {
            RelationView::One(id) => id.iter().copied().collect(),
            RelationView::Many(ids) => ids.to_vec(),
        }
    }

    pub fn contains(&self, id: Id) -> bool {
        match self {
            RelationView::One(current) => *current == Some(id),
            RelationView::Many(ids) => ids.contains(&id),
        }
    }
}

/// Write access to a reference field.
#[derive(Debug)]
pub enum RelationSlot<'a> {
    One(&'a mut Option<Id>),
    Many(&'a mut Vec<Id>),
}

impl RelationSlot<'_> {
    /// Adds a reference.
    ///
    /// Returns `Ok(true)` when the field changed and `Ok(false)` when the
    /// reference was already present. A single-valued field that already
    /// points elsewhere is left untouched and its current value is returned
    /// as the error.
    pub fn insert(&mut self, id: Id) -> Result<bool, Id> {
        match self {
            RelationSlot::One(current) => match **current {
                None => {
                    **current = Some(id);
                    Ok(true)
                }
                Some(existing) if existing == id => Ok(false),
                Some(existing) => Err(existing),
            },
            RelationSlot::Many(ids) => {
                if ids.contains(&id) {
                    Ok(false)
                } else {
                    ids.push(id);
                    Ok(true)
                }
            }
        }
    }

    /// Replaces a single-valued reference, or appends to a list.
    pub fn set(&mut self, id: Id) {
        match self {
            RelationSlot::One(current) => **current = Some(id),
            RelationSlot::Many(ids) => {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
    }

    /// Removes one reference. Returns `true` if it was present.
    pub fn remove(&mut self, id: Id) -> bool {
        match self {
            RelationSlot::One(current) => {
                if **current == Some(id) {
                    **current = None;
                    true
                } else {
                    false
                }
            }
            RelationSlot::Many(ids) => {
                let before = ids.len();
                ids.retain(|existing| *existing != id);
                ids.len() != before
            }
        }
    }

    /// Removes every reference and returns what was removed.
    pub fn clear(&mut self) -> Vec<Id> {
        match self {
            RelationSlot::One(current) => current.take().into_iter().collect(),
            RelationSlot::Many(ids) => std::mem::take(*ids),
        }
    }
}

/// Access to the reference fields of a resource by model-file field name.
pub trait Relations {
    fn relation(&self, field: &str) -> Option<RelationView<'_>>;

    fn relation_mut(&mut self, field: &str) -> Option<RelationSlot<'_>>;
}

/// Implements [`Relations`] for a struct from a `"fieldName" => one|many field` table.
macro_rules! relations {
    (@view one $value:expr) => {
        $crate::model::RelationView::One($value)
    };
    (@view many $value:expr) => {
        $crate::model::RelationView::Many(&$value)
    };
    (@slot one $value:expr) => {
        $crate::model::RelationSlot::One(&mut $value)
    };
    (@slot many $value:expr) => {
        $crate::model::RelationSlot::Many(&mut $value)
    };
    ($ty:ty { $($key:literal => $kind:ident $field:ident),* $(,)? }) => {
        impl $crate::model::Relations for $ty {
            fn relation(&self, field: &str) -> Option<$crate::model::RelationView<'_>> {
                match field {
                    $($key => Some(relations!(@view $kind self.$field)),)*
                    _ => None,
                }
            }

            fn relation_mut(&mut self, field: &str) -> Option<$crate::model::RelationSlot<'_>> {
                match field {
                    $($key => Some(relations!(@slot $kind self.$field)),)*
                    _ => None,
                }
            }
        }
    };
}

pub(crate) use relations;

/// A live, typed resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "class")]
pub enum Resource {
    Node(Node),
    Link(Link),
    Lyph(Lyph),
    Region(Region),
    Border(Border),
    Chain(Chain),
    Group(Group),
    Coalescence(Coalescence),
    Material(Material),
    External(External),
    Anchor(Anchor),
    Wire(Wire),
}

/// Applies `$body` to the inner record of every variant.
macro_rules! each_variant {
    ($value:expr, $inner:ident => $body:expr) => {
        match $value {
            Resource::Node($inner) => $body,
            Resource::Link($inner) => $body,
            Resource::Lyph($inner) => $body,
            Resource::Region($inner) => $body,
            Resource::Border($inner) => $body,
            Resource::Chain($inner) => $body,
            Resource::Group($inner) => $body,
            Resource::Coalescence($inner) => $body,
            Resource::Material($inner) => $body,
            Resource::External($inner) => $body,
            Resource::Anchor($inner) => $body,
            Resource::Wire($inner) => $body,
        }
    };
}

impl Resource {
    /// Builds a typed resource of `class` from a normalized JSON object.
    ///
    /// # Errors
    ///
    /// Returns the deserialization error when a field holds a value of
    /// the wrong shape, or when `class` is abstract.
    pub fn from_value(class: ResourceClass, value: Value) -> Result<Self, serde_json::Error> {
        use serde::de::Error as _;

        Ok(match class {
            ResourceClass::Node => Resource::Node(serde_json::from_value(value)?),
            ResourceClass::Link => Resource::Link(serde_json::from_value(value)?),
            ResourceClass::Lyph => Resource::Lyph(serde_json::from_value(value)?),
            ResourceClass::Region => Resource::Region(serde_json::from_value(value)?),
            ResourceClass::Border => Resource::Border(serde_json::from_value(value)?),
            ResourceClass::Chain => Resource::Chain(serde_json::from_value(value)?),
            ResourceClass::Group => Resource::Group(serde_json::from_value(value)?),
            ResourceClass::Coalescence => Resource::Coalescence(serde_json::from_value(value)?),
            ResourceClass::Material => Resource::Material(serde_json::from_value(value)?),
            ResourceClass::External => Resource::External(serde_json::from_value(value)?),
            ResourceClass::Anchor => Resource::Anchor(serde_json::from_value(value)?),
            ResourceClass::Wire => Resource::Wire(serde_json::from_value(value)?),
            ResourceClass::Shape => {
                return Err(serde_json::Error::custom(
                    "cannot instantiate abstract class `Shape`",
                ));
            }
        })
    }

    /// A resource of `class` carrying nothing but its identifier.
    ///
    /// Returns `None` for abstract classes.
    pub fn stub(class: ResourceClass, id: Id) -> Option<Self> {
        let info = ResourceInfo::new(id);
        Some(match class {
            ResourceClass::Node => Resource::Node(Node::new(info)),
            ResourceClass::Link => Resource::Link(Link::new(info)),
            ResourceClass::Lyph => Resource::Lyph(Lyph::new(info)),
            ResourceClass::Region => Resource::Region(Region::new(info)),
            ResourceClass::Border => Resource::Border(Border::new(info)),
            ResourceClass::Chain => Resource::Chain(Chain::new(info)),
            ResourceClass::Group => Resource::Group(Group::new(info)),
            ResourceClass::Coalescence => Resource::Coalescence(Coalescence::new(info)),
            ResourceClass::Material => Resource::Material(Material::new(info)),
            ResourceClass::External => Resource::External(External::new(info)),
            ResourceClass::Anchor => Resource::Anchor(Anchor::new(info)),
            ResourceClass::Wire => Resource::Wire(Wire::new(info)),
            ResourceClass::Shape => return None,
        })
    }

    /// The record as a JSON object, without the `class` discriminator.
    pub fn to_value(&self) -> Value {
        let value = each_variant!(self, inner => serde_json::to_value(inner));
        value.unwrap_or(Value::Null)
    }

    pub fn class(&self) -> ResourceClass {
        match self {
            Resource::Node(_) => ResourceClass::Node,
            Resource::Link(_) => ResourceClass::Link,
            Resource::Lyph(_) => ResourceClass::Lyph,
            Resource::Region(_) => ResourceClass::Region,
            Resource::Border(_) => ResourceClass::Border,
            Resource::Chain(_) => ResourceClass::Chain,
            Resource::Group(_) => ResourceClass::Group,
            Resource::Coalescence(_) => ResourceClass::Coalescence,
            Resource::Material(_) => ResourceClass::Material,
            Resource::External(_) => ResourceClass::External,
            Resource::Anchor(_) => ResourceClass::Anchor,
            Resource::Wire(_) => ResourceClass::Wire,
        }
    }

    pub fn info(&self) -> &ResourceInfo {
        each_variant!(self, inner => &inner.info)
    }

    pub fn info_mut(&mut self) -> &mut ResourceInfo {
        each_variant!(self, inner => &mut inner.info)
    }

    pub fn id(&self) -> Id {
        self.info().id
    }

    pub fn is_generated(&self) -> bool {
        self.info().generated
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Resource::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_node_mut(&mut self) -> Option<&mut Node> {
        match self {
            Resource::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_link(&self) -> Option<&Link> {
        match self {
            Resource::Link(link) => Some(link),
            _ => None,
        }
    }

    pub fn as_link_mut(&mut self) -> Option<&mut Link> {
        match self {
            Resource::Link(link) => Some(link),
            _ => None,
        }
    }

    pub fn as_lyph(&self) -> Option<&Lyph> {
        match self {
            Resource::Lyph(lyph) => Some(lyph),
            _ => None,
        }
    }

    pub fn as_lyph_mut(&mut self) -> Option<&mut Lyph> {
        match self {
            Resource::Lyph(lyph) => Some(lyph),
            _ => None,
        }
    }

    pub fn as_region(&self) -> Option<&Region> {
        match self {
            Resource::Region(region) => Some(region),
            _ => None,
        }
    }

    pub fn as_region_mut(&mut self) -> Option<&mut Region> {
        match self {
            Resource::Region(region) => Some(region),
            _ => None,
        }
    }

    pub fn as_border(&self) -> Option<&Border> {
        match self {
            Resource::Border(border) => Some(border),
            _ => None,
        }
    }

    pub fn as_border_mut(&mut self) -> Option<&mut Border> {
        match self {
            Resource::Border(border) => Some(border),
            _ => None,
        }
    }

    pub fn as_chain(&self) -> Option<&Chain> {
        match self {
            Resource::Chain(chain) => Some(chain),
            _ => None,
        }
    }

    pub fn as_chain_mut(&mut self) -> Option<&mut Chain> {
        match self {
            Resource::Chain(chain) => Some(chain),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Resource::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_group_mut(&mut self) -> Option<&mut Group> {
        match self {
            Resource::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_coalescence(&self) -> Option<&Coalescence> {
        match self {
            Resource::Coalescence(coalescence) => Some(coalescence),
            _ => None,
        }
    }

    pub fn as_anchor(&self) -> Option<&Anchor> {
        match self {
            Resource::Anchor(anchor) => Some(anchor),
            _ => None,
        }
    }

    pub fn as_wire(&self) -> Option<&Wire> {
        match self {
            Resource::Wire(wire) => Some(wire),
            _ => None,
        }
    }
}

impl Relations for Resource {
    fn relation(&self, field: &str) -> Option<RelationView<'_>> {
        each_variant!(self, inner => inner.relation(field))
    }

    fn relation_mut(&mut self, field: &str) -> Option<RelationSlot<'_>> {
        each_variant!(self, inner => inner.relation_mut(field))
    }
}

impl From<Node> for Resource {
    fn from(node: Node) -> Self {
        Resource::Node(node)
    }
}

impl From<Link> for Resource {
    fn from(link: Link) -> Self {
        Resource::Link(link)
    }
}

impl From<Lyph> for Resource {
    fn from(lyph: Lyph) -> Self {
        Resource::Lyph(lyph)
    }
}

impl From<Border> for Resource {
    fn from(border: Border) -> Self {
        Resource::Border(border)
    }
}

impl From<Group> for Resource {
    fn from(group: Group) -> Self {
        Resource::Group(group)
    }
}

impl From<Coalescence> for Resource {
    fn from(coalescence: Coalescence) -> Self {
        Resource::Coalescence(coalescence)
    }
}
