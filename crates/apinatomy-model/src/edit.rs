//! Editing operations on a built graph.
//!
//! These are the entry points an editor calls after a build: change a
//! value field, create a resource in a relationship field, or remove
//! references. Every change keeps inverse fields in step.

use serde_json::Value;
use thiserror::Error;

use apinatomy_core::{
    identifier::Id,
    model::{RelationView, Relations, Resource},
    schema::{FieldKind, RelationSpec, ResourceClass},
};

use crate::{error::json_type, graph::Graph, registry::Registry, sync};

#[derive(Debug, Error)]
pub enum EditError {
    #[error("unknown resource `{0}`")]
    UnknownResource(Id),

    #[error("{class} has no field `{field}`")]
    UnknownField { class: ResourceClass, field: String },

    #[error("`{field}` of {class} is not a relationship")]
    NotARelation { class: ResourceClass, field: String },

    #[error("`{field}` of {class} holds references, not a value")]
    NotAScalar { class: ResourceClass, field: String },

    #[error("`{field}` refers to the abstract class {target}; the new resource must name its `class`")]
    AbstractTarget { field: String, target: ResourceClass },

    #[error("invalid value for `{field}` of `{id}`: {reason}")]
    InvalidValue { id: Id, field: String, reason: String },

    #[error("`{field}` of `{id}` already refers to `{existing}`")]
    InverseTaken { id: Id, field: String, existing: Id },
}

impl EditError {
    fn invalid(id: Id, field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            id,
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

fn class_of(registry: &Registry, id: Id) -> Result<ResourceClass, EditError> {
    registry.class_of(id).ok_or(EditError::UnknownResource(id))
}

fn relation_spec(class: ResourceClass, field: &str) -> Result<&'static RelationSpec, EditError> {
    match class.field(field).map(|spec| &spec.kind) {
        Some(FieldKind::Relation(relation)) => Ok(relation),
        Some(_) => Err(EditError::NotARelation {
            class,
            field: field.to_string(),
        }),
        None => Err(EditError::UnknownField {
            class,
            field: field.to_string(),
        }),
    }
}

/// Rebuilds `resource` from its JSON form with `field` set to `value`.
fn with_field(resource: &Resource, field: &str, value: Value) -> Result<Resource, EditError> {
    let id = resource.id();
    let Value::Object(mut record) = resource.to_value() else {
        return Err(EditError::invalid(id, field, "resource has no JSON form"));
    };
    if value.is_null() {
        record.remove(field);
    } else {
        record.insert(field.to_string(), value);
    }
    let mut updated = Resource::from_value(resource.class(), Value::Object(record))
        .map_err(|err| EditError::invalid(id, field, err.to_string()))?;
    if let (Some(lyph), Some(before)) = (updated.as_lyph_mut(), resource.as_lyph()) {
        lyph.inactive = before.inactive;
    }
    Ok(updated)
}

impl Graph {
    /// Sets a value field of a resource; `null` unsets it.
    ///
    /// # Errors
    ///
    /// Fails if the resource or field is unknown, if the field holds
    /// references, or if `value` does not fit the field.
    pub fn update_value(&mut self, id: Id, field: &str, value: Value) -> Result<(), EditError> {
        let registry = self.registry_mut();
        let class = class_of(registry, id)?;
        if field == "id" {
            return Err(EditError::invalid(id, field, "identifiers cannot be changed"));
        }
        match class.field(field).map(|spec| spec.kind) {
            None => {
                return Err(EditError::UnknownField {
                    class,
                    field: field.to_string(),
                });
            }
            Some(FieldKind::Relation(_)) => {
                return Err(EditError::NotAScalar {
                    class,
                    field: field.to_string(),
                });
            }
            Some(_) => {}
        }
        let resource = registry.get(id).ok_or(EditError::UnknownResource(id))?;
        let updated = with_field(resource, field, value)?;
        if let Some(slot) = registry.get_mut(id) {
            *slot = updated;
        }
        Ok(())
    }

    /// Creates a resource from `value` and links it through `field` of `id`.
    ///
    /// The new resource has the target class of the field, or the class
    /// named by its `class` member, which is required for abstract targets.
    /// A missing identifier is generated. The new resource joins the group
    /// of its owner and its inverse field points back at the owner. Returns
    /// the identifier of the new resource.
    ///
    /// # Errors
    ///
    /// Fails if the owner or field is unknown, if the field is not a
    /// relationship, or if `value` does not describe a valid new resource.
    pub fn create_related_resource(
        &mut self,
        id: Id,
        field: &str,
        value: Value,
    ) -> Result<Id, EditError> {
        let root = self.id();
        let registry = self.registry_mut();
        let owner_class = class_of(registry, id)?;
        let relation = *relation_spec(owner_class, field)?;

        let Value::Object(mut record) = value else {
            return Err(EditError::invalid(
                id,
                field,
                format!("expected a resource object, found {}", json_type(&value)),
            ));
        };
        let class = match record.remove("class") {
            Some(Value::String(name)) => match name.parse::<ResourceClass>() {
                Ok(class) if class.is_a(relation.target) => class,
                _ => {
                    return Err(EditError::invalid(
                        id,
                        field,
                        format!("`{name}` is not a {}", relation.target),
                    ));
                }
            },
            Some(other) => {
                return Err(EditError::invalid(
                    id,
                    field,
                    format!("expected a class name, found {}", json_type(&other)),
                ));
            }
            None => relation.target,
        };
        if class.is_abstract() {
            return Err(EditError::AbstractTarget {
                field: field.to_string(),
                target: class,
            });
        }

        let new_id = match record.get("id") {
            Some(Value::String(name)) if !name.is_empty() => Id::new(name),
            _ => registry.next_id(class),
        };
        if registry.contains(new_id) {
            return Err(EditError::invalid(id, field, format!("`{new_id}` already exists")));
        }
        record.insert("id".into(), Value::String(new_id.to_string()));
        let resource = Resource::from_value(class, Value::Object(record))
            .map_err(|err| EditError::invalid(new_id, field, err.to_string()))?;
        if let Some(inverse) = relation.inverse {
            if let Some(RelationView::One(Some(existing))) = resource.relation(inverse) {
                if existing != id {
                    return Err(EditError::InverseTaken {
                        id: new_id,
                        field: inverse.to_string(),
                        existing,
                    });
                }
            }
        }
        registry
            .register(resource)
            .map_err(|err| EditError::invalid(new_id, field, err.to_string()))?;
        let group = registry.group_of(id).unwrap_or(root);
        registry.join(group, new_id);

        let replaced = match registry.get_mut(id).and_then(|owner| owner.relation_mut(field)) {
            Some(mut slot) => {
                let replaced = if relation.many { Vec::new() } else { slot.clear() };
                slot.set(new_id);
                replaced
            }
            None => Vec::new(),
        };
        sync::unlink_inverse(registry, id, field, &replaced);
        if let Some(inverse) = relation.inverse {
            if let Some(mut slot) = registry
                .get_mut(new_id)
                .and_then(|resource| resource.relation_mut(inverse))
            {
                slot.set(id);
            }
        }
        Ok(new_id)
    }

    /// Removes `target` from `field` of `id`, or every reference when
    /// `target` is `None`, together with the inverse references. Returns
    /// the identifiers that were removed.
    ///
    /// # Errors
    ///
    /// Fails if the resource or field is unknown or the field is not a
    /// relationship.
    pub fn remove_relationship(
        &mut self,
        id: Id,
        field: &str,
        target: Option<Id>,
    ) -> Result<Vec<Id>, EditError> {
        let registry = self.registry_mut();
        let class = class_of(registry, id)?;
        relation_spec(class, field)?;

        let removed = match registry.get_mut(id).and_then(|owner| owner.relation_mut(field)) {
            Some(mut slot) => match target {
                Some(target) if slot.remove(target) => vec![target],
                Some(_) => Vec::new(),
                None => slot.clear(),
            },
            None => Vec::new(),
        };
        sync::unlink_inverse(registry, id, field, &removed);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{config::BuildConfig, diagnostics::Logger, graph::build_value};

    fn graph() -> Graph {
        let mut logger = Logger::new();
        build_value(
            json!({
                "id": "g",
                "nodes": [{"id": "a"}, {"id": "b"}],
                "links": [{"id": "l1", "source": "a", "target": "b", "conveyingLyph": "L"}],
                "lyphs": [{"id": "L", "layers": ["L1"]}, {"id": "L1"}]
            }),
            &BuildConfig::default(),
            &mut logger,
        )
        .unwrap()
    }

    #[test]
    fn test_update_value() {
        let mut graph = graph();
        graph.update_value(Id::new("L"), "width", json!(12.5)).unwrap();
        assert_eq!(graph.registry().lyph(Id::new("L")).unwrap().width, Some(12.5));

        graph.update_value(Id::new("L"), "width", Value::Null).unwrap();
        assert_eq!(graph.registry().lyph(Id::new("L")).unwrap().width, None);
    }

    #[test]
    fn test_update_value_rejections() {
        let mut graph = graph();
        assert!(matches!(
            graph.update_value(Id::new("nope"), "width", json!(1)),
            Err(EditError::UnknownResource(_))
        ));
        assert!(matches!(
            graph.update_value(Id::new("L"), "wings", json!(1)),
            Err(EditError::UnknownField { .. })
        ));
        assert!(matches!(
            graph.update_value(Id::new("L"), "layers", json!([])),
            Err(EditError::NotAScalar { .. })
        ));
        assert!(matches!(
            graph.update_value(Id::new("L"), "width", json!("wide")),
            Err(EditError::InvalidValue { .. })
        ));
        assert_eq!(graph.registry().lyph(Id::new("L")).unwrap().width, None);
    }

    #[test]
    fn test_create_related_resource_links_inverse() {
        let mut graph = graph();
        let layer = graph
            .create_related_resource(Id::new("L"), "layers", json!({"id": "L2", "name": "Wall"}))
            .unwrap();
        let registry = graph.registry();
        assert_eq!(registry.lyph(Id::new("L")).unwrap().layers, vec![Id::new("L1"), layer]);
        assert_eq!(registry.lyph(layer).unwrap().layer_in, Some(Id::new("L")));
        assert!(registry.group(Id::new("g")).unwrap().lyphs.contains(&layer));
    }

    #[test]
    fn test_create_related_resource_replaces_single_reference() {
        let mut graph = graph();
        let node = graph
            .create_related_resource(Id::new("l1"), "target", json!({}))
            .unwrap();
        let registry = graph.registry();
        assert_eq!(registry.link(Id::new("l1")).unwrap().target, Some(node));
        assert_eq!(registry.node(node).unwrap().target_of, vec![Id::new("l1")]);
        assert!(registry.node(Id::new("b")).unwrap().target_of.is_empty());
    }

    #[test]
    fn test_create_related_resource_with_taken_inverse() {
        let mut graph = graph();
        let result =
            graph.create_related_resource(Id::new("L"), "layers", json!({"id": "L2", "layerIn": "L1"}));
        assert!(matches!(
            result,
            Err(EditError::InverseTaken { existing, .. }) if existing == Id::new("L1")
        ));
        let registry = graph.registry();
        assert!(!registry.contains(Id::new("L2")));
        assert_eq!(registry.lyph(Id::new("L")).unwrap().layers, vec![Id::new("L1")]);
    }

    #[test]
    fn test_create_related_resource_abstract_target() {
        let mut graph = graph();
        assert!(matches!(
            graph.create_related_resource(Id::new("L"), "internalLyphs", json!({"id": "I"})),
            Err(EditError::AbstractTarget { .. })
        ));
        let region = graph
            .create_related_resource(
                Id::new("L"),
                "internalLyphs",
                json!({"id": "R", "class": "Region"}),
            )
            .unwrap();
        assert_eq!(graph.registry().region(region).unwrap().internal_in, Some(Id::new("L")));
    }

    #[test]
    fn test_remove_relationship() {
        let mut graph = graph();
        let removed = graph
            .remove_relationship(Id::new("L"), "layers", Some(Id::new("L1")))
            .unwrap();
        assert_eq!(removed, vec![Id::new("L1")]);
        assert_eq!(graph.registry().lyph(Id::new("L1")).unwrap().layer_in, None);

        let removed = graph.remove_relationship(Id::new("l1"), "source", None).unwrap();
        assert_eq!(removed, vec![Id::new("a")]);
        assert!(graph.registry().node(Id::new("a")).unwrap().source_of.is_empty());

        assert!(matches!(
            graph.remove_relationship(Id::new("L"), "width", None),
            Err(EditError::NotARelation { .. })
        ));
    }
}
