//! The resource registry.
//!
//! The registry owns every resource of a model by identifier and is the
//! single source of truth while a model is built. References between
//! resources are identifiers; any reference to an identifier the
//! registry does not hold goes on the waiting list with its
//! `(owner, field)` origin until it is resolved or reported.

use std::collections::HashMap;

use indexmap::IndexMap;
use log::{debug, trace};
use thiserror::Error;

use apinatomy_core::{
    identifier::Id,
    model::{Border, Chain, Group, Link, Lyph, Node, Region, Relations, Resource},
    schema::ResourceClass,
};

use crate::{
    diagnostics::{LogCode, Logger},
    error::ModelError,
};

/// The origin of a reference: which field of which resource holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    pub owner: Id,
    pub field: &'static str,
}

/// Returned by [`Registry::register`] when the identifier is already taken
/// by a different resource.
#[derive(Debug, Clone, Error)]
#[error("duplicate resource `{id}`, already registered as {existing}")]
pub struct DuplicateIdError {
    pub id: Id,
    pub existing: ResourceClass,
}

#[derive(Debug, Default, Clone)]
pub struct Registry {
    resources: IndexMap<Id, Resource>,
    waiting: IndexMap<Id, Vec<Reference>>,
    membership: HashMap<Id, Id>,
    counter: usize,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a resource by its identifier.
    ///
    /// Registering an identical resource twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateIdError`] if the identifier already belongs to a
    /// different resource; the existing resource is kept.
    pub fn register(&mut self, resource: impl Into<Resource>) -> Result<Id, DuplicateIdError> {
        let resource = resource.into();
        let id = resource.id();
        if let Some(existing) = self.resources.get(&id) {
            if *existing == resource {
                return Ok(id);
            }
            return Err(DuplicateIdError {
                id,
                existing: existing.class(),
            });
        }
        trace!(id:% = id, class = resource.class().as_str(); "Registering resource");
        self.waiting.shift_remove(&id);
        self.resources.insert(id, resource);
        Ok(id)
    }

    /// Registers a resource, logging a duplicate instead of failing.
    pub fn register_or_log(&mut self, resource: impl Into<Resource>, logger: &mut Logger) -> Id {
        match self.register(resource) {
            Ok(id) => id,
            Err(err) => {
                logger.warn(LogCode::ResourceDuplicate, [err.id.to_string(), err.existing.to_string()]);
                err.id
            }
        }
    }

    /// Removes a resource. Used only by editing operations.
    pub fn remove(&mut self, id: Id) -> Option<Resource> {
        self.membership.remove(&id);
        self.resources.shift_remove(&id)
    }

    pub fn contains(&self, id: Id) -> bool {
        self.resources.contains_key(&id)
    }

    pub fn get(&self, id: Id) -> Option<&Resource> {
        self.resources.get(&id)
    }

    pub fn get_mut(&mut self, id: Id) -> Option<&mut Resource> {
        self.resources.get_mut(&id)
    }

    pub fn class_of(&self, id: Id) -> Option<ResourceClass> {
        self.get(id).map(Resource::class)
    }

    /// Returns the live resource for `id`, or records the reference on the
    /// waiting list and returns `None`.
    pub fn resolve(&mut self, id: Id, owner: Id, field: &'static str) -> Option<&Resource> {
        if !self.resources.contains_key(&id) {
            let refs = self.waiting.entry(id).or_default();
            let reference = Reference { owner, field };
            if !refs.contains(&reference) {
                refs.push(reference);
            }
            return None;
        }
        self.resources.get(&id)
    }

    pub fn waiting_list(&self) -> &IndexMap<Id, Vec<Reference>> {
        &self.waiting
    }

    /// Rebuilds the waiting list from the reference fields of every resource.
    pub fn scan_references(&mut self) {
        let mut pending = Vec::new();
        for resource in self.resources.values() {
            for (field, _) in resource.class().relations() {
                let Some(view) = resource.relation(field) else {
                    continue;
                };
                for target in view.ids() {
                    if !self.resources.contains_key(&target) {
                        pending.push((target, resource.id(), field));
                    }
                }
            }
        }
        self.waiting.clear();
        for (target, owner, field) in pending {
            self.resolve(target, owner, field);
        }
    }

    /// Resolves the waiting list by auto-creating missing resources.
    ///
    /// For every unresolved identifier the first reference decides the
    /// class: if the referring field expects a concrete class, a minimal
    /// resource of that class is created and joined to the owner's group
    /// (or to `root`). Identifiers still unresolved afterwards are reported.
    /// Returns the identifiers of the created resources.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Cyclic`] if resources are still being created
    /// after `max_passes` passes.
    pub fn drain_waiting_list(
        &mut self,
        root: Id,
        max_passes: usize,
        logger: &mut Logger,
    ) -> Result<Vec<Id>, ModelError> {
        let mut created = Vec::new();
        let mut passes = 0;
        loop {
            self.scan_references();
            if passes == max_passes {
                if self.has_creatable() {
                    return Err(ModelError::Cyclic { passes });
                }
                break;
            }
            let (added, external) = self.auto_create(root);
            if added.is_empty() && external.is_empty() {
                break;
            }
            if !added.is_empty() {
                logger.warn(LogCode::AutoGen, &added);
            }
            if !external.is_empty() {
                logger.warn(LogCode::AutoGenExternal, &external);
            }
            created.extend(added);
            created.extend(external);
            passes += 1;
        }

        if !self.waiting.is_empty() {
            let dangling: Vec<String> = self
                .waiting
                .iter()
                .map(|(id, refs)| match refs.first() {
                    Some(reference) => format!("{id} <- {}.{}", reference.owner, reference.field),
                    None => id.to_string(),
                })
                .collect();
            logger.error(LogCode::RefUndefined, dangling);
        }
        debug!(created = created.len(), unresolved = self.waiting.len(); "Waiting list drained");
        Ok(created)
    }

    /// The class to auto-create for a waiting identifier, if any.
    fn creatable_class(&self, reference: &Reference) -> Option<ResourceClass> {
        let relation = self.class_of(reference.owner)?.relation(reference.field)?;
        (!relation.target.is_abstract()).then_some(relation.target)
    }

    fn has_creatable(&self) -> bool {
        self.waiting.values().any(|refs| {
            refs.first()
                .is_some_and(|reference| self.creatable_class(reference).is_some())
        })
    }

    fn auto_create(&mut self, root: Id) -> (Vec<Id>, Vec<Id>) {
        let mut added = Vec::new();
        let mut external = Vec::new();
        let waiting: Vec<(Id, Reference)> = self
            .waiting
            .iter()
            .filter_map(|(id, refs)| refs.first().map(|reference| (*id, *reference)))
            .collect();

        for (id, reference) in waiting {
            let Some(class) = self.creatable_class(&reference) else {
                continue;
            };
            let Some(stub) = Resource::stub(class, id) else {
                continue;
            };
            if self.register(stub).is_err() {
                continue;
            }
            let group = self.group_of(reference.owner).unwrap_or(root);
            self.join(group, id);
            if class == ResourceClass::External {
                external.push(id);
            } else {
                added.push(id);
            }
        }
        (added, external)
    }

    /// Adds `member` to the array of `group` that holds its class.
    pub fn join(&mut self, group: Id, member: Id) {
        let Some(field) = self.class_of(member).and_then(|class| class.group_field()) else {
            return;
        };
        let Some(group_resource) = self.get_mut(group) else {
            return;
        };
        if let Some(mut slot) = group_resource.relation_mut(field) {
            let _ = slot.insert(member);
        }
        self.membership.entry(member).or_insert(group);
    }

    /// Records the membership of every resource listed in a group array.
    ///
    /// Groups are visited in registration order, so a resource listed by
    /// several groups belongs to the first one registered.
    pub fn index_memberships(&mut self) {
        let mut listed = Vec::new();
        for resource in self.resources.values() {
            let Resource::Group(group) = resource else {
                continue;
            };
            for (field, _) in ResourceClass::Group.relations() {
                if let Some(view) = group.relation(field) {
                    listed.extend(view.ids().into_iter().map(|member| (member, group.info.id)));
                }
            }
        }
        for (member, group) in listed {
            self.membership.entry(member).or_insert(group);
        }
    }

    /// The first group a resource was joined to.
    pub fn group_of(&self, member: Id) -> Option<Id> {
        self.membership.get(&member).copied()
    }

    /// A fresh identifier for a resource of `class`.
    pub fn next_id(&mut self, class: ResourceClass) -> Id {
        loop {
            self.counter += 1;
            let id = Id::from_counter(class.id_prefix(), self.counter);
            if !self.contains(id) {
                return id;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Resource> {
        self.resources.values_mut()
    }

    /// Identifiers of all resources of `class`, in registration order.
    pub fn ids_of(&self, class: ResourceClass) -> Vec<Id> {
        self.iter()
            .filter(|resource| resource.class().is_a(class))
            .map(Resource::id)
            .collect()
    }

    pub fn count(&self, class: ResourceClass) -> usize {
        self.iter()
            .filter(|resource| resource.class() == class)
            .count()
    }

    pub fn node(&self, id: Id) -> Option<&Node> {
        self.get(id).and_then(Resource::as_node)
    }

    pub fn node_mut(&mut self, id: Id) -> Option<&mut Node> {
        self.get_mut(id).and_then(Resource::as_node_mut)
    }

    pub fn link(&self, id: Id) -> Option<&Link> {
        self.get(id).and_then(Resource::as_link)
    }

    pub fn link_mut(&mut self, id: Id) -> Option<&mut Link> {
        self.get_mut(id).and_then(Resource::as_link_mut)
    }

    pub fn lyph(&self, id: Id) -> Option<&Lyph> {
        self.get(id).and_then(Resource::as_lyph)
    }

    pub fn lyph_mut(&mut self, id: Id) -> Option<&mut Lyph> {
        self.get_mut(id).and_then(Resource::as_lyph_mut)
    }

    pub fn region(&self, id: Id) -> Option<&Region> {
        self.get(id).and_then(Resource::as_region)
    }

    pub fn region_mut(&mut self, id: Id) -> Option<&mut Region> {
        self.get_mut(id).and_then(Resource::as_region_mut)
    }

    pub fn border(&self, id: Id) -> Option<&Border> {
        self.get(id).and_then(Resource::as_border)
    }

    pub fn border_mut(&mut self, id: Id) -> Option<&mut Border> {
        self.get_mut(id).and_then(Resource::as_border_mut)
    }

    pub fn chain(&self, id: Id) -> Option<&Chain> {
        self.get(id).and_then(Resource::as_chain)
    }

    pub fn chain_mut(&mut self, id: Id) -> Option<&mut Chain> {
        self.get_mut(id).and_then(Resource::as_chain_mut)
    }

    pub fn group(&self, id: Id) -> Option<&Group> {
        self.get(id).and_then(Resource::as_group)
    }

    pub fn group_mut(&mut self, id: Id) -> Option<&mut Group> {
        self.get_mut(id).and_then(Resource::as_group_mut)
    }
}

#[cfg(test)]
mod tests {
    use apinatomy_core::model::ResourceInfo;

    use super::*;
    use crate::diagnostics::Severity;

    fn root_registry() -> (Registry, Id) {
        let mut registry = Registry::new();
        let root = Id::new("root");
        registry.register(Group::new(ResourceInfo::new(root))).unwrap();
        (registry, root)
    }

    #[test]
    fn test_register_duplicate() {
        let mut registry = Registry::new();
        let id = Id::new("n1");
        registry.register(Node::new(ResourceInfo::new(id))).unwrap();
        assert!(registry.register(Node::new(ResourceInfo::new(id))).is_ok());

        let mut other = Node::new(ResourceInfo::new(id));
        other.val = Some(3.0);
        let err = registry.register(other).unwrap_err();
        assert_eq!(err.existing, ResourceClass::Node);
        assert_eq!(registry.node(id).unwrap().val, None);
    }

    #[test]
    fn test_resolve_records_waiting_reference() {
        let mut registry = Registry::new();
        let owner = Id::new("l1");
        let missing = Id::new("n9");

        assert!(registry.resolve(missing, owner, "source").is_none());
        assert!(registry.resolve(missing, owner, "source").is_none());
        assert_eq!(registry.waiting_list()[&missing].len(), 1);

        registry.register(Node::new(ResourceInfo::new(missing))).unwrap();
        assert!(registry.waiting_list().is_empty());
        assert!(registry.resolve(missing, owner, "source").is_some());
    }

    #[test]
    fn test_drain_auto_creates_concrete_targets() {
        let (mut registry, root) = root_registry();
        let mut link = Link::new(ResourceInfo::new(Id::new("l1")));
        link.source = Some(Id::new("a"));
        link.conveying_lyph = Some(Id::new("L"));
        registry.register(link).unwrap();
        registry.join(root, Id::new("l1"));

        let mut logger = Logger::new();
        let created = registry.drain_waiting_list(root, 8, &mut logger).unwrap();

        assert_eq!(created, vec![Id::new("a"), Id::new("L")]);
        assert!(registry.node(Id::new("a")).is_some());
        assert!(registry.lyph(Id::new("L")).is_some());
        assert!(registry.group(root).unwrap().nodes.contains(&Id::new("a")));
        assert_eq!(logger.with_code(LogCode::AutoGen).count(), 1);
        assert_eq!(logger.count(Severity::Error), 0);
    }

    #[test]
    fn test_drain_reports_abstract_targets() {
        let (mut registry, root) = root_registry();
        let mut lyph = Lyph::new(ResourceInfo::new(Id::new("L")));
        lyph.internal_in = Some(Id::new("nowhere"));
        registry.register(lyph).unwrap();

        let mut logger = Logger::new();
        let created = registry.drain_waiting_list(root, 8, &mut logger).unwrap();

        assert!(created.is_empty());
        assert!(!registry.contains(Id::new("nowhere")));
        let reported: Vec<_> = logger.with_code(LogCode::RefUndefined).collect();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].params(), ["nowhere <- L.internalIn"]);
    }

    #[test]
    fn test_index_memberships_prefers_first_group() {
        let (mut registry, root) = root_registry();
        let mut inner = Group::new(ResourceInfo::new(Id::new("inner")));
        inner.nodes = vec![Id::new("n1")];
        let inner_id = registry.register(inner).unwrap();
        registry.register(Node::new(ResourceInfo::new(Id::new("n1")))).unwrap();
        registry.group_mut(root).unwrap().nodes.push(Id::new("n1"));

        registry.index_memberships();
        assert_eq!(registry.group_of(Id::new("n1")), Some(root));
        assert_eq!(registry.group_of(inner_id), None);
    }

    #[test]
    fn test_next_id_skips_taken() {
        let mut registry = Registry::new();
        registry.register(Node::new(ResourceInfo::new(Id::new("node_1")))).unwrap();
        assert_eq!(registry.next_id(ResourceClass::Node), "node_2");
        assert_eq!(registry.next_id(ResourceClass::Lyph), "lyph_3");
    }
}
