//! Synchronization of inverse reference fields.

use log::debug;

use apinatomy_core::{identifier::Id, model::Relations};

use crate::{
    diagnostics::{LogCode, Logger},
    registry::Registry,
};

/// Mirrors every reference into the inverse field of its target.
///
/// A single-valued inverse that already points at another resource is
/// left alone and reported. Targets that are not registered or whose class
/// has no such field are skipped.
pub(crate) fn sync_relations(registry: &mut Registry, logger: &mut Logger) {
    let mut pairs: Vec<(Id, &'static str, Id)> = Vec::new();
    for resource in registry.iter() {
        for (field, spec) in resource.class().relations() {
            let Some(inverse) = spec.inverse else {
                continue;
            };
            let Some(view) = resource.relation(field) else {
                continue;
            };
            pairs.extend(view.ids().into_iter().map(|target| (target, inverse, resource.id())));
        }
    }

    let mut added = 0usize;
    for (target, inverse, owner) in pairs {
        let Some(mut slot) = registry
            .get_mut(target)
            .and_then(|resource| resource.relation_mut(inverse))
        else {
            continue;
        };
        match slot.insert(owner) {
            Ok(true) => added += 1,
            Ok(false) => {}
            Err(existing) => logger.warn(
                LogCode::ResourceDoubleRef,
                [target, Id::new(inverse), existing, owner],
            ),
        }
    }
    debug!(added = added; "Inverse references synchronized");
}

/// Removes `owner` from the inverse field of every target of `field`.
pub(crate) fn unlink_inverse(registry: &mut Registry, owner: Id, field: &str, targets: &[Id]) {
    let Some(inverse) = registry
        .class_of(owner)
        .and_then(|class| class.relation(field))
        .and_then(|spec| spec.inverse)
    else {
        return;
    };
    for target in targets {
        if let Some(mut slot) = registry
            .get_mut(*target)
            .and_then(|resource| resource.relation_mut(inverse))
        {
            slot.remove(owner);
        }
    }
}
