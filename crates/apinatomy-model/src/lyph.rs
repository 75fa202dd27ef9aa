//! Lyph template expansion.
//!
//! A template lyph describes a layer structure once; every subtype gets its
//! own copy of that structure. Expanding a template marks it inactive, so a
//! second expansion is a no-op and never produces duplicate layers.

use log::{debug, trace};

use apinatomy_core::{
    identifier::Id,
    model::{Lyph, ResourceInfo},
    schema::ResourceClass,
};

use crate::{
    diagnostics::{LogCode, Logger},
    registry::Registry,
};

/// Bounds recursion through layer stacks and supertype chains.
const MAX_DEPTH: usize = 32;

/// Returns `true` if subtypes of `lyph` should inherit from it.
///
/// Besides lyphs flagged `isTemplate`, a lyph listing subtypes or named as
/// some other lyph's supertype acts as a template.
pub fn is_template(registry: &Registry, lyph: Id) -> bool {
    let Some(record) = registry.lyph(lyph) else {
        return false;
    };
    record.is_template
        || !record.subtypes.is_empty()
        || registry
            .iter()
            .filter_map(|resource| resource.as_lyph())
            .any(|other| other.supertype == Some(lyph))
}

/// Expands every template lyph in registration order.
pub(crate) fn expand_templates(registry: &mut Registry, logger: &mut Logger) {
    let templates: Vec<Id> = registry
        .ids_of(ResourceClass::Lyph)
        .into_iter()
        .filter(|id| is_template(registry, *id))
        .collect();
    debug!(templates = templates.len(); "Expanding lyph templates");
    for template in templates {
        expand_template(registry, template, logger);
    }
}

/// Clones `template` into each of its subtypes.
///
/// The subtypes are the lyphs listed in `template.subtypes` plus every lyph
/// whose `supertype` is the template. Listed identifiers with no definition
/// get a minimal lyph first.
pub fn expand_template(registry: &mut Registry, template: Id, logger: &mut Logger) {
    expand_template_at(registry, template, logger, 0);
}

fn expand_template_at(registry: &mut Registry, template: Id, logger: &mut Logger, depth: usize) {
    if depth > MAX_DEPTH {
        return;
    }
    let Some(record) = registry.lyph_mut(template) else {
        return;
    };
    if record.inactive {
        return;
    }
    record.inactive = true;
    let mut subtypes = record.subtypes.clone();

    let group = registry.group_of(template);
    for subtype in &subtypes {
        if !registry.contains(*subtype) {
            registry.register_or_log(Lyph::new(ResourceInfo::new(*subtype)), logger);
            if let Some(group) = group {
                registry.join(group, *subtype);
            }
        }
    }
    for lyph in registry.ids_of(ResourceClass::Lyph) {
        if !subtypes.contains(&lyph)
            && registry.lyph(lyph).is_some_and(|l| l.supertype == Some(template))
        {
            subtypes.push(lyph);
        }
    }

    trace!(template:% = template, subtypes = subtypes.len(); "Expanding template");
    for subtype in subtypes {
        if subtype == template {
            continue;
        }
        if let Some(lyph) = registry.lyph_mut(subtype) {
            lyph.supertype.get_or_insert(template);
        }
        clone_at(registry, template, subtype, logger, depth + 1);
    }
}

/// Makes `lyph` a subtype of `template` and gives it the template's structure.
///
/// Used for lyphs generated after templates were expanded: an already
/// expanded template is cloned into the lyph directly.
pub fn inherit(registry: &mut Registry, lyph: Id, template: Id, logger: &mut Logger) {
    let Some(record) = registry.lyph_mut(lyph) else {
        return;
    };
    record.supertype.get_or_insert(template);
    let expanded = registry.lyph(template).is_some_and(|t| t.inactive);
    if expanded {
        clone_lyph(registry, template, lyph, logger);
    } else {
        expand_template(registry, template, logger);
    }
}

/// Copies the unset whitelisted fields and the layer stack of `source` onto `target`.
pub fn clone_lyph(registry: &mut Registry, source: Id, target: Id, logger: &mut Logger) {
    clone_at(registry, source, target, logger, 0);
}

fn clone_at(registry: &mut Registry, source: Id, target: Id, logger: &mut Logger, depth: usize) {
    if depth > MAX_DEPTH || source == target {
        return;
    }
    let Some(supertype) = registry.lyph(source).map(|lyph| lyph.supertype) else {
        return;
    };
    if !registry.contains(target) {
        return;
    }
    if let Some(supertype) = supertype {
        let pending = registry.lyph(supertype).is_some_and(|s| !s.inactive);
        if pending && is_template(registry, supertype) {
            expand_template_at(registry, supertype, logger, depth + 1);
        }
    }

    let Some(src) = registry.lyph(source).cloned() else {
        return;
    };
    let Some(dst) = registry.lyph_mut(target) else {
        return;
    };
    apply_defaults(dst, &src);
    if src.is_template || dst.supertype == Some(source) {
        dst.supertype.get_or_insert(source);
    } else {
        dst.clone_of.get_or_insert(source);
    }
    if dst.info.name.is_none() {
        if let Some(name) = &src.info.name {
            dst.info.name = Some(if name.ends_with("clone)") {
                name.clone()
            } else {
                format!("{name} (clone)")
            });
        }
    }

    if src.layers.is_empty() {
        return;
    }
    if !dst.layers.is_empty() {
        logger.warn(
            LogCode::LyphSubtypeHasOwnLayers,
            [target.to_string(), source.to_string()],
        );
        return;
    }
    let target_name = dst.info.name.clone();
    let target_topology = dst.topology;
    let group = registry.group_of(target).or_else(|| registry.group_of(source));

    let mut layers = Vec::with_capacity(src.layers.len());
    for source_layer in &src.layers {
        let Some(layer_name) = registry.lyph(*source_layer).map(|l| l.info.name.clone()) else {
            logger.error(
                LogCode::LyphNoTemplateLayer,
                [source.to_string(), source_layer.to_string()],
            );
            continue;
        };
        let layer_id = source_layer.join(target);
        if !registry.contains(layer_id) {
            let mut layer = Lyph::new(ResourceInfo {
                name: layer_name
                    .as_deref()
                    .zip(target_name.as_deref())
                    .map(|(layer, host)| format!("{layer} in {host}")),
                generated: true,
                ..ResourceInfo::new(layer_id)
            });
            layer.layer_in = Some(target);
            registry.register_or_log(layer, logger);
            if let Some(group) = group {
                registry.join(group, layer_id);
            }
            clone_at(registry, *source_layer, layer_id, logger, depth + 1);
            if let (Some(topology), Some(layer)) = (target_topology, registry.lyph_mut(layer_id)) {
                layer.topology = Some(topology);
            }
        }
        layers.push(layer_id);
    }
    if let Some(dst) = registry.lyph_mut(target) {
        dst.layers = layers;
    }
}

/// Copies whitelisted fields from `source` where `target` leaves them unset.
fn apply_defaults(target: &mut Lyph, source: &Lyph) {
    fn fill<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
        if slot.is_none() {
            slot.clone_from(value);
        }
    }
    fn fill_vec<T: Clone>(slot: &mut Vec<T>, value: &[T]) {
        if slot.is_empty() {
            slot.extend_from_slice(value);
        }
    }

    fill(&mut target.info.color, &source.info.color);
    fill(&mut target.info.description, &source.info.description);
    fill(&mut target.scale, &source.scale);
    fill(&mut target.height, &source.height);
    fill(&mut target.width, &source.width);
    fill(&mut target.length, &source.length);
    fill(&mut target.thickness, &source.thickness);
    fill_vec(&mut target.external, &source.external);
    fill_vec(&mut target.materials, &source.materials);
    fill_vec(&mut target.channels, &source.channels);
    fill_vec(&mut target.bundles_trees, &source.bundles_trees);
    target.create3d |= source.create3d;
}
