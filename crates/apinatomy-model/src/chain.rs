//! Chain expansion and embedding.
//!
//! A chain is a template for a linear sequence of links, each conveying a
//! lyph, joined end to end by nodes. It is specified either by its lyphs
//! ([`derive_from_lyphs`]) or by a partial list of levels, a level count or
//! housing lyphs ([`derive_from_levels`]). The generated resources go into
//! a group owned by the chain and are also merged into the parent group.
//!
//! Chains housed in other lyphs are then embedded: their levels are bundled
//! by the housing lyphs, boundary nodes are placed on the housing borders
//! and an embedding coalescence ties each conveying lyph to its housing lyph.

use std::collections::HashMap;

use indexmap::IndexSet;
use log::info;
use petgraph::{algo::toposort, graph::DiGraph};

use apinatomy_core::{
    color, gen_id,
    geometry::Point,
    identifier::Id,
    model::{
        Coalescence, CoalescenceTopology, Group, Link, Lyph, LyphTopology, Node, ProcessType,
        Resource, ResourceInfo,
    },
    schema::ResourceClass,
};

use crate::{
    diagnostics::{LogCode, Logger},
    lyph,
    registry::Registry,
    shape,
};

/// Widths at or above this are treated as unknown when resizing.
const MAX_WIDTH: f64 = 1000.0;

/// Border segment that receives the sources of housed levels.
const SOURCE_SEGMENT: usize = 3;
/// Border segment that receives the cloned targets of housed levels.
const TARGET_SEGMENT: usize = 1;

/// The group a chain generates into and the group that declares the chain.
#[derive(Debug, Clone, Copy)]
struct Scope {
    parent: Id,
    group: Id,
}

impl Scope {
    /// Joins a registered resource to both groups.
    fn adopt(&self, registry: &mut Registry, member: Id) {
        registry.join(self.group, member);
        registry.join(self.parent, member);
    }
}

/// One end of a wired chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChainEnd {
    Anchor(Id),
    Layout(Point),
}

/// Expands every chain, housing chains before the chains they house.
pub(crate) fn expand_chains(registry: &mut Registry, root: Id, logger: &mut Logger) {
    let chains = registry.ids_of(ResourceClass::Chain);
    for chain in expansion_order(registry, &chains, logger) {
        let parent = registry.group_of(chain).unwrap_or(root);
        expand_chain(registry, parent, chain, logger);
    }
}

fn expansion_order(registry: &Registry, chains: &[Id], logger: &mut Logger) -> Vec<Id> {
    let mut graph = DiGraph::<Id, ()>::new();
    let index: HashMap<Id, _> = chains.iter().map(|id| (*id, graph.add_node(*id))).collect();
    for id in chains {
        let housing = registry.chain(*id).and_then(|chain| chain.housing_chain);
        if let Some((from, to)) = housing.and_then(|h| Some((*index.get(&h)?, *index.get(id)?))) {
            graph.add_edge(from, to, ());
        }
    }
    match toposort(&graph, None) {
        Ok(order) => order.into_iter().map(|ix| graph[ix]).collect(),
        Err(cycle) => {
            logger.error(LogCode::GroupSelf, [graph[cycle.node_id()]]);
            chains.to_vec()
        }
    }
}

/// Generates the group of a chain within `parent`.
///
/// A chain that already has a group is left alone. A chain with neither
/// lyphs, levels, a level count nor housing is skipped with a warning.
pub fn expand_chain(registry: &mut Registry, parent: Id, chain_id: Id, logger: &mut Logger) {
    let Some(chain) = registry.chain(chain_id) else {
        logger.warn(LogCode::ChainUndefined, [chain_id]);
        return;
    };
    if chain.group.is_some() {
        return;
    }
    if !chain.is_expandable() {
        logger.warn(LogCode::ChainSkipped, [chain_id]);
        return;
    }
    let from_lyphs = !chain.lyphs.is_empty();
    let conflict = from_lyphs && !chain.levels.is_empty();
    let name = chain.info.name.clone().unwrap_or_else(|| chain_id.to_string());

    let group_id = gen_id!("group", chain_id);
    let group = Group::new(ResourceInfo {
        name: Some(name),
        generated: true,
        ..ResourceInfo::new(group_id)
    });
    registry.register_or_log(group, logger);
    registry.join(parent, group_id);
    if let Some(chain) = registry.chain_mut(chain_id) {
        chain.group = Some(group_id);
    }
    let scope = Scope {
        parent,
        group: group_id,
    };

    if from_lyphs {
        if conflict {
            logger.warn(LogCode::ChainConflict2, [chain_id]);
        }
        derive_from_lyphs(registry, chain_id, scope, logger);
    } else {
        derive_from_levels(registry, chain_id, scope, logger);
    }
    let levels = registry.chain(chain_id).map_or(0, |chain| chain.levels.len());
    info!(chain:% = chain_id, levels = levels; "Chain expanded");
}

fn chain_node(id: Id) -> Node {
    Node {
        info: ResourceInfo {
            color: Some(color::INTERNAL_NODE.into()),
            ..ResourceInfo::generated(id)
        },
        val: Some(1.0),
        ..Node::new(ResourceInfo::default())
    }
}

fn chain_link(id: Id, source: Id, target: Id) -> Link {
    let mut link = Link::generated(id, source, target);
    link.info.color = Some(color::LINK.into());
    link
}

/// Builds the chain from its explicit lyph list: `N` lyphs yield `N + 1`
/// nodes and `N` links.
fn derive_from_lyphs(registry: &mut Registry, chain_id: Id, scope: Scope, logger: &mut Logger) {
    let Some(chain) = registry.chain(chain_id).cloned() else {
        return;
    };
    let n = chain.lyphs.len();

    for lyph in &chain.lyphs {
        if !registry.contains(*lyph) {
            registry.register_or_log(Lyph::new(ResourceInfo::new(*lyph)), logger);
            scope.adopt(registry, *lyph);
        }
    }
    if let Some(template) = chain.lyph_template {
        if registry.lyph(template).is_none() {
            logger.error(LogCode::ChainLyphTemplateMissing, [chain_id, template]);
        } else {
            for member in &chain.lyphs {
                let bare = registry
                    .lyph(*member)
                    .is_some_and(|l| l.supertype.is_none() && l.layers.is_empty());
                if bare {
                    lyph::inherit(registry, *member, template, logger);
                }
            }
        }
    }

    let materials = innermost_materials(registry, &chain.lyphs);
    if materials.len() > 1 {
        logger.warn(LogCode::ChainMatDiff, chain.lyphs.iter());
    }

    let mut nodes = Vec::with_capacity(n + 1);
    for i in 0..=n {
        let id = match (chain.root, chain.leaf) {
            (Some(root), _) if i == 0 => root,
            (_, Some(leaf)) if i == n => leaf,
            _ => gen_id!(chain_id, "node", i),
        };
        if !registry.contains(id) {
            registry.register_or_log(chain_node(id), logger);
        }
        scope.adopt(registry, id);
        nodes.push(id);
    }

    let conveying_type = chain.conveying_type.unwrap_or(ProcessType::Advective);
    let length = chain.length.map(|length| length / n as f64);
    let materials: Vec<Id> = materials.into_iter().collect();
    let mut levels: Vec<Id> = Vec::with_capacity(n);
    for (i, member) in chain.lyphs.iter().enumerate() {
        let id = gen_id!(chain_id, "lnk", i + 1);
        let link = Link {
            conveying_lyph: Some(*member),
            conveying_type: Some(conveying_type),
            conveying_materials: materials.clone(),
            length,
            prev: levels.last().copied(),
            level_in: vec![chain_id],
            ..chain_link(id, nodes[i], nodes[i + 1])
        };
        registry.register_or_log(link, logger);
        scope.adopt(registry, id);
        if let Some(prev) = levels.last().and_then(|prev| registry.link_mut(*prev)) {
            prev.next = Some(id);
        }
        levels.push(id);
    }

    if let Some(chain) = registry.chain_mut(chain_id) {
        chain.levels = levels;
        chain.num_levels = Some(n);
    }
}

/// Distinct materials of the innermost layers of `lyphs`.
fn innermost_materials(registry: &Registry, lyphs: &[Id]) -> IndexSet<Id> {
    lyphs
        .iter()
        .filter_map(|lyph| registry.lyph(*lyph)?.layers.first().copied())
        .filter_map(|layer| registry.lyph(layer))
        .flat_map(|layer| layer.materials.iter().copied())
        .collect()
}

/// Topology of level `idx` of `total`, capped according to the template.
///
/// Only the end levels can be capped; interior levels are always tubes.
pub fn level_topology(idx: usize, total: usize, template: Option<LyphTopology>) -> LyphTopology {
    let Some(template) = template else {
        return LyphTopology::Tube;
    };
    if template == LyphTopology::Cyst && total == 1 {
        return LyphTopology::Cyst;
    }
    if idx == 0 && template.caps_start() {
        return LyphTopology::Bag2;
    }
    if idx + 1 == total && template.caps_end() {
        return LyphTopology::Bag;
    }
    LyphTopology::Tube
}

/// Builds the chain from partial levels, a level count or its housing.
fn derive_from_levels(registry: &mut Registry, chain_id: Id, scope: Scope, logger: &mut Logger) {
    let Some(mut chain) = registry.chain(chain_id).cloned() else {
        return;
    };

    if let Some(housing) = chain.housing_chain {
        if !chain.housing_lyphs.is_empty() {
            logger.warn(LogCode::ChainConflict, [chain_id]);
        } else {
            let Some(mut housing_lyphs) = registry.chain(housing).map(|h| h.lyphs.clone()) else {
                logger.warn(LogCode::ChainNoHousing, [chain_id, housing]);
                return;
            };
            if let Some(range) = chain.housing_range {
                housing_lyphs = housing_lyphs[range.clamp_to(housing_lyphs.len())].to_vec();
                logger.info(
                    LogCode::ChainSlice,
                    [housing.to_string(), housing_lyphs.len().to_string()],
                );
            }
            chain.housing_lyphs = housing_lyphs;
        }
    }

    let requested = chain.num_levels.filter(|n| *n > 0);
    let mut n = requested.unwrap_or(chain.housing_lyphs.len());
    let mut levels: Vec<Option<Id>> = chain.levels.iter().copied().map(Some).collect();
    if levels.len() != n {
        let (given, wanted) = (levels.len(), n);
        logger.info(
            LogCode::ChainNumLevels,
            [chain_id.to_string(), given.min(wanted).to_string(), given.max(wanted).to_string()],
        );
        if requested.is_some() && given > wanted {
            logger.warn(
                LogCode::ChainLevelCount,
                [chain_id.to_string(), given.to_string(), wanted.to_string()],
            );
        }
        n = given.max(wanted);
        levels.resize(n, None);
    }
    if n == 0 {
        if let Some(stored) = registry.chain_mut(chain_id) {
            stored.housing_lyphs = chain.housing_lyphs;
        }
        return;
    }

    // Explicit levels without a definition become plain links.
    for level in levels.iter_mut() {
        let Some(id) = *level else {
            continue;
        };
        if !registry.contains(id) {
            registry.register_or_log(Link::new(ResourceInfo::new(id)), logger);
        } else if registry.link(id).is_none() {
            logger.warn(LogCode::ResourceDuplicate, [id]);
            *level = None;
        }
    }

    // Boundary i sits between level i - 1 and level i.
    let mut sources: Vec<Option<Id>> = levels
        .iter()
        .map(|level| level.and_then(|id| registry.link(id)?.source))
        .chain(std::iter::once(None))
        .collect();
    let mut targets: Vec<Option<Id>> = std::iter::once(None)
        .chain(
            levels
                .iter()
                .map(|level| level.and_then(|id| registry.link(id)?.target)),
        )
        .collect();
    if let Some(root) = chain.root {
        if let Some(source) = sources[0].filter(|source| *source != root) {
            logger.error(LogCode::ChainLevelError, [0.to_string(), source.to_string(), root.to_string()]);
        }
        sources[0] = Some(root);
    }
    if let Some(leaf) = chain.leaf {
        if let Some(target) = targets[n].filter(|target| *target != leaf) {
            logger.error(LogCode::ChainLevelError, [n.to_string(), target.to_string(), leaf.to_string()]);
        }
        targets[n] = Some(leaf);
    }

    let mut nodes = Vec::with_capacity(n + 1);
    for i in 0..=n {
        if let (Some(source), Some(target)) = (sources[i], targets[i]) {
            if source != target {
                logger.error(
                    LogCode::ChainLevelError,
                    [i.to_string(), source.to_string(), target.to_string()],
                );
            }
        }
        let node = match sources[i].or(targets[i]) {
            Some(node) => node,
            None => {
                let id = gen_id!(chain_id, "node", i);
                if !registry.contains(id) {
                    registry.register_or_log(chain_node(id), logger);
                }
                id
            }
        };
        scope.adopt(registry, node);
        nodes.push(node);
    }

    let template = match chain.lyph_template {
        Some(template) => match registry.lyph(template) {
            Some(lyph) => Some((template, lyph.topology)),
            None => {
                logger.error(LogCode::ChainLyphTemplateMissing, [chain_id, template]);
                None
            }
        },
        None => None,
    };

    let length = chain.length.map(|length| length / n as f64);
    let mut ids: Vec<Id> = Vec::with_capacity(n);
    let mut lyphs = Vec::with_capacity(n);
    for (i, level) in levels.iter().enumerate() {
        let id = match level {
            Some(id) => *id,
            None => {
                let id = gen_id!(chain_id, "lnk", i + 1);
                if !registry.contains(id) {
                    registry.register_or_log(chain_link(id, nodes[i], nodes[i + 1]), logger);
                }
                id
            }
        };
        let Some(link) = registry.link_mut(id) else {
            continue;
        };
        link.source.get_or_insert(nodes[i]);
        link.target.get_or_insert(nodes[i + 1]);
        if i == 0 && chain.root.is_some() {
            link.source = Some(nodes[0]);
        }
        if i + 1 == n && chain.leaf.is_some() {
            link.target = Some(nodes[n]);
        }
        if !link.level_in.contains(&chain_id) {
            link.level_in.push(chain_id);
        }
        link.info.color.get_or_insert_with(|| color::LINK.into());
        if length.is_some() {
            link.length = length;
        }
        if link.conveying_type.is_none() {
            link.conveying_type = chain.conveying_type;
        }
        let mut conveying = link.conveying_lyph;

        if conveying.is_none() {
            if let Some((template, topology)) = template {
                let lyph_id = gen_id!(chain_id, "lyph", i + 1);
                link.conveying_lyph = Some(lyph_id);
                if !registry.contains(lyph_id) {
                    let generated = Lyph {
                        topology: Some(level_topology(i, n, topology)),
                        conveys: Some(id),
                        ..Lyph::new(ResourceInfo::generated(lyph_id))
                    };
                    registry.register_or_log(generated, logger);
                    lyph::inherit(registry, lyph_id, template, logger);
                }
                conveying = Some(lyph_id);
            }
        }
        if let Some(prev) = ids.last().and_then(|prev| registry.link_mut(*prev)) {
            prev.next = Some(id);
        }
        if let Some(conveyed) = conveying {
            scope.adopt(registry, conveyed);
            lyphs.push(conveyed);
        }
        scope.adopt(registry, id);
        ids.push(id);
    }

    if let Some(stored) = registry.chain_mut(chain_id) {
        stored.housing_lyphs = chain.housing_lyphs;
        stored.num_levels = Some(ids.len());
        stored.levels = ids;
        stored.lyphs = lyphs;
        stored.root = nodes.first().copied();
        stored.leaf = nodes.last().copied();
    }
}

/// Embeds the levels of every housed chain.
pub(crate) fn embed_chains(registry: &mut Registry, root: Id, logger: &mut Logger) {
    for chain in registry.ids_of(ResourceClass::Chain) {
        embed_to_housing_lyphs(registry, root, chain, logger);
    }
}

/// Places the levels of a chain inside its housing lyphs.
///
/// Level `i` is hosted by housing lyph `i`, or by one of its layers: the
/// layer that bundles the chain, else the layer named by `housingLayers[i]`,
/// else the outermost layer.
pub fn embed_to_housing_lyphs(registry: &mut Registry, root: Id, chain_id: Id, logger: &mut Logger) {
    let Some(chain) = registry.chain(chain_id).cloned() else {
        return;
    };
    if chain.housing_lyphs.is_empty() || chain.levels.is_empty() {
        return;
    }
    let parent = registry.group_of(chain_id).unwrap_or(root);
    let scope = Scope {
        parent,
        group: chain.group.unwrap_or(parent),
    };
    let n = chain.housing_lyphs.len().min(chain.levels.len());
    let last = chain.housing_lyphs.len() - 1;

    for i in 0..n {
        let housing = chain.housing_lyphs[i];
        let Some(housing_lyph) = registry.lyph(housing) else {
            logger.warn(LogCode::ChainNoHousingLyph, [housing]);
            continue;
        };

        let mut host = housing;
        if !housing_lyph.layers.is_empty() {
            let layers = housing_lyph.layers.clone();
            if layers.iter().any(|layer| registry.lyph(*layer).is_none()) {
                logger.warn(LogCode::ChainNoHousingLayers, [housing]);
                continue;
            }
            let bundling = layers.iter().copied().find(|layer| {
                registry
                    .lyph(*layer)
                    .is_some_and(|l| l.bundles_chains.contains(&chain_id))
            });
            let mut idx = layers.len() - 1;
            if let Some(&wanted) = chain.housing_layers.get(i) {
                if wanted < idx as i64 {
                    idx = wanted.max(0) as usize;
                    if let Some(bundling) = bundling.filter(|b| *b != layers[idx]) {
                        logger.warn(LogCode::ChainConflict3, [bundling, layers[idx]]);
                    }
                }
            }
            host = bundling.unwrap_or(layers[idx]);
        }

        let level_id = chain.levels[i];
        let Some(level) = registry.link(level_id).cloned() else {
            logger.warn(LogCode::ChainNoHousingLyph, [housing, level_id]);
            continue;
        };

        if registry.lyph(host).is_some_and(|l| l.is_template) {
            logger.warn(LogCode::ChainHousingTemplate, [host]);
        } else {
            host_level(registry, scope, host, &level, i == 0, i == last, logger);
        }

        match level.conveying_lyph {
            Some(lyph) => {
                let id = gen_id!(housing, "clsn", lyph);
                if !registry.contains(id) {
                    let coalescence = Coalescence {
                        topology: Some(CoalescenceTopology::Embedding),
                        lyphs: vec![housing, lyph],
                        ..Coalescence::new(ResourceInfo {
                            generated: true,
                            ..ResourceInfo::new(id)
                        })
                    };
                    registry.register_or_log(coalescence, logger);
                    registry.join(parent, id);
                }
            }
            None => logger.warn(LogCode::ChainNoCoalescence, [housing, level_id]),
        }
    }
}

/// Bundles `level` in `host` and places its end nodes.
fn host_level(
    registry: &mut Registry,
    scope: Scope,
    host: Id,
    level: &Link,
    first: bool,
    last: bool,
    logger: &mut Logger,
) {
    let level_id = level.info.id;
    if let Some(lyph) = registry.lyph_mut(host) {
        if !lyph.bundles.contains(&level_id) {
            lyph.bundles.push(level_id);
        }
    }

    if let Some(source) = level.source {
        if first {
            add_internal_node(registry, host, source);
        } else {
            add_border_node(registry, host, SOURCE_SEGMENT, source);
        }
    }

    let Some(target) = level.target else {
        return;
    };
    if last {
        add_internal_node(registry, host, target);
        return;
    }
    let clone_id = target.suffixed("_clone");
    if !registry.contains(clone_id) {
        let clone = match registry.node(target) {
            Some(node) => node.cloned_as(clone_id),
            None => Node {
                clone_of: Some(target),
                ..Node::new(ResourceInfo::generated(clone_id))
            },
        };
        registry.register_or_log(clone, logger);
        scope.adopt(registry, clone_id);
        let collapsible = Link::collapsible(target, clone_id);
        let collapsible_id = collapsible.info.id;
        registry.register_or_log(collapsible, logger);
        scope.adopt(registry, collapsible_id);
        logger.info(LogCode::NodeCloneInternal, [target, clone_id]);
    }
    add_border_node(registry, host, TARGET_SEGMENT, clone_id);
    if let Some(link) = registry.link_mut(level_id) {
        link.target = Some(clone_id);
    }
}

fn add_internal_node(registry: &mut Registry, host: Id, node: Id) {
    if let Some(lyph) = registry.lyph_mut(host) {
        if !lyph.internal_nodes.contains(&node) {
            lyph.internal_nodes.push(node);
        }
    }
}

fn add_border_node(registry: &mut Registry, host: Id, segment: usize, node: Id) {
    let Some(segment) = shape::border_segment(registry, host, segment) else {
        return;
    };
    if let Some(link) = registry.link_mut(segment) {
        if !link.hosted_nodes.contains(&node) {
            link.hosted_nodes.push(node);
        }
    }
}

/// Derives the conveying lyph sizes of a chain and optionally equalizes widths.
pub fn resize_lyphs(registry: &mut Registry, chain_id: Id, same_width: bool, logger: &mut Logger) {
    let Some(levels) = registry.chain(chain_id).map(|chain| chain.levels.clone()) else {
        return;
    };
    let mut min_width = MAX_WIDTH;
    let mut lyphs = Vec::with_capacity(levels.len());
    for level in levels {
        let Some(lyph) = registry.link(level).and_then(|link| link.conveying_lyph) else {
            logger.warn(LogCode::ChainNoConveyingLyph, [chain_id, level]);
            continue;
        };
        if let Some(width) = shape::update_size(registry, lyph) {
            min_width = min_width.min(width);
            lyphs.push(lyph);
        }
    }
    if same_width && min_width < MAX_WIDTH {
        for lyph in lyphs {
            if let Some(lyph) = registry.lyph_mut(lyph) {
                lyph.width = Some(min_width);
            }
        }
    }
}

/// The end caps of a chain as a pair of flags, if the chain is a capped tube.
///
/// Undefined when an interior level is not a tube or when the outer ends
/// of the first or last lyph are closed.
pub fn chain_topology(registry: &Registry, chain_id: Id) -> Option<[bool; 2]> {
    let chain = registry.chain(chain_id)?;
    let conveying = |level: &Id| registry.link(*level).and_then(|link| link.conveying_lyph);
    let last = chain.levels.len().checked_sub(1)?;
    for level in chain.levels.iter().take(last).skip(1) {
        let topology = conveying(level)
            .and_then(|lyph| registry.lyph(lyph))
            .map(|lyph| lyph.topology.unwrap_or_default());
        if topology.is_some_and(|t| t != LyphTopology::Tube) {
            return None;
        }
    }
    let start = conveying(&chain.levels[0])?;
    let end = conveying(&chain.levels[last])?;
    let start = shape::radial_types(registry, start);
    let end = shape::radial_types(registry, end);
    if start[0] || end[1] {
        return None;
    }
    Some([start[1], end[0]])
}

/// Where the two ends of a chain are pinned.
///
/// A wire gives both anchors; otherwise each end node contributes its
/// anchor or, failing that, its layout. `startFromLeaf` swaps the ends.
pub fn wired_chain_ends(registry: &Registry, chain_id: Id) -> (Option<ChainEnd>, Option<ChainEnd>) {
    let Some(chain) = registry.chain(chain_id) else {
        return (None, None);
    };
    let wire = chain
        .wired_to
        .and_then(|wire| registry.get(wire))
        .and_then(Resource::as_wire);
    let (start, end) = match wire {
        Some(wire) => (
            wire.source.map(ChainEnd::Anchor),
            wire.target.map(ChainEnd::Anchor),
        ),
        None => {
            let pin = |node: Option<Id>| {
                let node = registry.node(node?)?;
                node.anchored_to
                    .map(ChainEnd::Anchor)
                    .or(node.layout.map(ChainEnd::Layout))
            };
            (pin(chain.root), pin(chain.leaf))
        }
    };
    if chain.start_from_leaf {
        (end, start)
    } else {
        (start, end)
    }
}
