//! Model assembly.
//!
//! [`build_value`] turns a raw model document into a resolved [`Graph`]:
//!
//! 1. Normalize the document against the class table and flag lyphs
//!    conveyed by more than one link.
//! 2. Register the typed resources and apply group `assign` blocks.
//! 3. Expand lyph templates and chains, generate shape borders and embed
//!    housed chains, then apply group `interpolate` blocks.
//! 4. Drain the waiting list and synchronize inverse references.
//! 5. Generate axes for internal shapes, post-process coalescences and
//!    normalize link lengths, which is always the last step to touch a
//!    length.
//!
//! Problems that leave a usable model are logged; only malformed input
//! aborts the build with a [`ModelError`].

use std::collections::{HashMap, HashSet};

use indexmap::{IndexMap, IndexSet};
use log::{debug, info};
use serde_json::{Map, Value};

use apinatomy_core::{
    color::{self, Color},
    identifier::Id,
    model::{
        Chain, Coalescence, Group, Link, LinkGeometry, Lyph, Node, Region, Relations, Resource,
        ResourceInfo,
    },
    schema::ResourceClass,
};

use crate::{
    chain,
    config::BuildConfig,
    diagnostics::{LogCode, Logger},
    error::{ModelError, json_type},
    lyph,
    normalize::{self, Normalized, Record},
    registry::Registry,
    shape, sync,
};

/// Nesting limit when following container chains.
const MAX_NESTING: usize = 32;

/// A resolved model: the registry and the identifier of its root group.
#[derive(Debug, Clone)]
pub struct Graph {
    root: Id,
    registry: Registry,
}

impl Graph {
    /// Identifier of the root group.
    pub fn id(&self) -> Id {
        self.root
    }

    pub fn name(&self) -> Option<&str> {
        self.root_group()?.info.name.as_deref()
    }

    pub fn root_group(&self) -> Option<&Group> {
        self.registry.group(self.root)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.registry.iter().filter_map(Resource::as_node)
    }

    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.registry.iter().filter_map(Resource::as_link)
    }

    pub fn lyphs(&self) -> impl Iterator<Item = &Lyph> {
        self.registry.iter().filter_map(Resource::as_lyph)
    }

    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.registry.iter().filter_map(Resource::as_region)
    }

    pub fn chains(&self) -> impl Iterator<Item = &Chain> {
        self.registry.iter().filter_map(Resource::as_chain)
    }

    pub fn coalescences(&self) -> impl Iterator<Item = &Coalescence> {
        self.registry.iter().filter_map(Resource::as_coalescence)
    }

    /// Multiplies every coordinate and size of the model by `factor`.
    ///
    /// Covers lyph widths and heights, node layouts, defined link lengths
    /// and region points.
    pub fn scale(&mut self, factor: f64) {
        for resource in self.registry.iter_mut() {
            match resource {
                Resource::Lyph(lyph) => {
                    lyph.width = lyph.width.map(|width| width * factor);
                    lyph.height = lyph.height.map(|height| height * factor);
                }
                Resource::Node(node) => {
                    node.layout = node.layout.map(|layout| layout.scaled(factor));
                }
                Resource::Link(link) => {
                    link.length = link.length.map(|length| length * factor);
                }
                Resource::Region(region) => {
                    for point in &mut region.points {
                        *point = point.scaled(factor);
                    }
                }
                _ => {}
            }
        }
        debug!(factor = factor; "Graph scaled");
    }
}

/// Parses and builds a model from JSON text.
///
/// # Errors
///
/// Returns [`ModelError::Json`] if `json` does not parse, and any error of
/// [`build_value`].
pub fn build(json: &str, config: &BuildConfig, logger: &mut Logger) -> Result<Graph, ModelError> {
    let model: Value = serde_json::from_str(json)?;
    build_value(model, config, logger)
}

/// Builds a resolved model from a raw model document.
///
/// # Errors
///
/// Returns [`ModelError`] when the document is not an object, when a field
/// holds a value of the wrong structural type, or when references still
/// create resources after the configured number of waiting list passes.
pub fn build_value(
    model: Value,
    config: &BuildConfig,
    logger: &mut Logger,
) -> Result<Graph, ModelError> {
    let Normalized { root, records } = normalize::normalize(model, logger)?;
    check_conveying_lyphs(&records, logger);
    let mut registry = register_records(records, logger)?;
    apply_assignments(&mut registry, logger)?;

    lyph::expand_templates(&mut registry, logger);
    chain::expand_chains(&mut registry, root, logger);
    lyph::expand_templates(&mut registry, logger);
    shape::generate_borders(&mut registry, logger);
    chain::embed_chains(&mut registry, root, logger);
    apply_interpolations(&mut registry, logger)?;

    registry.drain_waiting_list(root, config.max_drain_passes(), logger)?;
    shape::generate_borders(&mut registry, logger);
    sync::sync_relations(&mut registry, logger);

    create_axes(&mut registry, root, config, logger);
    process_coalescences(&mut registry, config, logger);
    normalize_lengths(&mut registry, config);
    if config.resize_chain_lyphs() {
        for chain in registry.ids_of(ResourceClass::Chain) {
            chain::resize_lyphs(&mut registry, chain, config.same_width(), logger);
        }
    }

    log_summary(&registry, logger);
    info!(graph:% = root, resources = registry.len(), status:% = logger.status(); "Model built");
    Ok(Graph { root, registry })
}

/// Reports every lyph that more than one link declares as conveying lyph.
fn check_conveying_lyphs(records: &IndexMap<Id, Record>, logger: &mut Logger) {
    let mut conveyed: IndexMap<&str, Vec<Id>> = IndexMap::new();
    for (id, record) in records {
        if record.class != ResourceClass::Link {
            continue;
        }
        if let Some(Value::String(lyph)) = record.value.get("conveyingLyph") {
            conveyed.entry(lyph.as_str()).or_default().push(*id);
        }
    }
    for (lyph, links) in conveyed {
        if links.len() > 1 {
            let params = std::iter::once(lyph.to_string()).chain(links.iter().map(Id::to_string));
            logger.error(LogCode::LyphConveyedTwice, params);
        }
    }
}

fn register_records(
    records: IndexMap<Id, Record>,
    logger: &mut Logger,
) -> Result<Registry, ModelError> {
    let mut registry = Registry::new();
    let mut memberships = Vec::new();
    for (id, record) in records {
        let class = record.class;
        let resource = Resource::from_value(class, Value::Object(record.value))
            .map_err(|err| ModelError::invalid_field(class, id, "(record)", err.to_string()))?;
        registry.register_or_log(resource, logger);
        if let Some(group) = record.group {
            memberships.push((group, id));
        }
    }
    for (group, member) in memberships {
        registry.join(group, member);
    }
    registry.index_memberships();
    debug!(resources = registry.len(); "Resources registered");
    Ok(registry)
}

fn invalid_block(group: Id, field: &str, what: &str, found: &Value) -> ModelError {
    ModelError::invalid_field(
        ResourceClass::Group,
        group,
        field,
        format!("expected {what}, found {}", json_type(found)),
    )
}

/// Applies the `assign` block of every group to the members it names.
///
/// `{"lyphs": {"color": "#f00"}}` sets the color of every lyph in the
/// group's `lyphs` array that has none yet.
fn apply_assignments(registry: &mut Registry, logger: &mut Logger) -> Result<(), ModelError> {
    for group_id in registry.ids_of(ResourceClass::Group) {
        let Some(assign) = registry.group(group_id).and_then(|group| group.assign.clone()) else {
            continue;
        };
        let Value::Object(assign) = assign else {
            return Err(invalid_block(group_id, "assign", "an object", &assign));
        };
        for (array, values) in &assign {
            let Value::Object(values) = values else {
                return Err(invalid_block(group_id, "assign", "an object of field values", values));
            };
            let Some(members) = registry
                .group(group_id)
                .and_then(|group| group.relation(array))
                .map(|view| view.ids())
            else {
                logger.info(LogCode::ResourceIgnoreFields, [group_id.to_string(), format!("assign.{array}")]);
                continue;
            };
            let mut ignored = IndexSet::new();
            for member in members {
                assign_fields(registry, member, values, &mut ignored)?;
            }
            if !ignored.is_empty() {
                let fields: Vec<String> = ignored.into_iter().collect();
                logger.info(LogCode::ResourceIgnoreFields, [group_id.to_string(), fields.join(", ")]);
            }
        }
    }
    Ok(())
}

/// Sets the fields of `member` that are still unset.
fn assign_fields(
    registry: &mut Registry,
    member: Id,
    values: &Map<String, Value>,
    ignored: &mut IndexSet<String>,
) -> Result<(), ModelError> {
    let Some(resource) = registry.get(member) else {
        return Ok(());
    };
    let class = resource.class();
    let inactive = resource.as_lyph().is_some_and(|lyph| lyph.inactive);
    let Value::Object(mut record) = resource.to_value() else {
        return Ok(());
    };

    let mut changed = false;
    for (field, value) in values {
        if field == "id" || class.field(field).is_none() {
            ignored.insert(field.clone());
            continue;
        }
        if record.get(field).is_none_or(Value::is_null) {
            record.insert(field.clone(), value.clone());
            changed = true;
        }
    }
    if !changed {
        return Ok(());
    }

    let mut updated = Resource::from_value(class, Value::Object(record))
        .map_err(|err| ModelError::invalid_field(class, member, "assign", err.to_string()))?;
    if let Some(lyph) = updated.as_lyph_mut() {
        lyph.inactive = inactive;
    }
    if let Some(slot) = registry.get_mut(member) {
        *slot = updated;
    }
    Ok(())
}

/// Members of `field` in `group` and in every group nested in it.
fn nested_members(registry: &Registry, group: Id, field: &str) -> IndexSet<Id> {
    let mut members = IndexSet::new();
    let mut visited = HashSet::new();
    let mut pending = vec![group];
    while let Some(current) = pending.pop() {
        if !visited.insert(current) {
            continue;
        }
        let Some(group) = registry.group(current) else {
            continue;
        };
        if let Some(view) = group.relation(field) {
            members.extend(view.ids());
        }
        pending.extend(group.groups.iter().rev().copied());
    }
    members
}

/// Applies the `interpolate` block of every group.
fn apply_interpolations(registry: &mut Registry, logger: &mut Logger) -> Result<(), ModelError> {
    for group_id in registry.ids_of(ResourceClass::Group) {
        let Some(spec) = registry.group(group_id).and_then(|group| group.interpolate.clone()) else {
            continue;
        };
        if !spec.is_object() {
            return Err(invalid_block(group_id, "interpolate", "an object", &spec));
        }
        if let Some(ramp) = spec.get("lyphs").and_then(|lyphs| lyphs.get("color")) {
            interpolate_colors(registry, group_id, ramp, logger)?;
        }
        if let Some(offsets) = spec.get("nodes").and_then(|nodes| nodes.get("offset")) {
            interpolate_offsets(registry, group_id, offsets)?;
        }
    }
    Ok(())
}

/// Colors the conveying lyphs of the group's links along a linear ramp.
fn interpolate_colors(
    registry: &mut Registry,
    group: Id,
    ramp: &Value,
    logger: &mut Logger,
) -> Result<(), ModelError> {
    let (start, end) = match ramp {
        Value::Object(bounds) => {
            let bound = |key: &str| {
                bounds
                    .get(key)
                    .and_then(Value::as_str)
                    .and_then(|color| Color::new(color).ok())
            };
            match (bound("start"), bound("end")) {
                (Some(start), Some(end)) => (start, end),
                _ => {
                    logger.warn(LogCode::ResourceColorUnknown, [group.to_string(), ramp.to_string()]);
                    return Ok(());
                }
            }
        }
        Value::String(scheme) => {
            logger.warn(LogCode::ResourceColorUnknown, [group.to_string(), scheme.clone()]);
            return Ok(());
        }
        other => return Err(invalid_block(group, "interpolate", "a color ramp", other)),
    };

    let lyphs: IndexSet<Id> = nested_members(registry, group, "links")
        .into_iter()
        .filter_map(|link| registry.link(link)?.conveying_lyph)
        .collect();
    let steps = lyphs.len().saturating_sub(1).max(1) as f32;
    for (i, lyph) in lyphs.iter().enumerate() {
        if let Some(lyph) = registry.lyph_mut(*lyph) {
            lyph.info.color = Some(start.lerp(end, i as f32 / steps).to_hex());
        }
    }
    Ok(())
}

/// Spreads `offset` over the group's nodes from `start` towards `end`.
fn interpolate_offsets(registry: &mut Registry, group: Id, spec: &Value) -> Result<(), ModelError> {
    let Value::Object(bounds) = spec else {
        return Err(invalid_block(group, "interpolate", "an offset range", spec));
    };
    let number = |key: &str| bounds.get(key).and_then(Value::as_f64);
    let start = number("start").unwrap_or(0.0);
    let end = number("end").unwrap_or(1.0);
    let nodes = nested_members(registry, group, "nodes");
    let step = number("step").unwrap_or_else(|| {
        (end - start) / nodes.len().saturating_sub(1).max(1) as f64
    });
    let (low, high) = (start.min(end), start.max(end));
    for (i, node) in nodes.iter().enumerate() {
        if let Some(node) = registry.node_mut(*node) {
            node.offset = Some((start + step * i as f64).clamp(low, high));
        }
    }
    Ok(())
}

fn needs_axis(registry: &Registry, shape: Id) -> bool {
    match registry.get(shape) {
        Some(Resource::Lyph(lyph)) => {
            lyph.internal_in.is_some()
                && lyph.conveys.is_none()
                && lyph.layer_in.is_none()
                && !lyph::is_template(registry, shape)
        }
        Some(Resource::Region(region)) => region.internal_in.is_some() && region.axis.is_none(),
        _ => false,
    }
}

/// Generates an axis link for every internal lyph or region without one.
fn create_axes(registry: &mut Registry, root: Id, config: &BuildConfig, logger: &mut Logger) {
    let pending: Vec<Id> = registry
        .ids_of(ResourceClass::Shape)
        .into_iter()
        .filter(|shape| needs_axis(registry, *shape))
        .collect();
    if pending.is_empty() {
        return;
    }
    let mut lengths = HashMap::new();
    for shape in &pending {
        axis_length(registry, *shape, config, logger, &mut lengths, 0);
    }
    for shape in &pending {
        let length = lengths.get(shape).copied().flatten();
        add_axis(registry, root, *shape, length, logger);
    }
    logger.info(LogCode::GroupGenLyphAxis, &pending);
}

/// Length of the axis generated for `shape`, a fraction of its container's.
///
/// A container whose axis has no length gives the default link length
/// instead. `None` means the container has no axis at all, which leaves the
/// axis length to the defaults applied at the end of the build. Results are
/// memoized in `lengths`.
fn axis_length(
    registry: &Registry,
    shape: Id,
    config: &BuildConfig,
    logger: &mut Logger,
    lengths: &mut HashMap<Id, Option<f64>>,
    depth: usize,
) -> Option<f64> {
    if let Some(length) = lengths.get(&shape) {
        return *length;
    }
    let factor = config.internal_axis_factor();
    let default = config.default_link_length();
    let length = match shape::container(registry, shape) {
        _ if depth > MAX_NESTING => None,
        None => None,
        Some(container) => match shape::axis(registry, container) {
            Some(axis) => Some(
                registry
                    .link(axis)
                    .and_then(|link| link.length)
                    .map_or(default, |length| length * factor),
            ),
            None if needs_axis(registry, container) => Some(
                axis_length(registry, container, config, logger, lengths, depth + 1)
                    .map_or(default, |length| length * factor),
            ),
            None => {
                logger.warn(LogCode::GraphLyphNoAxis, [shape, container]);
                None
            }
        },
    };
    lengths.insert(shape, length);
    length
}

fn add_axis(registry: &mut Registry, root: Id, shape: Id, length: Option<f64>, logger: &mut Logger) {
    let source = shape.prefixed("s");
    let target = shape.prefixed("t");
    let link_id = shape.suffixed("-lnk");

    for node in [source, target] {
        if !registry.contains(node) {
            let node = Node {
                info: ResourceInfo {
                    color: Some(color::HELPER.into()),
                    ..ResourceInfo::generated(node)
                },
                val: Some(0.1),
                ..Node::new(ResourceInfo::default())
            };
            let id = registry.register_or_log(node, logger);
            registry.join(root, id);
        }
    }

    let is_lyph = registry.lyph(shape).is_some();
    let mut link = Link {
        conveying_lyph: is_lyph.then_some(shape),
        geometry: Some(LinkGeometry::Invisible),
        length,
        ..Link::generated(link_id, source, target)
    };
    link.info.color = Some(color::HELPER.into());
    registry.register_or_log(link, logger);
    registry.join(root, link_id);

    if let Some(node) = registry.node_mut(source) {
        node.source_of.push(link_id);
    }
    if let Some(node) = registry.node_mut(target) {
        node.target_of.push(link_id);
    }
    match registry.get_mut(shape) {
        Some(Resource::Lyph(lyph)) => lyph.conveys = Some(link_id),
        Some(Resource::Region(region)) => region.axis = Some(link_id),
        _ => {}
    }
}

/// Whether `lyph` is `other` or nested in it as a layer.
fn is_layer_of(registry: &Registry, lyph: Id, other: Id) -> bool {
    let mut current = Some(lyph);
    for _ in 0..MAX_NESTING {
        match current {
            Some(id) if id == other => return true,
            Some(id) => current = registry.lyph(id).and_then(|lyph| lyph.layer_in),
            None => return false,
        }
    }
    false
}

/// Validates coalescences and turns their non-primary lyphs around.
fn process_coalescences(registry: &mut Registry, config: &BuildConfig, logger: &mut Logger) {
    for id in registry.ids_of(ResourceClass::Coalescence) {
        let Some(lyphs) = registry
            .get(id)
            .and_then(Resource::as_coalescence)
            .map(|coalescence| coalescence.lyphs.clone())
        else {
            continue;
        };

        for (i, lyph) in lyphs.iter().copied().enumerate() {
            if registry.lyph(lyph).is_none() {
                logger.error(LogCode::CoalescenceNoLyph, [id, lyph]);
                continue;
            }
            for other in lyphs[..i].iter().copied() {
                if is_layer_of(registry, lyph, other) || is_layer_of(registry, other, lyph) {
                    logger.error(LogCode::CoalescenceSelf, [id, lyph, other]);
                }
            }
            if shape::axis(registry, lyph).is_none() {
                logger.warn(LogCode::CoalescenceNoAxis, [id, lyph]);
            }
            if i > 0 {
                if let Some(lyph) = registry.lyph_mut(lyph) {
                    lyph.angle = Some(config.coalescence_angle());
                }
            }
        }
    }
}

/// Gives every non-border link a length and applies the final length scale.
fn normalize_lengths(registry: &mut Registry, config: &BuildConfig) {
    for link in registry.iter_mut().filter_map(Resource::as_link_mut) {
        if link.on_border.is_some() {
            continue;
        }
        let length = link.length.unwrap_or(config.default_link_length());
        link.length = Some(length * config.length_scale());
    }
}

fn log_summary(registry: &Registry, logger: &mut Logger) {
    let counts: Vec<String> = ResourceClass::CONCRETE
        .iter()
        .filter_map(|class| {
            let count = registry.count(*class);
            (count > 0).then(|| format!("{class}: {count}"))
        })
        .collect();
    logger.info(LogCode::ResourceNum, counts);
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;
    use serde_json::json;

    use super::*;
    use crate::diagnostics::Severity;

    fn build_json(model: Value) -> (Graph, Logger) {
        let mut logger = Logger::new();
        let graph = build_value(model, &BuildConfig::default(), &mut logger).unwrap();
        (graph, logger)
    }

    #[test]
    fn test_build_default_id_and_summary() {
        let (graph, logger) = build_json(json!({"nodes": [{"id": "a"}]}));
        assert_eq!(graph.id(), normalize::DEFAULT_GRAPH_ID);
        assert_eq!(graph.nodes().count(), 1);
        let summary: Vec<_> = logger.with_code(LogCode::ResourceNum).collect();
        assert_eq!(summary.len(), 1);
        assert!(summary[0].params().contains(&"Node: 1".to_string()));
    }

    #[test]
    fn test_build_rejects_bad_json() {
        let mut logger = Logger::new();
        let result = build("{nodes: ", &BuildConfig::default(), &mut logger);
        assert!(matches!(result, Err(ModelError::Json(_))));
    }

    #[test]
    fn test_link_lengths_default_then_scale() {
        let (graph, _) = build_json(json!({
            "id": "g",
            "links": [
                {"id": "l1", "source": "a", "target": "b"},
                {"id": "l2", "source": "b", "target": "c", "length": 10}
            ]
        }));
        let length = |id: &str| graph.registry().link(Id::new(id)).unwrap().length.unwrap();
        assert!(approx_eq!(f64, length("l1"), 8.0));
        assert!(approx_eq!(f64, length("l2"), 20.0));
    }

    #[test]
    fn test_border_segments_keep_no_length() {
        let (graph, _) = build_json(json!({"lyphs": [{"id": "L"}]}));
        let segment = shape::border_segment(graph.registry(), Id::new("L"), 0).unwrap();
        assert_eq!(graph.registry().link(segment).unwrap().length, None);
    }

    #[test]
    fn test_back_references_synchronized() {
        let (graph, _) = build_json(json!({
            "nodes": [{"id": "a"}, {"id": "b"}],
            "links": [{"id": "l1", "source": "a", "target": "b", "conveyingLyph": "L"}],
            "lyphs": [{"id": "L"}]
        }));
        let registry = graph.registry();
        assert_eq!(registry.node(Id::new("a")).unwrap().source_of, vec![Id::new("l1")]);
        assert_eq!(registry.lyph(Id::new("L")).unwrap().conveys, Some(Id::new("l1")));
    }

    #[test]
    fn test_internal_lyph_gets_axis() {
        let (graph, logger) = build_json(json!({
            "links": [{"id": "h", "source": "a", "target": "b", "length": 10, "conveyingLyph": "H"}],
            "lyphs": [{"id": "H", "internalLyphs": ["I"]}, {"id": "I"}]
        }));
        let registry = graph.registry();
        let inner = registry.lyph(Id::new("I")).unwrap();
        assert_eq!(inner.internal_in, Some(Id::new("H")));
        assert_eq!(inner.conveys, Some(Id::new("I-lnk")));

        let axis = registry.link(Id::new("I-lnk")).unwrap();
        assert_eq!(axis.source, Some(Id::new("sI")));
        assert_eq!(axis.target, Some(Id::new("tI")));
        assert_eq!(axis.geometry, Some(LinkGeometry::Invisible));
        assert!(approx_eq!(f64, axis.length.unwrap(), 16.0));
        assert_eq!(logger.with_code(LogCode::GroupGenLyphAxis).count(), 1);
    }

    #[test]
    fn test_nested_internal_axes_use_default_length() {
        let (graph, logger) = build_json(json!({
            "regions": [{"id": "R", "internalLyphs": ["A"]}],
            "lyphs": [{"id": "A", "internalLyphs": ["B"]}, {"id": "B"}]
        }));
        let length = |id: &str| graph.registry().link(Id::new(id)).unwrap().length.unwrap();
        assert!(approx_eq!(f64, length("A-lnk"), 4.0 * 2.0));
        assert!(approx_eq!(f64, length("B-lnk"), 4.0 * 2.0));
        assert_eq!(logger.with_code(LogCode::GraphLyphNoAxis).count(), 1);
    }

    #[test]
    fn test_container_axis_without_length_gives_default() {
        let (graph, _) = build_json(json!({
            "links": [{"id": "h", "source": "a", "target": "b", "conveyingLyph": "H"}],
            "lyphs": [{"id": "H", "internalLyphs": ["I"]}, {"id": "I", "internalLyphs": ["J"]}, {"id": "J"}]
        }));
        let length = |id: &str| graph.registry().link(Id::new(id)).unwrap().length.unwrap();
        assert!(approx_eq!(f64, length("h"), 4.0 * 2.0));
        assert!(approx_eq!(f64, length("I-lnk"), 4.0 * 2.0));
        assert!(approx_eq!(f64, length("J-lnk"), 4.0 * 0.8 * 2.0));
    }

    #[test]
    fn test_self_coalescence_is_error() {
        let (graph, logger) = build_json(json!({
            "lyphs": [{"id": "A", "layers": ["A1"]}, {"id": "A1"}],
            "coalescences": [{"id": "c1", "lyphs": ["A", "A1"]}]
        }));
        assert_eq!(logger.with_code(LogCode::CoalescenceSelf).count(), 1);
        assert_eq!(logger.with_code(LogCode::CoalescenceNoAxis).count(), 2);
        assert_eq!(graph.registry().lyph(Id::new("A1")).unwrap().angle, Some(180.0));
        assert_eq!(graph.registry().lyph(Id::new("A")).unwrap().angle, None);
    }

    #[test]
    fn test_coalescence_with_missing_lyph() {
        let (_, logger) = build_json(json!({
            "coalescences": [{"id": "c1", "lyphs": ["X"]}],
            "lyphs": []
        }));
        // `X` is auto-created by the waiting list, so only the axis is missing.
        assert_eq!(logger.with_code(LogCode::CoalescenceNoLyph).count(), 0);
        assert_eq!(logger.with_code(LogCode::CoalescenceNoAxis).count(), 1);
    }

    #[test]
    fn test_assign_does_not_overwrite() {
        let (graph, logger) = build_json(json!({
            "assign": {"lyphs": {"color": "#f00", "wings": 2}},
            "lyphs": [{"id": "A"}, {"id": "B", "color": "#00f"}]
        }));
        let color = |id: &str| graph.registry().lyph(Id::new(id)).unwrap().info.color.clone();
        assert_eq!(color("A").as_deref(), Some("#f00"));
        assert_eq!(color("B").as_deref(), Some("#00f"));
        let ignored: Vec<_> = logger.with_code(LogCode::ResourceIgnoreFields).collect();
        assert_eq!(ignored.len(), 1);
        assert_eq!(ignored[0].params()[1], "wings");
    }

    #[test]
    fn test_assign_with_wrong_type_fails() {
        let mut logger = Logger::new();
        let result = build_value(
            json!({"assign": {"lyphs": {"width": "wide"}}, "lyphs": [{"id": "A"}]}),
            &BuildConfig::default(),
            &mut logger,
        );
        assert!(matches!(result, Err(ModelError::InvalidField { .. })));
    }

    #[test]
    fn test_interpolate_color_ramp_and_offsets() {
        let (graph, logger) = build_json(json!({
            "interpolate": {
                "lyphs": {"color": {"start": "#000000", "end": "#ffffff"}},
                "nodes": {"offset": {"start": 0.0, "end": 1.0}}
            },
            "nodes": [{"id": "a"}, {"id": "b"}, {"id": "c"}],
            "links": [
                {"id": "l1", "source": "a", "target": "b", "conveyingLyph": "L1"},
                {"id": "l2", "source": "b", "target": "c", "conveyingLyph": "L2"}
            ],
            "lyphs": [{"id": "L1"}, {"id": "L2"}]
        }));
        let registry = graph.registry();
        assert_eq!(registry.lyph(Id::new("L1")).unwrap().info.color.as_deref(), Some("#000000"));
        assert_eq!(registry.lyph(Id::new("L2")).unwrap().info.color.as_deref(), Some("#ffffff"));
        assert_eq!(registry.node(Id::new("b")).unwrap().offset, Some(0.5));
        assert_eq!(registry.node(Id::new("c")).unwrap().offset, Some(1.0));
        assert_eq!(logger.count(Severity::Warning), 0);
    }

    #[test]
    fn test_interpolate_unknown_scheme() {
        let (_, logger) = build_json(json!({
            "interpolate": {"lyphs": {"color": "viridis"}},
            "lyphs": [{"id": "L1"}]
        }));
        assert_eq!(logger.with_code(LogCode::ResourceColorUnknown).count(), 1);
    }

    #[test]
    fn test_scale_graph() {
        let (mut graph, _) = build_json(json!({
            "nodes": [{"id": "a", "layout": {"x": 1, "y": 2}}],
            "regions": [{"id": "R"}],
            "lyphs": [{"id": "L", "width": 3}]
        }));
        graph.scale(2.0);
        let registry = graph.registry();
        let layout = registry.node(Id::new("a")).unwrap().layout.unwrap();
        assert!(approx_eq!(f64, layout.x, 2.0));
        assert!(approx_eq!(f64, layout.y, 4.0));
        assert_eq!(registry.lyph(Id::new("L")).unwrap().width, Some(6.0));
        assert!(approx_eq!(f64, registry.region(Id::new("R")).unwrap().points[0].x, -20.0));
    }
}
