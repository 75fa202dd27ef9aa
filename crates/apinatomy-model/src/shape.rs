//! Shape borders and derived lyph attributes.
//!
//! Every lyph and region owns a [`Border`] made of invisible segment links.
//! Lyph borders always have four segments; a region has one segment per
//! corner point. The attributes below are computed from the registry on
//! demand rather than stored.

use log::debug;

use apinatomy_core::{
    geometry::default_region_points,
    identifier::Id,
    model::{Border, LYPH_BORDERS, Link, LinkGeometry, Node, Resource, ResourceInfo},
    schema::ResourceClass,
};

use crate::{diagnostics::Logger, registry::Registry};

/// Guards layer walks against malformed `layerIn` cycles.
const MAX_NESTING: usize = 32;

/// Creates borders for every lyph and region that lacks one.
///
/// Templates get no border. Regions with fewer than three points first get
/// the default square, and their point list is closed by repeating the
/// first point. Returns the identifiers of the new borders.
pub(crate) fn generate_borders(registry: &mut Registry, logger: &mut Logger) -> Vec<Id> {
    let mut created = Vec::new();

    for id in registry.ids_of(ResourceClass::Lyph) {
        let Some(lyph) = registry.lyph(id) else {
            continue;
        };
        if lyph.border.is_some() || lyph.is_template {
            continue;
        }
        let border = create_border(registry, id, LYPH_BORDERS, logger);
        if let Some(lyph) = registry.lyph_mut(id) {
            lyph.border = Some(border);
        }
        created.push(border);
    }

    for id in registry.ids_of(ResourceClass::Region) {
        let Some(region) = registry.region_mut(id) else {
            continue;
        };
        if region.points.len() < 3 {
            region.points = default_region_points();
        }
        if region.points.first() != region.points.last() {
            if let Some(first) = region.points.first().copied() {
                region.points.push(first);
            }
        }
        if region.border.is_some() {
            continue;
        }
        let segments = region.points.len() - 1;
        let border = create_border(registry, id, segments, logger);
        if let Some(region) = registry.region_mut(id) {
            region.border = Some(border);
        }
        created.push(border);
    }

    if !created.is_empty() {
        debug!(borders = created.len(); "Generated shape borders");
    }
    created
}

fn create_border(registry: &mut Registry, host: Id, segments: usize, logger: &mut Logger) -> Id {
    let border_id = host.suffixed("_border");
    let mut border = Border::new(ResourceInfo::generated(border_id));
    border.host = Some(host);

    for idx in 0..segments {
        let segment_id = apinatomy_core::gen_id!(border_id, idx);
        let source = segment_id.prefixed("s_");
        let target = segment_id.prefixed("t_");
        for node in [source, target] {
            registry.register_or_log(Node::new(ResourceInfo::generated(node)), logger);
        }
        let segment = Link {
            geometry: Some(LinkGeometry::Invisible),
            on_border: Some(border_id),
            ..Link::generated(segment_id, source, target)
        };
        registry.register_or_log(segment, logger);
        border.borders.push(segment_id);
    }
    registry.register_or_log(border, logger)
}

/// The `idx`-th border segment link of a shape.
pub fn border_segment(registry: &Registry, shape: Id, idx: usize) -> Option<Id> {
    let border = match registry.get(shape)? {
        Resource::Lyph(lyph) => lyph.border?,
        Resource::Region(region) => region.border?,
        _ => return None,
    };
    registry.border(border)?.borders.get(idx).copied()
}

/// Whether each end of a lyph is closed, see
/// [`LyphTopology::radial_types`](apinatomy_core::model::LyphTopology::radial_types).
///
/// A lyph without its own topology takes the radial types of the lyph it is
/// a layer of.
pub fn radial_types(registry: &Registry, lyph: Id) -> [bool; 2] {
    let mut current = lyph;
    for _ in 0..MAX_NESTING {
        let Some(record) = registry.lyph(current) else {
            break;
        };
        if let Some(topology) = record.topology {
            return topology.radial_types();
        }
        match record.layer_in {
            Some(host) => current = host,
            None => break,
        }
    }
    [false, false]
}

/// The link a shape is drawn along.
///
/// For a lyph this is the link conveying it, else the axis of the lyph it
/// is a layer of. A region's axis is only set for internal regions.
pub fn axis(registry: &Registry, shape: Id) -> Option<Id> {
    let mut current = shape;
    for _ in 0..MAX_NESTING {
        match registry.get(current)? {
            Resource::Region(region) => return region.axis,
            Resource::Lyph(lyph) => {
                if lyph.conveys.is_some() {
                    return lyph.conveys;
                }
                current = lyph.layer_in?;
            }
            _ => return None,
        }
    }
    None
}

/// The shape a shape is placed inside.
pub fn container(registry: &Registry, shape: Id) -> Option<Id> {
    let mut current = shape;
    for _ in 0..MAX_NESTING {
        match registry.get(current)? {
            Resource::Region(region) => return region.internal_in,
            Resource::Lyph(lyph) => {
                if lyph.internal_in.is_some() {
                    return lyph.internal_in;
                }
                current = lyph.layer_in?;
            }
            _ => return None,
        }
    }
    None
}

/// Width and height of a lyph derived from its axis length and scale.
pub fn size(registry: &Registry, lyph: Id) -> Option<(f64, f64)> {
    let record = registry.lyph(lyph)?;
    let length = axis(registry, lyph)
        .and_then(|link| registry.link(link))
        .and_then(|link| link.length);
    Some(record.size_for_axis(length))
}

/// Fills in unset `width` and `height` from [`size`] and returns the width.
pub fn update_size(registry: &mut Registry, lyph: Id) -> Option<f64> {
    let (width, height) = size(registry, lyph)?;
    let record = registry.lyph_mut(lyph)?;
    let width = *record.width.get_or_insert(width);
    record.height.get_or_insert(height);
    Some(width)
}

#[cfg(test)]
mod tests {
    use apinatomy_core::model::{Lyph, LyphTopology, Region};
    use float_cmp::approx_eq;

    use super::*;

    fn lyph(id: &str) -> Lyph {
        Lyph::new(ResourceInfo::new(Id::new(id)))
    }

    #[test]
    fn test_lyph_border_has_four_segments() {
        let mut registry = Registry::new();
        let mut logger = Logger::new();
        registry.register(lyph("L")).unwrap();

        let created = generate_borders(&mut registry, &mut logger);

        assert_eq!(created, [Id::new("L_border")]);
        let border = registry.border(Id::new("L_border")).unwrap();
        assert_eq!(border.host, Some(Id::new("L")));
        assert_eq!(border.borders.len(), LYPH_BORDERS);

        let segment = registry.link(Id::new("L_border_3")).unwrap();
        assert_eq!(segment.source, Some(Id::new("s_L_border_3")));
        assert_eq!(segment.target, Some(Id::new("t_L_border_3")));
        assert_eq!(segment.geometry, Some(LinkGeometry::Invisible));
        assert!(segment.info.generated);
        assert_eq!(border_segment(&registry, Id::new("L"), 1), Some(Id::new("L_border_1")));
        assert!(logger.is_empty());
    }

    #[test]
    fn test_templates_and_existing_borders_are_skipped() {
        let mut registry = Registry::new();
        let mut logger = Logger::new();
        let mut template = lyph("T");
        template.is_template = true;
        registry.register(template).unwrap();
        registry.register(lyph("L")).unwrap();

        generate_borders(&mut registry, &mut logger);
        let again = generate_borders(&mut registry, &mut logger);

        assert!(again.is_empty());
        assert!(registry.lyph(Id::new("T")).unwrap().border.is_none());
    }

    #[test]
    fn test_region_points_default_and_close() {
        let mut registry = Registry::new();
        let mut logger = Logger::new();
        registry
            .register(Resource::Region(Region::new(ResourceInfo::new(Id::new("R")))))
            .unwrap();

        generate_borders(&mut registry, &mut logger);

        let region = registry.region(Id::new("R")).unwrap();
        assert_eq!(region.points.len(), 5);
        assert_eq!(region.points.first(), region.points.last());
        let border = registry.border(Id::new("R_border")).unwrap();
        assert_eq!(border.borders.len(), 4);
    }

    #[test]
    fn test_layer_inherits_radial_types_and_axis() {
        let mut registry = Registry::new();
        let mut host = lyph("H");
        host.topology = Some(LyphTopology::Bag);
        host.layers = vec![Id::new("H1")];
        host.conveys = Some(Id::new("lnk"));
        let mut layer = lyph("H1");
        layer.layer_in = Some(Id::new("H"));
        registry.register(host).unwrap();
        registry.register(layer).unwrap();
        let mut link = Link::generated(Id::new("lnk"), Id::new("a"), Id::new("b"));
        link.length = Some(10.0);
        registry.register(link).unwrap();

        assert_eq!(radial_types(&registry, Id::new("H1")), [true, false]);
        assert_eq!(axis(&registry, Id::new("H1")), Some(Id::new("lnk")));
        let (width, height) = size(&registry, Id::new("H1")).unwrap();
        assert!(approx_eq!(f64, width, 10.0));
        assert!(approx_eq!(f64, height, 10.0));
    }

    #[test]
    fn test_update_size_keeps_explicit_width() {
        let mut registry = Registry::new();
        let mut explicit = lyph("L");
        explicit.width = Some(3.0);
        registry.register(explicit).unwrap();

        assert_eq!(update_size(&mut registry, Id::new("L")), Some(3.0));
        assert_eq!(registry.lyph(Id::new("L")).unwrap().height, Some(1.0));
    }

    #[test]
    fn test_container_falls_back_to_host() {
        let mut registry = Registry::new();
        let mut host = lyph("H");
        host.internal_in = Some(Id::new("R"));
        let mut layer = lyph("H1");
        layer.layer_in = Some(Id::new("H"));
        registry.register(host).unwrap();
        registry.register(layer).unwrap();

        assert_eq!(container(&registry, Id::new("H1")), Some(Id::new("R")));
        assert_eq!(container(&registry, Id::new("missing")), None);
    }
}
