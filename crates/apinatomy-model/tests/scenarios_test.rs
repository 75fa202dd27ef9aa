//! End-to-end builds of small models.

use serde_json::{Value, json};

use apinatomy_core::{
    identifier::Id,
    model::{CoalescenceTopology, Lyph, LyphTopology, ResourceInfo},
};
use apinatomy_model::{
    BuildConfig, Graph, build_value,
    diagnostics::{LogCode, Logger, Severity, Status},
    error::ModelError,
    lyph,
    registry::Registry,
};

fn build_model(model: Value) -> (Graph, Logger) {
    let mut logger = Logger::new();
    let graph = build_value(model, &BuildConfig::default(), &mut logger)
        .unwrap_or_else(|err| panic!("build failed: {err}"));
    (graph, logger)
}

fn ids(names: &[&str]) -> Vec<Id> {
    names.iter().map(|name| Id::new(name)).collect()
}

#[test]
fn test_template_subtype_gets_layers() {
    let (graph, logger) = build_model(json!({
        "lyphs": [
            {"id": "T1", "topology": "BAG2", "layers": ["L1", "L2"], "subtypes": ["S1"]},
            {"id": "S1"},
            {"id": "L1"},
            {"id": "L2"}
        ]
    }));
    let registry = graph.registry();
    let subtype = registry.lyph(Id::new("S1")).unwrap();
    assert_eq!(subtype.layers, ids(&["L1_S1", "L2_S1"]));
    assert_eq!(subtype.supertype, Some(Id::new("T1")));
    for layer in &subtype.layers {
        assert_eq!(registry.lyph(*layer).unwrap().layer_in, Some(Id::new("S1")));
    }
    assert_eq!(logger.count(Severity::Error), 0);
}

#[test]
fn test_template_expansion_is_idempotent() {
    let mut registry = Registry::new();
    let template = Lyph {
        is_template: true,
        layers: ids(&["L1", "L2"]),
        subtypes: ids(&["S1"]),
        ..Lyph::new(ResourceInfo::new(Id::new("T1")))
    };
    registry.register(template).unwrap();
    for id in ["S1", "L1", "L2"] {
        registry.register(Lyph::new(ResourceInfo::new(Id::new(id)))).unwrap();
    }

    let mut logger = Logger::new();
    lyph::expand_template(&mut registry, Id::new("T1"), &mut logger);
    let after_first = registry.len();
    lyph::expand_template(&mut registry, Id::new("T1"), &mut logger);

    assert_eq!(registry.len(), after_first);
    assert_eq!(registry.lyph(Id::new("S1")).unwrap().layers.len(), 2);
    assert!(logger.is_empty());
}

#[test]
fn test_chain_from_lyphs() {
    let (graph, _) = build_model(json!({
        "chains": [{"id": "C1", "lyphs": ["A", "B"], "root": "n0", "leaf": "n3"}],
        "lyphs": [{"id": "A"}, {"id": "B"}]
    }));
    let registry = graph.registry();
    let chain = registry.chain(Id::new("C1")).unwrap();
    assert_eq!(chain.num_levels, Some(2));
    assert_eq!(chain.levels, ids(&["C1_lnk_1", "C1_lnk_2"]));

    let group = registry.group(chain.group.unwrap()).unwrap();
    assert_eq!(group.nodes, ids(&["n0", "C1_node_1", "n3"]));
    assert_eq!(group.links.len(), 2);

    for (level, lyph) in chain.levels.iter().zip(["A", "B"]) {
        assert_eq!(registry.link(*level).unwrap().conveying_lyph, Some(Id::new(lyph)));
    }
    let first = registry.link(chain.levels[0]).unwrap();
    assert_eq!(first.source, Some(Id::new("n0")));
    assert_eq!(first.next, Some(chain.levels[1]));
}

#[test]
fn test_lyphs_win_over_levels() {
    let (graph, logger) = build_model(json!({
        "chains": [{
            "id": "C1",
            "lyphs": ["A", "B"],
            "levels": [{"id": "x1"}, {"id": "x2"}]
        }],
        "lyphs": [{"id": "A"}, {"id": "B"}]
    }));
    assert_eq!(logger.with_code(LogCode::ChainConflict2).count(), 1);
    let chain = graph.registry().chain(Id::new("C1")).unwrap();
    assert_eq!(chain.levels, ids(&["C1_lnk_1", "C1_lnk_2"]));
}

#[test]
fn test_lyph_conveyed_twice() {
    let (graph, logger) = build_model(json!({
        "links": [
            {"id": "l1", "source": "a", "target": "b", "conveyingLyph": "X"},
            {"id": "l2", "source": "b", "target": "c", "conveyingLyph": "X"}
        ],
        "lyphs": [{"id": "X"}]
    }));
    assert_eq!(logger.count(Severity::Error), 1);
    let error = logger
        .entries()
        .iter()
        .find(|entry| entry.severity() == Severity::Error)
        .unwrap();
    assert_eq!(error.code(), LogCode::LyphConveyedTwice);
    assert_eq!(error.params(), ["X", "l1", "l2"]);
    assert!(graph.registry().link(Id::new("l1")).is_some());
    assert!(graph.registry().link(Id::new("l2")).is_some());
    assert_eq!(logger.status(), Status::Error);
}

#[test]
fn test_level_count_mismatch_keeps_levels() {
    let (graph, logger) = build_model(json!({
        "chains": [{"id": "C1", "numLevels": 2, "levels": ["x1", "x2", "x3"]}]
    }));
    let chain = graph.registry().chain(Id::new("C1")).unwrap();
    assert_eq!(chain.levels, ids(&["x1", "x2", "x3"]));
    assert_eq!(chain.num_levels, Some(3));
    assert_eq!(logger.with_code(LogCode::ChainLevelCount).count(), 1);

    let (graph, _) = build_model(json!({
        "chains": [{"id": "C2", "numLevels": 4, "levels": ["y1"]}]
    }));
    let chain = graph.registry().chain(Id::new("C2")).unwrap();
    assert_eq!(chain.levels.len(), 4);
    assert_eq!(chain.levels[0], Id::new("y1"));
}

#[test]
fn test_template_topology_along_chain() {
    let (graph, _) = build_model(json!({
        "chains": [{"id": "C1", "numLevels": 3, "lyphTemplate": "T"}],
        "lyphs": [{"id": "T", "isTemplate": true, "topology": "BAG"}]
    }));
    let registry = graph.registry();
    let topologies: Vec<_> = registry
        .chain(Id::new("C1"))
        .unwrap()
        .lyphs
        .iter()
        .map(|lyph| registry.lyph(*lyph).unwrap().topology)
        .collect();
    assert_eq!(
        topologies,
        [
            Some(LyphTopology::Tube),
            Some(LyphTopology::Tube),
            Some(LyphTopology::Bag)
        ]
    );
    for lyph in &registry.chain(Id::new("C1")).unwrap().lyphs {
        assert_eq!(registry.lyph(*lyph).unwrap().supertype, Some(Id::new("T")));
    }
}

#[test]
fn test_housed_chain_is_embedded() {
    let (graph, _) = build_model(json!({
        "chains": [{"id": "C", "housingLyphs": ["H1", "H2"], "lyphTemplate": "T"}],
        "lyphs": [{"id": "T", "isTemplate": true}, {"id": "H1"}, {"id": "H2"}]
    }));
    let registry = graph.registry();
    let chain = registry.chain(Id::new("C")).unwrap();
    assert_eq!(chain.levels.len(), 2);

    let h1 = registry.lyph(Id::new("H1")).unwrap();
    assert_eq!(h1.bundles, vec![chain.levels[0]]);
    assert_eq!(registry.link(chain.levels[0]).unwrap().fasciculates_in, Some(Id::new("H1")));

    let coalescence = registry
        .get(Id::new("H1_clsn_C_lyph_1"))
        .and_then(|resource| resource.as_coalescence())
        .unwrap();
    assert_eq!(coalescence.topology, Some(CoalescenceTopology::Embedding));
    assert_eq!(coalescence.lyphs, ids(&["H1", "C_lyph_1"]));
}

#[test]
fn test_missing_references_are_created() {
    let (graph, logger) = build_model(json!({
        "id": "g",
        "links": [{"id": "l1", "source": "a", "target": "b"}]
    }));
    let registry = graph.registry();
    assert!(registry.node(Id::new("a")).is_some());
    let root = graph.root_group().unwrap();
    assert!(root.nodes.contains(&Id::new("a")));
    assert!(root.nodes.contains(&Id::new("b")));
    assert_eq!(logger.with_code(LogCode::AutoGen).count(), 1);
    assert_eq!(logger.count(Severity::Error), 0);
}

#[test]
fn test_wrong_structural_type_aborts() {
    let mut logger = Logger::new();
    let result = build_value(
        json!({"lyphs": [{"id": "L1", "layers": "L2"}]}),
        &BuildConfig::default(),
        &mut logger,
    );
    match result {
        Err(ModelError::InvalidField { id, field, .. }) => {
            assert_eq!(id, "L1");
            assert_eq!(field, "layers");
        }
        other => panic!("expected an invalid field error, got {other:?}"),
    }
}

#[test]
fn test_top_level_must_be_object() {
    let mut logger = Logger::new();
    let result = build_value(json!([1, 2]), &BuildConfig::default(), &mut logger);
    assert!(matches!(result, Err(ModelError::NotAnObject { .. })));
}
