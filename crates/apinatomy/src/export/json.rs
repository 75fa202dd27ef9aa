//! Resolved JSON documents.
//!
//! Each resource class gets its own array. Lyphs carry the attributes that
//! are derived from the graph rather than stored on them: the axis they
//! inherit from their container, their radial types and, when unset, the
//! width and height implied by their axis.

use log::debug;
use serde_json::{Map, Value, json};

use apinatomy_core::{model::Resource, schema::ResourceClass};
use apinatomy_model::{registry::Registry, shape};

use super::{Error, Exporter};
use crate::{Model, config::ExportConfig};

const SECTIONS: [(ResourceClass, &str); 9] = [
    (ResourceClass::Group, "groups"),
    (ResourceClass::Node, "nodes"),
    (ResourceClass::Link, "links"),
    (ResourceClass::Lyph, "lyphs"),
    (ResourceClass::Region, "regions"),
    (ResourceClass::Border, "borders"),
    (ResourceClass::Chain, "chains"),
    (ResourceClass::Coalescence, "coalescences"),
    (ResourceClass::Material, "materials"),
];

/// Writes a built model as one JSON document.
#[derive(Debug, Clone, Default)]
pub struct JsonExporter {
    config: ExportConfig,
}

impl JsonExporter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// The exported document as a JSON value.
    pub fn document(&self, model: &Model) -> Value {
        let graph = model.graph();
        let registry = graph.registry();

        let mut doc = Map::new();
        doc.insert("id".into(), json!(graph.id().to_string()));
        if let Some(name) = graph.name() {
            doc.insert("name".into(), json!(name));
        }
        for (class, key) in SECTIONS {
            let records: Vec<Value> = registry
                .ids_of(class)
                .into_iter()
                .filter_map(|id| registry.get(id))
                .filter(|resource| self.config.include_generated() || !resource.is_generated())
                .map(|resource| record(registry, resource))
                .collect();
            if !records.is_empty() {
                doc.insert(key.into(), Value::Array(records));
            }
        }
        doc.insert("status".into(), json!(model.status()));
        if self.config.include_diagnostics() {
            doc.insert("diagnostics".into(), model.diagnostics().print());
        }
        Value::Object(doc)
    }
}

impl Exporter for JsonExporter {
    fn export_model(&self, model: &Model) -> Result<String, Error> {
        let doc = self.document(model);
        let output = if self.config.pretty() {
            serde_json::to_string_pretty(&doc)
        } else {
            serde_json::to_string(&doc)
        };
        let output = output.map_err(|err| Error::Render(err.to_string()))?;
        debug!(graph:% = model.graph().id(), bytes = output.len(); "Model exported");
        Ok(output)
    }
}

fn record(registry: &Registry, resource: &Resource) -> Value {
    let mut value = resource.to_value();
    let (Value::Object(map), Resource::Lyph(_)) = (&mut value, resource) else {
        return value;
    };
    let id = resource.id();
    if let Some(axis) = shape::axis(registry, id) {
        map.entry("axis").or_insert_with(|| json!(axis.to_string()));
    }
    map.insert("radialTypes".into(), json!(shape::radial_types(registry, id)));
    if let Some((width, height)) = shape::size(registry, id) {
        map.entry("width").or_insert_with(|| json!(width));
        map.entry("height").or_insert_with(|| json!(height));
    }
    value
}

#[cfg(test)]
mod tests {
    use apinatomy_core::identifier::Id;
    use apinatomy_model::diagnostics::{LogCode, Status};

    use super::*;
    use crate::ModelBuilder;

    fn model() -> Model {
        ModelBuilder::default()
            .build(
                r#"{
                    "id": "g",
                    "name": "Demo",
                    "nodes": [{"id": "a"}, {"id": "b"}],
                    "links": [{"id": "l1", "source": "a", "target": "b", "conveyingLyph": "L"}],
                    "lyphs": [{"id": "L", "layers": ["L1", "L2"], "thickness": {"min": 1, "max": 3}}, {"id": "L1"}, {"id": "L2"}]
                }"#,
            )
            .unwrap()
    }

    fn lyph<'a>(doc: &'a Value, id: &str) -> &'a Value {
        doc["lyphs"]
            .as_array()
            .unwrap()
            .iter()
            .find(|lyph| lyph["id"] == id)
            .unwrap()
    }

    #[test]
    fn test_document_sections() {
        let doc = JsonExporter::default().document(&model());
        assert_eq!(doc["id"], "g");
        assert_eq!(doc["name"], "Demo");
        let nodes = doc["nodes"].as_array().unwrap();
        assert!(nodes.iter().any(|node| node["id"] == "a"));
        assert_eq!(doc["links"][0]["id"], "l1");
        assert!(doc["borders"].is_array());
        assert_eq!(doc["status"], "OK");
        assert!(doc["diagnostics"].is_array());
        assert!(doc.get("chains").is_none());
    }

    #[test]
    fn test_undeclared_link_ends_are_reported() {
        let model = ModelBuilder::default()
            .build(r#"{"links": [{"id": "l1", "source": "a", "target": "b"}]}"#)
            .unwrap();
        assert_eq!(model.status(), Status::Warning);
        let auto_gen: Vec<_> = model.diagnostics().with_code(LogCode::AutoGen).collect();
        assert_eq!(auto_gen.len(), 1);

        let doc = JsonExporter::default().document(&model);
        assert_eq!(doc["status"], "Warning");
        assert_eq!(doc["nodes"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_layers_inherit_axis() {
        let doc = JsonExporter::default().document(&model());
        assert_eq!(lyph(&doc, "L")["axis"], "l1");
        assert_eq!(lyph(&doc, "L1")["axis"], "l1");
        assert!(lyph(&doc, "L")["radialTypes"].is_array());
        assert!(lyph(&doc, "L")["width"].is_number());
    }

    #[test]
    fn test_generated_resources_can_be_dropped() {
        let model = model();
        let border = model.graph().registry().get(Id::new("L_border")).unwrap();
        assert!(border.is_generated());

        let config = ExportConfig::new(false, false, false);
        let doc = JsonExporter::new(config).document(&model);
        assert!(doc.get("borders").is_none());
        assert!(doc.get("diagnostics").is_none());
        assert_eq!(doc["links"].as_array().unwrap().len(), 1);
        assert_eq!(doc["nodes"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_compact_output() {
        let model = model();
        let exporter = JsonExporter::new(ExportConfig::new(false, true, true));
        let output = exporter.export_model(&model).unwrap();
        assert!(!output.contains('\n'));
        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed, exporter.document(&model));
    }
}
