//! Schema-driven normalization of the raw JSON model.
//!
//! The raw model is terse: identifiers may be numbers or missing, references
//! may be inline objects, and unknown fields are tolerated. Normalization
//! walks the document against the class table and produces one flat
//! [`Record`] per resource whose fields all have the shape the typed
//! records expect. Recoverable problems are logged; a value of the wrong
//! structural type is a hard [`ModelError::InvalidField`].

use std::collections::HashSet;

use indexmap::IndexMap;
use log::{debug, trace};
use serde_json::{Map, Number, Value};

use apinatomy_core::{
    color::Color,
    identifier::Id,
    schema::{FieldKind, RelationSpec, ResourceClass},
};

use crate::{
    diagnostics::{LogCode, Logger},
    error::{ModelError, json_type},
};

/// Identifier given to a model that does not declare one.
pub const DEFAULT_GRAPH_ID: &str = "mainGraph";

/// A normalized resource definition.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Record {
    pub class: ResourceClass,
    pub value: Map<String, Value>,
    /// The group whose arrays the resource belongs to.
    pub group: Option<Id>,
}

/// The flattened model: every resource once, keyed by identifier.
#[derive(Debug)]
pub(crate) struct Normalized {
    pub root: Id,
    pub records: IndexMap<Id, Record>,
}

/// Normalizes a whole model document.
pub(crate) fn normalize(model: Value, logger: &mut Logger) -> Result<Normalized, ModelError> {
    let Value::Object(mut map) = model else {
        return Err(ModelError::NotAnObject {
            found: json_type(&model),
        });
    };
    if map.get("id").is_none_or(Value::is_null) {
        map.insert("id".into(), Value::String(DEFAULT_GRAPH_ID.into()));
    }

    let mut taken = HashSet::new();
    collect_ids(&map, &mut taken);

    let mut normalizer = Normalizer {
        logger,
        records: IndexMap::new(),
        taken,
        counter: 0,
    };
    let root = normalizer
        .normalize_resource(ResourceClass::Group, Value::Object(map), None)?
        .unwrap_or_else(|| Id::new(DEFAULT_GRAPH_ID));

    debug!(records = normalizer.records.len(); "Model normalized");
    Ok(Normalized {
        root,
        records: normalizer.records,
    })
}

fn collect_ids(map: &Map<String, Value>, taken: &mut HashSet<String>) {
    match map.get("id") {
        Some(Value::String(id)) => {
            taken.insert(id.clone());
        }
        Some(Value::Number(id)) => {
            taken.insert(id.to_string());
        }
        _ => {}
    }
    for value in map.values() {
        collect_nested_ids(value, taken);
    }
}

fn collect_nested_ids(value: &Value, taken: &mut HashSet<String>) {
    match value {
        Value::Object(map) => collect_ids(map, taken),
        Value::Array(items) => items
            .iter()
            .for_each(|item| collect_nested_ids(item, taken)),
        _ => {}
    }
}

struct Normalizer<'a> {
    logger: &'a mut Logger,
    records: IndexMap<Id, Record>,
    taken: HashSet<String>,
    counter: usize,
}

/// Where a field value sits, for diagnostics and errors.
#[derive(Clone, Copy)]
struct Site<'f> {
    class: ResourceClass,
    id: Id,
    field: &'f str,
    /// Enclosing group of the resource owning the field.
    group: Option<Id>,
}

impl Site<'_> {
    fn invalid(&self, reason: impl Into<String>) -> ModelError {
        ModelError::invalid_field(self.class, self.id, self.field, reason)
    }

    fn expected(&self, what: &str, found: &Value) -> ModelError {
        self.invalid(format!("expected {what}, found {}", json_type(found)))
    }
}

impl Normalizer<'_> {
    /// Normalizes one resource definition and records it.
    ///
    /// Returns `None` when the definition had to be skipped.
    fn normalize_resource(
        &mut self,
        class: ResourceClass,
        value: Value,
        group: Option<Id>,
    ) -> Result<Option<Id>, ModelError> {
        let Value::Object(mut map) = value else {
            return Err(ModelError::invalid_field(
                class,
                "?",
                "id",
                format!("expected a resource object, found {}", json_type(&value)),
            ));
        };

        let id = self.normalize_id(class, &mut map)?;
        let class = self.resolve_class(class, id, map.remove("class"));
        if class.is_abstract() {
            self.logger
                .error(LogCode::ResourceNoAbstractClass, [id.to_string(), class.to_string()]);
            return Ok(None);
        }
        trace!(id:% = id, class = class.as_str(); "Normalizing resource");

        let mut unknown = Vec::new();
        let keys: Vec<String> = map.keys().filter(|key| *key != "id").cloned().collect();
        for key in keys {
            let value = map.remove(&key).unwrap_or(Value::Null);
            let Some(spec) = class.field(&key) else {
                unknown.push(key);
                continue;
            };
            let site = Site {
                class,
                id,
                field: spec.name,
                group,
            };
            if let Some(value) = self.normalize_field(site, spec.kind, value)? {
                map.insert(key, value);
            }
        }
        if !unknown.is_empty() {
            self.logger.info(
                LogCode::ResourceIgnoreFields,
                [id.to_string(), unknown.join(", ")],
            );
        }

        self.insert_record(id, class, map, group);
        Ok(Some(id))
    }

    fn normalize_id(
        &mut self,
        class: ResourceClass,
        map: &mut Map<String, Value>,
    ) -> Result<Id, ModelError> {
        let id = match map.get("id") {
            Some(Value::String(id)) if !id.is_empty() => Id::new(id),
            Some(Value::Number(number)) => {
                let id = Id::new(&number.to_string());
                self.logger.info(LogCode::ResourceNumIdToStr, [id]);
                id
            }
            None | Some(Value::Null) | Some(Value::String(_)) => {
                let id = self.fresh_id(class);
                self.logger
                    .warn(LogCode::ResourceNoId, [id.to_string(), class.to_string()]);
                id
            }
            Some(other) => {
                return Err(ModelError::invalid_field(
                    class,
                    "?",
                    "id",
                    format!("expected a string, found {}", json_type(other)),
                ));
            }
        };
        map.insert("id".into(), Value::String(id.to_string()));
        Ok(id)
    }

    fn fresh_id(&mut self, class: ResourceClass) -> Id {
        loop {
            self.counter += 1;
            let candidate = format!("{}_{}", class.id_prefix(), self.counter);
            if self.taken.insert(candidate.clone()) {
                return Id::new(&candidate);
            }
        }
    }

    /// An explicit `class` may narrow an abstract or matching expected class.
    fn resolve_class(&mut self, expected: ResourceClass, id: Id, named: Option<Value>) -> ResourceClass {
        let Some(named) = named else {
            return expected;
        };
        let name = match &named {
            Value::String(name) => name.as_str(),
            _ => "",
        };
        match name.parse::<ResourceClass>() {
            Ok(class) if class.is_a(expected) => class,
            _ => {
                self.logger.warn(
                    LogCode::ResourceClassUnknown,
                    [id.to_string(), named.to_string(), expected.to_string()],
                );
                expected
            }
        }
    }

    fn normalize_field(
        &mut self,
        site: Site<'_>,
        kind: FieldKind,
        value: Value,
    ) -> Result<Option<Value>, ModelError> {
        if value.is_null() {
            return Ok(None);
        }
        let normalized = match kind {
            FieldKind::Text => match value {
                Value::String(_) => Some(value),
                Value::Number(number) => {
                    self.logger.info(
                        LogCode::ResourceNumValToStr,
                        [site.id.to_string(), site.field.to_string()],
                    );
                    Some(Value::String(number.to_string()))
                }
                other => return Err(site.expected("a string", &other)),
            },
            FieldKind::Color => match &value {
                Value::String(color) => match Color::new(color) {
                    Ok(_) => Some(value),
                    Err(err) => {
                        self.invalid_value(site, err);
                        None
                    }
                },
                other => return Err(site.expected("a color string", other)),
            },
            FieldKind::Number => match value {
                Value::Number(_) => Some(value),
                other => return Err(site.expected("a number", &other)),
            },
            FieldKind::Count => match &value {
                Value::Number(number) => match as_integer(number) {
                    Some(count) if count >= 0 => Some(Value::from(count)),
                    _ => {
                        self.invalid_value(site, format!("`{number}` is not a count"));
                        None
                    }
                },
                other => return Err(site.expected("a number", other)),
            },
            FieldKind::Flag => match value {
                Value::Bool(_) => Some(value),
                other => return Err(site.expected("a boolean", &other)),
            },
            FieldKind::Choice(choice) => match &value {
                Value::String(name) if choice.accepts(name) => Some(value),
                Value::String(name) => {
                    self.invalid_value(site, format!("unknown value `{name}`"));
                    None
                }
                other => return Err(site.expected("a string", other)),
            },
            FieldKind::Point => {
                check_point(site, &value)?;
                Some(value)
            }
            FieldKind::Points => match &value {
                Value::Array(points) => {
                    for point in points {
                        check_point(site, point)?;
                    }
                    Some(value)
                }
                other => return Err(site.expected("an array of points", other)),
            },
            FieldKind::Range => {
                check_numeric_object(site, &value, &["min", "max"])?;
                Some(value)
            }
            FieldKind::Scale => {
                check_numeric_object(site, &value, &["width", "height"])?;
                Some(value)
            }
            FieldKind::Integers => match value {
                Value::Array(items) => {
                    let mut integers = Vec::with_capacity(items.len());
                    for item in &items {
                        match item {
                            Value::Number(number) => match as_integer(number) {
                                Some(integer) => integers.push(Value::from(integer)),
                                None => return Err(site.expected("an integer", item)),
                            },
                            other => return Err(site.expected("an integer", other)),
                        }
                    }
                    Some(Value::Array(integers))
                }
                other => return Err(site.expected("an array", &other)),
            },
            FieldKind::Opaque => Some(value),
            FieldKind::OpaqueIds => match value {
                Value::Array(items) => {
                    let mut ids = Vec::with_capacity(items.len());
                    for item in items {
                        match item {
                            Value::String(_) => ids.push(item),
                            Value::Number(number) => {
                                self.logger.info(LogCode::ResourceNumIdToStr, [number.to_string()]);
                                ids.push(Value::String(number.to_string()));
                            }
                            other => return Err(site.expected("an identifier", &other)),
                        }
                    }
                    Some(Value::Array(ids))
                }
                other => return Err(site.expected("an array", &other)),
            },
            FieldKind::Relation(relation) => self.normalize_relation(site, relation, value)?,
        };
        Ok(normalized)
    }

    fn normalize_relation(
        &mut self,
        site: Site<'_>,
        relation: RelationSpec,
        value: Value,
    ) -> Result<Option<Value>, ModelError> {
        if relation.many {
            let Value::Array(items) = value else {
                return Err(site.expected("an array", &value));
            };
            let mut ids = Vec::with_capacity(items.len());
            for item in items {
                if let Some(id) = self.normalize_reference(site, relation.target, item)? {
                    ids.push(Value::String(id.to_string()));
                }
            }
            Ok(Some(Value::Array(ids)))
        } else {
            if value.is_array() {
                return Err(site.expected("a single reference", &value));
            }
            Ok(self
                .normalize_reference(site, relation.target, value)?
                .map(|id| Value::String(id.to_string())))
        }
    }

    /// Turns one reference into an identifier, hoisting inline definitions.
    fn normalize_reference(
        &mut self,
        site: Site<'_>,
        target: ResourceClass,
        item: Value,
    ) -> Result<Option<Id>, ModelError> {
        match item {
            Value::String(id) if id.is_empty() => Ok(None),
            Value::String(id) => Ok(Some(Id::new(&id))),
            Value::Number(number) => {
                self.logger.info(LogCode::ResourceNumIdToStr, [number.to_string()]);
                Ok(Some(Id::new(&number.to_string())))
            }
            Value::Object(definition) => {
                if target.is_abstract() && !definition.contains_key("class") {
                    self.logger.error(
                        LogCode::ResourceNoAbstractClass,
                        [site.id.to_string(), site.field.to_string()],
                    );
                    return Ok(None);
                }
                // Members listed in a group's own arrays belong to that group;
                // anything else defined inline joins the enclosing group.
                let group = if site.class == ResourceClass::Group {
                    Some(site.id)
                } else {
                    site.group
                };
                self.normalize_resource(target, Value::Object(definition), group)
            }
            other => Err(site.expected("a reference", &other)),
        }
    }

    fn invalid_value(&mut self, site: Site<'_>, reason: impl ToString) {
        self.logger.warn(
            LogCode::ResourceInvalidValue,
            [site.id.to_string(), site.field.to_string(), reason.to_string()],
        );
    }

    /// Records a definition, merging repeated definitions of the same id.
    ///
    /// A bare `{id}` never replaces a fuller definition, and is replaced by
    /// one. Two different full definitions keep the first.
    fn insert_record(
        &mut self,
        id: Id,
        class: ResourceClass,
        value: Map<String, Value>,
        group: Option<Id>,
    ) {
        let Some(existing) = self.records.get_mut(&id) else {
            self.records.insert(id, Record { class, value, group });
            return;
        };
        if existing.class != class {
            self.logger.warn(
                LogCode::ResourceDuplicate,
                [id.to_string(), existing.class.to_string(), class.to_string()],
            );
            return;
        }
        if existing.group.is_none() {
            existing.group = group;
        }
        if existing.value == value || value.len() == 1 {
            return;
        }
        if existing.value.len() == 1 {
            existing.value = value;
            return;
        }
        self.logger.warn(LogCode::ResourceDuplicate, [id]);
    }
}

fn as_integer(number: &Number) -> Option<i64> {
    number.as_i64().or_else(|| {
        number
            .as_f64()
            .filter(|value| value.fract() == 0.0 && value.abs() < i64::MAX as f64)
            .map(|value| value as i64)
    })
}

fn check_point(site: Site<'_>, value: &Value) -> Result<(), ModelError> {
    check_numeric_object(site, value, &["x", "y", "z"])
}

fn check_numeric_object(site: Site<'_>, value: &Value, keys: &[&str]) -> Result<(), ModelError> {
    let Value::Object(map) = value else {
        return Err(site.expected("an object", value));
    };
    for key in keys {
        match map.get(*key) {
            None | Some(Value::Null) | Some(Value::Number(_)) => {}
            Some(other) => {
                return Err(site.invalid(format!(
                    "`{key}` must be a number, found {}",
                    json_type(other)
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::diagnostics::Severity;

    fn run(model: Value) -> (Result<Normalized, ModelError>, Logger) {
        let mut logger = Logger::new();
        let result = normalize(model, &mut logger);
        (result, logger)
    }

    #[test]
    fn test_default_graph_id() {
        let (result, _) = run(json!({}));
        let normalized = result.unwrap();
        assert_eq!(normalized.root, DEFAULT_GRAPH_ID);
        assert_eq!(normalized.records.len(), 1);
    }

    #[test]
    fn test_not_an_object() {
        let (result, _) = run(json!([1, 2]));
        assert!(matches!(result, Err(ModelError::NotAnObject { found: "an array" })));
    }

    #[test]
    fn test_inline_references_are_hoisted() {
        let (result, logger) = run(json!({
            "id": "g",
            "links": [{"id": "l1", "source": {"id": "n1", "name": "first"}, "target": "n2"}]
        }));
        let normalized = result.unwrap();

        let link = &normalized.records[&Id::new("l1")];
        assert_eq!(link.value["source"], "n1");
        assert_eq!(link.group, Some(Id::new("g")));

        let node = &normalized.records[&Id::new("n1")];
        assert_eq!(node.class, ResourceClass::Node);
        assert_eq!(node.group, Some(Id::new("g")));
        assert_eq!(node.value["name"], "first");
        assert!(logger.is_empty());
    }

    #[test]
    fn test_numeric_ids_and_unknown_fields() {
        let (result, logger) = run(json!({
            "nodes": [{"id": 7, "mystery": true}],
            "links": [{"id": "l", "source": 7}]
        }));
        let normalized = result.unwrap();

        assert!(normalized.records.contains_key(&Id::new("7")));
        assert_eq!(normalized.records[&Id::new("l")].value["source"], "7");
        assert_eq!(logger.with_code(LogCode::ResourceNumIdToStr).count(), 2);
        let ignored: Vec<_> = logger.with_code(LogCode::ResourceIgnoreFields).collect();
        assert_eq!(ignored[0].params(), ["7", "mystery"]);
        assert_eq!(logger.count(Severity::Warning), 0);
    }

    #[test]
    fn test_missing_ids_are_generated() {
        let (result, logger) = run(json!({"nodes": [{"id": "node_1"}, {"name": "anonymous"}]}));
        let normalized = result.unwrap();

        assert!(normalized.records.contains_key(&Id::new("node_2")));
        assert_eq!(logger.with_code(LogCode::ResourceNoId).count(), 1);
    }

    #[test]
    fn test_invalid_enum_and_color_dropped() {
        let (result, logger) = run(json!({
            "lyphs": [{"id": "L", "topology": "SPHERE", "color": "not-a-color"}]
        }));
        let normalized = result.unwrap();

        let lyph = &normalized.records[&Id::new("L")];
        assert!(!lyph.value.contains_key("topology"));
        assert!(!lyph.value.contains_key("color"));
        assert_eq!(logger.with_code(LogCode::ResourceInvalidValue).count(), 2);
    }

    #[test]
    fn test_wrong_structural_type_is_hard_failure() {
        let (result, _) = run(json!({"lyphs": [{"id": "L", "layers": "L2"}]}));
        match result {
            Err(ModelError::InvalidField { class, id, field, .. }) => {
                assert_eq!(class, ResourceClass::Lyph);
                assert_eq!(id, "L");
                assert_eq!(field, "layers");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_abstract_inline_requires_class() {
        let (result, logger) = run(json!({
            "lyphs": [
                {"id": "A", "internalIn": {"id": "R"}},
                {"id": "B", "internalIn": {"id": "R2", "class": "Region"}}
            ]
        }));
        let normalized = result.unwrap();

        assert!(!normalized.records.contains_key(&Id::new("R")));
        assert_eq!(normalized.records[&Id::new("R2")].class, ResourceClass::Region);
        assert_eq!(logger.with_code(LogCode::ResourceNoAbstractClass).count(), 1);
    }

    #[test]
    fn test_stub_replaced_by_full_definition() {
        let (result, logger) = run(json!({
            "links": [{"id": "l", "source": {"id": "n"}}],
            "nodes": [{"id": "n", "name": "full"}]
        }));
        let normalized = result.unwrap();

        assert_eq!(normalized.records[&Id::new("n")].value["name"], "full");
        assert_eq!(logger.with_code(LogCode::ResourceDuplicate).count(), 0);
    }

    #[test]
    fn test_nested_groups_own_their_members() {
        let (result, _) = run(json!({
            "id": "root",
            "groups": [{"id": "inner", "nodes": [{"id": "n"}]}]
        }));
        let normalized = result.unwrap();

        assert_eq!(normalized.records[&Id::new("n")].group, Some(Id::new("inner")));
        assert_eq!(normalized.records[&Id::new("inner")].group, Some(Id::new("root")));
        assert_eq!(normalized.records[&Id::new("root")].value["groups"], json!(["inner"]));
    }
}
