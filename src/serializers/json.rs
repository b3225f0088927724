//! Nested JSON projection of the triple graph
//!
//! Each subject becomes an item with short property names. Blank node
//! objects that are themselves items are inlined where they are used.

use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::{btree_map, BTreeMap, HashMap, HashSet};
use std::slice;

use crate::config::Config;
use crate::rdf::{is_blank, Object, Triple, RDF_TYPE};

/// Marker written where an item would contain one of its own ancestors
pub const CIRCULAR_REF: &str = "ERROR";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonOutput {
    pub items: Vec<JsonItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JsonItem {
    /// Absent for blank node subjects
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
    pub properties: BTreeMap<String, Vec<JsonValue>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsonValue {
    Item(JsonItem),
    Value(Value),
    /// Reference back to an enclosing item
    CircularRef,
}

impl Serialize for JsonValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            JsonValue::Item(item) => item.serialize(serializer),
            JsonValue::Value(value) => value.serialize(serializer),
            JsonValue::CircularRef => serializer.serialize_str(CIRCULAR_REF),
        }
    }
}

enum DraftValue<'t> {
    Ref(&'t str),
    Value(Value),
}

#[derive(Default)]
struct Draft<'t> {
    types: Vec<String>,
    properties: BTreeMap<String, Vec<DraftValue<'t>>>,
}

pub fn rdf_to_json(triples: &[Triple], config: &Config) -> JsonOutput {
    let mut order: Vec<&str> = Vec::new();
    let mut drafts: HashMap<&str, Draft> = HashMap::new();
    for triple in triples {
        let subject = triple.subject.as_str();
        if !drafts.contains_key(subject) {
            order.push(subject);
            drafts.insert(subject, Draft::default());
        }
    }

    let mut nested: HashSet<&str> = HashSet::new();
    for triple in triples {
        if triple.predicate == RDF_TYPE {
            let draft = drafts.get_mut(triple.subject.as_str());
            if let (Some(id), Some(draft)) = (triple.object.id(), draft) {
                draft.types.push(id.to_string());
            }
            continue;
        }

        let value = match &triple.object {
            Object::NamedNode { id } if is_blank(id) => {
                if drafts.contains_key(id.as_str()) {
                    nested.insert(id.as_str());
                    Some(DraftValue::Ref(id.as_str()))
                } else {
                    None
                }
            }
            Object::NamedNode { id } => Some(DraftValue::Value(Value::String(id.clone()))),
            Object::Literal(literal) => Some(DraftValue::Value(literal.value.to_json())),
        };

        if let (Some(value), Some(draft)) = (value, drafts.get_mut(triple.subject.as_str())) {
            let property = short_name(&triple.predicate, &draft.types, &config.base);
            draft.properties.entry(property).or_default().push(value);
        }
    }

    let items = order
        .into_iter()
        .filter(|id| !nested.contains(id))
        .filter_map(|id| materialize(&drafts, id))
        .collect();

    JsonOutput { items }
}

/// Predicate IRI minus the longest matching type vocabulary or `base#` prefix
fn short_name(predicate: &str, types: &[String], base: &str) -> String {
    let base_vocab = format!("{}#", base);
    types
        .iter()
        .map(|t| t.trim_end_matches(|c: char| c != '#' && c != '/'))
        .chain(std::iter::once(base_vocab.as_str()))
        .filter(|vocab| predicate.starts_with(vocab))
        .max_by_key(|vocab| vocab.len())
        .map(|vocab| predicate[vocab.len()..].to_string())
        .unwrap_or_else(|| predicate.to_string())
}

/// An item whose property values are being filled in
struct Building<'d, 't> {
    id: &'t str,
    draft: &'d Draft<'t>,
    entries: btree_map::Iter<'d, String, Vec<DraftValue<'t>>>,
    current: Option<(&'d String, slice::Iter<'d, DraftValue<'t>>)>,
    values: Vec<JsonValue>,
    properties: BTreeMap<String, Vec<JsonValue>>,
}

impl<'d, 't> Building<'d, 't> {
    fn new(id: &'t str, draft: &'d Draft<'t>) -> Self {
        Self {
            id,
            draft,
            entries: draft.properties.iter(),
            current: None,
            values: Vec::new(),
            properties: BTreeMap::new(),
        }
    }

    fn next_value(&mut self) -> Option<&'d DraftValue<'t>> {
        loop {
            if let Some((_, values)) = self.current.as_mut() {
                if let Some(value) = values.next() {
                    return Some(value);
                }
            }
            self.flush();
            let (name, values) = self.entries.next()?;
            self.current = Some((name, values.iter()));
        }
    }

    fn flush(&mut self) {
        if let Some((name, _)) = self.current.take() {
            self.properties
                .insert(name.clone(), std::mem::take(&mut self.values));
        }
    }

    fn finish(mut self) -> JsonItem {
        self.flush();
        JsonItem {
            id: (!is_blank(self.id)).then(|| self.id.to_string()),
            types: self.draft.types.clone(),
            properties: self.properties,
        }
    }
}

/// Build the item tree below `root`, cutting references to items on the current path
fn materialize<'d, 't>(
    drafts: &'d HashMap<&'t str, Draft<'t>>,
    root: &'t str,
) -> Option<JsonItem> {
    let mut stack = vec![Building::new(root, drafts.get(root)?)];

    while let Some(top) = stack.last_mut() {
        match top.next_value() {
            Some(DraftValue::Value(value)) => top.values.push(JsonValue::Value(value.clone())),
            Some(DraftValue::Ref(target)) => {
                if stack.iter().any(|building| building.id == *target) {
                    if let Some(top) = stack.last_mut() {
                        top.values.push(JsonValue::CircularRef);
                    }
                } else if let Some(draft) = drafts.get(*target) {
                    stack.push(Building::new(*target, draft));
                }
            }
            None => {
                let item = stack.pop()?.finish();
                match stack.last_mut() {
                    Some(parent) => parent.values.push(JsonValue::Item(item)),
                    None => return Some(item),
                }
            }
        }
    }

    None
}

// Nested items are unlinked and dropped one level at a time
impl Drop for JsonItem {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        take_children(&mut self.properties, &mut pending);
        while let Some(mut item) = pending.pop() {
            take_children(&mut item.properties, &mut pending);
        }
    }
}

fn take_children(
    properties: &mut BTreeMap<String, Vec<JsonValue>>,
    pending: &mut Vec<JsonItem>,
) {
    for values in properties.values_mut() {
        for value in values.iter_mut() {
            if let JsonValue::Item(item) = value {
                pending.push(std::mem::take(item));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::{Literal, XSD_INTEGER};
    use serde_json::json;

    fn lit(subject: &str, predicate: &str, value: &str) -> Triple {
        Triple::new(subject, predicate, Literal::plain(value).into())
    }

    fn link(subject: &str, predicate: &str, id: &str) -> Triple {
        Triple::new(subject, predicate, Object::named(id))
    }

    #[test]
    fn test_nested_items_are_inlined() {
        let triples = vec![
            link("_:0", RDF_TYPE, "http://schema.org/Person"),
            lit("_:0", "http://schema.org/name", "Jan"),
            Triple::new("_:0", "http://schema.org/age", Literal::typed(29.0, XSD_INTEGER).into()),
            link("_:1", RDF_TYPE, "http://schema.org/PostalAddress"),
            lit("_:1", "http://schema.org/street", "street1"),
            link("_:0", "http://schema.org/address", "_:1"),
            link("_:0", "http://schema.org/url", "http://example.com/jan"),
        ];
        let output = rdf_to_json(&triples, &Config::default());
        assert_eq!(
            serde_json::to_value(&output).unwrap(),
            json!({
                "items": [{
                    "type": ["http://schema.org/Person"],
                    "properties": {
                        "name": ["Jan"],
                        "age": [29],
                        "address": [{
                            "type": ["http://schema.org/PostalAddress"],
                            "properties": {"street": ["street1"]}
                        }],
                        "url": ["http://example.com/jan"]
                    }
                }]
            })
        );
    }

    #[test]
    fn test_iri_subjects_keep_their_id() {
        let triples = vec![lit("http://example.com/#me", "http://example.com/#name", "Jan")];
        let config = Config::default().with_base("http://example.com/");
        let output = rdf_to_json(&triples, &config);
        assert_eq!(output.items[0].id.as_deref(), Some("http://example.com/#me"));
        assert_eq!(
            output.items[0].properties["name"],
            vec![JsonValue::Value(json!("Jan"))]
        );
    }

    #[test]
    fn test_cycles_become_markers() {
        let triples = vec![
            lit("_:0", "#name", "Jan"),
            lit("_:1", "#name", "Other Jan"),
            lit("_:2", "#name", "Jan"),
            link("_:2", "#friend", "_:1"),
            link("_:1", "#friend", "_:2"),
            link("_:0", "#friend", "_:1"),
        ];
        let output = rdf_to_json(&triples, &Config::default());
        assert_eq!(
            serde_json::to_value(&output).unwrap(),
            json!({
                "items": [{
                    "properties": {
                        "name": ["Jan"],
                        "friend": [{
                            "properties": {
                                "name": ["Other Jan"],
                                "friend": [{
                                    "properties": {"name": ["Jan"], "friend": ["ERROR"]}
                                }]
                            }
                        }]
                    }
                }]
            })
        );
    }

    #[test]
    fn test_marker_is_distinct_from_literal_error() {
        let triples = vec![
            link("_:0", "#child", "_:1"),
            lit("_:1", "#status", "ERROR"),
            link("_:1", "#self", "_:1"),
        ];
        let output = rdf_to_json(&triples, &Config::default());
        assert_eq!(output.items.len(), 1);
        let JsonValue::Item(item) = &output.items[0].properties["child"][0] else {
            panic!("child should be inlined");
        };
        assert_eq!(item.properties["status"], vec![JsonValue::Value(json!("ERROR"))]);
        assert_eq!(item.properties["self"], vec![JsonValue::CircularRef]);
    }

    #[test]
    fn test_unknown_blank_objects_are_dropped() {
        let triples = vec![link("_:0", "#knows", "_:9")];
        let output = rdf_to_json(&triples, &Config::default());
        assert!(output.items[0].properties.is_empty());
    }

    #[test]
    fn test_long_chains_are_built_without_recursion() {
        let depth = 50_000;
        let triples: Vec<Triple> = (0..depth)
            .map(|i| link(&format!("_:{}", i), "#child", &format!("_:{}", i + 1)))
            .chain(std::iter::once(lit(&format!("_:{}", depth), "#name", "leaf")))
            .collect();
        let output = rdf_to_json(&triples, &Config::default());
        assert_eq!(output.items.len(), 1);

        let mut item = &output.items[0];
        let mut levels = 0;
        while let Some(JsonValue::Item(child)) = item.properties.get("child").and_then(|v| v.first()) {
            item = child;
            levels += 1;
        }
        assert_eq!(levels, depth);
        assert_eq!(item.properties["name"], vec![JsonValue::Value(json!("leaf"))]);
    }

    #[test]
    fn test_short_name_prefers_longest_vocabulary() {
        let types = vec!["http://schema.org/Person".to_string()];
        assert_eq!(short_name("http://schema.org/name", &types, ""), "name");
        assert_eq!(short_name("#name", &[], ""), "name");
        assert_eq!(
            short_name("http://example.com/doc#name", &[], "http://example.com/doc"),
            "name"
        );
        assert_eq!(
            short_name("http://purl.org/dc/terms/title", &types, ""),
            "http://purl.org/dc/terms/title"
        );
    }
}
