//! RDF to JSON-LD serialization
//!
//! Reference: https://www.w3.org/TR/json-ld-api/#serialize-rdf-as-json-ld-algorithm

use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

use crate::config::Config;
use crate::rdf::{
    is_blank, number_to_json, Literal, Object, Triple, RDF_FIRST, RDF_LIST, RDF_NIL, RDF_REST,
    RDF_TYPE, XSD_BOOLEAN, XSD_DOUBLE, XSD_INTEGER, XSD_STRING,
};

const DEFAULT_GRAPH: &str = "@default";

/// Top-level JSON-LD node object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonLdNode {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type", skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
    /// Nodes of the named graph carrying this node's id
    #[serde(rename = "@graph", skip_serializing_if = "Option::is_none")]
    pub graph: Option<Vec<JsonLdNode>>,
    /// Predicate IRI -> `{"@id"}`, `{"@value"}` or `{"@list"}` objects
    #[serde(flatten)]
    pub properties: BTreeMap<String, Vec<Value>>,
}

impl JsonLdNode {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            types: Vec::new(),
            graph: None,
            properties: BTreeMap::new(),
        }
    }

    /// Values of `predicate`, empty if absent
    pub fn values(&self, predicate: &str) -> &[Value] {
        self.properties
            .get(predicate)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Nothing but an `@id`
    fn is_stub(&self) -> bool {
        self.types.is_empty() && self.graph.is_none() && self.properties.is_empty()
    }
}

/// Location of a node reference: `properties[property][index]` of node `node`
#[derive(Debug, Clone)]
struct Usage {
    node: String,
    property: String,
    index: usize,
}

#[derive(Debug)]
struct NodeEntry {
    node: JsonLdNode,
    /// Places that reference this node
    usages: Vec<Usage>,
}

impl NodeEntry {
    fn new(id: &str) -> Self {
        Self {
            node: JsonLdNode::new(id),
            usages: Vec::new(),
        }
    }

    fn is_well_formed_list_node(&self) -> bool {
        self.usages.len() == 1
            && self.node.values(RDF_FIRST).len() == 1
            && self.node.values(RDF_REST).len() == 1
            && (self.node.types.is_empty() || self.node.types == [RDF_LIST])
    }
}

type NodeMap = BTreeMap<String, NodeEntry>;

/// Serialize triples as an array of JSON-LD nodes sorted by `@id`
pub fn rdf_to_jsonld(triples: &[Triple], config: &Config) -> Vec<JsonLdNode> {
    let mut graphs: BTreeMap<String, NodeMap> = BTreeMap::new();
    graphs.insert(DEFAULT_GRAPH.to_string(), NodeMap::new());

    for triple in triples {
        let name = triple
            .graph
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_GRAPH);
        if name != DEFAULT_GRAPH {
            graphs
                .entry(DEFAULT_GRAPH.to_string())
                .or_default()
                .entry(name.to_string())
                .or_insert_with(|| NodeEntry::new(name));
        }
        let node_map = graphs.entry(name.to_string()).or_default();
        add_triple(node_map, triple, config);
    }

    for node_map in graphs.values_mut() {
        compact_lists(node_map);
    }

    let default_graph = graphs.remove(DEFAULT_GRAPH).unwrap_or_default();
    let mut result = Vec::new();
    for (id, entry) in default_graph {
        let mut node = entry.node;
        if let Some(graph) = graphs.remove(&id) {
            node.graph = Some(
                graph
                    .into_values()
                    .map(|entry| entry.node)
                    .filter(|node| !node.is_stub())
                    .collect(),
            );
        }
        if !node.is_stub() {
            result.push(node);
        }
    }

    tracing::debug!(nodes = result.len(), "serialized json-ld");
    result
}

fn add_triple(node_map: &mut NodeMap, triple: &Triple, config: &Config) {
    let object_id = triple.object.id();
    if let Some(id) = object_id {
        node_map
            .entry(id.to_string())
            .or_insert_with(|| NodeEntry::new(id));
    }
    let subject = node_map
        .entry(triple.subject.clone())
        .or_insert_with(|| NodeEntry::new(&triple.subject));

    if let (RDF_TYPE, false, Some(id)) = (triple.predicate.as_str(), config.use_rdf_type, object_id)
    {
        if !subject.node.types.iter().any(|t| t == id) {
            subject.node.types.push(id.to_string());
        }
        return;
    }

    let value = jsonld_value(&triple.object, config.use_native_types);
    let values = subject
        .node
        .properties
        .entry(triple.predicate.clone())
        .or_default();
    let index = match values.iter().position(|existing| *existing == value) {
        Some(index) => index,
        None => {
            values.push(value);
            values.len() - 1
        }
    };

    if let Some(referenced) = object_id.and_then(|id| node_map.get_mut(id)) {
        referenced.usages.push(Usage {
            node: triple.subject.clone(),
            property: triple.predicate.clone(),
            index,
        });
    }
}

fn jsonld_value(object: &Object, use_native_types: bool) -> Value {
    match object {
        Object::NamedNode { id } => json!({ "@id": id }),
        Object::Literal(literal) => literal_value(literal, use_native_types),
    }
}

fn literal_value(literal: &Literal, use_native_types: bool) -> Value {
    let lexical = literal.value.to_string();
    let datatype = literal.datatype.as_deref();
    let mut result = Map::new();
    let mut value = Value::String(lexical.clone());
    let mut kept_type = None;

    match datatype {
        Some(XSD_BOOLEAN) if use_native_types => {
            if lexical.eq_ignore_ascii_case("true") {
                value = Value::Bool(true);
            } else if lexical.eq_ignore_ascii_case("false") {
                value = Value::Bool(false);
            } else {
                kept_type = datatype;
            }
        }
        Some(XSD_DOUBLE | XSD_INTEGER) if use_native_types => {
            match lexical.trim().parse::<f64>().ok().filter(|n| n.is_finite()) {
                Some(number) => value = number_to_json(number),
                None => kept_type = datatype,
            }
        }
        _ if literal.language.is_some() => {
            if let Some(language) = &literal.language {
                result.insert("@language".to_string(), Value::String(language.clone()));
            }
        }
        Some(other) if other != XSD_STRING => kept_type = Some(other),
        _ => {}
    }

    result.insert("@value".to_string(), value);
    if let Some(datatype) = kept_type {
        result.insert("@type".to_string(), Value::String(datatype.to_string()));
    }
    Value::Object(result)
}

fn value_at_mut<'m>(node_map: &'m mut NodeMap, usage: &Usage) -> Option<&'m mut Value> {
    node_map
        .get_mut(&usage.node)?
        .node
        .properties
        .get_mut(&usage.property)?
        .get_mut(usage.index)
}

/// Fold well-formed `rdf:first`/`rdf:rest` chains ending in `rdf:nil` into `@list` objects
fn compact_lists(node_map: &mut NodeMap) {
    let Some(nil) = node_map.get(RDF_NIL) else {
        return;
    };

    for usage in nil.usages.clone() {
        let mut node_id = usage.node.clone();
        let mut property = usage.property.clone();
        let mut head = usage;
        // Node referenced by the value at `head`
        let mut referenced = RDF_NIL.to_string();
        let mut list = Vec::new();
        let mut list_nodes = Vec::new();

        while property == RDF_REST {
            let Some(entry) = node_map.get(&node_id) else {
                break;
            };
            if !entry.is_well_formed_list_node() {
                break;
            }
            let (Some(first), Some(next)) = (entry.node.values(RDF_FIRST).first(), entry.usages.first())
            else {
                break;
            };
            list.push(first.clone());
            list_nodes.push(node_id.clone());

            referenced = std::mem::replace(&mut node_id, next.node.clone());
            property = next.property.clone();
            head = next.clone();
            if !is_blank(&node_id) {
                break;
            }
        }

        if property == RDF_FIRST {
            // Nested list: the last collected node stays and its rest becomes the list
            if node_id == RDF_NIL {
                continue;
            }
            head = Usage {
                node: referenced,
                property: RDF_REST.to_string(),
                index: 0,
            };
            list.pop();
            list_nodes.pop();
        }

        list.reverse();
        if let Some(slot) = value_at_mut(node_map, &head) {
            *slot = json!({ "@list": list });
        }
        for id in &list_nodes {
            node_map.remove(id);
        }
    }
}
