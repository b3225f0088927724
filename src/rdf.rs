//! RDF triple model shared by the generator and every serializer

use serde::{Serialize, Serializer};
use std::fmt;

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const RDF_NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";
pub const RDF_FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";
pub const RDF_REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";
pub const RDF_LIST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#List";

pub const XSD_DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
pub const XSD_BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
pub const XSD_DATE: &str = "http://www.w3.org/2001/XMLSchema#date";
pub const XSD_TIME: &str = "http://www.w3.org/2001/XMLSchema#time";
pub const XSD_DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
pub const XSD_G_YEAR_MONTH: &str = "http://www.w3.org/2001/XMLSchema#gYearMonth";
pub const XSD_G_YEAR: &str = "http://www.w3.org/2001/XMLSchema#gYear";
pub const XSD_DURATION: &str = "http://www.w3.org/2001/XMLSchema#duration";

/// Whether `id` is a blank node label (`_:n`)
pub fn is_blank(id: &str) -> bool {
    id.starts_with("_:")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: Object,
    /// Named graph, `None` for the default graph
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph: Option<String>,
}

impl Triple {
    pub fn new(subject: impl Into<String>, predicate: impl Into<String>, object: Object) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object,
            graph: None,
        }
    }

    pub fn in_graph(mut self, graph: impl Into<String>) -> Self {
        self.graph = Some(graph.into());
        self
    }
}

/// Object position of a triple
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Object {
    /// IRI or blank node label
    NamedNode { id: String },
    Literal(Literal),
}

impl Object {
    pub fn named(id: impl Into<String>) -> Self {
        Object::NamedNode { id: id.into() }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Object::NamedNode { id } => Some(id),
            Object::Literal(_) => None,
        }
    }
}

impl From<Literal> for Object {
    fn from(literal: Literal) -> Self {
        Object::Literal(literal)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Literal {
    pub value: LiteralValue,
    /// Datatype IRI; absent for plain strings
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl Literal {
    /// Untyped string literal
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: LiteralValue::Text(value.into()),
            datatype: None,
            language: None,
        }
    }

    pub fn typed(value: impl Into<LiteralValue>, datatype: &str) -> Self {
        Self {
            value: value.into(),
            datatype: Some(datatype.to_string()),
            language: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Text(String),
    Number(f64),
    Boolean(bool),
}

impl LiteralValue {
    /// JSON form; integral numbers become JSON integers
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            LiteralValue::Text(text) => serde_json::Value::String(text.clone()),
            LiteralValue::Number(number) => number_to_json(*number),
            LiteralValue::Boolean(flag) => serde_json::Value::Bool(*flag),
        }
    }
}

impl Serialize for LiteralValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<&str> for LiteralValue {
    fn from(text: &str) -> Self {
        LiteralValue::Text(text.to_string())
    }
}

impl From<String> for LiteralValue {
    fn from(text: String) -> Self {
        LiteralValue::Text(text)
    }
}

impl From<f64> for LiteralValue {
    fn from(number: f64) -> Self {
        LiteralValue::Number(number)
    }
}

impl From<bool> for LiteralValue {
    fn from(flag: bool) -> Self {
        LiteralValue::Boolean(flag)
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Text(text) => f.write_str(text),
            LiteralValue::Number(number) => write!(f, "{}", number),
            LiteralValue::Boolean(flag) => write!(f, "{}", flag),
        }
    }
}

/// Largest magnitude at which every integral f64 is exactly an i64
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

pub(crate) fn number_to_json(number: f64) -> serde_json::Value {
    if number.fract() == 0.0 && number.abs() <= MAX_SAFE_INTEGER {
        serde_json::Value::from(number as i64)
    } else {
        serde_json::Number::from_f64(number)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}
