//! Microdata to RDF converter
//!
//! Extracts `itemscope`/`itemprop` structured data from HTML and converts it:
//! - RDF triples (W3C Microdata to RDF)
//! - JSON-LD (W3C RDF to JSON-LD serialization, with list compaction)
//! - Canonical N-Quads
//! - A nested JSON projection of items and properties
//!
//! A C interface for embedding lives in [`ffi`].

pub mod config;
pub mod error;
pub mod ffi;
pub mod microdata;
pub mod rdf;
pub mod serializers;

pub use config::{Config, PropertyRelations, Registry, Vocabulary};
pub use error::{Error, Result};
pub use rdf::{Literal, LiteralValue, Object, Triple};
pub use serializers::{JsonItem, JsonLdNode, JsonOutput, JsonValue, CIRCULAR_REF};

use microdata::microdata_to_rdf;
use serializers::{rdf_to_json, rdf_to_jsonld, rdf_to_nquads};

/// Triples of every top-level item in `html`
pub fn to_rdf(html: &str, config: &Config) -> Result<Vec<Triple>> {
    microdata_to_rdf(html, &config.normalized())
}

/// JSON-LD node objects sorted by `@id`
pub fn to_jsonld(html: &str, config: &Config) -> Result<Vec<JsonLdNode>> {
    let config = config.normalized();
    let triples = microdata_to_rdf(html, &config)?;
    Ok(rdf_to_jsonld(&triples, &config))
}

/// Nested `{ "items": [...] }` projection
pub fn to_json(html: &str, config: &Config) -> Result<JsonOutput> {
    let config = config.normalized();
    let triples = microdata_to_rdf(html, &config)?;
    Ok(rdf_to_json(&triples, &config))
}

/// Sorted N-Quads text
pub fn to_nquads(html: &str, config: &Config) -> Result<String> {
    let triples = to_rdf(html, config)?;
    Ok(rdf_to_nquads(&triples))
}

/// JSON-LD for an already generated triple list, named graphs included
pub fn triples_to_jsonld(triples: &[Triple], config: &Config) -> Vec<JsonLdNode> {
    rdf_to_jsonld(triples, &config.normalized())
}

/// Sorted N-Quads for an already generated triple list
pub fn triples_to_nquads(triples: &[Triple]) -> String {
    rdf_to_nquads(triples)
}

/// Nested JSON projection of an already generated triple list
pub fn triples_to_json(triples: &[Triple], config: &Config) -> JsonOutput {
    rdf_to_json(triples, &config.normalized())
}
