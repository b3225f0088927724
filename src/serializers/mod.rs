//! Output formats built from a triple list

mod json;
mod jsonld;
mod nquads;

pub use json::{rdf_to_json, JsonItem, JsonOutput, JsonValue, CIRCULAR_REF};
pub use jsonld::{rdf_to_jsonld, JsonLdNode};
pub use nquads::rdf_to_nquads;
