//! Conversion configuration and vocabulary registry

use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

use crate::error::Result;

/// Vocabulary prefix -> vocabulary metadata
pub type Registry = HashMap<String, Vocabulary>;

/// Options for a single conversion.
///
/// Deserializes from the same camelCase JSON document the C interface accepts:
/// `{"base": "...", "registry": {...}, "strict": false, "useRdfType": false, "useNativeTypes": true}`
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Document URL used to resolve relative URLs and unscoped property names
    pub base: String,
    pub registry: Registry,
    /// Reject cyclic item graphs and never promote `itemscope itemprop` elements to top-level items
    pub strict: bool,
    /// Keep `rdf:type` as a regular property instead of folding it into `@type`
    pub use_rdf_type: bool,
    /// Convert `xsd:boolean`, `xsd:integer` and `xsd:double` literals to native JSON values
    pub use_native_types: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base: String::new(),
            registry: Registry::new(),
            strict: false,
            use_rdf_type: false,
            use_native_types: true,
        }
    }
}

impl Config {
    /// Parse a JSON configuration document
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Copy of this config with a trailing `#fragment` removed from the base
    pub fn normalized(&self) -> Self {
        let mut config = self.clone();
        config.base = strip_fragment(&self.base).to_string();
        config
    }
}

fn strip_fragment(base: &str) -> &str {
    match base.rfind('#') {
        Some(pos) if !base[pos + 1..].contains(['/', '?']) => &base[..pos],
        _ => base,
    }
}

/// Property metadata of one vocabulary in the registry
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    pub properties: HashMap<String, PropertyRelations>,
}

/// Predicates that a property implies in addition to its own
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PropertyRelations {
    #[serde(deserialize_with = "one_or_many")]
    pub sub_property_of: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub equivalent_property: Vec<String>,
}

impl PropertyRelations {
    /// `subPropertyOf` entries followed by `equivalentProperty` entries
    pub fn implied(&self) -> impl Iterator<Item = &str> {
        self.sub_property_of
            .iter()
            .chain(&self.equivalent_property)
            .map(String::as_str)
    }
}

impl Vocabulary {
    /// Predicates implied by property `name`, empty when the registry does not know it
    pub fn implied_by<'a>(&'a self, name: &str) -> Vec<&'a str> {
        self.properties
            .get(name)
            .map(|relations| relations.implied().collect())
            .unwrap_or_default()
    }
}

// Registry documents write a single relation as a bare string
fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(iri) => vec![iri],
        OneOrMany::Many(iris) => iris,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.base, "");
        assert!(config.registry.is_empty());
        assert!(!config.strict);
        assert!(!config.use_rdf_type);
        assert!(config.use_native_types);
    }

    #[test]
    fn test_from_json_partial() {
        let config = Config::from_json(r#"{"base": "http://example.com/", "useRdfType": true}"#)
            .unwrap();
        assert_eq!(config.base, "http://example.com/");
        assert!(config.use_rdf_type);
        assert!(config.use_native_types);
        assert!(!config.strict);
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        assert!(Config::from_json("{base: nope}").is_err());
    }

    #[test]
    fn test_registry_relations_string_or_array() {
        let config = Config::from_json(
            r#"{
                "registry": {
                    "http://schema.org/": {
                        "propertyURI": "vocabulary",
                        "multipleValues": "unordered",
                        "properties": {
                            "additionalType": {"subPropertyOf": "http://www.w3.org/1999/02/22-rdf-syntax-ns#type"},
                            "name": {
                                "subPropertyOf": ["http://example.org/label"],
                                "equivalentProperty": ["http://purl.org/dc/terms/title", "http://xmlns.com/foaf/0.1/name"]
                            }
                        }
                    }
                }
            }"#,
        )
        .unwrap();

        let vocab = &config.registry["http://schema.org/"];
        assert_eq!(
            vocab.implied_by("additionalType"),
            vec!["http://www.w3.org/1999/02/22-rdf-syntax-ns#type"]
        );
        assert_eq!(
            vocab.implied_by("name"),
            vec![
                "http://example.org/label",
                "http://purl.org/dc/terms/title",
                "http://xmlns.com/foaf/0.1/name"
            ]
        );
        assert!(vocab.implied_by("unknown").is_empty());
    }

    #[test]
    fn test_normalized_strips_fragment() {
        let config = Config::default().with_base("http://example.com/doc#top");
        assert_eq!(config.normalized().base, "http://example.com/doc");

        let config = Config::default().with_base("http://example.com/doc#a/b");
        assert_eq!(config.normalized().base, "http://example.com/doc#a/b");

        let config = Config::default().with_base("http://example.com/doc");
        assert_eq!(config.normalized().base, "http://example.com/doc");
    }
}
