//! Microdata extraction
//!
//! Turns `itemscope`/`itemprop`/`itemtype`/`itemid`/`itemref` markup into RDF triples.
//! Reference: https://www.w3.org/TR/microdata-rdf/

mod document;
mod triples;
mod urls;
mod values;

pub use document::{MicrodataDocument, PropertyValue};
pub use triples::TripleGenerator;
pub use urls::{is_absolute_url, split_unique, try_resolve};
pub use values::ValueSource;

use scraper::Html;

use crate::config::Config;
use crate::error::Result;
use crate::rdf::Triple;

/// Parse `html` and generate the triples of every top-level item, in emission order
pub fn microdata_to_rdf(html: &str, config: &Config) -> Result<Vec<Triple>> {
    let document = Html::parse_document(html);
    let microdata = MicrodataDocument::new(&document, &config.base, config.strict);
    let triples = TripleGenerator::new(&microdata, config).run()?;
    tracing::debug!(triples = triples.len(), "converted microdata to rdf");
    Ok(triples)
}
