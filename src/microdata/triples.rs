//! Microdata to RDF triple generation
//!
//! Reference: https://www.w3.org/TR/microdata-rdf/
//!
//! Items are expanded with an explicit frame stack instead of recursion so
//! deeply nested documents cannot exhaust the native stack.

use ego_tree::NodeId;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use scraper::ElementRef;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use super::document::{item_types, property_names, MicrodataDocument, PropertyValue};
use super::urls::is_absolute_url;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::rdf::{Object, Triple, RDF_TYPE};

/// Everything except the characters `encodeURIComponent` leaves alone
const NAME_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Type and vocabulary in effect for an item's properties
#[derive(Debug, Default)]
struct Scope {
    current_type: Option<String>,
    current_vocab: Option<String>,
}

/// An item whose properties are being emitted.
///
/// The frame stack is the chain of items being expanded, outermost first.
struct Frame<'a> {
    item: NodeId,
    subject: String,
    scope: Rc<Scope>,
    pending: VecDeque<(ElementRef<'a>, String)>,
    /// Property name waiting for a nested item's subject
    awaiting: Option<String>,
}

enum Entered<'a> {
    Expanded(Frame<'a>),
    /// Item re-entered through a cycle; only its subject is known
    Known(String),
}

/// Generates the triples of one document.
///
/// Blank node labels and item subjects are scoped to a single generator.
pub struct TripleGenerator<'d, 'a> {
    document: &'d MicrodataDocument<'a>,
    config: &'d Config,
    memory: HashMap<NodeId, String>,
    next_blank: usize,
    triples: Vec<Triple>,
}

impl<'d, 'a> TripleGenerator<'d, 'a> {
    pub fn new(document: &'d MicrodataDocument<'a>, config: &'d Config) -> Self {
        Self {
            document,
            config,
            memory: HashMap::new(),
            next_blank: 0,
            triples: Vec::new(),
        }
    }

    pub fn run(mut self) -> Result<Vec<Triple>> {
        let items = self.document.items();
        tracing::debug!(items = items.len(), "generating triples for top-level items");
        for item in items {
            self.generate(item)?;
        }
        Ok(self.triples)
    }

    /// Emit the triples of `item` and everything nested in it, returning its subject
    fn generate(&mut self, item: ElementRef<'a>) -> Result<String> {
        let root = match self.enter(item, &Scope::default(), &[])? {
            Entered::Known(subject) => return Ok(subject),
            Entered::Expanded(frame) => frame,
        };
        let subject = root.subject.clone();
        let mut stack = vec![root];
        let mut returned: Option<String> = None;

        while let Some(frame) = stack.last_mut() {
            if let Some(child) = returned.take() {
                if let Some(name) = frame.awaiting.take() {
                    self.emit(&frame.subject, &name, &frame.scope, Object::named(child));
                }
            }

            let Some((element, name)) = frame.pending.pop_front() else {
                returned = stack.pop().map(|done| done.subject);
                continue;
            };

            match self.document.item_value(element) {
                Some(PropertyValue::Item(nested)) => {
                    frame.awaiting = Some(name);
                    let scope = Rc::clone(&frame.scope);
                    match self.enter(nested, &scope, &stack)? {
                        Entered::Known(nested_subject) => returned = Some(nested_subject),
                        Entered::Expanded(child) => stack.push(child),
                    }
                }
                Some(PropertyValue::Object(object)) => {
                    self.emit(&frame.subject, &name, &frame.scope, object)
                }
                None => {}
            }
        }

        Ok(subject)
    }

    /// Assign the item's subject, emit its types and prepare its properties
    fn enter(
        &mut self,
        item: ElementRef<'a>,
        scope: &Scope,
        path: &[Frame<'a>],
    ) -> Result<Entered<'a>> {
        let subject = match self.memory.get(&item.id()) {
            Some(subject) => subject.clone(),
            None => match self.document.item_id(&item) {
                Some(id) => id,
                None => self.mint_blank(),
            },
        };
        self.memory.insert(item.id(), subject.clone());

        if path.iter().any(|frame| frame.item == item.id()) {
            if self.config.strict {
                return Err(Error::CyclicStructure { subject });
            }
            tracing::debug!(subject = %subject, "item reached through itemref cycle, not expanding");
            return Ok(Entered::Known(subject));
        }

        let types = item_types(&item);
        for item_type in &types {
            self.triples.push(Triple::new(
                subject.clone(),
                RDF_TYPE,
                Object::named(item_type.as_str()),
            ));
        }

        let current_type = types
            .into_iter()
            .next()
            .or_else(|| scope.current_type.clone());
        let current_vocab = current_type.as_deref().map(|t| self.vocabulary_for(t));
        let pending = self
            .document
            .properties(item)
            .into_iter()
            .flat_map(|element| {
                property_names(&element)
                    .into_iter()
                    .map(move |name| (element, name))
            })
            .collect();

        Ok(Entered::Expanded(Frame {
            item: item.id(),
            subject,
            scope: Rc::new(Scope {
                current_type,
                current_vocab,
            }),
            pending,
            awaiting: None,
        }))
    }

    /// Property triple plus one triple per implied registry predicate
    fn emit(&mut self, subject: &str, name: &str, scope: &Scope, object: Object) {
        let config = self.config;
        let implied = scope
            .current_vocab
            .as_ref()
            .and_then(|vocab| config.registry.get(vocab))
            .map(|vocabulary| vocabulary.implied_by(name))
            .unwrap_or_default();

        let predicate = self.predicate(name, scope);
        self.triples
            .push(Triple::new(subject, predicate, object.clone()));
        for predicate in implied {
            self.triples
                .push(Triple::new(subject, predicate, object.clone()));
        }
    }

    fn predicate(&self, name: &str, scope: &Scope) -> String {
        if is_absolute_url(name) {
            return name.to_string();
        }
        match (&scope.current_type, &scope.current_vocab) {
            (Some(_), Some(vocab)) if vocab.ends_with(['#', '/']) => format!("{}{}", vocab, name),
            (Some(_), Some(vocab)) => format!("{}#{}", vocab, name),
            _ => format!(
                "{}#{}",
                self.config.base,
                utf8_percent_encode(name, NAME_ENCODE)
            ),
        }
    }

    /// Longest registry prefix of `item_type`, else the type without its last segment
    fn vocabulary_for(&self, item_type: &str) -> String {
        self.config
            .registry
            .keys()
            .filter(|prefix| item_type.starts_with(prefix.as_str()))
            .max_by_key(|prefix| prefix.len())
            .cloned()
            .unwrap_or_else(|| {
                item_type
                    .trim_end_matches(|c: char| c != '#' && c != '/')
                    .to_string()
            })
    }

    fn mint_blank(&mut self) -> String {
        let blank = format!("_:{}", self.next_blank);
        self.next_blank += 1;
        blank
    }
}
