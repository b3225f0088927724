//! Microdata view over a parsed HTML document
//!
//! Implements the item and property discovery rules of
//! https://html.spec.whatwg.org/multipage/microdata.html on top of the
//! scraper tree. Nodes are identified by their `NodeId`, which stays stable
//! for the lifetime of the parsed document.

use ego_tree::{NodeId, NodeRef};
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::{HashMap, HashSet, VecDeque};

use super::urls::{is_absolute_url, split_unique, try_resolve};
use super::values::{date_value, number_value, url_value, ValueSource};
use crate::rdf::{Literal, Object};

/// Value of an `itemprop` element
#[derive(Debug, Clone)]
pub enum PropertyValue<'a> {
    /// The element is itself an item; its subject is decided by the triple generator
    Item(ElementRef<'a>),
    Object(Object),
}

pub struct MicrodataDocument<'a> {
    html: &'a Html,
    base: String,
    strict: bool,
    /// First element carrying each `id`
    ids: HashMap<String, NodeId>,
    /// Pre-order position of every node
    order: HashMap<NodeId, usize>,
}

impl<'a> MicrodataDocument<'a> {
    pub fn new(html: &'a Html, config_base: &str, strict: bool) -> Self {
        let base = resolve_base(html, config_base);

        let mut ids = HashMap::new();
        let mut order = HashMap::new();
        for (position, node) in html.tree.root().descendants().enumerate() {
            order.insert(node.id(), position);
            if let Some(id) = node.value().as_element().and_then(|el| el.id()) {
                ids.entry(id.to_string()).or_insert(node.id());
            }
        }

        tracing::debug!(base = %base, ids = ids.len(), "indexed microdata document");

        Self {
            html,
            base,
            strict,
            ids,
            order,
        }
    }

    /// Effective base URL after applying `<base href>`
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Top-level items in document order
    pub fn items(&self) -> Vec<ElementRef<'a>> {
        let mut items = Vec::new();
        let mut stack: Vec<(NodeRef<'a, Node>, bool)> = vec![(self.html.tree.root(), true)];

        while let Some((node, top_level)) = stack.pop() {
            let mut children_top_level = top_level;
            if let Some(element) = ElementRef::wrap(node) {
                if is_item(&element) {
                    let strict_item = !is_property(&element);
                    let loose_item = !self.strict && top_level;
                    if strict_item || loose_item {
                        children_top_level = false;
                        items.push(element);
                    }
                }
            }
            let children: Vec<_> = node.children().collect();
            for child in children.into_iter().rev() {
                stack.push((child, children_top_level));
            }
        }

        items
    }

    /// Property elements of `root` in document order, following `itemref`
    pub fn properties(&self, root: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        let mut visited: HashSet<NodeId> = HashSet::from([root.id()]);
        let mut pending: VecDeque<NodeRef<'a, Node>> = root.children().collect();

        if let Some(refs) = root.value().attr("itemref") {
            for id in split_unique(refs) {
                match self.ids.get(&id).and_then(|node_id| self.html.tree.get(*node_id)) {
                    Some(node) => pending.push_back(node),
                    None => tracing::trace!(itemref = %id, "skipping unresolved itemref"),
                }
            }
        }

        let mut results = Vec::new();
        while let Some(node) = pending.pop_front() {
            if !visited.insert(node.id()) {
                continue;
            }
            let Some(element) = ElementRef::wrap(node) else {
                continue;
            };
            if !is_item(&element) {
                pending.extend(node.children());
            }
            if !property_names(&element).is_empty() {
                results.push(element);
            }
        }

        results.sort_by_key(|element| self.position(element.id()));
        results
    }

    fn position(&self, id: NodeId) -> usize {
        self.order.get(&id).copied().unwrap_or(usize::MAX)
    }

    /// Global identifier of an item, resolved against the document base
    ///
    /// A whitespace-only `itemid` resolves to the base itself; an empty one is ignored.
    pub fn item_id(&self, item: &ElementRef<'a>) -> Option<String> {
        let id = item
            .value()
            .attr("itemid")
            .filter(|id| !id.is_empty())?
            .trim();
        if is_absolute_url(id) {
            return Some(id.to_string());
        }
        Some(try_resolve(id, &self.base)).filter(|resolved| !resolved.is_empty())
    }

    /// Value of a property element
    pub fn item_value(&self, element: ElementRef<'a>) -> Option<PropertyValue<'a>> {
        if !is_property(&element) {
            return None;
        }
        if is_item(&element) {
            return Some(PropertyValue::Item(element));
        }

        let el = element.value();
        let object = match ValueSource::classify(el) {
            ValueSource::MetaLike => Literal::plain(el.attr("content").unwrap_or_default()).into(),
            ValueSource::SrcAttr => url_value(el.attr("src"), &self.base),
            ValueSource::HrefAttr => url_value(el.attr("href"), &self.base),
            ValueSource::DataAttr => url_value(el.attr("data"), &self.base),
            ValueSource::ValueAttr => number_value(el.attr("value")).into(),
            ValueSource::TimeAttr => date_value(el.attr("datetime")).into(),
            ValueSource::Generic => {
                Literal::plain(element.text().collect::<String>().trim()).into()
            }
        };
        Some(PropertyValue::Object(object))
    }
}

/// Document base: the first `<base href>` resolved against the configured base
fn resolve_base(html: &Html, config_base: &str) -> String {
    let selector = match Selector::parse("base[href]") {
        Ok(s) => s,
        Err(_) => return config_base.to_string(),
    };

    match html.select(&selector).next().and_then(|el| el.value().attr("href")) {
        Some(href) => try_resolve(href, config_base),
        None => config_base.to_string(),
    }
}

pub fn is_item(element: &ElementRef) -> bool {
    element.value().attr("itemscope").is_some()
}

pub fn is_property(element: &ElementRef) -> bool {
    element.value().attr("itemprop").is_some()
}

/// Absolute item types, duplicates removed
pub fn item_types(item: &ElementRef) -> Vec<String> {
    item.value()
        .attr("itemtype")
        .map(split_unique)
        .unwrap_or_default()
        .into_iter()
        .filter(|t| is_absolute_url(t))
        .collect()
}

pub fn property_names(element: &ElementRef) -> Vec<String> {
    element
        .value()
        .attr("itemprop")
        .map(split_unique)
        .unwrap_or_default()
}
