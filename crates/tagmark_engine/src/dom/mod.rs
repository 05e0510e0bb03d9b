//! Mutable document arena.
//!
//! Pages are parsed with `scraper` and copied into this arena so annotators can
//! rewrite text, attributes, inline style and listeners in place. Node ids are
//! never reused: a detached node keeps its id, which keeps the mark ledger
//! sound without weak references.

mod parse;
mod serialize;

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomEvent {
    PointerEnter,
    PointerLeave,
    Click,
}

impl DomEvent {
    pub fn bubbles(self) -> bool {
        matches!(self, DomEvent::Click)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerAction {
    IntensifyHighlight,
    RestoreHighlight,
    OpenPrimaryAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listener {
    pub event: DomEvent,
    pub action: ListenerAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    name: String,
    attrs: Vec<(String, String)>,
    listeners: Vec<Listener>,
}

impl ElementData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_lowercase(),
            attrs: Vec::new(),
            listeners: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .attrs
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            Some((_, existing)) => *existing = value,
            None => self.attrs.push((name.to_ascii_lowercase(), value)),
        }
    }

    /// Raw `class` attribute, empty when absent.
    pub fn class(&self) -> &str {
        self.attr("class").unwrap_or("")
    }

    /// Case-insensitive substring test against the raw class attribute.
    pub fn class_contains(&self, needle: &str) -> bool {
        !needle.is_empty()
            && self
                .class()
                .to_ascii_lowercase()
                .contains(&needle.to_ascii_lowercase())
    }

    pub fn listeners(&self) -> &[Listener] {
        &self.listeners
    }

    pub fn add_listener(&mut self, event: DomEvent, action: ListenerAction) {
        self.listeners.push(Listener { event, action });
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element(ElementData),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    doctype: Option<String>,
    inserted: Vec<NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Empty document with only the root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Document,
            }],
            root: NodeId(0),
            doctype: None,
            inserted: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn doctype(&self) -> Option<&str> {
        self.doctype.as_deref()
    }

    pub(crate) fn set_doctype(&mut self, name: impl Into<String>) {
        self.doctype = Some(name.into());
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.nodes[id.0].kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    /// Element name (lowercase) or `None` for non-elements.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(ElementData::name)
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|el| el.attr(name))
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        if let Some(el) = self.element_mut(id) {
            el.set_attr(name, value);
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|p| self.is_element(*p))
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Ancestors from the parent up to the document root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.parent(id),
        }
    }

    /// `id` and every node below it, in document order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Elements at or below `id` accepted by `pred`, in document order.
    pub fn find_elements<F>(&self, id: NodeId, mut pred: F) -> Vec<NodeId>
    where
        F: FnMut(&ElementData) -> bool,
    {
        self.descendants(id)
            .into_iter()
            .filter(|node| self.element(*node).is_some_and(&mut pred))
            .collect()
    }

    pub fn first_element_named(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.find_elements(id, |el| el.name() == name).into_iter().next()
    }

    pub fn body(&self) -> Option<NodeId> {
        self.first_element_named(self.root, "body")
    }

    /// Concatenated text of every text node under `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .into_iter()
            .filter_map(|node| self.text(node))
            .collect()
    }

    /// True when `id` is reachable from the document root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == self.root || self.ancestors(id).any(|a| a == self.root)
    }

    /// True when `ancestor` is `id` or one of its ancestors.
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        ancestor == id || self.ancestors(id).any(|a| a == ancestor)
    }

    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.push(NodeKind::Element(ElementData::new(name)))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(text.into()))
    }

    pub(crate) fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Comment(text.into()))
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        self.record_insertion(child);
    }

    /// Inserts `child` before `reference`, or appends when `reference` is not a child of `parent`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        self.detach(child);
        let siblings = &mut self.nodes[parent.0].children;
        match siblings.iter().position(|c| *c == reference) {
            Some(pos) => siblings.insert(pos, child),
            None => siblings.push(child),
        }
        self.nodes[child.0].parent = Some(parent);
        self.record_insertion(child);
    }

    /// Removes `id` from its parent; the node and its subtree stay in the arena.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != id);
        }
    }

    /// Replaces `old` with `replacements` at the same position.
    pub fn replace_with(&mut self, old: NodeId, replacements: &[NodeId]) {
        let Some(parent) = self.parent(old) else {
            return;
        };
        for node in replacements {
            self.insert_before(parent, *node, old);
        }
        self.detach(old);
    }

    /// Parses `html` as a fragment and appends its top-level nodes to `parent`.
    pub fn insert_html(&mut self, parent: NodeId, html: &str) -> Vec<NodeId> {
        let nodes = parse::import_fragment(self, html);
        for node in &nodes {
            self.append_child(parent, *node);
        }
        nodes
    }

    /// Inline style value for `property`, as written in the `style` attribute.
    pub fn style(&self, id: NodeId, property: &str) -> Option<String> {
        let raw = self.attr(id, "style")?;
        parse_style(raw)
            .into_iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(property))
            .map(|(_, value)| value)
    }

    /// Sets inline style properties, keeping unrelated declarations.
    pub fn set_styles(&mut self, id: NodeId, declarations: &[(&str, String)]) {
        let Some(el) = self.element_mut(id) else {
            return;
        };
        let mut current = parse_style(el.attr("style").unwrap_or(""));
        for (property, value) in declarations {
            match current
                .iter_mut()
                .find(|(key, _)| key.eq_ignore_ascii_case(property))
            {
                Some((_, existing)) => *existing = value.clone(),
                None => current.push((property.to_string(), value.clone())),
            }
        }
        el.set_attr("style", render_style(&current));
    }

    /// Element nodes inserted since the last call, oldest first.
    pub fn take_insertions(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.inserted)
    }

    pub fn clear_insertions(&mut self) {
        self.inserted.clear();
    }

    /// Current length of the insertion log.
    pub fn insertion_mark(&self) -> usize {
        self.inserted.len()
    }

    /// Drops insertions recorded after `mark`. Earlier ones stay queued.
    pub fn discard_insertions_since(&mut self, mark: usize) {
        self.inserted.truncate(mark);
    }

    pub fn to_html(&self) -> String {
        serialize::document_html(self)
    }

    pub fn outer_html(&self, id: NodeId) -> String {
        serialize::node_html(self, id)
    }

    pub fn parse(html: &str) -> Self {
        parse::parse_document(html)
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            kind,
        });
        id
    }

    fn record_insertion(&mut self, id: NodeId) {
        if self.is_element(id) && self.is_attached(id) {
            self.inserted.push(id);
        }
    }

    pub(crate) fn append_parsed(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }
}

pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.parent(current);
        Some(current)
    }
}

fn parse_style(raw: &str) -> Vec<(String, String)> {
    raw.split(';')
        .filter_map(|decl| {
            let (key, value) = decl.split_once(':')?;
            let key = key.trim();
            let value = value.trim();
            if key.is_empty() {
                None
            } else {
                Some((key.to_ascii_lowercase(), value.to_string()))
            }
        })
        .collect()
}

fn render_style(declarations: &[(String, String)]) -> String {
    declarations
        .iter()
        .map(|(key, value)| format!("{key}: {value};"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_styles_merges_with_existing_declarations() {
        let mut doc = Document::parse(r#"<div style="color: red; margin: 0">x</div>"#);
        let div = doc.first_element_named(doc.root(), "div").unwrap();
        doc.set_styles(div, &[("color", "blue".into()), ("position", "relative".into())]);

        assert_eq!(doc.style(div, "color").as_deref(), Some("blue"));
        assert_eq!(doc.style(div, "margin").as_deref(), Some("0"));
        assert_eq!(
            doc.attr(div, "style"),
            Some("color: blue; margin: 0; position: relative;")
        );
    }

    #[test]
    fn replace_with_keeps_sibling_order() {
        let mut doc = Document::parse("<p>a<b>b</b>c</p>");
        let p = doc.first_element_named(doc.root(), "p").unwrap();
        let first = doc.children(p)[0];
        let x = doc.create_text("x");
        let y = doc.create_element("i");
        doc.replace_with(first, &[x, y]);

        assert_eq!(doc.outer_html(p), "<p>x<i></i><b>b</b>c</p>");
        assert!(!doc.is_attached(first));
    }

    #[test]
    fn only_attached_element_insertions_are_recorded() {
        let mut doc = Document::parse("<div id=\"host\"></div>");
        doc.clear_insertions();
        let host = doc.first_element_named(doc.root(), "div").unwrap();

        let loose = doc.create_element("span");
        let text = doc.create_text("t");
        doc.append_child(loose, text);
        assert!(doc.take_insertions().is_empty());

        doc.append_child(host, loose);
        assert_eq!(doc.take_insertions(), vec![loose]);
    }
}
