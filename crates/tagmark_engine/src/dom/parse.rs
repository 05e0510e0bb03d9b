use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::Html;

use super::{Document, NodeId};

pub(super) fn parse_document(html: &str) -> Document {
    let parsed = Html::parse_document(html);
    let mut doc = Document::new();
    let root = doc.root();
    for child in parsed.tree.root().children() {
        if let Some(id) = import_node(&mut doc, child) {
            doc.append_parsed(root, id);
        }
    }
    doc
}

/// Parses `html` in body context and returns detached top-level nodes.
pub(super) fn import_fragment(doc: &mut Document, html: &str) -> Vec<NodeId> {
    let parsed = Html::parse_fragment(html);
    parsed
        .root_element()
        .children()
        .filter_map(|child| import_node(doc, child))
        .collect()
}

fn import_node(doc: &mut Document, node: NodeRef<'_, Node>) -> Option<NodeId> {
    match node.value() {
        Node::Text(text) => Some(doc.create_text(&**text)),
        Node::Comment(comment) => Some(doc.create_comment(&**comment)),
        Node::Doctype(doctype) => {
            doc.set_doctype(doctype.name());
            None
        }
        Node::Element(element) => {
            let id = doc.create_element(element.name());
            if let Some(data) = doc.element_mut(id) {
                for (name, value) in element.attrs() {
                    data.set_attr(name, value);
                }
            }
            for child in node.children() {
                if let Some(child_id) = import_node(doc, child) {
                    doc.append_parsed(id, child_id);
                }
            }
            Some(id)
        }
        _ => None,
    }
}
