use tagmark_core::TagSnapshot;
use tagmark_logging::tagmark_trace;

use crate::config::StyleConfig;
use crate::dom::{Document, NodeId, NodeKind};
use crate::marks::MarkLedger;
use crate::matcher::UsernameMatcher;
use crate::style::{self, BADGE_ATTR, MENTION_ATTR};

const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "textarea", "template"];

/// Wraps tagged `@mentions` found in text nodes with a styled marker element.
pub struct TextAnnotator<'a> {
    matcher: &'a UsernameMatcher,
    tags: &'a TagSnapshot,
    style: &'a StyleConfig,
}

enum Segment<'t> {
    Plain(&'t str),
    Tagged { text: &'t str, username: String },
}

impl<'a> TextAnnotator<'a> {
    pub fn new(
        matcher: &'a UsernameMatcher,
        tags: &'a TagSnapshot,
        style: &'a StyleConfig,
    ) -> Self {
        Self {
            matcher,
            tags,
            style,
        }
    }

    /// Annotates every unprocessed text leaf under `root`.
    /// Returns the number of mentions wrapped.
    pub fn annotate(&self, doc: &mut Document, marks: &mut MarkLedger, root: NodeId) -> usize {
        let leaves = self.collect_leaves(doc, marks, root);
        leaves
            .into_iter()
            .map(|leaf| self.annotate_leaf(doc, marks, leaf))
            .sum()
    }

    fn collect_leaves(&self, doc: &Document, marks: &MarkLedger, root: NodeId) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            match doc.kind(id) {
                NodeKind::Text(text) => {
                    if !text.is_empty() && !marks.is_current(id) {
                        leaves.push(id);
                    }
                }
                NodeKind::Element(el) => {
                    if SKIPPED_ELEMENTS.contains(&el.name())
                        || el.has_attr(MENTION_ATTR)
                        || el.has_attr(BADGE_ATTR)
                    {
                        continue;
                    }
                    // Empty containers stay unmarked so a later pass can visit them.
                    if doc.text_content(id).is_empty() {
                        continue;
                    }
                    stack.extend(doc.children(id).iter().rev().copied());
                }
                NodeKind::Document => stack.extend(doc.children(id).iter().rev().copied()),
                NodeKind::Comment(_) => {}
            }
        }
        leaves
    }

    fn annotate_leaf(&self, doc: &mut Document, marks: &mut MarkLedger, leaf: NodeId) -> usize {
        marks.mark(leaf);
        let Some(text) = doc.text(leaf) else {
            return 0;
        };
        if doc.parent(leaf).is_none() {
            return 0;
        }
        let segments = self.split(text);
        let tagged = segments
            .iter()
            .filter(|s| matches!(s, Segment::Tagged { .. }))
            .count();
        if tagged == 0 {
            return 0;
        }

        let owned: Vec<(String, Option<String>)> = segments
            .into_iter()
            .map(|segment| match segment {
                Segment::Plain(text) => (text.to_string(), None),
                Segment::Tagged { text, username } => (text.to_string(), Some(username)),
            })
            .collect();

        let mut fragment = Vec::with_capacity(owned.len());
        for (text, username) in owned {
            let text_node = doc.create_text(text);
            marks.mark(text_node);
            match username {
                None => fragment.push(text_node),
                Some(username) => {
                    let marker = doc.create_element("span");
                    if let Some(el) = doc.element_mut(marker) {
                        el.set_attr(MENTION_ATTR, username.as_str());
                        el.set_attr("title", style::mention_tooltip(&username));
                    }
                    doc.set_styles(marker, &style::mention_marker(self.style));
                    doc.append_child(marker, text_node);
                    fragment.push(marker);
                }
            }
        }
        doc.replace_with(leaf, &fragment);
        tagmark_trace!("wrapped {} mention(s) in text node {}", tagged, leaf);
        tagged
    }

    fn split<'t>(&self, text: &'t str) -> Vec<Segment<'t>> {
        let mut segments = Vec::new();
        let mut plain_start = 0;
        for mention in self.matcher.find_mentions(text) {
            if !self.matcher.is_tagged(self.tags, mention.username) {
                continue;
            }
            if mention.span.start > plain_start {
                segments.push(Segment::Plain(&text[plain_start..mention.span.start]));
            }
            segments.push(Segment::Tagged {
                text: mention.text,
                username: mention.username.to_ascii_lowercase(),
            });
            plain_start = mention.span.end;
        }
        if plain_start < text.len() {
            segments.push(Segment::Plain(&text[plain_start..]));
        }
        segments
    }
}
