//! Best-effort discovery of the "item container" around a profile link.
//!
//! Discovery is an ordered chain of strategies; the first one that returns an
//! element wins. Host-specific class names and thresholds live in [`ContainerRules`].

use url::Url;

use crate::config::ContainerRules;
use crate::dom::{Document, ElementData, NodeId};
use crate::layout::LayoutProbe;
use crate::profile::ProfileMatcher;

/// Everything a strategy may look at.
pub struct ContainerContext<'a> {
    pub doc: &'a Document,
    pub layout: &'a dyn LayoutProbe,
    pub rules: &'a ContainerRules,
    pub profiles: &'a ProfileMatcher,
    pub base: Option<&'a Url>,
}

impl ContainerContext<'_> {
    /// Element ancestors of `id`, nearest first, stopping before `body`/`html`.
    fn candidates(&self, id: NodeId) -> Vec<NodeId> {
        self.doc
            .ancestors(id)
            .take_while(|a| !matches!(self.doc.name(*a), Some("body") | Some("html") | None))
            .collect()
    }

    pub fn is_title_element(&self, el: &ElementData) -> bool {
        self.rules.title_tags.iter().any(|t| t == el.name())
            || self
                .rules
                .title_class_keywords
                .iter()
                .any(|k| el.class_contains(k))
    }

    /// First title-like element under `id`.
    pub fn find_title(&self, id: NodeId) -> Option<NodeId> {
        self.doc
            .find_elements(id, |el| self.is_title_element(el))
            .into_iter()
            .find(|t| *t != id)
    }

    fn overlay_marker(&self, id: NodeId) -> bool {
        let Some(el) = self.doc.element(id) else {
            return false;
        };
        let role = el.attr("role").unwrap_or("").to_ascii_lowercase();
        let ident = el.attr("id").unwrap_or("").to_ascii_lowercase();
        el.has_attr("aria-modal")
            || self.rules.overlay_keywords.iter().any(|k| {
                let k = k.to_ascii_lowercase();
                el.class_contains(&k) || role.contains(&k) || ident.contains(&k)
            })
    }

    /// True when `id` or one of its ancestors within `overlay_depth` levels looks like an overlay.
    pub fn under_overlay(&self, id: NodeId) -> bool {
        std::iter::once(id)
            .chain(self.doc.ancestors(id))
            .take(self.rules.overlay_depth + 1)
            .any(|node| self.overlay_marker(node))
    }
}

pub trait ContainerStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn locate(&self, cx: &ContainerContext<'_>, link: NodeId) -> Option<NodeId>;
}

/// Ancestor within a bounded depth whose class contains every substring of a signature.
#[derive(Debug, Default, Clone, Copy)]
pub struct SignatureStrategy;

impl ContainerStrategy for SignatureStrategy {
    fn name(&self) -> &'static str {
        "signature"
    }

    fn locate(&self, cx: &ContainerContext<'_>, link: NodeId) -> Option<NodeId> {
        cx.candidates(link)
            .into_iter()
            .take(cx.rules.max_signature_depth)
            .find(|id| {
                cx.doc.element(*id).is_some_and(|el| {
                    cx.rules.signatures.iter().any(|signature| {
                        !signature.is_empty()
                            && signature.iter().all(|part| el.class_contains(part))
                    })
                })
            })
    }
}

/// Nearest ancestor whose class mentions a generic "card/row/item" keyword.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericKeywordStrategy;

impl ContainerStrategy for GenericKeywordStrategy {
    fn name(&self) -> &'static str {
        "generic-keyword"
    }

    fn locate(&self, cx: &ContainerContext<'_>, link: NodeId) -> Option<NodeId> {
        cx.candidates(link).into_iter().find(|id| {
            cx.doc.element(*id).is_some_and(|el| {
                cx.rules
                    .generic_keywords
                    .iter()
                    .any(|k| el.class_contains(k))
            })
        })
    }
}

/// Nearest ancestor that holds a title and a profile link, is large enough,
/// and is not part of a modal or overlay.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContentShapeStrategy;

impl ContainerStrategy for ContentShapeStrategy {
    fn name(&self) -> &'static str {
        "content-shape"
    }

    fn locate(&self, cx: &ContainerContext<'_>, link: NodeId) -> Option<NodeId> {
        cx.candidates(link).into_iter().find(|id| {
            cx.layout
                .size(cx.doc, *id)
                .is_some_and(|size| size.covers(cx.rules.min_content_size))
                && cx.find_title(*id).is_some()
                && !cx.profiles.profile_links(cx.doc, *id, cx.base).is_empty()
                && !cx.under_overlay(*id)
        })
    }
}

/// Nearest ancestor exceeding the fallback size threshold.
#[derive(Debug, Default, Clone, Copy)]
pub struct MinimumSizeStrategy;

impl ContainerStrategy for MinimumSizeStrategy {
    fn name(&self) -> &'static str {
        "minimum-size"
    }

    fn locate(&self, cx: &ContainerContext<'_>, link: NodeId) -> Option<NodeId> {
        cx.candidates(link).into_iter().find(|id| {
            cx.layout
                .size(cx.doc, *id)
                .is_some_and(|size| size.covers(cx.rules.min_fallback_size))
        })
    }
}

/// The link's parent element.
#[derive(Debug, Default, Clone, Copy)]
pub struct ParentStrategy;

impl ContainerStrategy for ParentStrategy {
    fn name(&self) -> &'static str {
        "parent"
    }

    fn locate(&self, cx: &ContainerContext<'_>, link: NodeId) -> Option<NodeId> {
        cx.doc.parent_element(link)
    }
}

/// Ordered strategy chain.
pub struct ContainerLocator {
    strategies: Vec<Box<dyn ContainerStrategy>>,
}

impl Default for ContainerLocator {
    fn default() -> Self {
        Self::standard()
    }
}

impl ContainerLocator {
    /// signature → generic keyword → content shape → minimum size → parent.
    pub fn standard() -> Self {
        Self::with_strategies(vec![
            Box::new(SignatureStrategy),
            Box::new(GenericKeywordStrategy),
            Box::new(ContentShapeStrategy),
            Box::new(MinimumSizeStrategy),
            Box::new(ParentStrategy),
        ])
    }

    pub fn with_strategies(strategies: Vec<Box<dyn ContainerStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Container for `link` and the name of the strategy that found it.
    pub fn locate(
        &self,
        cx: &ContainerContext<'_>,
        link: NodeId,
    ) -> Option<(NodeId, &'static str)> {
        self.strategies
            .iter()
            .find_map(|strategy| strategy.locate(cx, link).map(|id| (id, strategy.name())))
    }
}
