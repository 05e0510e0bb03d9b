use tagmark_core::TagSnapshot;
use tagmark_logging::{tagmark_debug, tagmark_trace};
use url::Url;

use crate::config::{ContainerRules, StyleConfig};
use crate::container::{ContainerContext, ContainerLocator};
use crate::dom::{DomEvent, Document, ListenerAction, NodeId};
use crate::layout::{LayoutProbe, Positioning};
use crate::marks::MarkLedger;
use crate::profile::ProfileMatcher;
use crate::style::{
    self, BADGE_ATTR, CLICK_BOUND_ATTR, HIGHLIGHTED_ATTR, HOVER_BOUND_ATTR, USERNAME_ATTR,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkPassStats {
    pub links_scanned: usize,
    pub containers_highlighted: usize,
}

/// Highlights the item container around profile links of tagged users.
pub struct LinkAnnotator<'a> {
    pub profiles: &'a ProfileMatcher,
    pub tags: &'a TagSnapshot,
    pub locator: &'a ContainerLocator,
    pub layout: &'a dyn LayoutProbe,
    pub rules: &'a ContainerRules,
    pub style: &'a StyleConfig,
}

impl LinkAnnotator<'_> {
    pub fn annotate(
        &self,
        doc: &mut Document,
        marks: &mut MarkLedger,
        root: NodeId,
        page_url: &Url,
    ) -> LinkPassStats {
        let mut stats = LinkPassStats::default();
        let links = self.profiles.profile_links(doc, root, Some(page_url));
        for link in links {
            if marks.is_current(link) {
                continue;
            }
            stats.links_scanned += 1;
            if self.annotate_link(doc, link, page_url) {
                stats.containers_highlighted += 1;
            }
            marks.mark(link);
        }
        stats
    }

    /// Returns true when a container was newly highlighted.
    fn annotate_link(&self, doc: &mut Document, link: NodeId, page_url: &Url) -> bool {
        let Some(reference) = doc
            .attr(link, "href")
            .and_then(|href| self.profiles.reference(href, Some(page_url)))
        else {
            return false;
        };
        if !self.tags.is_tagged(&reference.username) {
            return false;
        }

        let located = {
            let cx = ContainerContext {
                doc,
                layout: self.layout,
                rules: self.rules,
                profiles: self.profiles,
                base: Some(page_url),
            };
            self.locator.locate(&cx, link)
        };
        let Some((container, strategy)) = located else {
            tagmark_debug!("no container for @{} link {}", reference.username, link);
            return false;
        };
        if doc.attr(container, HIGHLIGHTED_ATTR) == Some("true") {
            return false;
        }

        tagmark_trace!(
            "highlighting {} for @{} via {}",
            container,
            reference.username,
            strategy
        );
        self.highlight(doc, container, &reference.username);
        self.attach_badge(doc, container, &reference.username);
        true
    }

    fn highlight(&self, doc: &mut Document, container: NodeId, username: &str) {
        doc.set_styles(container, &style::container_base(self.style));
        let Some(el) = doc.element_mut(container) else {
            return;
        };
        el.set_attr(HIGHLIGHTED_ATTR, "true");
        el.set_attr(USERNAME_ATTR, username);
        if !el.has_attr(HOVER_BOUND_ATTR) {
            el.add_listener(DomEvent::PointerEnter, ListenerAction::IntensifyHighlight);
            el.add_listener(DomEvent::PointerLeave, ListenerAction::RestoreHighlight);
            el.set_attr(HOVER_BOUND_ATTR, "true");
        }
        if !el.has_attr(CLICK_BOUND_ATTR) {
            el.add_listener(DomEvent::Click, ListenerAction::OpenPrimaryAction);
            el.set_attr(CLICK_BOUND_ATTR, "true");
        }
    }

    fn attach_badge(&self, doc: &mut Document, container: NodeId, username: &str) {
        let stale: Vec<NodeId> = doc
            .children(container)
            .iter()
            .copied()
            .filter(|child| doc.attr(*child, BADGE_ATTR).is_some())
            .collect();
        for badge in stale {
            doc.detach(badge);
        }

        if self.layout.positioning(doc, container) == Positioning::Static {
            doc.set_styles(container, &[("position", "relative".to_string())]);
        }

        let badge = doc.create_element("div");
        doc.set_attr(badge, BADGE_ATTR, username);
        doc.set_styles(badge, &style::badge(self.style));
        let icon = doc.create_element("span");
        let icon_text = doc.create_text(self.style.badge_icon.clone());
        doc.append_child(icon, icon_text);
        let label = doc.create_text(format!(" @{username}"));
        doc.append_child(badge, icon);
        doc.append_child(badge, label);
        doc.append_child(container, badge);
    }
}
