use tagmark_core::{matches_any, TagSnapshot, UrlPattern};
use tagmark_logging::{set_generation, tagmark_debug, tagmark_info};
use url::Url;

use crate::action::resolve_primary_action;
use crate::config::{ConfigError, EngineConfig};
use crate::container::{ContainerContext, ContainerLocator};
use crate::dom::{DomEvent, Document, ListenerAction, NodeId};
use crate::layout::{InlineStyleLayout, LayoutProbe};
use crate::links::LinkAnnotator;
use crate::marks::MarkLedger;
use crate::matcher::UsernameMatcher;
use crate::profile::ProfileMatcher;
use crate::style;
use crate::text::TextAnnotator;
use crate::types::{PageAction, PassReport};

/// Annotation engine for one page: owns the processed-node ledgers and the
/// current tag snapshot, and runs text and link passes over subtrees.
pub struct Highlighter {
    config: EngineConfig,
    targets: Vec<UrlPattern>,
    matcher: UsernameMatcher,
    profiles: ProfileMatcher,
    locator: ContainerLocator,
    layout: Box<dyn LayoutProbe>,
    tags: TagSnapshot,
    text_marks: MarkLedger,
    link_marks: MarkLedger,
    active: bool,
}

impl Highlighter {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        let targets = config.target_patterns()?;
        Ok(Self {
            targets,
            matcher: UsernameMatcher::new(),
            profiles: ProfileMatcher::new(&config.profiles),
            locator: ContainerLocator::standard(),
            layout: Box::new(InlineStyleLayout),
            tags: TagSnapshot::default(),
            text_marks: MarkLedger::new(),
            link_marks: MarkLedger::new(),
            active: false,
            config,
        })
    }

    pub fn with_layout(mut self, layout: Box<dyn LayoutProbe>) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_locator(mut self, locator: ContainerLocator) -> Self {
        self.locator = locator;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn tags(&self) -> &TagSnapshot {
        &self.tags
    }

    pub fn generation(&self) -> u64 {
        self.text_marks.generation()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// True when link highlighting runs on `page_url`.
    pub fn is_target(&self, page_url: &Url) -> bool {
        matches_any(&self.targets, page_url)
    }

    /// Activates the engine and annotates the whole document.
    pub fn init(&mut self, doc: &mut Document, page_url: &Url) -> PassReport {
        self.active = true;
        let report = self.full_pass(doc, page_url);
        tagmark_info!("initial pass on {}: {}", page_url, report);
        report
    }

    /// Stops reacting to passes and events and forgets processed nodes.
    /// Annotations already in the document stay.
    pub fn dispose(&mut self) {
        self.active = false;
        self.text_marks.clear();
        self.link_marks.clear();
    }

    /// Installs a new tag set. Every node becomes eligible for re-processing.
    pub fn set_tags(&mut self, tags: TagSnapshot) -> u64 {
        self.tags = tags;
        self.link_marks.advance();
        let generation = self.text_marks.advance();
        set_generation(generation);
        tagmark_debug!("{} tag(s) installed", self.tags.len());
        generation
    }

    pub fn full_pass(&mut self, doc: &mut Document, page_url: &Url) -> PassReport {
        let root = doc.body().unwrap_or_else(|| doc.root());
        self.annotate(doc, &[root], page_url)
    }

    /// Runs the text pass on every attached root, and the link pass too when
    /// `page_url` is a target page.
    pub fn annotate(&mut self, doc: &mut Document, roots: &[NodeId], page_url: &Url) -> PassReport {
        let mut report = PassReport {
            generation: self.generation(),
            ..PassReport::default()
        };
        if !self.active {
            return report;
        }
        let mark = doc.insertion_mark();
        let link_pass = self.is_target(page_url);
        let text = TextAnnotator::new(&self.matcher, &self.tags, &self.config.style);
        let links = LinkAnnotator {
            profiles: &self.profiles,
            tags: &self.tags,
            locator: &self.locator,
            layout: self.layout.as_ref(),
            rules: &self.config.container,
            style: &self.config.style,
        };

        for &root in roots {
            if !doc.is_attached(root) {
                tagmark_debug!("skipping detached root {}", root);
                continue;
            }
            report.roots += 1;
            report.mentions_wrapped += text.annotate(doc, &mut self.text_marks, root);
            if link_pass {
                let stats = links.annotate(doc, &mut self.link_marks, root, page_url);
                report.links_scanned += stats.links_scanned;
                report.containers_highlighted += stats.containers_highlighted;
            }
        }

        // Our own markers and badges must not trigger another pass.
        doc.discard_insertions_since(mark);
        report
    }

    /// Runs the listeners an event reaches. Pointer enter/leave act on the
    /// target only; clicks bubble to the nearest container with a click listener.
    pub fn handle_event(
        &self,
        doc: &mut Document,
        target: NodeId,
        event: DomEvent,
        page_url: &Url,
    ) -> Option<PageAction> {
        if !self.active {
            return None;
        }
        let path: Vec<NodeId> = if event.bubbles() {
            std::iter::once(target).chain(doc.ancestors(target)).collect()
        } else {
            vec![target]
        };
        let (current, action) = path.into_iter().find_map(|node| {
            doc.element(node)?
                .listeners()
                .iter()
                .find(|l| l.event == event)
                .map(|l| (node, l.action))
        })?;

        match action {
            ListenerAction::IntensifyHighlight => {
                doc.set_styles(current, &style::container_hover(&self.config.style));
                Some(PageAction::Hovered(current))
            }
            ListenerAction::RestoreHighlight => {
                doc.set_styles(current, &style::container_base(&self.config.style));
                Some(PageAction::Unhovered(current))
            }
            ListenerAction::OpenPrimaryAction => {
                if self.click_on_profile_link(doc, target, current, page_url) {
                    return None;
                }
                let cx = ContainerContext {
                    doc,
                    layout: self.layout.as_ref(),
                    rules: &self.config.container,
                    profiles: &self.profiles,
                    base: Some(page_url),
                };
                let action = resolve_primary_action(&cx, &self.config.action, current, page_url);
                Some(PageAction::Open {
                    container: current,
                    action,
                })
            }
        }
    }

    /// True when the target, or an ancestor below `container`, is a profile link.
    fn click_on_profile_link(
        &self,
        doc: &Document,
        target: NodeId,
        container: NodeId,
        page_url: &Url,
    ) -> bool {
        std::iter::once(target)
            .chain(doc.ancestors(target))
            .take_while(|node| *node != container)
            .any(|node| self.profiles.is_profile_link(doc, node, Some(page_url)))
    }
}
