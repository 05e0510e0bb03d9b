use std::sync::Arc;
use std::time::Instant;

use tagmark_core::{watch_update, Notice, TagStore, WatchEffect, WatchMsg, WatchState};
use tagmark_logging::{tagmark_debug, tagmark_info, tagmark_warn};
use url::Url;

use crate::action::PrimaryAction;
use crate::bus::{RelayMessage, RelayResponse};
use crate::config::{ConfigError, EngineConfig};
use crate::dom::{DomEvent, Document, NodeId};
use crate::highlighter::Highlighter;
use crate::persist::{PersistenceError, TagStorage};
use crate::types::{PageAction, PassReport};

/// Side effects a page can have on its surroundings.
pub trait PageHost: Send {
    fn open_url(&mut self, url: &Url);
    fn notify(&mut self, notice: Notice);
}

/// Host that only logs; used when no browser is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogHost;

impl PageHost for LogHost {
    fn open_url(&mut self, url: &Url) {
        tagmark_info!("open {}", url);
    }

    fn notify(&mut self, notice: Notice) {
        tagmark_info!("notice ({:?}): {}", notice.level, notice.text);
    }
}

/// One annotated page: its document, highlighter, tag list, and insertion debounce.
pub struct PageSession {
    url: Url,
    document: Document,
    highlighter: Highlighter,
    store: TagStore,
    storage: Arc<dyn TagStorage>,
    host: Box<dyn PageHost>,
    watch: WatchState<NodeId>,
}

impl PageSession {
    pub fn new(
        config: EngineConfig,
        url: Url,
        document: Document,
        storage: Arc<dyn TagStorage>,
        host: Box<dyn PageHost>,
    ) -> Result<Self, ConfigError> {
        let window = config.debounce();
        Ok(Self::with_highlighter(
            Highlighter::new(config)?,
            url,
            document,
            storage,
            host,
            window,
        ))
    }

    pub fn with_highlighter(
        highlighter: Highlighter,
        url: Url,
        document: Document,
        storage: Arc<dyn TagStorage>,
        host: Box<dyn PageHost>,
        window: std::time::Duration,
    ) -> Self {
        Self {
            url,
            document,
            highlighter,
            store: TagStore::new(),
            storage,
            host,
            watch: WatchState::new(window),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable access for callers that change the page.
    /// Inserted elements are picked up by [`observe`](Self::observe).
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn highlighter(&self) -> &Highlighter {
        &self.highlighter
    }

    pub fn store(&self) -> &TagStore {
        &self.store
    }

    /// Loads tags and runs the initial full pass. A storage failure starts
    /// with an empty tag list.
    pub fn start(&mut self) -> PassReport {
        if let Err(err) = self.load_tags() {
            tagmark_warn!("could not load tags for {}: {}", self.url, err);
            self.highlighter.set_tags(self.store.snapshot());
        }
        self.document.clear_insertions();
        self.highlighter.init(&mut self.document, &self.url)
    }

    /// Feeds element insertions recorded since the last call into the
    /// debounce. Returns the deadline of the armed timer, if any.
    pub fn observe(&mut self, now: Instant) -> Option<Instant> {
        let nodes = self.document.take_insertions();
        if nodes.is_empty() || !self.highlighter.is_active() {
            return None;
        }
        let watch = std::mem::take(&mut self.watch);
        let (watch, effects) = watch_update(watch, WatchMsg::Inserted { nodes, at: now });
        self.watch = watch;
        effects.into_iter().find_map(|effect| match effect {
            WatchEffect::ArmTimer { deadline } => Some(deadline),
            WatchEffect::RunPass { .. } => None,
        })
    }

    /// Runs the pending pass when the debounce deadline has passed.
    pub fn fire_timer(&mut self, now: Instant) -> Option<PassReport> {
        let watch = std::mem::take(&mut self.watch);
        let (watch, effects) = watch_update(watch, WatchMsg::TimerFired { at: now });
        self.watch = watch;

        let mut ran = None;
        for effect in effects {
            if let WatchEffect::RunPass { roots } = effect {
                let report = self
                    .highlighter
                    .annotate(&mut self.document, &roots, &self.url);
                tagmark_debug!("debounced pass on {}: {}", self.url, report);
                ran = Some(report);
            }
        }
        if ran.is_some() {
            let watch = std::mem::take(&mut self.watch);
            let (watch, _) = watch_update(watch, WatchMsg::PassFinished);
            self.watch = watch;
        }
        ran
    }

    pub fn pending_deadline(&self) -> Option<Instant> {
        self.watch.deadline()
    }

    /// Reloads tags from storage, invalidates earlier marks and re-annotates the page.
    pub fn refresh_tags(&mut self) -> Result<PassReport, PersistenceError> {
        self.load_tags()?;
        let report = self.highlighter.full_pass(&mut self.document, &self.url);
        tagmark_info!("refreshed {}: {}", self.url, report);
        Ok(report)
    }

    pub fn handle_relay(&mut self, message: RelayMessage) -> (RelayResponse, Option<PassReport>) {
        match message {
            RelayMessage::RefreshTags => match self.refresh_tags() {
                Ok(report) => (RelayResponse { success: true }, Some(report)),
                Err(err) => {
                    tagmark_warn!("refresh on {} failed: {}", self.url, err);
                    (RelayResponse { success: false }, None)
                }
            },
        }
    }

    /// Delivers a pointer event and carries out the resulting navigation.
    pub fn dispatch(&mut self, target: NodeId, event: DomEvent) -> Option<PageAction> {
        let outcome = self
            .highlighter
            .handle_event(&mut self.document, target, event, &self.url);
        if let Some(PageAction::Open { action, .. }) = &outcome {
            self.host.open_url(action.url());
            self.host.notify(Notice::info(open_notice(action)));
        }
        outcome
    }

    pub fn dispose(&mut self) {
        self.highlighter.dispose();
        self.watch.reset();
        self.document.clear_insertions();
    }

    fn load_tags(&mut self) -> Result<(), PersistenceError> {
        let record = self.storage.load()?;
        self.store.reload(record.tags);
        self.highlighter.set_tags(self.store.snapshot());
        Ok(())
    }
}

fn open_notice(action: &PrimaryAction) -> String {
    match action {
        PrimaryAction::Link(url) => format!("Opening {url}"),
        PrimaryAction::Search { query, .. } => format!("Searching for \"{query}\""),
        PrimaryAction::CurrentPage(_) => "Reopening this page".to_string(),
    }
}
