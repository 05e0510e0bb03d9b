use crate::view_model::{ImportStats, ManagerView};
use crate::TagStore;

/// State behind the tag manager surface.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    store: TagStore,
    last_import: Option<ImportStats>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(store: TagStore) -> Self {
        Self {
            store,
            ..Self::default()
        }
    }

    pub fn store(&self) -> &TagStore {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut TagStore {
        &mut self.store
    }

    pub fn view(&self) -> ManagerView {
        ManagerView {
            tags: self.store.to_strings(),
            count: self.store.len(),
            last_import: self.last_import,
            dirty: self.dirty,
        }
    }

    pub(crate) fn set_last_import(&mut self, added: usize, total: usize) {
        self.last_import = Some(ImportStats { added, total });
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether the view changed since the last call and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
