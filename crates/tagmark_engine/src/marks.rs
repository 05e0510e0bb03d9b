use std::collections::HashMap;

use crate::dom::NodeId;

/// Generation-tagged "already processed" ledger.
///
/// A node counts as processed only if it was marked during the current
/// generation; `advance` invalidates every mark at once.
#[derive(Debug, Clone, Default)]
pub struct MarkLedger {
    generation: u64,
    marks: HashMap<NodeId, u64>,
}

impl MarkLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, id: NodeId) -> bool {
        self.marks.get(&id) == Some(&self.generation)
    }

    /// Marks `id`; returns false if it was already marked this generation.
    pub fn mark(&mut self, id: NodeId) -> bool {
        self.marks.insert(id, self.generation) != Some(self.generation)
    }

    /// Starts a new generation, dropping the stale entries.
    pub fn advance(&mut self) -> u64 {
        self.generation += 1;
        self.marks.clear();
        self.generation
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    pub fn clear(&mut self) {
        self.marks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;

    #[test]
    fn advance_invalidates_previous_marks() {
        let mut doc = Document::new();
        let node = doc.create_text("x");
        let mut ledger = MarkLedger::new();

        assert!(ledger.mark(node));
        assert!(!ledger.mark(node));
        assert!(ledger.is_current(node));

        assert_eq!(ledger.advance(), 1);
        assert!(!ledger.is_current(node));
        assert!(ledger.mark(node));
        assert!(ledger.is_current(node));
    }
}
