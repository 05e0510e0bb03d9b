use std::fmt;

use crate::action::PrimaryAction;
use crate::dom::NodeId;

/// Outcome of one annotation pass over a set of roots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PassReport {
    pub generation: u64,
    pub roots: usize,
    pub mentions_wrapped: usize,
    pub links_scanned: usize,
    pub containers_highlighted: usize,
}

impl PassReport {
    pub fn is_empty(&self) -> bool {
        self.mentions_wrapped == 0 && self.containers_highlighted == 0
    }
}

impl fmt::Display for PassReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} root(s), {} mention(s), {} link(s) scanned, {} container(s) highlighted",
            self.roots, self.mentions_wrapped, self.links_scanned, self.containers_highlighted
        )
    }
}

/// What a dispatched pointer event did to the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageAction {
    Hovered(NodeId),
    Unhovered(NodeId),
    Open { container: NodeId, action: PrimaryAction },
}
