use crate::{Notice, Tag};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Write the full tag list to the key-value store.
    Persist { tags: Vec<Tag> },
    /// Tell every open page to reload tags and re-annotate.
    BroadcastRefresh,
    /// Show a transient notice.
    Notify(Notice),
    /// Produce an export file for the given tags.
    WriteExport { tags: Vec<Tag> },
}
