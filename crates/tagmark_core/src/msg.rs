#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Persisted tags arrived from storage (startup or explicit refresh).
    TagsLoaded(Vec<String>),
    /// User submitted a username in the add box.
    AddRequested(String),
    /// User clicked remove on a tag row.
    RemoveRequested(String),
    /// User confirmed "clear all".
    ClearRequested,
    /// User asked for an export file.
    ExportRequested,
    /// An import file was read and parsed into raw entries.
    ImportParsed { tags: Vec<String> },
    /// An import file could not be read or had the wrong shape.
    ImportRejected { reason: String },
    /// A persistence write failed after the in-memory change was applied.
    PersistFailed { reason: String },
}
