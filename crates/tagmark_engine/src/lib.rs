//! Tagmark engine: document model, annotators, page sessions and IO.
mod action;
mod bus;
mod config;
mod container;
mod decode;
pub mod dom;
mod highlighter;
mod layout;
mod links;
mod marks;
mod matcher;
mod persist;
mod profile;
mod session;
pub mod style;
mod text;
mod transfer;
mod types;
mod watcher;

pub use action::{resolve_primary_action, PrimaryAction};
pub use bus::{collect_responses, Relay, RelayMessage, RelayResponse};
pub use config::{
    ActionConfig, ConfigError, ContainerRules, EngineConfig, MinSize, ProfileConfig, StyleConfig,
};
pub use container::{
    ContainerContext, ContainerLocator, ContainerStrategy, ContentShapeStrategy,
    GenericKeywordStrategy, MinimumSizeStrategy, ParentStrategy, SignatureStrategy,
};
pub use decode::{decode_page, DecodeError, DecodedPage};
pub use dom::{DomEvent, Document, ElementData, ListenerAction, NodeId, NodeKind};
pub use highlighter::Highlighter;
pub use layout::{InlineStyleLayout, LayoutProbe, Positioning, Size};
pub use links::{LinkAnnotator, LinkPassStats};
pub use marks::MarkLedger;
pub use matcher::{Mention, Mentions, UsernameMatcher};
pub use persist::{
    ensure_dir, AtomicFileWriter, JsonFileStorage, MemoryStorage, PersistenceError, StoredTags,
    TagStorage, STORAGE_KEY,
};
pub use profile::{resolve_href, ProfileMatcher, ProfileReference};
pub use session::{LogHost, PageHost, PageSession};
pub use text::TextAnnotator;
pub use transfer::{
    export_document, export_filename, parse_import, ExportFile, ImportFormatError, EXPORT_VERSION,
};
pub use types::{PageAction, PassReport};
pub use watcher::{PageCommand, PageHandle, WatchLoop};
