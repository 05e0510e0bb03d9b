//! Tagmark core: tag model, pure manager state machine and the insertion debounce state machine.
mod effect;
mod msg;
mod notice;
mod pattern;
mod state;
mod store;
mod tag;
mod update;
mod view_model;
mod watch;

pub use effect::Effect;
pub use msg::Msg;
pub use notice::{Notice, NoticeLevel, NOTICE_TIMEOUT};
pub use pattern::{host_in_domain, matches_any, PatternError, UrlPattern};
pub use state::AppState;
pub use store::{TagSnapshot, TagStore};
pub use tag::{normalize_username, Tag, ValidationError, MAX_TAG_LEN, MIN_TAG_LEN};
pub use update::update;
pub use view_model::{ImportStats, ManagerView};
pub use watch::{watch_update, WatchEffect, WatchMsg, WatchPhase, WatchState, DEFAULT_DEBOUNCE};
