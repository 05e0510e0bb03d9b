use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tagmark_core::{update, AppState, Effect, Msg, Notice, NoticeLevel, Tag};
use tagmark_engine::{
    export_document, export_filename, AtomicFileWriter, Relay, RelayMessage, StoredTags,
    TagStorage,
};
use tagmark_logging::{tagmark_error, tagmark_info};

/// Runs manager messages through `update` and carries out the resulting effects.
pub struct EffectRunner {
    storage: Arc<dyn TagStorage>,
    relay: Relay,
    export_target: PathBuf,
    notices: Vec<Notice>,
}

impl EffectRunner {
    pub fn new(storage: Arc<dyn TagStorage>, relay: Relay) -> Self {
        Self {
            storage,
            relay,
            export_target: PathBuf::from("."),
            notices: Vec::new(),
        }
    }

    /// File, or directory to create a dated file in, for `WriteExport`.
    pub fn with_export_target(mut self, target: PathBuf) -> Self {
        self.export_target = target;
        self
    }

    /// Applies `msg` and any follow-up messages produced by failed effects.
    pub fn dispatch(&mut self, mut state: AppState, msg: Msg) -> AppState {
        let mut queue = VecDeque::from([msg]);
        while let Some(msg) = queue.pop_front() {
            let (next, effects) = update(state, msg);
            state = next;
            for effect in effects {
                if let Some(follow_up) = self.run(effect) {
                    queue.push_back(follow_up);
                }
            }
        }
        state
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn run(&mut self, effect: Effect) -> Option<Msg> {
        match effect {
            Effect::Persist { tags } => {
                let record = StoredTags::now(tags.iter().map(|t| t.as_str().to_owned()).collect());
                match self.storage.save(&record) {
                    Ok(()) => {
                        tagmark_info!("persisted {} tag(s)", record.tags.len());
                        None
                    }
                    Err(err) => {
                        tagmark_error!("persist failed: {}", err);
                        Some(Msg::PersistFailed {
                            reason: err.to_string(),
                        })
                    }
                }
            }
            Effect::BroadcastRefresh => {
                let replies = self.relay.broadcast(RelayMessage::RefreshTags);
                if replies.is_empty() {
                    tagmark_info!("no open pages to refresh");
                }
                None
            }
            Effect::Notify(notice) => {
                self.notices.push(notice);
                None
            }
            Effect::WriteExport { tags } => {
                match self.write_export(&tags) {
                    Ok(path) => tagmark_info!("export written to {}", path.display()),
                    Err(err) => {
                        tagmark_error!("export failed: {:#}", err);
                        self.notices
                            .push(Notice::error(format!("Export failed: {err:#}")));
                    }
                }
                None
            }
        }
    }

    fn write_export(&self, tags: &[Tag]) -> Result<PathBuf> {
        let now = Utc::now();
        let content = serde_json::to_string_pretty(&export_document(tags, now))?;
        let target = if self.export_target.is_dir() {
            self.export_target.join(export_filename(now))
        } else {
            self.export_target.clone()
        };
        write_atomically(&target, &content)
    }
}

/// Writes `content` to `path` through a temp file in the same directory.
pub fn write_atomically(path: &Path, content: &str) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("{} has no file name", path.display()))?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    AtomicFileWriter::new(dir)
        .write(file_name, content)
        .with_context(|| format!("writing {}", path.display()))
}

/// Prints notices to stderr. Returns true when any of them is an error.
pub fn print_notices(notices: &[Notice]) -> bool {
    for notice in notices {
        let label = match notice.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Info => "info",
            NoticeLevel::Error => "error",
        };
        eprintln!("{label}: {}", notice.text);
    }
    notices.iter().any(|n| n.level == NoticeLevel::Error)
}
