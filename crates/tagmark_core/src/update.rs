use crate::{AppState, Effect, Msg, Notice, Tag};

/// Pure update function: applies a manager message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::TagsLoaded(raw) => {
            state.store_mut().reload(raw);
            state.mark_dirty();
            Vec::new()
        }
        Msg::AddRequested(raw) => match state.store_mut().add(&raw) {
            Ok(tag) => {
                state.mark_dirty();
                let notice = Notice::success(format!("Added @{tag}"));
                mutation_effects(&state, notice)
            }
            Err(err) => vec![Effect::Notify(Notice::error(err.to_string()))],
        },
        Msg::RemoveRequested(raw) => {
            let removed = match Tag::parse(&raw) {
                Ok(tag) if state.store_mut().remove(&tag) => Some(tag),
                _ => None,
            };
            match removed {
                Some(tag) => {
                    state.mark_dirty();
                    mutation_effects(&state, Notice::success(format!("Removed @{tag}")))
                }
                None => vec![Effect::Notify(Notice::info(format!(
                    "@{} is not tagged",
                    raw.trim().trim_start_matches('@')
                )))],
            }
        }
        Msg::ClearRequested => {
            let removed = state.store_mut().clear();
            state.mark_dirty();
            mutation_effects(&state, Notice::success(format!("Cleared {removed} tags")))
        }
        Msg::ExportRequested => {
            if state.store().is_empty() {
                vec![Effect::Notify(Notice::info("No tags to export"))]
            } else {
                let count = state.store().len();
                vec![
                    Effect::WriteExport {
                        tags: state.store().get().to_vec(),
                    },
                    Effect::Notify(Notice::success(format!("Exported {count} tags"))),
                ]
            }
        }
        Msg::ImportParsed { tags } => {
            let total = tags.len();
            let added = state.store_mut().replace_all(&tags);
            state.set_last_import(added, total);
            state.mark_dirty();
            let notice = Notice::success(format!("Imported {added} new of {total} tags"));
            if added > 0 {
                mutation_effects(&state, notice)
            } else {
                vec![Effect::Notify(notice)]
            }
        }
        Msg::ImportRejected { reason } => {
            vec![Effect::Notify(Notice::error(format!("Import failed: {reason}")))]
        }
        Msg::PersistFailed { reason } => {
            vec![Effect::Notify(Notice::error(format!(
                "Could not save tags: {reason}"
            )))]
        }
    };

    (state, effects)
}

fn mutation_effects(state: &AppState, notice: Notice) -> Vec<Effect> {
    vec![
        Effect::Persist {
            tags: state.store().get().to_vec(),
        },
        Effect::BroadcastRefresh,
        Effect::Notify(notice),
    ]
}
