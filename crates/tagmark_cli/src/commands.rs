use std::fs;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use tagmark_core::{AppState, Msg, Notice};
use tagmark_engine::{
    decode_page, parse_import, Document, EngineConfig, JsonFileStorage, LogHost, PageSession,
    Relay, StoredTags, TagStorage,
};
use tagmark_logging::{tagmark_debug, tagmark_info, tagmark_warn};
use url::Url;

use crate::cli::{AnnotateArgs, Cli, Command, TagsAction};
use crate::effects::{print_notices, write_atomically, EffectRunner};

pub fn run(cli: Cli) -> Result<ExitCode> {
    let Cli {
        store,
        config,
        command,
        ..
    } = cli;
    let config = match config {
        Some(path) => EngineConfig::load(&path)?,
        None => EngineConfig::default(),
    };
    let storage: Arc<dyn TagStorage> = Arc::new(JsonFileStorage::new(store));

    match command {
        Command::Tags { action } => run_tags(storage, &config, action),
        Command::Annotate(args) => annotate(storage, config, args),
    }
}

fn run_tags(
    storage: Arc<dyn TagStorage>,
    config: &EngineConfig,
    action: TagsAction,
) -> Result<ExitCode> {
    let loaded = storage.load().unwrap_or_else(|err| {
        tagmark_warn!("could not read tag store, starting empty: {}", err);
        StoredTags::default()
    });
    let relay = Relay::new(config.target_patterns()?);
    let mut runner = EffectRunner::new(storage, relay);
    let state = runner.dispatch(AppState::new(), Msg::TagsLoaded(loaded.tags));

    let msg = match action {
        TagsAction::List => {
            let view = state.view();
            for tag in &view.tags {
                println!("{tag}");
            }
            if view.count == 0 {
                print_notices(&[Notice::info("No tags yet")]);
            }
            return Ok(ExitCode::SUCCESS);
        }
        TagsAction::Add { name } => Msg::AddRequested(name),
        TagsAction::Remove { name } => Msg::RemoveRequested(name),
        TagsAction::Clear => Msg::ClearRequested,
        TagsAction::Export { file } => {
            runner = runner.with_export_target(file);
            Msg::ExportRequested
        }
        TagsAction::Import { file } => import_message(&file),
    };

    let state = runner.dispatch(state, msg);
    tagmark_debug!("manager now holds {} tag(s)", state.view().count);
    if print_notices(&runner.take_notices()) {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn import_message(file: &Path) -> Msg {
    let text = match fs::read_to_string(file) {
        Ok(text) => text,
        Err(err) => {
            return Msg::ImportRejected {
                reason: format!("{}: {err}", file.display()),
            }
        }
    };
    match parse_import(&text) {
        Ok(tags) => Msg::ImportParsed { tags },
        Err(err) => Msg::ImportRejected {
            reason: err.to_string(),
        },
    }
}

fn annotate(
    storage: Arc<dyn TagStorage>,
    config: EngineConfig,
    args: AnnotateArgs,
) -> Result<ExitCode> {
    let bytes =
        fs::read(&args.input).with_context(|| format!("reading {}", args.input.display()))?;
    let page = decode_page(&bytes, args.charset.as_deref())?;
    tagmark_debug!("decoded {} as {}", args.input.display(), page.encoding_label);
    let url = Url::parse(&args.page_url)
        .with_context(|| format!("invalid page url {}", args.page_url))?;

    let document = Document::parse(&page.html);
    let mut session = PageSession::new(config, url, document, storage, Box::new(LogHost))?;
    let report = session.start();
    if report.is_empty() {
        tagmark_info!("nothing tagged on {}", session.url());
    }
    session.dispose();
    let html = session.into_document().to_html();

    match args.out {
        Some(path) => {
            let written = write_atomically(&path, &html)?;
            tagmark_info!("annotated page written to {}", written.display());
        }
        None => println!("{html}"),
    }
    eprintln!("{report}");
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn clear_recovers_from_a_corrupt_store() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("store.json");
        fs::write(&path, "{ not json").unwrap();
        let storage: Arc<dyn TagStorage> = Arc::new(JsonFileStorage::new(&path));

        run_tags(storage.clone(), &EngineConfig::default(), TagsAction::Clear).unwrap();

        assert!(storage.load().unwrap().tags.is_empty());
    }

    #[test]
    fn add_on_a_corrupt_store_starts_from_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("store.json");
        fs::write(&path, "[1, 2").unwrap();
        let storage: Arc<dyn TagStorage> = Arc::new(JsonFileStorage::new(&path));

        let add = TagsAction::Add {
            name: "alice".into(),
        };
        run_tags(storage.clone(), &EngineConfig::default(), add).unwrap();

        assert_eq!(storage.load().unwrap().tags, vec!["alice"]);
    }
}
