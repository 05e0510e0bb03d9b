use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tagmark_engine::style::MENTION_ATTR;
use tagmark_engine::{
    collect_responses, Document, EngineConfig, LogHost, MemoryStorage, NodeId, PageHandle,
    PageSession, PersistenceError, Relay, RelayMessage, RelayResponse, StoredTags, TagStorage,
    WatchLoop,
};
use tokio::time::{sleep, timeout, Instant};
use url::Url;

struct OfflineStorage;

impl TagStorage for OfflineStorage {
    fn load(&self) -> Result<StoredTags, PersistenceError> {
        Err(PersistenceError::Directory("storage offline".into()))
    }

    fn save(&self, _record: &StoredTags) -> Result<(), PersistenceError> {
        Err(PersistenceError::Directory("storage offline".into()))
    }
}

const FEED_PAGE: &str = r#"<html><body><div id="feed"><p>@alice posted</p></div></body></html>"#;

fn feed(doc: &Document) -> NodeId {
    doc.find_elements(doc.root(), |el| el.attr("id") == Some("feed"))[0]
}

fn spawn_page(url: &str, storage: Arc<dyn TagStorage>) -> (PageHandle, NodeId) {
    let doc = Document::parse(FEED_PAGE);
    let feed = feed(&doc);
    let session = PageSession::new(
        EngineConfig::default(),
        Url::parse(url).unwrap(),
        doc,
        storage,
        Box::new(LogHost),
    )
    .unwrap();
    (WatchLoop::spawn(session), feed)
}

#[tokio::test(start_paused = true)]
async fn three_bursts_twenty_ms_apart_run_one_pass() {
    tagmark_logging::initialize_for_tests();
    let storage = Arc::new(MemoryStorage::with_tags(["alice"]));
    let (mut page, feed) = spawn_page("https://www.producthunt.com/", storage);
    let initial = page.next_report().await.unwrap();
    assert_eq!(initial.mentions_wrapped, 1);

    let start = Instant::now();
    for i in 0..3 {
        assert!(page.insert(feed, format!("<p>burst {i} from @alice</p>")));
        if i < 2 {
            sleep(Duration::from_millis(20)).await;
        }
    }

    let report = page.next_report().await.unwrap();
    let elapsed = start.elapsed();
    assert!(
        elapsed >= Duration::from_millis(140) && elapsed < Duration::from_millis(150),
        "pass ran after {elapsed:?}"
    );
    assert_eq!(report.roots, 3);
    assert_eq!(report.mentions_wrapped, 3);

    assert!(timeout(Duration::from_secs(1), page.next_report())
        .await
        .is_err());

    let session = page.shutdown().await.unwrap();
    let doc = session.document();
    assert_eq!(
        doc.find_elements(doc.root(), |el| el.has_attr(MENTION_ATTR))
            .len(),
        4
    );
}

#[tokio::test(start_paused = true)]
async fn refresh_is_relayed_to_target_pages_only() {
    let storage = Arc::new(MemoryStorage::new());
    let (mut target, _) = spawn_page("https://www.producthunt.com/posts/a", storage.clone());
    let (mut other, _) = spawn_page("https://example.com/", storage.clone());
    assert_eq!(target.next_report().await.unwrap().mentions_wrapped, 0);
    assert_eq!(other.next_report().await.unwrap().mentions_wrapped, 0);

    let mut relay = Relay::new(EngineConfig::default().target_patterns().unwrap());
    relay.register(target.url().clone(), target.sender());
    relay.register(other.url().clone(), other.sender());

    storage
        .save(&StoredTags::now(vec!["alice".to_string()]))
        .unwrap();
    let replies = relay.broadcast(RelayMessage::RefreshTags);
    assert_eq!(replies.len(), 1);
    assert_eq!(
        collect_responses(replies).await,
        vec![RelayResponse { success: true }]
    );
    assert_eq!(target.next_report().await.unwrap().mentions_wrapped, 1);

    other.shutdown().await.unwrap();
    assert_eq!(relay.prune(), 1);
    assert_eq!(relay.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_storage_read_answers_unsuccessful() {
    let (mut page, _) = spawn_page("https://www.producthunt.com/", Arc::new(OfflineStorage));
    page.next_report().await.unwrap();

    let mut relay = Relay::new(EngineConfig::default().target_patterns().unwrap());
    relay.register(page.url().clone(), page.sender());
    let responses = collect_responses(relay.broadcast(RelayMessage::RefreshTags)).await;

    assert_eq!(responses, vec![RelayResponse { success: false }]);
}
