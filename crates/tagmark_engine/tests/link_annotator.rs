use pretty_assertions::assert_eq;
use tagmark_core::TagSnapshot;
use tagmark_engine::style::{BADGE_ATTR, HIGHLIGHTED_ATTR, USERNAME_ATTR};
use tagmark_engine::{
    DomEvent, Document, EngineConfig, Highlighter, NodeId, PageAction, PrimaryAction,
};
use url::Url;

const ITEM_PAGE: &str = r#"<html><body>
<div class="styles_item__x1">
  <div class="styles_content__q"><h3>Cool product</h3>
    <p>Made by <a href="https://x.com/alice/status/123">alice</a></p>
  </div>
  <a href="https://www.youtube.com/watch?v=1">Demo</a>
  <a href="https://example.com/product">Visit</a>
</div>
</body></html>"#;

fn page_url() -> Url {
    Url::parse("https://www.producthunt.com/posts/cool").unwrap()
}

fn snapshot(names: &[&str]) -> TagSnapshot {
    names.iter().copied().collect()
}

fn highlighter(doc: &mut Document, tags: &[&str]) -> Highlighter {
    let mut engine = Highlighter::new(EngineConfig::default()).unwrap();
    engine.set_tags(snapshot(tags));
    engine.init(doc, &page_url());
    engine
}

fn highlighted(doc: &Document) -> Vec<NodeId> {
    doc.find_elements(doc.root(), |el| el.attr(HIGHLIGHTED_ATTR) == Some("true"))
}

fn badges(doc: &Document) -> Vec<NodeId> {
    doc.find_elements(doc.root(), |el| el.has_attr(BADGE_ATTR))
}

fn item(doc: &Document) -> NodeId {
    doc.find_elements(doc.root(), |el| el.class_contains("styles_item"))[0]
}

#[test]
fn tagged_profile_link_highlights_its_item_container() {
    tagmark_logging::initialize_for_tests();
    let mut doc = Document::parse(ITEM_PAGE);
    let report = {
        let mut engine = Highlighter::new(EngineConfig::default()).unwrap();
        engine.set_tags(snapshot(&["alice"]));
        engine.init(&mut doc, &page_url())
    };
    assert_eq!(report.containers_highlighted, 1);

    let container = item(&doc);
    assert_eq!(highlighted(&doc), vec![container]);
    assert_eq!(doc.attr(container, USERNAME_ATTR), Some("alice"));
    assert_eq!(doc.style(container, "position").as_deref(), Some("relative"));

    let badge = badges(&doc);
    assert_eq!(badge.len(), 1);
    assert_eq!(doc.parent(badge[0]), Some(container));
    assert_eq!(doc.attr(badge[0], BADGE_ATTR), Some("alice"));
    assert!(doc.text_content(badge[0]).ends_with("@alice"));

    let events: Vec<DomEvent> = doc
        .element(container)
        .unwrap()
        .listeners()
        .iter()
        .map(|l| l.event)
        .collect();
    assert_eq!(
        events,
        vec![DomEvent::PointerEnter, DomEvent::PointerLeave, DomEvent::Click]
    );
}

#[test]
fn second_pass_leaves_the_container_unchanged() {
    let mut doc = Document::parse(ITEM_PAGE);
    let mut engine = highlighter(&mut doc, &["alice"]);
    let once = doc.to_html();

    let report = engine.full_pass(&mut doc, &page_url());
    assert_eq!(report.containers_highlighted, 0);
    assert_eq!(doc.to_html(), once);

    // Same tags under a new generation: links are rescanned, nothing is added.
    engine.set_tags(snapshot(&["alice"]));
    let report = engine.full_pass(&mut doc, &page_url());
    assert_eq!(report.links_scanned, 1);
    assert_eq!(report.containers_highlighted, 0);
    assert_eq!(badges(&doc).len(), 1);
    assert_eq!(doc.element(item(&doc)).unwrap().listeners().len(), 3);
}

#[test]
fn untagged_and_reserved_links_are_skipped() {
    let mut doc = Document::parse(
        r#"<html><body>
        <div class="row"><a href="https://x.com/bob">bob</a></div>
        <div class="row"><a href="https://x.com/explore">explore</a></div>
        </body></html>"#,
    );
    let _engine = highlighter(&mut doc, &["alice"]);
    assert!(highlighted(&doc).is_empty());
    assert!(badges(&doc).is_empty());
}

#[test]
fn links_are_only_processed_on_target_pages() {
    let mut doc = Document::parse(ITEM_PAGE);
    let mut engine = Highlighter::new(EngineConfig::default()).unwrap();
    engine.set_tags(snapshot(&["alice"]));
    let report = engine.init(&mut doc, &Url::parse("https://example.com/feed").unwrap());

    assert_eq!(report.links_scanned, 0);
    assert!(highlighted(&doc).is_empty());
}

#[test]
fn clearing_tags_does_not_retract_existing_highlights() {
    let mut doc = Document::parse(ITEM_PAGE);
    let mut engine = highlighter(&mut doc, &["alice"]);
    let before = doc.to_html();

    engine.set_tags(TagSnapshot::default());
    let report = engine.full_pass(&mut doc, &page_url());

    assert_eq!(report.containers_highlighted, 0);
    assert_eq!(highlighted(&doc), vec![item(&doc)]);
    assert_eq!(doc.to_html(), before);
}

#[test]
fn hover_swaps_styles_on_the_container_only() {
    let mut doc = Document::parse(ITEM_PAGE);
    let engine = highlighter(&mut doc, &["alice"]);
    let container = item(&doc);
    let style = EngineConfig::default().style;

    let outcome = engine.handle_event(&mut doc, container, DomEvent::PointerEnter, &page_url());
    assert_eq!(outcome, Some(PageAction::Hovered(container)));
    assert_eq!(
        doc.style(container, "background-color"),
        Some(style.highlight_hover_background.clone())
    );

    // Hover does not bubble from descendants.
    let title = doc.first_element_named(container, "h3").unwrap();
    assert_eq!(
        engine.handle_event(&mut doc, title, DomEvent::PointerLeave, &page_url()),
        None
    );

    engine.handle_event(&mut doc, container, DomEvent::PointerLeave, &page_url());
    assert_eq!(
        doc.style(container, "background-color"),
        Some(style.highlight_background)
    );
}

#[test]
fn click_opens_first_non_profile_non_video_link() {
    let mut doc = Document::parse(ITEM_PAGE);
    let engine = highlighter(&mut doc, &["alice"]);
    let container = item(&doc);
    let title = doc.first_element_named(container, "h3").unwrap();

    let outcome = engine.handle_event(&mut doc, title, DomEvent::Click, &page_url());
    assert_eq!(
        outcome,
        Some(PageAction::Open {
            container,
            action: PrimaryAction::Link(Url::parse("https://example.com/product").unwrap()),
        })
    );
}

#[test]
fn click_on_profile_link_is_left_to_the_link() {
    let mut doc = Document::parse(ITEM_PAGE);
    let engine = highlighter(&mut doc, &["alice"]);
    let link = doc.find_elements(doc.root(), |el| {
        el.attr("href") == Some("https://x.com/alice/status/123")
    })[0];

    assert_eq!(
        engine.handle_event(&mut doc, link, DomEvent::Click, &page_url()),
        None
    );
}

#[test]
fn click_without_outbound_link_searches_for_the_title() {
    let mut doc = Document::parse(
        r#"<html><body><div class="card"><h2>Cool   product</h2>
        <a href="https://x.com/alice">alice</a>
        <a href="https://youtu.be/xyz">video</a></div></body></html>"#,
    );
    let engine = highlighter(&mut doc, &["alice"]);
    let container = doc.find_elements(doc.root(), |el| el.class_contains("card"))[0];

    let Some(PageAction::Open { action, .. }) =
        engine.handle_event(&mut doc, container, DomEvent::Click, &page_url())
    else {
        panic!("expected an open action");
    };
    assert_eq!(
        action,
        PrimaryAction::Search {
            query: "Cool product".into(),
            url: Url::parse("https://www.google.com/search?q=Cool+product").unwrap(),
        }
    );
}

#[test]
fn disposed_engine_ignores_passes_and_events() {
    let mut doc = Document::parse(ITEM_PAGE);
    let mut engine = highlighter(&mut doc, &[]);
    engine.dispose();
    engine.set_tags(snapshot(&["alice"]));

    let report = engine.full_pass(&mut doc, &page_url());
    assert_eq!(report.roots, 0);
    assert!(highlighted(&doc).is_empty());
}
