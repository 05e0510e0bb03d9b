use pretty_assertions::assert_eq;
use tagmark_engine::{
    ContainerContext, ContainerLocator, ContainerRules, Document, InlineStyleLayout, NodeId,
    ParentStrategy, ProfileConfig, ProfileMatcher,
};

fn locate(html: &str) -> (Document, Option<(NodeId, &'static str)>) {
    locate_with(ContainerLocator::standard(), html)
}

fn locate_with(
    locator: ContainerLocator,
    html: &str,
) -> (Document, Option<(NodeId, &'static str)>) {
    let doc = Document::parse(html);
    let rules = ContainerRules::default();
    let profiles = ProfileMatcher::new(&ProfileConfig::default());
    let link = doc.find_elements(doc.root(), |el| el.name() == "a")[0];
    let cx = ContainerContext {
        doc: &doc,
        layout: &InlineStyleLayout,
        rules: &rules,
        profiles: &profiles,
        base: None,
    };
    let found = locator.locate(&cx, link);
    (doc, found)
}

fn with_id(doc: &Document, id: &str) -> NodeId {
    doc.find_elements(doc.root(), |el| el.attr("id") == Some(id))[0]
}

#[test]
fn chain_order_is_fixed() {
    assert_eq!(
        ContainerLocator::standard().strategy_names(),
        vec![
            "signature",
            "generic-keyword",
            "content-shape",
            "minimum-size",
            "parent"
        ]
    );
}

#[test]
fn signature_wins_over_a_nearer_keyword_match() {
    let (doc, found) = locate(
        r#"<div id="outer" class="styles_postItem__Ab1"><div class="card"><a href="https://x.com/bob">bob</a></div></div>"#,
    );
    assert_eq!(found, Some((with_id(&doc, "outer"), "signature")));
}

#[test]
fn generic_keyword_is_case_insensitive() {
    let (doc, found) = locate(
        r#"<div id="card" class="FeedCard"><span><a href="https://x.com/bob">bob</a></span></div>"#,
    );
    assert_eq!(found, Some((with_id(&doc, "card"), "generic-keyword")));
}

#[test]
fn content_shape_needs_title_size_and_no_overlay() {
    let (doc, found) = locate(
        r#"<section id="post" style="width: 400px; height: 120px"><h2>Launch</h2><div><a href="https://x.com/bob">bob</a></div></section>"#,
    );
    assert_eq!(found, Some((with_id(&doc, "post"), "content-shape")));

    let (doc, found) = locate(
        r#"<div role="dialog"><section id="post" style="width: 400px; height: 120px"><h2>Launch</h2><div><a href="https://x.com/bob">bob</a></div></section></div>"#,
    );
    assert_eq!(found, Some((with_id(&doc, "post"), "minimum-size")));
}

#[test]
fn parent_is_the_last_resort() {
    let (doc, found) = locate(r#"<p><span id="wrap"><a href="https://x.com/bob">bob</a></span></p>"#);
    assert_eq!(found, Some((with_id(&doc, "wrap"), "parent")));
}

#[test]
fn body_is_never_matched_by_keyword() {
    let (doc, found) = locate(
        r#"<html><body class="item-list"><a href="https://x.com/bob">bob</a></body></html>"#,
    );
    let body = doc.body().unwrap();
    assert_eq!(found, Some((body, "parent")));
}

#[test]
fn custom_chain_replaces_the_heuristics() {
    let locator = ContainerLocator::with_strategies(vec![Box::new(ParentStrategy)]);
    let (doc, found) = locate_with(
        locator,
        r#"<div class="card"><span id="inner"><a href="https://x.com/bob">bob</a></span></div>"#,
    );
    assert_eq!(found, Some((with_id(&doc, "inner"), "parent")));
}
