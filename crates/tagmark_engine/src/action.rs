use tagmark_core::host_in_domain;
use url::Url;

use crate::config::ActionConfig;
use crate::container::ContainerContext;
use crate::dom::NodeId;
use crate::profile::resolve_href;

/// Where a click on a highlighted container should lead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimaryAction {
    /// First non-profile, non-video link inside the container.
    Link(Url),
    /// Search for the container's title text.
    Search { query: String, url: Url },
    /// Nothing better found; reopen the current page.
    CurrentPage(Url),
}

impl PrimaryAction {
    pub fn url(&self) -> &Url {
        match self {
            PrimaryAction::Link(url) => url,
            PrimaryAction::Search { url, .. } => url,
            PrimaryAction::CurrentPage(url) => url,
        }
    }
}

pub fn resolve_primary_action(
    cx: &ContainerContext<'_>,
    config: &ActionConfig,
    container: NodeId,
    page_url: &Url,
) -> PrimaryAction {
    if let Some(url) = first_outbound_link(cx, config, container, page_url) {
        return PrimaryAction::Link(url);
    }
    if let Some(query) = title_text(cx, container) {
        if let Ok(url) = Url::parse_with_params(&config.search_url, &[("q", query.as_str())]) {
            return PrimaryAction::Search { query, url };
        }
    }
    PrimaryAction::CurrentPage(page_url.clone())
}

fn first_outbound_link(
    cx: &ContainerContext<'_>,
    config: &ActionConfig,
    container: NodeId,
    page_url: &Url,
) -> Option<Url> {
    cx.doc
        .find_elements(container, |el| el.name() == "a")
        .into_iter()
        .filter_map(|id| cx.doc.attr(id, "href"))
        .filter_map(|href| resolve_href(href, Some(page_url)))
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .filter(|url| !cx.profiles.is_profile_url(url))
        .find(|url| !is_video_url(config, url))
}

fn is_video_url(config: &ActionConfig, url: &Url) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();
    config
        .video_hosts
        .iter()
        .any(|domain| host_in_domain(&host, &domain.to_ascii_lowercase()))
}

fn title_text(cx: &ContainerContext<'_>, container: NodeId) -> Option<String> {
    let title = cx.find_title(container)?;
    let text = cx
        .doc
        .text_content(title)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    (!text.is_empty()).then_some(text)
}
