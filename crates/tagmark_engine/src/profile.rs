use tagmark_core::{host_in_domain, Tag};
use url::Url;

use crate::config::ProfileConfig;
use crate::dom::{Document, NodeId};

/// A profile link resolved at scan time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileReference {
    pub url: Url,
    pub username: String,
}

/// Recognizes links pointing at user profiles on the allowlisted hosts.
#[derive(Debug, Clone)]
pub struct ProfileMatcher {
    hosts: Vec<String>,
    reserved: Vec<String>,
}

impl ProfileMatcher {
    pub fn new(config: &ProfileConfig) -> Self {
        Self {
            hosts: config
                .hosts
                .iter()
                .map(|h| h.trim().to_ascii_lowercase())
                .filter(|h| !h.is_empty())
                .collect(),
            reserved: config
                .reserved_paths
                .iter()
                .map(|p| p.to_ascii_lowercase())
                .collect(),
        }
    }

    /// True when the URL is on a profile host, whatever its path.
    pub fn is_profile_url(&self, url: &Url) -> bool {
        url.host_str()
            .map(|h| h.to_ascii_lowercase())
            .is_some_and(|host| self.hosts.iter().any(|d| host_in_domain(&host, d)))
    }

    /// Resolves `href` and extracts the username from its first path segment.
    pub fn reference(&self, href: &str, base: Option<&Url>) -> Option<ProfileReference> {
        let url = resolve_href(href, base)?;
        if !self.is_profile_url(&url) {
            return None;
        }
        let first = url.path_segments()?.find(|s| !s.is_empty())?;
        if self.reserved.iter().any(|r| r.eq_ignore_ascii_case(first)) {
            return None;
        }
        let tag = Tag::parse(first).ok()?;
        Some(ProfileReference {
            username: tag.into_string(),
            url,
        })
    }

    /// `a[href]` elements at or below `root` that point at a profile host.
    pub fn profile_links(&self, doc: &Document, root: NodeId, base: Option<&Url>) -> Vec<NodeId> {
        doc.find_elements(root, |el| {
            el.name() == "a"
                && el
                    .attr("href")
                    .and_then(|href| resolve_href(href, base))
                    .is_some_and(|url| self.is_profile_url(&url))
        })
    }

    /// True when `id` is an anchor pointing at a profile host.
    pub fn is_profile_link(&self, doc: &Document, id: NodeId, base: Option<&Url>) -> bool {
        doc.name(id) == Some("a")
            && doc
                .attr(id, "href")
                .and_then(|href| resolve_href(href, base))
                .is_some_and(|url| self.is_profile_url(&url))
    }
}

/// Resolves an href against `base`, skipping fragments and script URLs.
pub fn resolve_href(reference: &str, base: Option<&Url>) -> Option<Url> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with('#') || lower.starts_with("javascript:") {
        return None;
    }
    if let Ok(url) = Url::parse(trimmed) {
        return Some(url);
    }
    base.and_then(|base| base.join(trimmed).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> ProfileMatcher {
        ProfileMatcher::new(&ProfileConfig::default())
    }

    #[test]
    fn username_comes_from_first_segment() {
        let found = matcher()
            .reference("https://x.com/Alice/status/123", None)
            .unwrap();
        assert_eq!(found.username, "alice");

        let found = matcher()
            .reference("https://mobile.twitter.com/bob_1?s=20", None)
            .unwrap();
        assert_eq!(found.username, "bob_1");
    }

    #[test]
    fn reserved_sections_and_other_hosts_are_not_profiles() {
        let m = matcher();
        assert_eq!(m.reference("https://x.com/home", None), None);
        assert_eq!(m.reference("https://x.com/i/flow/login", None), None);
        assert_eq!(m.reference("https://x.com/", None), None);
        assert_eq!(m.reference("https://example.com/alice", None), None);
        assert_eq!(m.reference("https://x.com/this-is-no-user", None), None);
    }

    #[test]
    fn relative_links_resolve_against_base() {
        let base = Url::parse("https://x.com/explore").unwrap();
        let found = matcher().reference("/carol", Some(&base)).unwrap();
        assert_eq!(found.url.as_str(), "https://x.com/carol");
    }
}
