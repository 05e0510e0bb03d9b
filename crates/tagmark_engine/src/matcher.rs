use std::ops::Range;
use std::sync::LazyLock;

use regex::{CaptureMatches, Regex};
use tagmark_core::TagSnapshot;

static MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([A-Za-z0-9_]+)").expect("mention pattern compiles"));

/// One `@username` token found in text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention<'t> {
    /// Byte range of the whole token, `@` included.
    pub span: Range<usize>,
    pub text: &'t str,
    pub username: &'t str,
}

/// Finds `@mentions` and tests them against a tag snapshot.
#[derive(Debug, Clone)]
pub struct UsernameMatcher {
    pattern: Regex,
}

impl Default for UsernameMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl UsernameMatcher {
    pub fn new() -> Self {
        Self {
            pattern: MENTION.clone(),
        }
    }

    /// Lazy iterator over mentions in `text`; call again to restart.
    pub fn find_mentions<'r, 't>(&'r self, text: &'t str) -> Mentions<'r, 't> {
        Mentions {
            inner: self.pattern.captures_iter(text),
        }
    }

    pub fn is_tagged(&self, tags: &TagSnapshot, username: &str) -> bool {
        tags.is_tagged(username)
    }

    /// True when at least one mention in `text` is tagged.
    pub fn has_tagged_mention(&self, tags: &TagSnapshot, text: &str) -> bool {
        !tags.is_empty()
            && self
                .find_mentions(text)
                .any(|m| self.is_tagged(tags, m.username))
    }
}

pub struct Mentions<'r, 't> {
    inner: CaptureMatches<'r, 't>,
}

impl<'t> Iterator for Mentions<'_, 't> {
    type Item = Mention<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let caps = self.inner.next()?;
        let whole = caps.get(0)?;
        let name = caps.get(1)?;
        Some(Mention {
            span: whole.range(),
            text: whole.as_str(),
            username: name.as_str(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_every_mention_with_spans() {
        let matcher = UsernameMatcher::new();
        let text = "hi @Alice, cc @bob_2 and me@home";
        let found: Vec<_> = matcher.find_mentions(text).collect();

        assert_eq!(found.len(), 3);
        assert_eq!(found[0].username, "Alice");
        assert_eq!(&text[found[0].span.clone()], "@Alice");
        assert_eq!(found[1].text, "@bob_2");
        assert_eq!(found[2].username, "home");
    }

    #[test]
    fn iteration_restarts_from_the_beginning() {
        let matcher = UsernameMatcher::new();
        let text = "@a1 @b2";
        assert_eq!(matcher.find_mentions(text).count(), 2);
        assert_eq!(matcher.find_mentions(text).count(), 2);
    }

    #[test]
    fn tagged_check_is_case_insensitive() {
        let matcher = UsernameMatcher::new();
        let tags: TagSnapshot = ["alice"].into_iter().collect();
        assert!(matcher.has_tagged_mention(&tags, "yo @ALICE"));
        assert!(!matcher.has_tagged_mention(&tags, "yo @alicia"));
        assert!(!matcher.has_tagged_mention(&TagSnapshot::default(), "@alice"));
    }
}
