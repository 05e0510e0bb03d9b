use std::borrow::Borrow;
use std::fmt;

pub const MIN_TAG_LEN: usize = 2;
pub const MAX_TAG_LEN: usize = 15;

/// A normalized username: lowercase ASCII letters, digits or underscore,
/// 2 to 15 characters, never prefixed with `@`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("username is empty")]
    Empty,
    #[error("username must be {MIN_TAG_LEN}-{MAX_TAG_LEN} characters (got {len})")]
    Length { len: usize },
    #[error("username contains invalid character {ch:?}")]
    InvalidCharacter { ch: char },
    #[error("@{0} is already tagged")]
    Duplicate(Tag),
}

impl Tag {
    /// Normalizes and validates raw user input.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let name = normalize_username(raw);
        if name.is_empty() {
            return Err(ValidationError::Empty);
        }
        let len = name.chars().count();
        if !(MIN_TAG_LEN..=MAX_TAG_LEN).contains(&len) {
            return Err(ValidationError::Length { len });
        }
        if let Some(ch) = name
            .chars()
            .find(|ch| !(ch.is_ascii_alphanumeric() || *ch == '_'))
        {
            return Err(ValidationError::InvalidCharacter { ch });
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Trims whitespace, strips a single leading `@` and lowercases.
pub fn normalize_username(raw: &str) -> String {
    let trimmed = raw.trim();
    let stripped = trimmed.strip_prefix('@').unwrap_or(trimmed);
    stripped.to_lowercase()
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Tag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Tag {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_at_and_lowercases() {
        assert_eq!(Tag::parse("  @Alice_01 ").unwrap().as_str(), "alice_01");
    }

    #[test]
    fn rejects_out_of_range_lengths() {
        assert_eq!(Tag::parse("@a"), Err(ValidationError::Length { len: 1 }));
        assert_eq!(
            Tag::parse("abcdefghijklmnop"),
            Err(ValidationError::Length { len: 16 })
        );
        assert!(Tag::parse("abcdefghijklmno").is_ok());
    }

    #[test]
    fn rejects_empty_and_bare_at() {
        assert_eq!(Tag::parse("   "), Err(ValidationError::Empty));
        assert_eq!(Tag::parse("@"), Err(ValidationError::Empty));
    }

    #[test]
    fn rejects_non_word_characters() {
        assert_eq!(
            Tag::parse("al-ice"),
            Err(ValidationError::InvalidCharacter { ch: '-' })
        );
    }

    #[test]
    fn whitespace_after_the_at_is_kept() {
        assert_eq!(normalize_username(" @ Alice "), " alice");
        assert_eq!(
            Tag::parse("@ alice"),
            Err(ValidationError::InvalidCharacter { ch: ' ' })
        );
    }
}
