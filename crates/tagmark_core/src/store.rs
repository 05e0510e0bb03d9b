use std::collections::HashSet;
use std::sync::Arc;

use tagmark_logging::tagmark_debug;

use crate::tag::{normalize_username, Tag, ValidationError};

/// Ordered set of tagged usernames.
///
/// Every mutation advances `version`; the annotation side compares versions to
/// decide when previously processed nodes must be scanned again.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagStore {
    tags: Vec<Tag>,
    version: u64,
}

impl TagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from persisted entries, dropping invalid and duplicate ones.
    pub fn from_raw<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut store = Self::new();
        store.reload(raw);
        store.version = 0;
        store
    }

    pub fn get(&self) -> &[Tag] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Case-insensitive membership test; accepts a leading `@`.
    pub fn contains(&self, raw: &str) -> bool {
        let name = normalize_username(raw);
        self.tags.iter().any(|tag| tag.as_str() == name)
    }

    pub fn add(&mut self, raw: &str) -> Result<Tag, ValidationError> {
        let tag = Tag::parse(raw)?;
        if self.tags.contains(&tag) {
            return Err(ValidationError::Duplicate(tag));
        }
        self.tags.push(tag.clone());
        self.touch();
        Ok(tag)
    }

    pub fn remove(&mut self, tag: &Tag) -> bool {
        let before = self.tags.len();
        self.tags.retain(|existing| existing != tag);
        let removed = self.tags.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    /// Removes every tag and returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let removed = self.tags.len();
        self.tags.clear();
        self.touch();
        removed
    }

    /// Merges imported entries, skipping invalid ones and ones already present.
    /// Returns the number of tags actually added.
    pub fn replace_all<I, S>(&mut self, raw: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut added = 0;
        for entry in raw {
            let Ok(tag) = Tag::parse(entry.as_ref()) else {
                continue;
            };
            if !self.tags.contains(&tag) {
                self.tags.push(tag);
                added += 1;
            }
        }
        if added > 0 {
            self.touch();
        }
        added
    }

    /// Replaces the whole list with persisted entries.
    pub fn reload<I, S>(&mut self, raw: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tags: Vec<Tag> = Vec::new();
        for entry in raw {
            match Tag::parse(entry.as_ref()) {
                Ok(tag) if !tags.contains(&tag) => tags.push(tag),
                Ok(_) => {}
                Err(err) => {
                    tagmark_debug!("dropping stored tag {:?}: {}", entry.as_ref(), err);
                }
            }
        }
        self.tags = tags;
        self.touch();
    }

    pub fn snapshot(&self) -> TagSnapshot {
        TagSnapshot {
            names: Arc::new(self.tags.iter().map(|t| t.as_str().to_owned()).collect()),
            version: self.version,
        }
    }

    pub fn to_strings(&self) -> Vec<String> {
        self.tags.iter().map(|t| t.as_str().to_owned()).collect()
    }

    fn touch(&mut self) {
        self.version += 1;
    }
}

/// Read-only, cheaply clonable view of the tag set used by the matchers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSnapshot {
    names: Arc<HashSet<String>>,
    version: u64,
}

impl TagSnapshot {
    /// Case-insensitive membership test for a bare username.
    pub fn is_tagged(&self, username: &str) -> bool {
        if self.names.is_empty() {
            return false;
        }
        self.names.contains(&username.to_ascii_lowercase())
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for TagSnapshot {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        TagStore::from_raw(iter).snapshot()
    }
}
