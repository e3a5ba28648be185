//! Case-normalised, deduplicated tag sets.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A set of tags. Tags are trimmed and lowercased on insertion, empty tags
/// are dropped, and iteration yields them sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TagSet(BTreeSet<String>);

impl TagSet {
    /// Create an empty tag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalise a single tag. Returns `None` for blank input.
    pub fn normalize(tag: &str) -> Option<String> {
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_lowercase())
        }
    }

    /// Insert a tag. Returns true if it was not already present.
    pub fn insert(&mut self, tag: &str) -> bool {
        match Self::normalize(tag) {
            Some(t) => self.0.insert(t),
            None => false,
        }
    }

    /// Remove a tag (case-insensitive). Returns true if it was present.
    pub fn remove(&mut self, tag: &str) -> bool {
        match Self::normalize(tag) {
            Some(t) => self.0.remove(&t),
            None => false,
        }
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, tag: &str) -> bool {
        Self::normalize(tag).is_some_and(|t| self.0.contains(&t))
    }

    /// Iterate tags in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of distinct tags.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set has no tags.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for tag in iter {
            set.insert(tag.as_ref());
        }
        set
    }
}

impl From<Vec<String>> for TagSet {
    fn from(tags: Vec<String>) -> Self {
        tags.into_iter().collect()
    }
}

impl From<TagSet> for Vec<String> {
    fn from(tags: TagSet) -> Self {
        tags.0.into_iter().collect()
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = self.iter().collect();
        write!(f, "{}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_and_dedups() {
        let tags: TagSet = ["Horror", " horror ", "ONE-SHOT", ""].into_iter().collect();
        assert_eq!(tags.len(), 2);
        let sorted: Vec<&str> = tags.iter().collect();
        assert_eq!(sorted, vec!["horror", "one-shot"]);
    }

    #[test]
    fn contains_and_remove_ignore_case() {
        let mut tags: TagSet = ["Homebrew"].into_iter().collect();
        assert!(tags.contains("HOMEBREW"));
        assert!(tags.remove("homebrew"));
        assert!(tags.is_empty());
        assert!(!tags.remove("homebrew"));
    }

    #[test]
    fn deserializes_from_messy_list() {
        let tags: TagSet = serde_json::from_str(r#"["b", "A", "a"]"#).unwrap();
        assert_eq!(serde_json::to_string(&tags).unwrap(), r#"["a","b"]"#);
    }

    #[test]
    fn display_joins_sorted() {
        let tags: TagSet = ["west", "east"].into_iter().collect();
        assert_eq!(tags.to_string(), "east, west");
    }
}
