use std::{collections::BTreeSet, fmt::Display};

use chrono::{DateTime, Utc};
use teloxide::types::UserId;

/// A single tag: lowercase, without the leading `#`, never empty.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Tag(String);

impl Tag {
    /// Normalize a word into a tag. Leading `#` characters are stripped
    /// and the rest is lowercased. Returns [`None`] if nothing is left.
    pub fn new(word: &str) -> Option<Self> {
        let bare = word.trim_start_matches('#');
        if bare.is_empty() {
            return None;
        }
        Some(Self(bare.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        self.as_ref()
    }
}

impl AsRef<str> for Tag {
    fn as_ref(&self) -> &str {
        self.0.as_ref()
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// Tags of a link. Sorted, so that rendering is stable.
pub type TagSet = BTreeSet<Tag>;

/// One saved link, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Row ID of the entry. Also breaks ties between equal timestamps.
    pub id: i64,
    /// The user who saved it.
    pub owner: UserId,
    /// The saved string, verbatim.
    pub url: String,
    pub tags: TagSet,
    pub created_at: DateTime<Utc>,
}
