//! Entry domain model.
//!
//! # Responsibility
//! - Define the canonical catalog record and its on-disk wire shape.
//! - Provide the matching and key helpers used by store validation/search.
//!
//! # Invariants
//! - `id` is assigned in memory and never written to disk.
//! - Entries are mutated only through the store; fields are crate-private.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Required prefix for every stored `website` value.
pub const WEBSITE_PREFIX: &str = "https://";

/// Stable in-memory key for one entry.
///
/// Generated when the entry enters the store (add or load). Not persisted, so
/// ids differ between process runs.
pub type EntryId = Uuid;

/// User-editable entry field, in validation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryField {
    Name,
    Description,
    Website,
}

impl EntryField {
    /// Wire/display name of the field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
            Self::Website => "website",
        }
    }
}

impl Display for EntryField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named catalog record.
///
/// Serialized as `{"name", "description", "website"}`; unknown fields in a
/// document are ignored on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(skip, default = "Uuid::new_v4")]
    pub(crate) id: EntryId,
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) website: String,
}

impl Entry {
    /// Creates an entry with a fresh id from already-normalized values.
    pub(crate) fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        website: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            website: website.into(),
        }
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn website(&self) -> &str {
        &self.website
    }

    /// Returns whether any field contains `lowered_query` as a substring.
    ///
    /// The caller passes the query already lowercased so one search pass
    /// lowercases it once. An empty query matches every entry.
    pub fn matches_lowered(&self, lowered_query: &str) -> bool {
        if lowered_query.is_empty() {
            return true;
        }
        [&self.name, &self.description, &self.website]
            .iter()
            .any(|value| value.to_lowercase().contains(lowered_query))
    }

    /// Returns whether this entry's name equals `name` ignoring case.
    pub fn has_name(&self, name: &str) -> bool {
        name_key(&self.name) == name_key(name)
    }

    pub(crate) fn replace_fields(&mut self, name: String, description: String, website: String) {
        self.name = name;
        self.description = description;
        self.website = website;
    }
}

/// Case-folded key used for name uniqueness.
///
/// Folds one character at a time, so context-sensitive mappings (final
/// sigma) cannot split two casings of one name into different keys.
pub fn name_key(name: &str) -> String {
    name.chars().flat_map(char::to_lowercase).collect()
}

/// Returns the first field that is blank after trimming, in
/// `name -> description -> website` order.
pub fn first_blank_field(name: &str, description: &str, website: &str) -> Option<EntryField> {
    [
        (EntryField::Name, name),
        (EntryField::Description, description),
        (EntryField::Website, website),
    ]
    .into_iter()
    .find(|(_, value)| value.trim().is_empty())
    .map(|(field, _)| field)
}

/// Returns whether `website` starts with the literal `https://` prefix.
///
/// The check is case-sensitive: `HTTPS://` is rejected.
pub fn has_https_prefix(website: &str) -> bool {
    website.starts_with(WEBSITE_PREFIX)
}
