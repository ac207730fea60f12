//! Entry store: authoritative owner of the in-memory catalog.
//!
//! # Responsibility
//! - Own the entry collection and enforce validation/uniqueness rules.
//! - Persist the full collection through the repository after each mutation.
//! - Serve search as a lazy read view over the collection.
//!
//! # Invariants
//! - An `EntryStore` value exists only after a successful load, so no
//!   operation can run against an uninitialized collection.
//! - Collection order is insertion order; update keeps position, delete
//!   removes in place, add appends.
//! - Validation failures never mutate state. Save failures never roll back
//!   the in-memory mutation.

use crate::model::entry::{
    first_blank_field, has_https_prefix, name_key, Entry, EntryField, EntryId,
};
use crate::repo::entry_repo::{EntryRepository, RepoError};
use crate::search::substring::{filter_entries, filter_positions};
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level error for validation, lookup and persistence outcomes.
#[derive(Debug)]
pub enum StoreError {
    /// A required field was blank after trimming.
    MissingField(EntryField),
    /// Another entry already uses this name (case-insensitive).
    DuplicateName(String),
    /// Website does not start with `https://`.
    InvalidWebsite(String),
    /// No entry with this id exists.
    NotFound(EntryId),
    /// Initial load failed; no store was created.
    Load(RepoError),
    /// The mutation was applied in memory but could not be saved.
    Unsaved { entry_id: EntryId, source: RepoError },
    /// An explicit save of the current collection failed.
    Save(RepoError),
}

impl StoreError {
    /// Returns whether this error came from input validation.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingField(_) | Self::DuplicateName(_) | Self::InvalidWebsite(_)
        )
    }

    /// Returns whether the in-memory state is ahead of storage.
    pub fn is_unsaved(&self) -> bool {
        matches!(self, Self::Unsaved { .. } | Self::Save(_))
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "field `{field}` must be filled out"),
            Self::DuplicateName(name) => write!(f, "an entry named `{name}` already exists"),
            Self::InvalidWebsite(website) => {
                write!(f, "website `{website}` must start with https://")
            }
            Self::NotFound(id) => write!(f, "entry not found: {id}"),
            Self::Load(err) => write!(f, "failed to load entries: {err}"),
            Self::Unsaved { entry_id, source } => {
                write!(f, "entry {entry_id} changed but not saved: {source}")
            }
            Self::Save(err) => write!(f, "failed to save entries: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Load(err) | Self::Save(err) => Some(err),
            Self::Unsaved { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Validation policy applied by [`EntryStore::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateValidation {
    /// Same checks as `add`: blank fields, name uniqueness (excluding the
    /// target itself), then the trimmed website prefix.
    #[default]
    Strict,
    /// Only the untrimmed website prefix is checked. Blank fields and
    /// duplicate names are accepted.
    WebsiteOnly,
}

/// Store behavior options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreConfig {
    pub update_validation: UpdateValidation,
}

/// In-memory entry catalog backed by an [`EntryRepository`].
#[derive(Debug)]
pub struct EntryStore<R: EntryRepository> {
    repo: R,
    config: StoreConfig,
    entries: Vec<Entry>,
}

impl<R: EntryRepository> EntryStore<R> {
    /// Loads the collection once and returns a ready store.
    ///
    /// # Errors
    /// - `StoreError::Load` when the repository cannot read or parse its
    ///   document. A missing document is not an error.
    pub fn initialize(repo: R, config: StoreConfig) -> StoreResult<Self> {
        let entries = match repo.load() {
            Ok(entries) => entries,
            Err(err) => {
                error!(
                    "event=store_init module=store status=error error_code={} error={}",
                    if err.is_load_parse() {
                        "load_parse_failed"
                    } else {
                        "load_io_failed"
                    },
                    err
                );
                return Err(StoreError::Load(err));
            }
        };

        report_loaded_violations(&entries);
        info!(
            "event=store_init module=store status=ok count={} update_validation={:?}",
            entries.len(),
            config.update_validation
        );
        Ok(Self {
            repo,
            config,
            entries,
        })
    }

    /// Adds a new entry from raw field input.
    ///
    /// Checks run in fixed order and the first failure is returned:
    /// blank field, duplicate name, website prefix. Stored values are trimmed.
    ///
    /// # Errors
    /// - Validation errors leave the collection unchanged.
    /// - `StoreError::Unsaved` when the entry was appended but the save
    ///   failed; retry with [`EntryStore::save`].
    pub fn add(&mut self, name: &str, description: &str, website: &str) -> StoreResult<Entry> {
        let (name, description, website) = (name.trim(), description.trim(), website.trim());

        if let Some(field) = first_blank_field(name, description, website) {
            debug!("event=entry_add module=store status=rejected reason=missing_field field={field}");
            return Err(StoreError::MissingField(field));
        }
        if self.entries.iter().any(|entry| entry.has_name(name)) {
            debug!("event=entry_add module=store status=rejected reason=duplicate_name");
            return Err(StoreError::DuplicateName(name.to_string()));
        }
        if !has_https_prefix(website) {
            debug!("event=entry_add module=store status=rejected reason=invalid_website");
            return Err(StoreError::InvalidWebsite(website.to_string()));
        }

        let entry = Entry::new(name, description, website);
        self.entries.push(entry.clone());
        self.persist(entry.id(), "entry_add")?;
        Ok(entry)
    }

    /// Replaces the fields of the entry identified by `id` in place.
    ///
    /// Checks follow [`StoreConfig::update_validation`]. Position in the
    /// collection is unchanged.
    ///
    /// # Errors
    /// - `StoreError::NotFound` when `id` is unknown.
    /// - Validation errors leave the entry unchanged.
    /// - `StoreError::Unsaved` when the change was applied but not saved.
    pub fn update(
        &mut self,
        id: EntryId,
        name: &str,
        description: &str,
        website: &str,
    ) -> StoreResult<Entry> {
        let index = self.position(id).ok_or(StoreError::NotFound(id))?;

        match self.config.update_validation {
            UpdateValidation::Strict => self.validate_strict_update(id, name, description, website)?,
            UpdateValidation::WebsiteOnly => {
                if !has_https_prefix(website) {
                    debug!("event=entry_update module=store status=rejected reason=invalid_website");
                    return Err(StoreError::InvalidWebsite(website.to_string()));
                }
            }
        }

        let entry = &mut self.entries[index];
        entry.replace_fields(
            name.trim().to_string(),
            description.trim().to_string(),
            website.trim().to_string(),
        );
        let updated = entry.clone();
        self.persist(id, "entry_update")?;
        Ok(updated)
    }

    /// Removes the entry identified by `id` and returns it.
    ///
    /// Deleting an unknown id is a no-op returning `Ok(None)`; nothing is
    /// saved in that case.
    ///
    /// # Errors
    /// - `StoreError::Unsaved` when the entry was removed but not saved.
    pub fn delete(&mut self, id: EntryId) -> StoreResult<Option<Entry>> {
        let Some(index) = self.position(id) else {
            debug!("event=entry_delete module=store status=noop entry_id={id}");
            return Ok(None);
        };

        let removed = self.entries.remove(index);
        self.persist(id, "entry_delete")?;
        Ok(Some(removed))
    }

    /// Returns entries whose fields contain `query`, ignoring case.
    ///
    /// Lazy and recomputed on every call; an empty query yields everything.
    pub fn search<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a Entry> + 'a {
        filter_entries(&self.entries, query)
    }

    /// Same hits as [`EntryStore::search`], paired with each entry's
    /// position in [`EntryStore::entries`].
    pub fn search_positions<'a>(
        &'a self,
        query: &str,
    ) -> impl Iterator<Item = (usize, &'a Entry)> + 'a {
        filter_positions(&self.entries, query)
    }

    /// Writes the current collection again. Used to retry after
    /// `StoreError::Unsaved`.
    pub fn save(&self) -> StoreResult<()> {
        self.repo.save(&self.entries).map_err(|err| {
            warn!(
                "event=store_save module=store status=error count={} error={}",
                self.entries.len(),
                err
            );
            StoreError::Save(err)
        })?;
        info!(
            "event=store_save module=store status=ok count={}",
            self.entries.len()
        );
        Ok(())
    }

    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.id() == id)
    }

    /// All entries in collection order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn config(&self) -> StoreConfig {
        self.config
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    fn position(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id() == id)
    }

    fn validate_strict_update(
        &self,
        id: EntryId,
        name: &str,
        description: &str,
        website: &str,
    ) -> StoreResult<()> {
        let (name, description, website) = (name.trim(), description.trim(), website.trim());

        if let Some(field) = first_blank_field(name, description, website) {
            debug!("event=entry_update module=store status=rejected reason=missing_field field={field}");
            return Err(StoreError::MissingField(field));
        }
        if self
            .entries
            .iter()
            .any(|entry| entry.id() != id && entry.has_name(name))
        {
            debug!("event=entry_update module=store status=rejected reason=duplicate_name");
            return Err(StoreError::DuplicateName(name.to_string()));
        }
        if !has_https_prefix(website) {
            debug!("event=entry_update module=store status=rejected reason=invalid_website");
            return Err(StoreError::InvalidWebsite(website.to_string()));
        }
        Ok(())
    }

    fn persist(&self, entry_id: EntryId, event: &str) -> StoreResult<()> {
        match self.repo.save(&self.entries) {
            Ok(()) => {
                info!(
                    "event={event} module=store status=ok entry_id={entry_id} count={}",
                    self.entries.len()
                );
                Ok(())
            }
            Err(source) => {
                warn!(
                    "event={event} module=store status=unsaved entry_id={entry_id} error={source}"
                );
                Err(StoreError::Unsaved { entry_id, source })
            }
        }
    }
}

/// Logs loaded entries that break write-time invariants.
///
/// Such documents can come from hand edits or lenient updates; they are kept
/// as-is rather than dropped.
fn report_loaded_violations(entries: &[Entry]) {
    let mut seen = HashSet::new();
    for (index, entry) in entries.iter().enumerate() {
        if let Some(field) = first_blank_field(entry.name(), entry.description(), entry.website()) {
            warn!("event=store_init module=store status=warn index={index} issue=blank_field field={field}");
        }
        if !has_https_prefix(entry.website()) {
            warn!("event=store_init module=store status=warn index={index} issue=invalid_website");
        }
        if !seen.insert(name_key(entry.name())) {
            warn!("event=store_init module=store status=warn index={index} issue=duplicate_name");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EntryStore, StoreConfig, StoreError};
    use crate::repo::entry_repo::MemoryEntryRepository;

    fn empty_store() -> EntryStore<MemoryEntryRepository> {
        EntryStore::initialize(MemoryEntryRepository::new(), StoreConfig::default()).unwrap()
    }

    #[test]
    fn add_trims_and_appends() {
        let mut store = empty_store();
        let entry = store
            .add("  Acme ", "\tWidget maker\n", " https://acme.example ")
            .unwrap();
        assert_eq!(entry.name(), "Acme");
        assert_eq!(entry.description(), "Widget maker");
        assert_eq!(entry.website(), "https://acme.example");
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(entry.id()), Some(&entry));
    }

    #[test]
    fn error_classification() {
        let mut store = empty_store();
        let err = store.add("", "", "").unwrap_err();
        assert!(err.is_validation());
        assert!(!err.is_unsaved());

        let missing = uuid::Uuid::new_v4();
        let err = store.update(missing, "A", "b", "https://c").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(!err.is_validation());
    }

    #[test]
    fn store_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<EntryStore<MemoryEntryRepository>>();
    }
}
