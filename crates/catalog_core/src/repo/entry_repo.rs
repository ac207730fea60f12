//! Entry persistence contracts and JSON document implementations.
//!
//! # Responsibility
//! - Load and save the full entry collection as one JSON array.
//! - Keep file format and write strategy inside the persistence boundary.
//!
//! # Invariants
//! - A missing document loads as an empty collection; a malformed one is an
//!   error, never silently empty.
//! - `save` is a full overwrite. A failed save leaves the previous document
//!   intact.

use crate::model::entry::Entry;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;
use tempfile::NamedTempFile;

/// Default backing file name used by shells that do not configure one.
pub const DEFAULT_FILE_NAME: &str = "knownPlugins.json";

const MEMORY_ORIGIN: &str = ":memory:";

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error for entry document load and save operations.
#[derive(Debug)]
pub enum RepoError {
    /// OS-level read or write failure.
    Io { path: PathBuf, source: io::Error },
    /// Document exists but is not an array of entry records.
    LoadParse {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// Collection could not be encoded as JSON.
    Encode(serde_json::Error),
}

impl RepoError {
    /// Returns whether this is a malformed-document failure.
    pub fn is_load_parse(&self) -> bool {
        matches!(self, Self::LoadParse { .. })
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "I/O failure on `{}`: {source}", path.display())
            }
            Self::LoadParse { path, source } => write!(
                f,
                "`{}` is not a valid entry document: {source}",
                path.display()
            ),
            Self::Encode(err) => write!(f, "failed to encode entries: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::LoadParse { source, .. } => Some(source),
            Self::Encode(err) => Some(err),
        }
    }
}

/// Repository interface for whole-collection entry persistence.
pub trait EntryRepository {
    /// Reads the full collection. Absent storage yields an empty list.
    fn load(&self) -> RepoResult<Vec<Entry>>;
    /// Overwrites storage with the full collection.
    fn save(&self, entries: &[Entry]) -> RepoResult<()>;
}

/// JSON file-backed entry repository.
#[derive(Debug, Clone)]
pub struct JsonFileEntryRepository {
    path: PathBuf,
}

impl JsonFileEntryRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> RepoError {
        RepoError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl EntryRepository for JsonFileEntryRepository {
    fn load(&self) -> RepoResult<Vec<Entry>> {
        let started_at = Instant::now();
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!(
                    "event=entries_load module=repo status=ok mode=file count=0 missing=true duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                return Ok(Vec::new());
            }
            Err(err) => {
                error!(
                    "event=entries_load module=repo status=error mode=file error_code=read_failed error={}",
                    err
                );
                return Err(self.io_error(err));
            }
        };

        let entries = decode_document(&bytes, &self.path)?;
        info!(
            "event=entries_load module=repo status=ok mode=file count={} duration_ms={}",
            entries.len(),
            started_at.elapsed().as_millis()
        );
        Ok(entries)
    }

    fn save(&self, entries: &[Entry]) -> RepoResult<()> {
        let started_at = Instant::now();
        let encoded = encode_document(entries)?;

        match write_atomically(&self.path, encoded.as_bytes()) {
            Ok(()) => {
                info!(
                    "event=entries_save module=repo status=ok mode=file count={} duration_ms={}",
                    entries.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=entries_save module=repo status=error mode=file count={} error_code=write_failed error={}",
                    entries.len(),
                    err
                );
                Err(self.io_error(err))
            }
        }
    }
}

/// In-process entry repository holding the last saved document as text.
///
/// Useful for tests and for stores that do not need durability.
#[derive(Debug, Default)]
pub struct MemoryEntryRepository {
    document: Mutex<Option<String>>,
}

impl MemoryEntryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository whose next `load` reads `document`.
    pub fn with_document(document: impl Into<String>) -> Self {
        Self {
            document: Mutex::new(Some(document.into())),
        }
    }

    /// Returns the last saved (or seeded) document text.
    pub fn document(&self) -> Option<String> {
        self.lock_document().clone()
    }

    fn lock_document(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.document
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl EntryRepository for MemoryEntryRepository {
    fn load(&self) -> RepoResult<Vec<Entry>> {
        match self.lock_document().as_deref() {
            Some(document) => decode_document(document.as_bytes(), Path::new(MEMORY_ORIGIN)),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, entries: &[Entry]) -> RepoResult<()> {
        let encoded = encode_document(entries)?;
        *self.lock_document() = Some(encoded);
        Ok(())
    }
}

fn decode_document(bytes: &[u8], origin: &Path) -> RepoResult<Vec<Entry>> {
    serde_json::from_slice::<Vec<Entry>>(bytes).map_err(|source| {
        error!(
            "event=entries_load module=repo status=error error_code=parse_failed line={} column={}",
            source.line(),
            source.column()
        );
        RepoError::LoadParse {
            path: origin.to_path_buf(),
            source,
        }
    })
}

fn encode_document(entries: &[Entry]) -> RepoResult<String> {
    serde_json::to_string_pretty(entries).map_err(RepoError::Encode)
}

/// Writes `bytes` to a sibling temp file, syncs it, then renames it over
/// `path` so readers never observe a partial document.
fn write_atomically(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{decode_document, write_atomically, RepoError};
    use std::path::Path;

    #[test]
    fn decode_accepts_extra_fields_and_compact_formatting() {
        let doc = br#"[{"name":"A","description":"d","website":"https://a","stars":5}]"#;
        let entries = decode_document(doc, Path::new("x.json")).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name(), "A");
    }

    #[test]
    fn decode_rejects_missing_and_non_string_fields() {
        for doc in [
            r#"[{"name":"A","description":"d"}]"#,
            r#"[{"name":"A","description":"d","website":7}]"#,
            r#"{"name":"A","description":"d","website":"https://a"}"#,
            "",
            "null",
        ] {
            let err = decode_document(doc.as_bytes(), Path::new("x.json")).unwrap_err();
            assert!(
                matches!(err, RepoError::LoadParse { .. }),
                "unexpected error for {doc:?}: {err}"
            );
        }
    }

    #[test]
    fn decode_assigns_distinct_ids() {
        let doc = br#"[
            {"name":"A","description":"d","website":"https://a"},
            {"name":"B","description":"d","website":"https://b"}
        ]"#;
        let entries = decode_document(doc, Path::new("x.json")).unwrap();
        assert_ne!(entries[0].id(), entries[1].id());
        assert!(!entries[0].id().is_nil());
    }

    #[test]
    fn write_atomically_creates_parent_and_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("entries.json");

        write_atomically(&path, b"first").unwrap();
        write_atomically(&path, b"second").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        let leftovers = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
