use catalog_core::{Entry, EntryRepository, MemoryEntryRepository, RepoError, RepoResult};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

/// Memory repository whose saves can be switched to fail with an I/O error.
#[derive(Debug, Default)]
pub struct FlakyRepository {
    inner: MemoryEntryRepository,
    fail_saves: AtomicBool,
}

impl FlakyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn document(&self) -> Option<String> {
        self.inner.document()
    }
}

impl EntryRepository for FlakyRepository {
    fn load(&self) -> RepoResult<Vec<Entry>> {
        self.inner.load()
    }

    fn save(&self, entries: &[Entry]) -> RepoResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(RepoError::Io {
                path: PathBuf::from("flaky.json"),
                source: io::Error::new(io::ErrorKind::Other, "disk full"),
            });
        }
        self.inner.save(entries)
    }
}
