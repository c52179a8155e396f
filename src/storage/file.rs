//! File-backed storage backend
//!
//! Persists each key as one file beneath a root directory, the closest
//! native analog to per-key browser storage. Read problems of any kind
//! (missing root, permissions, encoding) are reported as misses; write
//! problems surface as [`StorageError`] for the caller to swallow.

use crate::storage::{KeyValueStorage, StorageError};
use directories::ProjectDirs;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// One-file-per-key storage rooted at a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Creates a store rooted at an explicit directory
    ///
    /// The directory is created lazily on the first write, so pointing
    /// at a non-existent path is fine as long as it can be created.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Creates a store in the user's per-application data directory
    ///
    /// # Returns
    /// None when the platform offers no home directory to resolve
    /// against, which callers treat as "storage disabled"
    pub fn in_user_data_dir() -> Option<Self> {
        let dirs = ProjectDirs::from("io", "tally-counter", "tally-counter")?;
        Some(Self::new(dirs.data_dir().to_path_buf()))
    }

    /// The directory this store reads and writes beneath
    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Some(value),
            Err(error) => {
                debug!("storage miss for {}: {}", key, error);
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }
}
