//! Key→string storage boundary
//!
//! This module encapsulates everything environment-specific about where
//! state lives between sessions and provides a narrow interface to the
//! rest of the application. Reads can only miss, never fail; writes can
//! fail and the caller decides whether that matters (it never does;
//! persistence is best-effort throughout).

pub mod file;
pub mod memory;

use thiserror::Error;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Errors a storage write can surface
///
/// Callers swallow these after logging; a failed write never disturbs
/// the in-memory state.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage write failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Minimal key→string persistence contract
///
/// Models the widget's session storage: opaque string values under
/// namespaced keys. A miss and a read failure are indistinguishable
/// here; both come back as None.
pub trait KeyValueStorage {
    /// Reads the value stored under a key
    fn get(&self, key: &str) -> Option<String>;

    /// Writes a value under a key, replacing any previous value
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}
