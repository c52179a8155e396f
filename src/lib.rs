//! Tally counter widget core
//!
//! State management for a small tally-counter widget: up to three
//! counters, clamped add/subtract on the active one, grouped-mark layout
//! with enter/exit transition classification, settings normalization,
//! and a best-effort persistence round-trip that repairs whatever it
//! finds in storage. The UI layer lives outside this crate and drives
//! the [`app::store::TallyStore`] one event at a time.

pub mod app;
pub mod config;
pub mod domain;
pub mod storage;

pub use app::state::{AppState, CommitPhase, MAX_COUNTERS};
pub use app::store::{sanitize_bulk_amount, AdjustOutcome, TallyStore};
pub use config::settings::{Language, Settings, Theme};
pub use domain::counter::{CountAdjustment, Counter};
pub use domain::grouping::{build_groups, classify_transition, GroupTransition};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
