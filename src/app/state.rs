//! Canonical application state and deferred-commit phases
//!
//! Defines the counter collection with its active-counter bookkeeping and
//! the small state machine that gates mutations while a group-removal
//! animation is still playing out. Transient UI concerns live with the
//! caller; only state that survives a reload is part of [`AppState`].

use crate::config::settings::Settings;
use crate::domain::counter::{CountAdjustment, Counter};
use serde::Serialize;
use std::time::{Duration, Instant};

/// Maximum number of counters that can exist at once
pub const MAX_COUNTERS: usize = 3;

/// The full persistable application state
///
/// Invariants, upheld by every operation here and by the persistence
/// repair pass:
/// - between 1 and [`MAX_COUNTERS`] counters, ids positive and unique
/// - `active_counter_id` always names a present counter
/// - `next_counter_id` exceeds every id ever assigned, so ids are never
///   reused
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    /// Counters in insertion order, which is also display order
    pub counters: Vec<Counter>,
    /// Id of the counter shown and edited in the main section
    pub active_counter_id: u32,
    /// Next id to hand out; strictly monotonic
    pub next_counter_id: u32,
    pub settings: Settings,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            counters: vec![Counter::new(1)],
            active_counter_id: 1,
            next_counter_id: 2,
            settings: Settings::default(),
        }
    }
}

impl AppState {
    /// Rebuilds a state from parts already validated by the caller
    ///
    /// Only the persistence repair pass uses this; everything else goes
    /// through the mutation operations below.
    pub(crate) fn from_parts(
        counters: Vec<Counter>,
        active_counter_id: u32,
        next_counter_id: u32,
        settings: Settings,
    ) -> Self {
        debug_assert!(!counters.is_empty() && counters.len() <= MAX_COUNTERS);
        Self {
            counters,
            active_counter_id,
            next_counter_id,
            settings,
        }
    }

    /// Looks up a counter by id
    pub fn counter(&self, id: u32) -> Option<&Counter> {
        self.counters.iter().find(|counter| counter.id == id)
    }

    /// Returns true if a counter with the given id exists
    pub fn has_counter(&self, id: u32) -> bool {
        self.counters.iter().any(|counter| counter.id == id)
    }

    /// The counter currently pinned as active
    ///
    /// The invariants guarantee this resolves; the Option shields callers
    /// against states built outside this module.
    pub fn active_counter(&self) -> Option<&Counter> {
        self.counter(self.active_counter_id)
    }

    fn active_counter_mut(&mut self) -> Option<&mut Counter> {
        let id = self.active_counter_id;
        self.counters.iter_mut().find(|counter| counter.id == id)
    }

    /// Returns true when no further counter can be created
    pub fn at_capacity(&self) -> bool {
        self.counters.len() >= MAX_COUNTERS
    }

    /// Previews a clamped mutation of the active counter's count
    ///
    /// # Arguments
    /// * `delta` - Signed amount to apply (negative subtracts)
    ///
    /// # Returns
    /// The before/after pair, or None when no active counter resolves.
    /// Nothing is committed: the caller classifies the group transition
    /// with the pair and then either commits immediately or defers the
    /// commit until the removal animation has finished.
    pub fn preview_active_adjustment(&self, delta: i64) -> Option<CountAdjustment> {
        let active = self.active_counter()?;
        Some(CountAdjustment {
            previous: active.count,
            updated: active.adjusted_count(delta),
        })
    }

    /// Commits a previously previewed count to the active counter
    ///
    /// # Returns
    /// false when no active counter resolves (nothing was written)
    pub fn commit_active_count(&mut self, count: u32) -> bool {
        match self.active_counter_mut() {
            Some(active) => {
                active.count = count;
                true
            }
            None => false,
        }
    }

    /// Creates a new counter and pins it as active
    ///
    /// # Returns
    /// The created counter, or None when the collection is at capacity
    /// (a silent no-op for the caller to surface as a disabled control)
    pub fn create_counter(&mut self) -> Option<&Counter> {
        if self.at_capacity() {
            return None;
        }

        let id = self.next_counter_id;
        self.counters.push(Counter::new(id));
        self.active_counter_id = id;
        self.next_counter_id += 1;
        self.counters.last()
    }

    /// Pins an existing counter as active
    ///
    /// # Returns
    /// false (and no state change) when the id does not exist
    pub fn set_active_counter(&mut self, id: u32) -> bool {
        if !self.has_counter(id) {
            return false;
        }

        self.active_counter_id = id;
        true
    }
}

/// Commit phase for count mutations
///
/// While a group-removal animation plays, the reduced count is already
/// decided but not yet applied, and new mutation requests are rejected
/// outright (never queued). There is no cancellation: the phase only
/// returns to Idle when the pending count is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitPhase {
    /// No deferred commit outstanding; mutations are accepted
    Idle,
    /// A removal animation is running and its commit is scheduled
    PendingRemoval {
        /// The count to apply once the animation finishes
        scheduled_count: u32,
        /// When the caller's animation timer is expected to fire
        deadline: Instant,
    },
}

impl Default for CommitPhase {
    fn default() -> Self {
        Self::Idle
    }
}

impl CommitPhase {
    /// Returns true when mutations are currently accepted
    pub fn is_idle(&self) -> bool {
        matches!(self, CommitPhase::Idle)
    }

    /// Enters the pending phase for a scheduled count
    pub fn begin_removal(scheduled_count: u32, commit_delay: Duration) -> Self {
        CommitPhase::PendingRemoval {
            scheduled_count,
            deadline: Instant::now() + commit_delay,
        }
    }

    /// Time left until the scheduled commit deadline
    ///
    /// # Returns
    /// None when idle; zero once the deadline has passed
    pub fn remaining_delay(&self) -> Option<Duration> {
        match self {
            CommitPhase::Idle => None,
            CommitPhase::PendingRemoval { deadline, .. } => {
                Some(deadline.saturating_duration_since(Instant::now()))
            }
        }
    }

    /// Takes the scheduled count, returning the phase to Idle
    pub fn take_scheduled(&mut self) -> Option<u32> {
        match *self {
            CommitPhase::Idle => None,
            CommitPhase::PendingRemoval {
                scheduled_count, ..
            } => {
                *self = CommitPhase::Idle;
                Some(scheduled_count)
            }
        }
    }
}
