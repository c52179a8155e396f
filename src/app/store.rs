//! Application store and mutation orchestration
//!
//! The store owns the canonical state, the commit-phase gate, and the
//! storage backend, and coordinates every mutation cycle: preview the
//! change, classify the group transition, commit now or after the exit
//! animation, persist. The UI layer drives it one event at a time and
//! renders from the data it returns.

use crate::app::persist::{
    load_state, serialize_state, APP_STATE_KEY, STORAGE_NOTICE_ACK_KEY, STORAGE_NOTICE_ACK_VALUE,
};
use crate::app::state::{AppState, CommitPhase};
use crate::config::settings::{parse_group_size, parse_leading_integer, Language, Theme};
use crate::domain::counter::{CountAdjustment, Counter};
use crate::domain::grouping::{
    classify_transition, group_count, removal_commit_delay, GroupTransition,
};
use crate::storage::KeyValueStorage;
use std::time::Duration;
use tracing::warn;

/// Result of requesting a count mutation on the active counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustOutcome {
    /// A removal commit is still pending; the request was dropped
    Rejected,
    /// The request could not change anything (zero delta, subtracting at
    /// zero, or no resolvable active counter)
    NoChange,
    /// The count was committed and persisted immediately
    Applied {
        adjustment: CountAdjustment,
        /// Present when new groups appeared; never a removal
        transition: Option<GroupTransition>,
    },
    /// Groups must animate out first; the commit is scheduled and the
    /// store rejects further mutations until it runs
    RemovalPending {
        adjustment: CountAdjustment,
        transition: GroupTransition,
        /// How long the caller's timer should wait before invoking
        /// [`TallyStore::commit_pending_removal`]
        commit_delay: Duration,
    },
}

/// Sanitizes a bulk-amount control value to a usable positive amount
///
/// Invalid or non-positive input falls back to 1, so a bulk button press
/// always applies at least a single mark.
pub fn sanitize_bulk_amount(raw: &str) -> u32 {
    match parse_leading_integer(raw) {
        Some(value) if value >= 1 => u32::try_from(value).unwrap_or(u32::MAX),
        _ => 1,
    }
}

/// Owns the application state and coordinates mutations with persistence
///
/// Generic over the storage backend so the widget shell can use the file
/// store while tests and embedders run fully in memory.
pub struct TallyStore<S: KeyValueStorage> {
    state: AppState,
    phase: CommitPhase,
    storage: S,
}

impl<S: KeyValueStorage> TallyStore<S> {
    /// Creates a store, restoring persisted state when possible
    ///
    /// A missing or unrepairable payload silently starts from defaults;
    /// the user never sees a load error.
    pub fn new(storage: S) -> Self {
        let state = load_state(storage.get(APP_STATE_KEY).as_deref()).unwrap_or_default();
        Self {
            state,
            phase: CommitPhase::Idle,
            storage,
        }
    }

    /// Read access to the current state for rendering
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Returns true while a removal commit is pending
    ///
    /// Mutation requests during this window are rejected, not queued.
    pub fn is_transition_in_progress(&self) -> bool {
        !self.phase.is_idle()
    }

    /// Time left before the pending removal commit is due, if any
    pub fn pending_commit_remaining(&self) -> Option<Duration> {
        self.phase.remaining_delay()
    }

    /// Applies a signed delta to the active counter
    ///
    /// # Arguments
    /// * `delta` - Signed amount (bulk deltas included; the UI sanitizes
    ///   bulk input with [`sanitize_bulk_amount`] first)
    ///
    /// # Returns
    /// What happened and, for accepted changes, the data the renderer
    /// needs: the count pair and the group transition. For removals the
    /// state is NOT yet committed: the caller animates the exiting
    /// groups and calls [`Self::commit_pending_removal`] when its timer
    /// fires.
    pub fn adjust_active(&mut self, delta: i64) -> AdjustOutcome {
        if !self.phase.is_idle() {
            return AdjustOutcome::Rejected;
        }

        let Some(adjustment) = self.state.preview_active_adjustment(delta) else {
            return AdjustOutcome::NoChange;
        };
        if adjustment.is_noop() {
            return AdjustOutcome::NoChange;
        }

        let tallies_per_group = self.state.settings.tallies_per_group;
        let transition =
            classify_transition(adjustment.previous, adjustment.updated, tallies_per_group);

        if let Some(removal @ GroupTransition::Remove { .. }) = transition {
            let removed = group_count(adjustment.previous, tallies_per_group)
                - group_count(adjustment.updated, tallies_per_group);
            let commit_delay = removal_commit_delay(removed);
            self.phase = CommitPhase::begin_removal(adjustment.updated, commit_delay);

            return AdjustOutcome::RemovalPending {
                adjustment,
                transition: removal,
                commit_delay,
            };
        }

        self.state.commit_active_count(adjustment.updated);
        self.persist();
        AdjustOutcome::Applied {
            adjustment,
            transition,
        }
    }

    /// Commits the count scheduled by a pending removal
    ///
    /// # Returns
    /// true when a pending count was applied and persisted; false when
    /// nothing was pending
    pub fn commit_pending_removal(&mut self) -> bool {
        match self.phase.take_scheduled() {
            Some(count) => {
                self.state.commit_active_count(count);
                self.persist();
                true
            }
            None => false,
        }
    }

    /// Creates a new counter, pins it active, and persists
    ///
    /// # Returns
    /// The created counter, or None at capacity (the caller disables the
    /// create control in that case)
    pub fn create_counter(&mut self) -> Option<&Counter> {
        let id = self.state.create_counter()?.id;
        self.persist();
        self.state.counter(id)
    }

    /// Pins an existing counter as active and persists
    ///
    /// # Returns
    /// false (no state change, nothing persisted) when the id is unknown
    pub fn set_active(&mut self, id: u32) -> bool {
        if !self.state.set_active_counter(id) {
            return false;
        }
        self.persist();
        true
    }

    /// Switches the theme, persisting on change
    pub fn set_theme(&mut self, theme: Theme) {
        if self.state.settings.theme == theme {
            return;
        }
        self.state.settings.theme = theme;
        self.persist();
    }

    /// Switches the language flag, persisting on change
    pub fn set_language(&mut self, language: Language) {
        if self.state.settings.language == language {
            return;
        }
        self.state.settings.language = language;
        self.persist();
    }

    /// Applies a group-size control value
    ///
    /// The raw value is parsed and clamped; a result equal to the
    /// current setting is a no-op so slider jitter does not trigger
    /// re-renders or writes.
    ///
    /// # Returns
    /// true when the setting changed (the caller re-buckets all marks)
    pub fn update_group_size(&mut self, raw: &str) -> bool {
        let next = parse_group_size(raw);
        if next == self.state.settings.tallies_per_group {
            return false;
        }

        self.state.settings.tallies_per_group = next;
        self.persist();
        true
    }

    /// Returns true once the storage-disclosure notice was dismissed
    pub fn storage_notice_acknowledged(&self) -> bool {
        self.storage
            .get(STORAGE_NOTICE_ACK_KEY)
            .is_some_and(|value| value == STORAGE_NOTICE_ACK_VALUE)
    }

    /// Records that the storage-disclosure notice was dismissed
    pub fn acknowledge_storage_notice(&mut self) {
        if let Err(error) = self
            .storage
            .set(STORAGE_NOTICE_ACK_KEY, STORAGE_NOTICE_ACK_VALUE)
        {
            warn!("failed to record storage notice acknowledgement: {}", error);
        }
    }

    /// Serializes and writes the current state, swallowing failures
    ///
    /// Quota or availability problems must never break the session, so
    /// the in-memory state stays authoritative either way.
    fn persist(&mut self) {
        let Some(payload) = serialize_state(&self.state) else {
            return;
        };
        if let Err(error) = self.storage.set(APP_STATE_KEY, &payload) {
            warn!("failed to persist app state: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, StorageError};

    /// Storage whose writes always fail, for quota/disabled scenarios
    struct BrokenStorage;

    impl KeyValueStorage for BrokenStorage {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".to_owned()))
        }
    }

    fn store() -> TallyStore<MemoryStorage> {
        TallyStore::new(MemoryStorage::new())
    }

    #[test]
    fn fresh_store_starts_from_defaults() {
        let store = store();
        assert_eq!(store.state().counters.len(), 1);
        assert_eq!(store.state().active_counter_id, 1);
        assert!(!store.is_transition_in_progress());
    }

    #[test]
    fn single_increments_fill_the_first_group_quietly() {
        let mut store = store();

        // Five single adds with groups of five never cross a boundary
        // after the very first mark creates group 0
        assert_eq!(
            store.adjust_active(1),
            AdjustOutcome::Applied {
                adjustment: CountAdjustment {
                    previous: 0,
                    updated: 1
                },
                transition: Some(GroupTransition::Add { first_new_group: 0 }),
            }
        );
        for expected in 2..=5 {
            assert_eq!(
                store.adjust_active(1),
                AdjustOutcome::Applied {
                    adjustment: CountAdjustment {
                        previous: expected - 1,
                        updated: expected
                    },
                    transition: None,
                }
            );
        }
        assert_eq!(store.state().active_counter().unwrap().count, 5);

        // The sixth mark starts group index 1
        assert_eq!(
            store.adjust_active(1),
            AdjustOutcome::Applied {
                adjustment: CountAdjustment {
                    previous: 5,
                    updated: 6
                },
                transition: Some(GroupTransition::Add { first_new_group: 1 }),
            }
        );
    }

    #[test]
    fn subtracting_at_zero_is_a_no_change() {
        let mut store = store();
        assert_eq!(store.adjust_active(-5), AdjustOutcome::NoChange);
        assert_eq!(store.adjust_active(0), AdjustOutcome::NoChange);
        assert_eq!(store.state().active_counter().unwrap().count, 0);
    }

    #[test]
    fn removal_defers_the_commit_and_gates_mutations() {
        let mut store = store();
        store.adjust_active(12);
        assert_eq!(store.state().active_counter().unwrap().count, 12);

        // Dropping from 12 to 2 removes groups 1 and 2
        let outcome = store.adjust_active(-10);
        let AdjustOutcome::RemovalPending {
            adjustment,
            transition,
            commit_delay,
        } = outcome
        else {
            panic!("expected a pending removal, got {:?}", outcome);
        };
        assert_eq!(adjustment.previous, 12);
        assert_eq!(adjustment.updated, 2);
        assert_eq!(
            transition,
            GroupTransition::Remove {
                first_removed_group: 1
            }
        );
        assert_eq!(commit_delay, removal_commit_delay(2));

        // The count is untouched until the timer fires, and further
        // mutations are dropped, not queued
        assert_eq!(store.state().active_counter().unwrap().count, 12);
        assert!(store.is_transition_in_progress());
        assert!(store.pending_commit_remaining().is_some());
        assert_eq!(store.adjust_active(1), AdjustOutcome::Rejected);
        assert_eq!(store.adjust_active(-1), AdjustOutcome::Rejected);

        // Timer fires: the scheduled count lands and the gate opens
        assert!(store.commit_pending_removal());
        assert_eq!(store.state().active_counter().unwrap().count, 2);
        assert!(!store.is_transition_in_progress());
        assert!(!store.commit_pending_removal());
    }

    #[test]
    fn removal_within_the_last_group_stays_immediate() {
        let mut store = store();
        store.adjust_active(4);

        // 4 -> 3 stays inside group 0, so no deferral
        assert_eq!(
            store.adjust_active(-1),
            AdjustOutcome::Applied {
                adjustment: CountAdjustment {
                    previous: 4,
                    updated: 3
                },
                transition: None,
            }
        );
    }

    #[test]
    fn bulk_amounts_sanitize_to_at_least_one() {
        assert_eq!(sanitize_bulk_amount("25"), 25);
        assert_eq!(sanitize_bulk_amount(" 7 "), 7);
        assert_eq!(sanitize_bulk_amount("3.9"), 3);
        assert_eq!(sanitize_bulk_amount("0"), 1);
        assert_eq!(sanitize_bulk_amount("-4"), 1);
        assert_eq!(sanitize_bulk_amount("abc"), 1);
        assert_eq!(sanitize_bulk_amount(""), 1);
    }

    #[test]
    fn create_counter_persists_and_respects_capacity() {
        let mut store = store();

        assert_eq!(store.create_counter().unwrap().id, 2);
        assert_eq!(store.create_counter().unwrap().id, 3);
        assert!(store.create_counter().is_none());
        assert_eq!(store.state().counters.len(), 3);

        // A new store over the same backing sees the created counters
        let reloaded = TallyStore::new(std::mem::take(&mut store.storage));
        assert_eq!(reloaded.state().counters.len(), 3);
        assert_eq!(reloaded.state().active_counter_id, 3);
    }

    #[test]
    fn set_active_rejects_unknown_ids() {
        let mut store = store();
        store.create_counter().unwrap();

        assert!(store.set_active(1));
        assert_eq!(store.state().active_counter_id, 1);
        assert!(!store.set_active(42));
        assert_eq!(store.state().active_counter_id, 1);
    }

    #[test]
    fn group_size_updates_ignore_jitter() {
        let mut store = store();

        assert!(store.update_group_size("3"));
        assert_eq!(store.state().settings.tallies_per_group, 3);

        // Same normalized value again is a no-op
        assert!(!store.update_group_size("3"));
        assert!(!store.update_group_size(" 3 "));

        // Out-of-range input clamps before the comparison
        assert!(store.update_group_size("99"));
        assert_eq!(store.state().settings.tallies_per_group, 10);
    }

    #[test]
    fn theme_and_language_persist_on_change() {
        let mut store = store();

        store.set_theme(Theme::Light);
        store.set_language(Language::Es);

        let reloaded = TallyStore::new(std::mem::take(&mut store.storage));
        assert_eq!(reloaded.state().settings.theme, Theme::Light);
        assert_eq!(reloaded.state().settings.language, Language::Es);
    }

    #[test]
    fn broken_storage_never_disturbs_memory_state() {
        let mut store = TallyStore::new(BrokenStorage);

        assert!(matches!(
            store.adjust_active(7),
            AdjustOutcome::Applied { .. }
        ));
        assert_eq!(store.state().active_counter().unwrap().count, 7);

        assert!(store.create_counter().is_some());
        assert!(store.update_group_size("4"));
        store.acknowledge_storage_notice();
        assert!(!store.storage_notice_acknowledged());
    }

    #[test]
    fn storage_notice_flag_round_trips() {
        let mut store = store();
        assert!(!store.storage_notice_acknowledged());

        store.acknowledge_storage_notice();
        assert!(store.storage_notice_acknowledged());

        let reloaded = TallyStore::new(std::mem::take(&mut store.storage));
        assert!(reloaded.storage_notice_acknowledged());
    }

    #[test]
    fn restored_state_survives_a_full_session_cycle() {
        let mut store = store();
        store.adjust_active(9);
        store.create_counter().unwrap();
        store.adjust_active(2);
        store.update_group_size("4");

        let reloaded = TallyStore::new(std::mem::take(&mut store.storage));
        assert_eq!(reloaded.state(), store.state());
    }
}
