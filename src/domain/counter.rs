//! Core domain types for individual tally counters
//!
//! This module defines the counter value type and its arithmetic.
//! Counts are unsigned and clamped at zero; all overflow and underflow
//! is absorbed here so callers never see a negative or wrapped count.

use serde::Serialize;

/// A single tally counter
///
/// Identified by a positive id that is unique within the owning state
/// and never reused. The count only changes through clamped arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Counter {
    /// Positive identifier, unique within the counter collection
    pub id: u32,
    /// Display name, never blank
    pub name: String,
    /// Current tally count, never negative
    pub count: u32,
}

impl Counter {
    /// Creates a fresh counter with the default name for its id
    ///
    /// # Example
    /// ```rust
    /// use tally_counter::domain::counter::Counter;
    ///
    /// let counter = Counter::new(2);
    /// assert_eq!(counter.name, "Counter 2");
    /// assert_eq!(counter.count, 0);
    /// ```
    pub fn new(id: u32) -> Self {
        Self {
            id,
            name: format!("Counter {}", id),
            count: 0,
        }
    }

    /// Creates a counter with an explicit name and count
    ///
    /// Used by the persistence layer after per-field repair.
    pub fn with_parts(id: u32, name: String, count: u32) -> Self {
        Self { id, name, count }
    }

    /// Computes the count after applying a signed delta, clamped at zero
    ///
    /// # Arguments
    /// * `delta` - Signed amount to add (negative subtracts)
    ///
    /// # Returns
    /// The clamped result; equals the current count when the delta
    /// cannot change it (zero delta, or subtracting at zero)
    pub fn adjusted_count(&self, delta: i64) -> u32 {
        let raw = i64::from(self.count) + delta;
        raw.clamp(0, i64::from(u32::MAX)) as u32
    }
}

/// Result of previewing a count mutation before it is committed
///
/// The pair is handed to the grouping engine so the caller can decide
/// whether the commit happens immediately or after an exit animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountAdjustment {
    /// Count before the mutation
    pub previous: u32,
    /// Clamped count after the mutation
    pub updated: u32,
}

impl CountAdjustment {
    /// Returns true if the mutation would not change the count
    pub fn is_noop(&self) -> bool {
        self.previous == self.updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_counter_has_default_name_and_zero_count() {
        let counter = Counter::new(3);
        assert_eq!(counter.id, 3);
        assert_eq!(counter.name, "Counter 3");
        assert_eq!(counter.count, 0);
    }

    #[test]
    fn adjusted_count_adds_and_subtracts() {
        let mut counter = Counter::new(1);
        counter.count = 5;

        assert_eq!(counter.adjusted_count(3), 8);
        assert_eq!(counter.adjusted_count(-4), 1);
    }

    #[test]
    fn adjusted_count_clamps_at_zero() {
        let mut counter = Counter::new(1);
        counter.count = 2;

        // Subtracting past zero stops at zero
        assert_eq!(counter.adjusted_count(-10), 0);

        counter.count = 0;
        assert_eq!(counter.adjusted_count(-1), 0);
    }

    #[test]
    fn adjustment_noop_detection() {
        let unchanged = CountAdjustment {
            previous: 0,
            updated: 0,
        };
        let changed = CountAdjustment {
            previous: 0,
            updated: 1,
        };

        assert!(unchanged.is_noop());
        assert!(!changed.is_noop());
    }
}
