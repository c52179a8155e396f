//! Tally group layout and transition classification
//!
//! This module decides how a count is bucketed into groups of marks and
//! whether a count change crosses a group boundary. The layout is always
//! recomputed from scratch: changing the group size must re-bucket every
//! existing mark, so there is no incremental per-mark state to maintain.

use std::time::Duration;

/// How long a single group's enter or exit animation runs
pub const GROUP_ANIMATION_DURATION: Duration = Duration::from_millis(360);
/// Extra delay applied per group when several groups animate together
pub const GROUP_ANIMATION_STAGGER: Duration = Duration::from_millis(40);

/// A count change classified in terms of whole tally groups
///
/// Indices are 0-based group positions: index 0 is the first group ever
/// shown, increasing with each subsequent group. The renderer uses the
/// boundary index to decide which group elements enter or exit and in
/// what stagger order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupTransition {
    /// One or more groups appeared; `first_new_group` is the index of the
    /// first group that did not exist before the change
    Add { first_new_group: usize },
    /// One or more groups disappeared; `first_removed_group` is the index
    /// of the first group that no longer exists after the change
    Remove { first_removed_group: usize },
}

impl GroupTransition {
    /// Returns true for a transition that removes groups
    pub fn is_removal(&self) -> bool {
        matches!(self, GroupTransition::Remove { .. })
    }
}

/// Number of groups needed to hold `count` marks
///
/// `tallies_per_group` must be positive; the settings layer guarantees
/// this for every value it hands out.
pub fn group_count(count: u32, tallies_per_group: u32) -> usize {
    debug_assert!(tallies_per_group > 0);
    count.div_ceil(tallies_per_group) as usize
}

/// Classifies a count change in terms of whole tally groups
///
/// # Arguments
/// * `previous_count` - Count before the change
/// * `new_count` - Count after the change
/// * `tallies_per_group` - Marks per group (positive)
///
/// # Returns
/// None when no group boundary was crossed, otherwise the add or remove
/// transition with its 0-based boundary index
///
/// # Example
/// ```rust
/// use tally_counter::domain::grouping::{classify_transition, GroupTransition};
///
/// // 5 -> 6 with groups of five starts a second group
/// assert_eq!(
///     classify_transition(5, 6, 5),
///     Some(GroupTransition::Add { first_new_group: 1 })
/// );
/// // 4 -> 5 just fills the first group
/// assert_eq!(classify_transition(4, 5, 5), None);
/// ```
pub fn classify_transition(
    previous_count: u32,
    new_count: u32,
    tallies_per_group: u32,
) -> Option<GroupTransition> {
    let previous_groups = group_count(previous_count, tallies_per_group);
    let new_groups = group_count(new_count, tallies_per_group);

    if new_groups == previous_groups {
        return None;
    }

    if new_groups > previous_groups {
        return Some(GroupTransition::Add {
            first_new_group: previous_groups,
        });
    }

    Some(GroupTransition::Remove {
        first_removed_group: new_groups,
    })
}

/// Iterator over the sizes of each tally group for a given count
///
/// Yields `tallies_per_group` for every full group and the remainder
/// for the final partial group. Restartable and finite; cloning gives
/// an independent pass over the same layout.
#[derive(Debug, Clone)]
pub struct GroupSizes {
    remaining: u32,
    tallies_per_group: u32,
}

impl Iterator for GroupSizes {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.remaining == 0 {
            return None;
        }

        let size = self.remaining.min(self.tallies_per_group);
        self.remaining -= size;
        Some(size)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = group_count(self.remaining, self.tallies_per_group);
        (len, Some(len))
    }
}

impl ExactSizeIterator for GroupSizes {}

/// Builds the group layout for a count
///
/// # Arguments
/// * `count` - Total marks to lay out
/// * `tallies_per_group` - Marks per group (positive)
///
/// # Returns
/// An iterator producing `ceil(count / tallies_per_group)` group sizes
/// summing to `count`; empty for a count of zero
///
/// # Example
/// ```rust
/// use tally_counter::domain::grouping::build_groups;
///
/// let sizes: Vec<u32> = build_groups(7, 3).collect();
/// assert_eq!(sizes, vec![3, 3, 1]);
/// assert_eq!(build_groups(0, 5).count(), 0);
/// ```
pub fn build_groups(count: u32, tallies_per_group: u32) -> GroupSizes {
    debug_assert!(tallies_per_group > 0);
    GroupSizes {
        remaining: count,
        tallies_per_group,
    }
}

/// Stagger delay for a group entering at `group_index`
///
/// The first entering group starts immediately; each later one waits
/// one more stagger step.
pub fn enter_delay(group_index: usize, first_new_group: usize) -> Duration {
    let offset = group_index.saturating_sub(first_new_group) as u32;
    GROUP_ANIMATION_STAGGER * offset
}

/// Stagger delay for the `exit_position`-th group leaving (0-based)
pub fn exit_delay(exit_position: usize) -> Duration {
    GROUP_ANIMATION_STAGGER * exit_position as u32
}

/// Total time until every exiting group has finished animating
///
/// This is the delay after which a deferred count commit may run: the
/// base animation duration plus one stagger step per additional group.
pub fn removal_commit_delay(removed_groups: usize) -> Duration {
    let extra = removed_groups.saturating_sub(1) as u32;
    GROUP_ANIMATION_DURATION + GROUP_ANIMATION_STAGGER * extra
}
