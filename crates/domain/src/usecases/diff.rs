//! Change detection between two snapshots

use std::collections::HashSet;

use crate::model::{DiffRecord, Entry};

/// Compute the entries added to and removed from `previous` to reach `current`
///
/// Additions come first in `current` order, then removals in `previous` order.
/// Membership is presence-only: an entry listed on both sides is never reported,
/// whatever its multiplicity.
pub fn diff(previous: &[Entry], current: &[Entry]) -> Vec<DiffRecord> {
    let previous_set: HashSet<&Entry> = previous.iter().collect();
    let current_set: HashSet<&Entry> = current.iter().collect();

    let added = current
        .iter()
        .filter(|entry| !previous_set.contains(entry))
        .map(|entry| DiffRecord::added(entry.clone()));

    let removed = previous
        .iter()
        .filter(|entry| !current_set.contains(entry))
        .map(|entry| DiffRecord::removed(entry.clone()));

    added.chain(removed).collect()
}
