//! Grouping intervals by owner.

use std::collections::HashMap;

use crate::interval::Interval;

/// Intervals grouped by owner, in order of each owner's first appearance.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnerPartition<P> {
    groups: Vec<(String, Vec<Interval<P>>)>,
    /// Owner key to position in `groups`.
    slots: HashMap<String, usize>,
}

impl<P> Default for OwnerPartition<P> {
    fn default() -> Self {
        Self {
            groups: Vec::new(),
            slots: HashMap::new(),
        }
    }
}

impl<P> OwnerPartition<P> {
    /// Number of distinct owners.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Owner keys in first-seen order.
    pub fn owners(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(owner, _)| owner.as_str())
    }

    /// The intervals belonging to `owner`, if any.
    pub fn get(&self, owner: &str) -> Option<&[Interval<P>]> {
        self.slots
            .get(owner)
            .map(|&slot| self.groups[slot].1.as_slice())
    }

    /// Iterates `(owner, intervals)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Interval<P>])> {
        self.groups
            .iter()
            .map(|(owner, intervals)| (owner.as_str(), intervals.as_slice()))
    }
}

impl<P> IntoIterator for OwnerPartition<P> {
    type Item = (String, Vec<Interval<P>>);
    type IntoIter = std::vec::IntoIter<(String, Vec<Interval<P>>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

/// Groups intervals by owner key.
///
/// Within a group the input order is preserved. Nothing is sorted or validated.
pub fn partition_by_owner<P>(intervals: impl IntoIterator<Item = Interval<P>>) -> OwnerPartition<P> {
    let mut partition = OwnerPartition::default();

    for interval in intervals {
        let slot = if let Some(&slot) = partition.slots.get(&interval.owner) {
            slot
        } else {
            let slot = partition.groups.len();
            partition.groups.push((interval.owner.clone(), Vec::new()));
            partition.slots.insert(interval.owner.clone(), slot);
            slot
        };
        partition.groups[slot].1.push(interval);
    }

    partition
}
