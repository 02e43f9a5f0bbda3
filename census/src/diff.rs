use std::collections::BTreeSet;

use crate::geoid::TractId;

/// Partition of two identifier sets.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diff {
    pub only_in_a: BTreeSet<TractId>,
    pub only_in_b: BTreeSet<TractId>,
    pub in_both: BTreeSet<TractId>,
}

impl Diff {
    /// Neither side has anything the other lacks.
    pub fn is_clean(&self) -> bool {
        self.only_in_a.is_empty() && self.only_in_b.is_empty()
    }
}

/// Compares two identifier sets. Ids are normalized already, so a bare and a
/// prefixed GEOID for the same tract land in `in_both`.
pub fn diff(a: &BTreeSet<TractId>, b: &BTreeSet<TractId>) -> Diff {
    Diff {
        only_in_a: a.difference(b).cloned().collect(),
        only_in_b: b.difference(a).cloned().collect(),
        in_both: a.intersection(b).cloned().collect(),
    }
}
