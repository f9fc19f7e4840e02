//! Last-Writer-Wins Element Set (LWW-Element-Set).
//!
//! A two-phase CRDT set: every add goes into an add list, every accepted
//! remove goes into a remove list, and membership is derived from both at read
//! time. A payload is a member when its add entry is at least as recent as
//! its remove entry (ties favor the add).
//!
//! Removes are only accepted for payloads this replica has already seen added
//! at or before the removal timestamp. Anything else is dropped silently: in a
//! replicated setting a speculative or out-of-order remove is expected, not an
//! error.
//!
//! Each public operation holds the set's mutex for its whole duration, so
//! read-modify-write sequences are atomic with respect to other callers.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use lwwes_types::Timestamp;
use tracing::{debug, trace};

use crate::element::Element;
use crate::set::{Equivalence, PartialEquivalence, Set};

/// The add and remove lists guarded by the set's lock.
#[derive(Clone)]
struct Lists<T, Q> {
    added: Set<T, Q>,
    removed: Set<T, Q>,
}

impl<T, Q: Equivalence<T>> Lists<T, Q> {
    /// Returns the add entry for `data` if it is currently a member.
    fn member(&self, data: &T) -> Option<&Element<T>> {
        let added = self.added.find(data)?;
        match self.removed.find(data) {
            Some(removed) if removed.timestamp() > added.timestamp() => None,
            _ => Some(added),
        }
    }
}

/// A thread-safe Last-Writer-Wins Element Set.
///
/// Share it between threads with `Arc`; all operations take `&self`.
pub struct ElementSet<T, Q = PartialEquivalence> {
    lists: Mutex<Lists<T, Q>>,
}

impl<T> ElementSet<T> {
    /// Creates an empty set comparing payloads with [`PartialEq`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_equivalence(PartialEquivalence)
    }
}

impl<T, Q: Default> Default for ElementSet<T, Q> {
    fn default() -> Self {
        Self::from_sets(Set::default(), Set::default())
    }
}

impl<T, Q> ElementSet<T, Q> {
    /// Creates an empty set using the given equivalence.
    #[must_use]
    pub fn with_equivalence(equivalence: Q) -> Self
    where
        Q: Clone,
    {
        Self::from_sets(
            Set::with_equivalence(equivalence.clone()),
            Set::with_equivalence(equivalence),
        )
    }

    /// Creates a set from predefined add and remove lists.
    #[must_use]
    pub fn from_sets(added: Set<T, Q>, removed: Set<T, Q>) -> Self {
        Self {
            lists: Mutex::new(Lists { added, removed }),
        }
    }

    /// Every critical section leaves both lists valid, so a poisoned lock
    /// still guards consistent state.
    fn lists(&self) -> MutexGuard<'_, Lists<T, Q>> {
        self.lists.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T, Q: Equivalence<T>> ElementSet<T, Q> {
    /// Records an add of `data` at `timestamp`.
    ///
    /// Returns true if the add list changed.
    pub fn add_data(&self, data: T, timestamp: impl Into<Timestamp>) -> bool {
        self.lists().added.add(Element::new(data, timestamp))
    }

    /// Records a remove of `data` at `timestamp`.
    ///
    /// The remove is accepted only if `data` is in the add list with an add
    /// timestamp at or before `timestamp`. Returns true if the remove list
    /// changed; a rejected remove leaves the set untouched.
    pub fn remove_data(&self, data: T, timestamp: impl Into<Timestamp>) -> bool {
        let timestamp = timestamp.into();
        let mut lists = self.lists();

        let observed = match lists.added.find(&data) {
            Some(added) if added.timestamp() <= timestamp => true,
            Some(added) => {
                trace!(added = %added.timestamp(), remove = %timestamp, "remove predates add");
                false
            }
            None => {
                trace!(remove = %timestamp, "remove of unknown element");
                false
            }
        };

        observed && lists.removed.add(Element::new(data, timestamp))
    }

    /// Returns true if `data` is currently a member.
    #[must_use]
    pub fn contains(&self, data: &T) -> bool {
        self.lists().member(data).is_some()
    }

    /// Returns the total number of add and remove entries, tombstones included.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        let lists = self.lists();
        lists.added.len() + lists.removed.len()
    }
}

impl<T: Clone, Q: Equivalence<T>> ElementSet<T, Q> {
    /// Returns the winning add entry for `data` if it is currently a member.
    #[must_use]
    pub fn lookup(&self, data: &T) -> Option<Element<T>> {
        self.lists().member(data).cloned()
    }

    /// Returns every current member, in add-list order.
    #[must_use]
    pub fn lookup_all(&self) -> Vec<Element<T>> {
        let lists = self.lists();
        lists
            .added
            .iter()
            .filter(|added| {
                lists
                    .removed
                    .find(added.data())
                    .is_none_or(|removed| removed.timestamp() <= added.timestamp())
            })
            .cloned()
            .collect()
    }
}

impl<T: Clone, Q: Clone> ElementSet<T, Q> {
    /// Returns a snapshot of the add list.
    #[must_use]
    pub fn added(&self) -> Set<T, Q> {
        self.lists().added.clone()
    }

    /// Returns a snapshot of the remove list (the tombstones).
    #[must_use]
    pub fn removed(&self) -> Set<T, Q> {
        self.lists().removed.clone()
    }
}

impl<T: Clone, Q: Equivalence<T> + Clone> ElementSet<T, Q> {
    /// Merges another replica's state into this one.
    ///
    /// Both lists are replaced by their union with the other replica's lists.
    /// `other` is snapshotted under its own lock before this set is locked, so
    /// two replicas merging into each other at the same time cannot deadlock,
    /// and merging a set with itself is allowed. `other` is never modified.
    pub fn merge(&self, other: &Self) {
        let incoming = other.lists().clone();

        let mut lists = self.lists();
        let before = lists.added.len() + lists.removed.len();
        lists.added = lists.added.union(&incoming.added);
        lists.removed = lists.removed.union(&incoming.removed);

        debug!(
            before,
            after = lists.added.len() + lists.removed.len(),
            "merged element set"
        );
    }
}

impl<T: Clone, Q: Clone> Clone for ElementSet<T, Q> {
    fn clone(&self) -> Self {
        Self {
            lists: Mutex::new(self.lists().clone()),
        }
    }
}

impl<T: fmt::Debug, Q> fmt::Debug for ElementSet<T, Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lists = self.lists();
        f.debug_struct("ElementSet")
            .field("added", &lists.added)
            .field("removed", &lists.removed)
            .finish()
    }
}
