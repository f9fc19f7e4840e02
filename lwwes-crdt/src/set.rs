//! List of Last-Writer-Wins registers keyed by payload equivalence.
//!
//! A [`Set`] holds at most one [`Element`] per equivalence class of its
//! payloads. Writing a payload that is already present keeps whichever copy
//! carries the later timestamp; on a tie the copy already stored wins, which
//! makes re-adding the same element a no-op.
//!
//! The set is not synchronized. It is meant to be reached through a
//! lock-holding [`ElementSet`](crate::ElementSet).

use std::fmt;

use tracing::trace;

use crate::element::Element;

/// Decides whether two payloads denote the same logical element.
///
/// Implementations must be pure and deterministic, and every replica that
/// will ever merge must use the same one: replicas disagreeing on equivalence
/// silently diverge.
pub trait Equivalence<T> {
    /// Returns true if `a` and `b` are the same logical element.
    fn equivalent(&self, a: &T, b: &T) -> bool;
}

/// Equivalence backed by the payload's own [`PartialEq`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartialEquivalence;

impl<T: PartialEq> Equivalence<T> for PartialEquivalence {
    fn equivalent(&self, a: &T, b: &T) -> bool {
        a == b
    }
}

impl<T, F> Equivalence<T> for F
where
    F: Fn(&T, &T) -> bool,
{
    fn equivalent(&self, a: &T, b: &T) -> bool {
        self(a, b)
    }
}

/// An insertion-ordered list of elements with LWW resolution per payload.
#[derive(Clone)]
pub struct Set<T, Q = PartialEquivalence> {
    elements: Vec<Element<T>>,
    equivalence: Q,
}

impl<T> Set<T> {
    /// Creates an empty set comparing payloads with [`PartialEq`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_equivalence(PartialEquivalence)
    }
}

impl<T, Q: Default> Default for Set<T, Q> {
    fn default() -> Self {
        Self::with_equivalence(Q::default())
    }
}

impl<T, Q> Set<T, Q> {
    /// Creates an empty set using the given equivalence.
    #[must_use]
    pub fn with_equivalence(equivalence: Q) -> Self {
        Self {
            elements: Vec::new(),
            equivalence,
        }
    }

    /// Creates a set directly from a list of elements.
    ///
    /// The list is taken as-is, bypassing [`Set::add`], so it may hold several
    /// elements for the same payload. Lookups on such a set return the last
    /// matching entry in list order, not the one with the highest timestamp.
    #[must_use]
    pub fn from_elements(elements: Vec<Element<T>>, equivalence: Q) -> Self {
        Self {
            elements,
            equivalence,
        }
    }

    /// Returns the stored elements in insertion order.
    #[must_use]
    pub fn elements(&self) -> &[Element<T>] {
        &self.elements
    }

    /// Returns an iterator over the stored elements in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Element<T>> {
        self.elements.iter()
    }

    /// Returns the number of stored elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns true if no element is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns the equivalence used to compare payloads.
    #[must_use]
    pub fn equivalence(&self) -> &Q {
        &self.equivalence
    }
}

impl<T, Q: Equivalence<T>> Set<T, Q> {
    /// Scans from the most recently inserted element backwards.
    fn position(&self, data: &T) -> Option<usize> {
        self.elements
            .iter()
            .rposition(|element| self.equivalence.equivalent(element.data(), data))
    }

    /// Returns the element stored for `data`, if any.
    ///
    /// When several entries match, the one latest in list order is returned.
    #[must_use]
    pub fn find(&self, data: &T) -> Option<&Element<T>> {
        self.position(data).map(|index| &self.elements[index])
    }

    /// Returns true if an element is stored for `data`.
    #[must_use]
    pub fn contains(&self, data: &T) -> bool {
        self.position(data).is_some()
    }

    /// Inserts `element`, resolving against any stored copy by timestamp.
    ///
    /// An element for a new payload is appended. An element for a known
    /// payload replaces the stored copy only if its timestamp is strictly
    /// later. Returns true if the set changed.
    pub fn add(&mut self, element: Element<T>) -> bool {
        match self.position(element.data()) {
            None => {
                self.elements.push(element);
                true
            }
            Some(index) if element.timestamp() > self.elements[index].timestamp() => {
                self.elements[index] = element;
                true
            }
            Some(index) => {
                trace!(
                    incoming = %element.timestamp(),
                    stored = %self.elements[index].timestamp(),
                    "ignoring stale write"
                );
                false
            }
        }
    }
}

impl<T: Clone, Q: Equivalence<T> + Clone> Set<T, Q> {
    /// Returns the union of this set and `other`.
    ///
    /// Every element of `self`, then every element of `other`, is folded into a
    /// fresh set through [`Set::add`]. Because `add` resolves purely by
    /// timestamp, the resolved contents do not depend on argument order.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut union = Self::with_equivalence(self.equivalence.clone());
        for element in self.elements.iter().chain(other.elements.iter()) {
            union.add(element.clone());
        }
        union
    }
}

impl<T: fmt::Debug, Q> fmt::Debug for Set<T, Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Set")
            .field("elements", &self.elements)
            .finish_non_exhaustive()
    }
}

impl<'a, T, Q> IntoIterator for &'a Set<T, Q> {
    type Item = &'a Element<T>;
    type IntoIter = std::slice::Iter<'a, Element<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}
