//! A payload tagged with the timestamp it was written at.

use lwwes_types::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An immutable payload/timestamp pair.
///
/// Elements are the unit stored by [`Set`](crate::Set): the timestamp decides
/// which of two writes of the same payload survives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Element<T> {
    timestamp: Timestamp,
    data: T,
}

impl<T> Element<T> {
    /// Creates an element.
    #[must_use]
    pub fn new(data: T, timestamp: impl Into<Timestamp>) -> Self {
        Self {
            timestamp: timestamp.into(),
            data,
        }
    }

    /// Returns the payload.
    #[must_use]
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Returns the write timestamp.
    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Consumes the element, returning its payload.
    #[must_use]
    pub fn into_data(self) -> T {
        self.data
    }
}

impl<T: fmt::Display> fmt::Display for Element<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Data:{} Timestamp:{}", self.data, self.timestamp)
    }
}
