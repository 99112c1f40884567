use core::ptr::NonNull;

mod node;

pub(crate) use node::{Link, Node};

pub(crate) use crate::height::MAX_HEIGHT as HEIGHT;

pub(crate) struct ListState {
    pub(crate) len: usize,
    /// Number of lanes in use, never below 1.
    pub(crate) level: usize,
}

impl ListState {
    pub(crate) fn new() -> Self {
        ListState { len: 0, level: 1 }
    }
}

/// The search path for a key: the last node strictly before it in every lane, and the
/// first lane-0 node whose key is not less than it.
///
/// Lanes at or above the list's level keep the head as their predecessor.
pub(crate) struct SearchResult {
    pub(crate) prev: [NonNull<Node>; HEIGHT],
    pub(crate) target: Link,
}
