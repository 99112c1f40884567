extern crate alloc;

use alloc::alloc::{alloc, dealloc, Layout};

use core::{
    fmt::Debug,
    ops::{Index, IndexMut},
    ptr::{self, NonNull},
};

use crate::{Error, Key};

/// A forward reference in one lane. `None` marks the end of that lane.
pub(crate) type Link = Option<NonNull<Node>>;

/// The forward references of a node, one per lane it takes part in, sized exactly to the
/// node's height at allocation time.
pub(crate) struct Levels {
    pub(crate) pointers: Box<[Link]>,
}

impl Levels {
    fn try_new(height: usize) -> Result<Self, Error> {
        let mut pointers = Vec::new();

        pointers
            .try_reserve_exact(height)
            .map_err(|_| Error::OutOfMemory { height })?;
        pointers.resize(height, None);

        Ok(Levels {
            pointers: pointers.into_boxed_slice(),
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.pointers.len()
    }
}

impl Index<usize> for Levels {
    type Output = Link;

    fn index(&self, index: usize) -> &Self::Output {
        &self.pointers[index]
    }
}

impl IndexMut<usize> for Levels {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.pointers[index]
    }
}

impl Debug for Levels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(
                self.pointers
                    .iter()
                    .map(|link| link.map(|next| unsafe { next.as_ref().key })),
            )
            .finish()
    }
}

/// A key and its tower of forward references.
///
/// Nodes are reachable from exactly one lane-0 predecessor, which owns them. The links
/// in lanes above 0 only borrow, and are never used to free a node.
pub(crate) struct Node {
    pub(crate) key: Key,
    pub(crate) levels: Levels,
}

impl Node {
    /// Allocates a node with every lane empty. Both the lane array and the node itself
    /// are allocated fallibly, so running out of memory is reported instead of aborting.
    pub(crate) fn alloc(key: Key, height: usize) -> Result<NonNull<Self>, Error> {
        let levels = Levels::try_new(height)?;

        let layout = Layout::new::<Self>();

        // `levels` is dropped on the error path, so nothing leaks.
        let ptr = NonNull::new(unsafe { alloc(layout) }.cast::<Self>())
            .ok_or(Error::OutOfMemory { height })?;

        unsafe { ptr::write(ptr.as_ptr(), Node { key, levels }) };

        Ok(ptr)
    }

    /// # Safety
    /// `ptr` must come from [`Node::alloc`], must not be reachable through any lane of a
    /// list anymore, and must not be used afterwards.
    pub(crate) unsafe fn dealloc(ptr: NonNull<Self>) {
        ptr::drop_in_place(ptr.as_ptr());

        dealloc(ptr.as_ptr().cast(), Layout::new::<Self>());
    }

    pub(crate) fn height(&self) -> usize {
        self.levels.len()
    }
}

impl Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("key", &self.key)
            .field("height", &self.height())
            .field("levels", &self.levels)
            .finish()
    }
}

#[cfg(test)]
mod node_test {
    use super::*;

    #[test]
    fn test_new_node() {
        let node = Node::alloc(100, 5).unwrap();

        unsafe {
            assert_eq!(node.as_ref().key, 100);
            assert_eq!(node.as_ref().height(), 5);
            assert!(node.as_ref().levels.pointers.iter().all(Option::is_none));

            Node::dealloc(node);
        }
    }

    #[test]
    fn test_levels_are_exact() {
        for height in 1..=crate::MAX_HEIGHT {
            let node = Node::alloc(-1, height).unwrap();

            unsafe {
                assert_eq!(node.as_ref().levels.len(), height);
                Node::dealloc(node);
            }
        }
    }

    #[test]
    fn test_oversized_levels_fail() {
        assert_eq!(
            Node::alloc(7, usize::MAX).unwrap_err(),
            Error::OutOfMemory { height: usize::MAX }
        );
    }

    #[test]
    fn test_debug_shows_successors() {
        let first = Node::alloc(1, 2).unwrap();
        let second = Node::alloc(2, 1).unwrap();

        unsafe {
            let levels = &mut (*first.as_ptr()).levels;
            levels[0] = Some(second);

            assert_eq!(
                format!("{:?}", first.as_ref()),
                "Node { key: 1, height: 2, levels: [Some(2), None] }"
            );

            Node::dealloc(first);
            Node::dealloc(second);
        }
    }
}
