use core::{
    fmt::{self, Debug, Display},
    marker::PhantomData,
    ptr::NonNull,
};
use std::alloc::{handle_alloc_error, Layout};

use tracing::{debug, instrument, trace, warn};

use crate::{
    height::{GeneratesHeight, Geometric},
    internal::utils::{Link, ListState, Node, SearchResult, HEIGHT},
    Error, Key,
};

/// An ordered set of unique keys, threaded onto up to [`MAX_HEIGHT`](crate::MAX_HEIGHT) lanes.
///
/// Lane 0 owns every node; the links in higher lanes are shortcuts into the same nodes.
/// The number of lanes in use grows by at most one per insertion, no matter how tall the
/// generator wants the new node to be.
pub struct SkipList<G = Geometric> {
    head: NonNull<Node>,
    state: ListState,
    generator: G,
}

// The list exclusively owns its chain, so moving it moves every node with it.
unsafe impl<G: Send> Send for SkipList<G> {}

impl SkipList<Geometric> {
    /// Instantiates a new, empty [SkipList](SkipList) with an entropy seeded generator.
    pub fn new() -> Self {
        Self::with_generator(Geometric::new())
    }
}

impl Default for SkipList<Geometric> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G> SkipList<G> {
    /// Like [`SkipList::with_generator`], but reports a failure to allocate the head.
    pub fn try_with_generator(generator: G) -> Result<Self, Error> {
        Ok(SkipList {
            head: Node::alloc(0, HEIGHT)?,
            state: ListState::new(),
            generator,
        })
    }

    /// Instantiates a new, empty [SkipList](SkipList) drawing node heights from
    /// `generator`.
    pub fn with_generator(generator: G) -> Self {
        match Self::try_with_generator(generator) {
            Ok(list) => list,
            Err(_) => handle_alloc_error(Layout::new::<Node>()),
        }
    }

    /// Gets the number of keys in the [SkipList](SkipList).
    pub fn len(&self) -> usize {
        self.state.len
    }

    pub fn is_empty(&self) -> bool {
        self.state.len < 1
    }

    /// The number of lanes currently in use. This is the height of the tallest node, or 1
    /// for an empty list.
    ///
    /// Lane 0 exists from construction and every insertion opens at most one more lane, so
    /// after `n` insertions the level is at most `min(MAX_HEIGHT, n + 1)`. A single key
    /// drawn tall therefore leaves a list of level 2.
    pub fn level(&self) -> usize {
        self.state.level
    }

    /// The generator drawing the heights of new nodes.
    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Mutable access to the generator, e.g. to reseed it. Nodes already in the list keep
    /// their heights.
    pub fn generator_mut(&mut self) -> &mut G {
        &mut self.generator
    }

    /// Walks every lane from the top, stopping in each one at the last node whose key is
    /// strictly less than `key`. The walk never backs up, so each lane resumes from where
    /// the lane above stopped.
    fn find(&self, key: Key) -> SearchResult {
        let mut prev = [self.head; HEIGHT];
        let mut curr = self.head;

        unsafe {
            for level in (0..self.state.level).rev() {
                while let Some(next) = curr.as_ref().levels[level] {
                    if next.as_ref().key >= key {
                        break;
                    }

                    curr = next;
                }

                prev[level] = curr;
            }

            SearchResult {
                prev,
                target: curr.as_ref().levels[0],
            }
        }
    }

    /// Looks up the node holding `key`.
    #[instrument(level = "trace", skip(self))]
    pub fn get(&self, key: Key) -> Option<Entry<'_>> {
        match self.find(key).target {
            Some(node) if unsafe { node.as_ref().key } == key => Some(Entry::from_raw(node)),
            _ => None,
        }
    }

    pub fn contains(&self, key: Key) -> bool {
        self.get(key).is_some()
    }

    /// Finds `key` by scanning lane 0 from the front, ignoring every shortcut. Linear in
    /// the length of the list.
    pub fn seq_search(&self, key: Key) -> Option<Entry<'_>> {
        self.iter()
            .take_while(|entry| entry.key() <= key)
            .find(|entry| entry.key() == key)
    }

    /// Removes `key` from the list.
    ///
    /// The node is unlinked from every lane it takes part in before it is freed. If that
    /// empties the topmost lanes, the level drops to the highest lane still holding a node.
    #[instrument(level = "trace", skip(self))]
    pub fn remove(&mut self, key: Key) -> Result<(), Error> {
        let SearchResult { prev, target } = self.find(key);

        let node = match target {
            Some(node) if unsafe { node.as_ref().key } == key => node,
            _ => {
                debug!(key, "key not found");
                return Err(Error::NotFound(key));
            }
        };

        unsafe {
            self.unlink(node, &prev);
            Node::dealloc(node);
        }

        self.state.len -= 1;
        self.shrink();

        Ok(())
    }

    /// Points every predecessor of `node` past it.
    ///
    /// # Safety
    /// `prev` must be the search path for `node`'s key, freshly computed.
    unsafe fn unlink(&mut self, node: NonNull<Node>, prev: &[NonNull<Node>; HEIGHT]) {
        for (level, link) in prev.iter().enumerate().take(self.state.level) {
            // a node missing from one lane is missing from all the lanes above it
            if link.as_ref().levels[level] != Some(node) {
                break;
            }

            let next = node.as_ref().levels[level];

            // `link` precedes `node`, so this is the only live reference into its lanes
            let levels = &mut (*link.as_ptr()).levels;
            levels[level] = next;
        }
    }

    fn shrink(&mut self) {
        let head = unsafe { self.head.as_ref() };
        let before = self.state.level;

        while self.state.level > 1 && head.levels[self.state.level - 1].is_none() {
            self.state.level -= 1;
        }

        if self.state.level < before {
            trace!(from = before, to = self.state.level, "lanes emptied");
        }
    }

    /// The smallest key in the list.
    pub fn first(&self) -> Option<Entry<'_>> {
        let first = unsafe { self.head.as_ref().levels[0] };

        first.map(Entry::from_raw)
    }

    /// The largest key in the list, found by running as far as possible along every lane
    /// from the top down.
    pub fn last(&self) -> Option<Entry<'_>> {
        let mut curr = self.head;

        unsafe {
            for level in (0..self.state.level).rev() {
                while let Some(next) = curr.as_ref().levels[level] {
                    curr = next;
                }
            }
        }

        if curr == self.head {
            None
        } else {
            Some(Entry::from_raw(curr))
        }
    }

    /// Iterates over every key in ascending order.
    pub fn iter(&self) -> Iter<'_> {
        self.lane(0)
    }

    /// Iterates over the nodes of a single lane in ascending order. Lanes at or above
    /// [`level`](SkipList::level) are empty.
    pub fn lane(&self, level: usize) -> Iter<'_> {
        let head = unsafe { self.head.as_ref() };

        Iter {
            next: head.levels.pointers.get(level).copied().flatten(),
            level,
            _lt: PhantomData,
        }
    }

    /// Releases every node and resets the list to its freshly constructed state. Returns
    /// the number of nodes released.
    #[instrument(level = "trace", skip(self))]
    pub fn clear(&mut self) -> usize {
        let released = unsafe { self.release_nodes() };
        self.state = ListState::new();

        trace!(released, "list cleared");
        released
    }

    /// Consumes the list, releasing every node and the head. Returns the number of nodes
    /// released.
    pub fn teardown(mut self) -> usize {
        self.clear()
    }

    /// Frees the lane-0 chain, leaving the head with every lane empty.
    ///
    /// # Safety
    /// No [`Entry`] into this list may be alive.
    unsafe fn release_nodes(&mut self) -> usize {
        let head = &mut *self.head.as_ptr();
        let mut node = head.levels[0];

        head.levels.pointers.iter_mut().for_each(|link| *link = None);

        let mut released = 0;
        while let Some(curr) = node {
            node = curr.as_ref().levels[0];
            Node::dealloc(curr);
            released += 1;
        }

        released
    }

    /// Renders every node with its height and its successor in each of its lanes.
    pub fn dump(&self) -> Dump<'_, G> {
        Dump { list: self }
    }
}

impl<G> SkipList<G>
where
    G: GeneratesHeight,
{
    /// Inserts `key` if it is not present yet.
    ///
    /// Duplicates are rejected before anything is allocated. A drawn height above the
    /// current level opens exactly one new lane, so the node may end up shorter than what
    /// the generator asked for.
    #[instrument(level = "trace", skip(self))]
    pub fn insert(&mut self, key: Key) -> Result<(), Error> {
        let SearchResult { mut prev, target } = self.find(key);

        if let Some(target) = target {
            if unsafe { target.as_ref().key } == key {
                debug!(key, "rejecting duplicate key");
                return Err(Error::DuplicateKey(key));
            }
        }

        let mut height = self.generator.gen_height().clamp(1, HEIGHT);

        let grows = height > self.state.level;
        if grows {
            height = self.state.level + 1;
            prev[height - 1] = self.head;
        }

        let new_node = Node::alloc(key, height).map_err(|err| {
            warn!(key, height, "failed to allocate node");
            err
        })?;

        if grows {
            self.state.level = height;
            trace!(level = height, "lane opened");
        }

        unsafe { Self::link_nodes(new_node, &prev) };

        self.state.len += 1;

        Ok(())
    }

    /// Splices `new_node` in after its predecessor in every one of its lanes. All of the
    /// node's own links are set before any predecessor is repointed at it.
    ///
    /// # Safety
    /// `new_node` must be freshly allocated and unreachable, and `prev` must be the search
    /// path for its key, with the head filled in for any newly opened lane.
    unsafe fn link_nodes(new_node: NonNull<Node>, prev: &[NonNull<Node>; HEIGHT]) {
        let height = new_node.as_ref().height();

        // nothing else can see `new_node` yet, and no predecessor is `new_node`
        let new_levels = &mut (*new_node.as_ptr()).levels;
        for (level, link) in prev.iter().enumerate().take(height) {
            new_levels[level] = link.as_ref().levels[level];
        }

        for (level, link) in prev.iter().enumerate().take(height) {
            let levels = &mut (*link.as_ptr()).levels;
            levels[level] = Some(new_node);
        }
    }
}

impl<G> Drop for SkipList<G> {
    fn drop(&mut self) {
        unsafe {
            self.release_nodes();
            Node::dealloc(self.head);
        }
    }
}

impl<G> Debug for SkipList<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(|entry| entry.key())).finish()
    }
}

impl<G: GeneratesHeight> Extend<Key> for SkipList<G> {
    /// Inserts every key, skipping the ones already present.
    fn extend<T: IntoIterator<Item = Key>>(&mut self, iter: T) {
        for key in iter {
            if let Err(Error::OutOfMemory { .. }) = self.insert(key) {
                handle_alloc_error(Layout::new::<Node>());
            }
        }
    }
}

impl FromIterator<Key> for SkipList<Geometric> {
    fn from_iter<T: IntoIterator<Item = Key>>(iter: T) -> Self {
        let mut list = Self::new();
        list.extend(iter);

        list
    }
}

impl<'a, G> IntoIterator for &'a SkipList<G> {
    type Item = Entry<'a>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A borrowed view of one node in a [SkipList](SkipList).
#[derive(Clone, Copy)]
pub struct Entry<'a> {
    node: NonNull<Node>,
    _lt: PhantomData<&'a Node>,
}

impl<'a> Entry<'a> {
    fn from_raw(node: NonNull<Node>) -> Self {
        Entry {
            node,
            _lt: PhantomData,
        }
    }

    fn node(&self) -> &'a Node {
        unsafe { self.node.as_ref() }
    }

    pub fn key(&self) -> Key {
        self.node().key
    }

    /// The number of lanes this node takes part in.
    pub fn height(&self) -> usize {
        self.node().height()
    }

    /// The next node in lane `level`, if this node takes part in that lane and is not the
    /// last one in it.
    pub fn successor(&self, level: usize) -> Option<Entry<'a>> {
        self.node()
            .levels
            .pointers
            .get(level)
            .copied()
            .flatten()
            .map(Entry::from_raw)
    }
}

impl<'a> Debug for Entry<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("key", &self.key())
            .field("height", &self.height())
            .finish()
    }
}

impl<'a> PartialEq for Entry<'a> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl<'a> Eq for Entry<'a> {}

/// Ascending iterator over one lane of a [SkipList](SkipList), from [`SkipList::lane`].
pub struct Iter<'a> {
    next: Link,
    level: usize,
    _lt: PhantomData<&'a Node>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = Entry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = unsafe { node.as_ref().levels[self.level] };

        Some(Entry::from_raw(node))
    }
}

impl<'a> Debug for Iter<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("level", &self.level)
            .field("next", &self.next.map(Entry::from_raw))
            .finish()
    }
}

/// One line per node: its key, its height in brackets, and the key of its successor in
/// each of its lanes (`-` for the end of a lane).
pub struct Dump<'a, G> {
    list: &'a SkipList<G>,
}

impl<'a, G> Display for Dump<'a, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "level {}, len {}", self.list.level(), self.list.len())?;

        for entry in self.list.iter() {
            write!(f, "{} [{}]", entry.key(), entry.height())?;

            for level in 0..entry.height() {
                match entry.successor(level) {
                    Some(next) => write!(f, " {}", next.key())?,
                    None => write!(f, " -")?,
                }
            }

            writeln!(f)?;
        }

        Ok(())
    }
}
