//! A skip list of integer keys.
//!
//! The purpose of this crate is to provide an ordered set of `i64` keys with expected
//! logarithmic search, insertion and removal, without any tree rebalancing. Nodes are
//! threaded onto several lanes, where lane 0 holds every key in order and each higher
//! lane holds a random subset of the lane below it.
//!
//! The list is single threaded. Lanes grow by at most one per insertion, and the height
//! of every new node is drawn from an injectable [`GeneratesHeight`] implementation.
#![warn(
    // missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]
mod error;
pub mod height;
mod internal;
pub mod skiplist;

pub use error::Error;
pub use height::{GeneratesHeight, Geometric, XorShift, MAX_HEIGHT};
pub use skiplist::{Entry, SkipList};

/// The key type stored in a [`SkipList`].
pub type Key = i64;
