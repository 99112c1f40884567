//! Height generation for newly inserted nodes.
//!
//! Every node joins lane 0 and then keeps climbing one more lane for as long as a fair
//! coin keeps landing heads, so `P(height = k)` is roughly `2^-k`, with the tail folded
//! into [`MAX_HEIGHT`].
use rand::{rngs::SmallRng, Rng, SeedableRng};

/// The maximum number of lanes any node, including the head, can take part in.
pub const MAX_HEIGHT: usize = 16;

/// Produces the height of a node about to be inserted.
///
/// Implementations should return a value in `[1, MAX_HEIGHT]`. The list clamps anything
/// outside of that range, so a faulty generator cannot break the lane invariants.
pub trait GeneratesHeight {
    fn gen_height(&mut self) -> usize;
}

impl<G: GeneratesHeight + ?Sized> GeneratesHeight for &mut G {
    fn gen_height(&mut self) -> usize {
        (**self).gen_height()
    }
}

impl<G: GeneratesHeight + ?Sized> GeneratesHeight for Box<G> {
    fn gen_height(&mut self) -> usize {
        (**self).gen_height()
    }
}

/// Flips a fair coin drawn from `R` until it lands tails or [`MAX_HEIGHT`] is reached.
#[derive(Debug, Clone)]
pub struct Geometric<R = SmallRng> {
    rng: R,
}

impl Geometric<SmallRng> {
    /// A generator seeded from the operating system's entropy source.
    pub fn new() -> Self {
        Geometric {
            rng: SmallRng::from_entropy(),
        }
    }

    /// A reproducible generator.
    pub fn seeded(seed: u64) -> Self {
        Geometric {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Default for Geometric<SmallRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> Geometric<R> {
    pub fn with_rng(rng: R) -> Self {
        Geometric { rng }
    }
}

impl<R: Rng> GeneratesHeight for Geometric<R> {
    fn gen_height(&mut self) -> usize {
        let mut height = 1;

        while height < MAX_HEIGHT && self.rng.gen::<bool>() {
            height += 1;
        }

        height
    }
}

/// A dependency free xorshift generator. Each trailing zero bit of the next state counts
/// as one coin landing heads.
#[derive(Debug, Clone)]
pub struct XorShift {
    seed: u64,
}

impl XorShift {
    pub fn new() -> Self {
        Self::seeded(rand::random())
    }

    /// A zero state would never leave zero, so it is nudged to one.
    pub fn seeded(seed: u64) -> Self {
        XorShift { seed: seed.max(1) }
    }
}

impl Default for XorShift {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneratesHeight for XorShift {
    fn gen_height(&mut self) -> usize {
        let seed = &mut self.seed;
        *seed ^= *seed << 13;
        *seed ^= *seed >> 7;
        *seed ^= *seed << 17;

        std::cmp::min(MAX_HEIGHT, seed.trailing_zeros() as usize + 1)
    }
}
