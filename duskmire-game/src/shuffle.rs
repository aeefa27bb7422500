//! Uniform shuffle primitives with injected entropy.
//!
//! Every randomized constructor in the engine routes through these two
//! helpers so tests can pin outcomes with a seeded generator.

use rand::seq::SliceRandom;
use rand::Rng;

/// Uniform in-place permutation.
pub fn shuffle_in_place<T, R: Rng>(items: &mut [T], rng: &mut R) {
    items.shuffle(rng);
}

/// A dense random permutation of `0..n`, used to assign seed ranks.
#[must_use]
pub fn seed_order<R: Rng>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(rng);
    order
}
