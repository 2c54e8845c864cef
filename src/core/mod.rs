//! Core deterministic primitives.
//!
//! Integer grid vectors, a seeded PRNG and state hashing. Nothing in here
//! knows about tiles or turns.

pub mod vec2;
pub mod rng;
pub mod hash;

// Re-export core types
pub use vec2::GridVec;
pub use rng::{DeterministicRng, RandomSource};
pub use hash::{compute_state_hash, StateHash, StateHasher};
