//! Random payload contents.

use rand::distributions::{Alphanumeric, DistString};
use rand::Rng;

pub const MIB: usize = 1024 * 1024;

/// A blob of exactly `size_mb` MiB drawn uniformly from the 62-character
/// alphanumeric alphabet. Not cryptographically secure; callers pass their
/// own generator so concurrent workers never contend on one.
pub fn contents<R: Rng>(rng: &mut R, size_mb: usize) -> String {
    Alphanumeric.sample_string(rng, size_mb * MIB)
}
