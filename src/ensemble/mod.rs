//! Randomized disk patterns and the averaged multi-run sampler built on them.

pub(crate) mod offsets;
pub(crate) mod sampler;
