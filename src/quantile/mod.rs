//! Streaming quantile estimation.

/// Masked per-lane selection and the five-element sorting network.
pub(crate) mod lanes;
/// The four-lane P² estimator.
pub(crate) mod p2;
