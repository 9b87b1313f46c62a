//! User-facing filters.

pub(crate) mod median_sketch;
pub(crate) mod quantile_filter;
pub(crate) mod settings;
