//! Approximate local percentile filtering for images.
//!
//! Each output pixel is a streaming P² estimate of a percentile over a randomized sample of its
//! disk neighborhood. The four color channels run as lockstep lanes of one estimator, and several
//! independently seeded runs are averaged to smooth out sampling noise.
//!
//! - [`P2Estimator`] is the four-lane streaming estimator.
//! - [`SampleDriver`] feeds it from a fixed offset list around a pixel.
//! - [`EnsembleSampler`] averages drivers over randomized [`OffsetPattern`]s.
//! - [`MedianSketch`] wires everything to a [`Surface`] with edge handling and parallel rendering.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod effects;
mod ensemble;
mod foundation;
mod quantile;
mod raster;
mod render;
mod sample;

pub use crate::foundation::core::{LANES, LaneRanks, Lanes, Point, Rect, Vec2, pixel_center, splat};
pub use crate::foundation::error::{SketchError, SketchResult};

pub use crate::effects::median_sketch::{MedianSketch, median_sketch};
pub use crate::effects::quantile_filter::QuantileFilter;
pub use crate::effects::settings::{
    MIN_SAMPLE_COUNT_PERCENT, MedianSketchSettings, ResolvedSettings,
};
pub use crate::ensemble::offsets::{
    DiskSampler, MAX_RADIUS, OffsetPattern, SampleCounts, footprint,
};
pub use crate::ensemble::sampler::{EnsembleConfig, EnsembleSampler};
pub use crate::quantile::p2::{LinearNeighbor, MIN_SAMPLES, P2Estimator, P2Params};
pub use crate::raster::border::{BorderedSurface, EdgeMode};
pub use crate::raster::surface::Surface;
pub use crate::render::pipeline::{RenderStats, RenderThreading, render_pixels};
pub use crate::sample::driver::{SampleDriver, SampleSource};
