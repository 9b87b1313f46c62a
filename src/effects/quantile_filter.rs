use crate::ensemble::offsets::footprint;
use crate::foundation::core::Vec2;
use crate::foundation::error::SketchResult;
use crate::quantile::p2::{MIN_SAMPLES, P2Params};
use crate::raster::border::{BorderedSurface, EdgeMode};
use crate::raster::surface::Surface;
use crate::render::pipeline::{RenderStats, RenderThreading, render_pixels};
use crate::sample::driver::SampleDriver;

/// Per-pixel percentile over an explicit, ordered list of offsets.
///
/// With fewer than five offsets the estimator is never run and the input is copied unchanged.
#[derive(Clone, Debug)]
pub struct QuantileFilter {
    offsets: Vec<Vec2>,
    params: P2Params,
}

impl QuantileFilter {
    /// Filter sampling `offsets` (in order) around every pixel.
    pub fn new(offsets: Vec<Vec2>, params: P2Params) -> Self {
        Self { offsets, params }
    }

    /// Sampling offsets in ingestion order.
    pub fn offsets(&self) -> &[Vec2] {
        &self.offsets
    }

    /// `true` when [`QuantileFilter::apply`] copies its input.
    pub fn is_passthrough(&self) -> bool {
        self.offsets.len() < MIN_SAMPLES
    }

    /// Apply the filter to `input`, resolving out-of-bounds samples with `edge`.
    #[tracing::instrument(skip(self, input), fields(offsets = self.offsets.len()))]
    pub fn apply(
        &self,
        input: &Surface,
        edge: EdgeMode,
        threading: &RenderThreading,
    ) -> SketchResult<(Surface, RenderStats)> {
        if self.is_passthrough() {
            tracing::debug!("too few offsets for an estimate; passing input through");
            return Ok((input.clone(), RenderStats::passthrough(input)));
        }

        let driver = SampleDriver::new(&self.offsets, self.params)?;
        let source = BorderedSurface::new(input, edge);
        let out = render_pixels(input.width(), input.height(), threading, |p| {
            driver.evaluate(&source, p)
        })?;
        let stats = RenderStats {
            pixels: out.pixels().len() as u64,
            iterations: 1,
            samples_per_pixel: self.offsets.len() as u64,
            passthrough: false,
            footprint: Some(footprint(&self.offsets)),
        };
        Ok((out, stats))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/quantile_filter.rs"]
mod tests;
