use crate::ensemble::offsets::{MAX_RADIUS, OffsetPattern};
use crate::foundation::core::{Lanes, Point, Rect, add_assign, scale};
use crate::foundation::error::{SketchError, SketchResult};
use crate::quantile::p2::P2Params;
use crate::raster::surface::Surface;
use crate::render::pipeline::{RenderStats, RenderThreading, render_pixels};
use crate::sample::driver::{SampleDriver, SampleSource};

/// Parameters of an ensemble of randomized disk estimators.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnsembleConfig {
    /// Disk radius in pixels, in `(0, MAX_RADIUS]`.
    pub radius: f32,
    /// Fraction of the disk area actually sampled, in `(0, 1]`.
    pub sample_count_percent: f32,
    /// Number of independent runs averaged per pixel, `>= 1`.
    pub iterations: u32,
    /// Base seed; iteration `i` uses `seed + i` (wrapping).
    pub seed: u32,
    /// Cyclic shift applied to every pattern's ingestion order.
    pub rotation_offset: u32,
}

/// `K` independent [`SampleDriver`] runs over distinct disk patterns, averaged per pixel.
///
/// Patterns are generated once per iteration and shared by all pixels.
#[derive(Clone, Debug)]
pub struct EnsembleSampler {
    params: P2Params,
    patterns: Vec<OffsetPattern>,
}

impl EnsembleSampler {
    /// Generate the `iterations` patterns for `config`.
    pub fn new(config: &EnsembleConfig, params: P2Params) -> SketchResult<Self> {
        if !(config.radius > 0.0 && config.radius <= MAX_RADIUS) {
            return Err(SketchError::validation(format!(
                "ensemble radius must be within (0, {MAX_RADIUS}], got {}",
                config.radius
            )));
        }
        if !(config.sample_count_percent > 0.0 && config.sample_count_percent <= 1.0) {
            return Err(SketchError::validation(format!(
                "sample_count_percent must be within (0, 1], got {}",
                config.sample_count_percent
            )));
        }
        if config.iterations == 0 {
            return Err(SketchError::validation("iterations must be >= 1"));
        }

        let patterns: Vec<OffsetPattern> = (0..config.iterations)
            .map(|i| {
                OffsetPattern::generate(
                    config.radius,
                    config.sample_count_percent,
                    config.seed.wrapping_add(i),
                    config.rotation_offset,
                )
            })
            .collect();

        for pattern in &patterns {
            SampleDriver::new(pattern.offsets(), params)?;
            tracing::debug!(
                seed = pattern.seed(),
                max = pattern.counts().max,
                kept = pattern.counts().kept,
                bounds = ?pattern.bounds(),
                "generated disk pattern"
            );
        }

        Ok(Self { params, patterns })
    }

    /// One pattern per iteration, in iteration order.
    pub fn patterns(&self) -> &[OffsetPattern] {
        &self.patterns
    }

    /// Estimator parameters shared by every iteration.
    pub fn params(&self) -> &P2Params {
        &self.params
    }

    /// Number of averaged runs.
    pub fn iterations(&self) -> usize {
        self.patterns.len()
    }

    /// Union of all pattern footprints.
    pub fn footprint(&self) -> Rect {
        self.patterns
            .iter()
            .map(OffsetPattern::bounds)
            .fold(Rect::ZERO, |acc, b| acc.union(b))
    }

    /// Driver for iteration `i`.
    pub fn driver(&self, i: usize) -> Option<SampleDriver<'_>> {
        self.patterns.get(i).map(|p| self.pattern_driver(p))
    }

    /// Averaged estimate around `position`.
    pub fn evaluate<S: SampleSource + ?Sized>(&self, source: &S, position: Point) -> Lanes {
        // `new` guarantees at least one pattern.
        let (first, rest) = match self.patterns.split_first() {
            Some(split) => split,
            None => unreachable!("ensemble sampler without patterns"),
        };
        let mut acc = self.pattern_driver(first).evaluate(source, position);
        if rest.is_empty() {
            return acc;
        }
        for pattern in rest {
            add_assign(&mut acc, self.pattern_driver(pattern).evaluate(source, position));
        }
        scale(acc, (1.0 / self.patterns.len() as f64) as f32)
    }

    /// Filter a `width x height` image read through `source`.
    #[tracing::instrument(skip(self, source), fields(iterations = self.patterns.len()))]
    pub fn render<S: SampleSource + ?Sized>(
        &self,
        source: &S,
        width: u32,
        height: u32,
        threading: &RenderThreading,
    ) -> SketchResult<(Surface, RenderStats)> {
        let out = render_pixels(width, height, threading, |p| self.evaluate(source, p))?;
        let stats = RenderStats {
            pixels: out.pixels().len() as u64,
            iterations: self.patterns.len() as u32,
            samples_per_pixel: self.patterns.iter().map(|p| p.len() as u64).sum(),
            passthrough: false,
            footprint: Some(self.footprint()),
        };
        Ok((out, stats))
    }

    fn pattern_driver<'a>(&'a self, pattern: &'a OffsetPattern) -> SampleDriver<'a> {
        // Every pattern was checked against the minimum length in `new`.
        SampleDriver::new_unchecked(pattern.offsets(), self.params)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/ensemble/sampler.rs"]
mod tests;
