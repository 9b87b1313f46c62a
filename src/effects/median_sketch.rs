//! The full approximate percentile filter.
//!
//! `input -> border -> K randomized P² passes -> average`, or a plain copy when the radius is 0.

use crate::effects::settings::{MedianSketchSettings, ResolvedSettings};
use crate::ensemble::offsets::OffsetPattern;
use crate::ensemble::sampler::{EnsembleConfig, EnsembleSampler};
use crate::foundation::error::SketchResult;
use crate::quantile::p2::P2Params;
use crate::raster::border::BorderedSurface;
use crate::raster::surface::Surface;
use crate::render::pipeline::{RenderStats, RenderThreading};

/// A configured approximate percentile filter.
#[derive(Clone, Debug)]
pub struct MedianSketch {
    settings: ResolvedSettings,
    sampler: Option<EnsembleSampler>,
}

impl MedianSketch {
    /// Clamp `settings` and pre-generate the sample patterns.
    pub fn new(settings: &MedianSketchSettings) -> SketchResult<Self> {
        let settings = settings.clamped()?;
        if settings.radius == 0.0 {
            return Ok(Self {
                settings,
                sampler: None,
            });
        }

        let params = P2Params::new(settings.percentile)?
            .with_linear_neighbor(settings.linear_neighbor);
        let config = EnsembleConfig {
            radius: settings.radius,
            sample_count_percent: settings.sample_count_percent,
            iterations: settings.iterations,
            seed: settings.random_seed,
            rotation_offset: settings.random_offset,
        };
        let sampler = EnsembleSampler::new(&config, params)?;
        Ok(Self {
            settings,
            sampler: Some(sampler),
        })
    }

    /// Effective (clamped) settings.
    pub fn settings(&self) -> &ResolvedSettings {
        &self.settings
    }

    /// `true` when [`MedianSketch::apply`] copies its input.
    pub fn is_passthrough(&self) -> bool {
        self.sampler.is_none()
    }

    /// Sample patterns, one per iteration; empty for pass-through.
    pub fn patterns(&self) -> &[OffsetPattern] {
        match &self.sampler {
            Some(sampler) => sampler.patterns(),
            None => &[],
        }
    }

    /// Filter `input`.
    #[tracing::instrument(skip(self, input), fields(width = input.width(), height = input.height()))]
    pub fn apply(
        &self,
        input: &Surface,
        threading: &RenderThreading,
    ) -> SketchResult<(Surface, RenderStats)> {
        let Some(sampler) = &self.sampler else {
            tracing::debug!("radius is 0; passing input through");
            return Ok((input.clone(), RenderStats::passthrough(input)));
        };

        let source = BorderedSurface::new(input, self.settings.edge_mode);
        let (out, stats) = sampler.render(&source, input.width(), input.height(), threading)?;
        tracing::info!(
            pixels = stats.pixels,
            iterations = stats.iterations,
            samples_per_pixel = stats.samples_per_pixel,
            "median sketch applied"
        );
        Ok((out, stats))
    }
}

/// One-shot convenience: build a [`MedianSketch`] from `settings` and apply it serially.
pub fn median_sketch(input: &Surface, settings: &MedianSketchSettings) -> SketchResult<Surface> {
    MedianSketch::new(settings)?
        .apply(input, &RenderThreading::default())
        .map(|(out, _)| out)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/median_sketch.rs"]
mod tests;
