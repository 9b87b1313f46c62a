//! Randomized disk sample patterns.
//!
//! A pattern is drawn from a generator seeded only by `(seed, iteration)`, so every pixel of one
//! iteration sees the same spatial layout. The generator always produces `max` points and keeps
//! the first `kept`; raising the sample percentage therefore adds points to a pattern without
//! reshuffling the ones already there.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::foundation::core::{Rect, Vec2};
use crate::quantile::p2::MIN_SAMPLES;

/// Largest supported disk radius. Sample counts grow with `r²`; beyond this a single pixel reads
/// thousands of samples per iteration.
pub const MAX_RADIUS: f32 = 50.0;

/// Sizes of a disk pattern: the disk area in samples and the subsampled count actually used.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct SampleCounts {
    /// `max(5, round(π r²))`.
    pub max: usize,
    /// `clamp(round(max * percent), 5, max)`.
    pub kept: usize,
}

impl SampleCounts {
    /// Counts for a disk of `radius` subsampled to `sample_count_percent`.
    ///
    /// `radius` is clamped to `[0, MAX_RADIUS]`; NaN counts as 0.
    pub fn for_disk(radius: f32, sample_count_percent: f32) -> Self {
        let radius = f64::from(clamp_radius(radius));
        let area = std::f64::consts::PI * radius * radius;
        let max = (area.round_ties_even() as usize).max(MIN_SAMPLES);
        let kept = (max as f64 * f64::from(sample_count_percent)).round_ties_even() as usize;
        Self {
            max,
            kept: kept.clamp(MIN_SAMPLES, max),
        }
    }
}

/// Uniform points in the unit disk by rejection from the enclosing square.
pub struct DiskSampler {
    rng: SmallRng,
}

impl DiskSampler {
    /// Deterministic sampler for `seed`.
    pub fn new(seed: u32) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(u64::from(seed)),
        }
    }

    /// Uniform value in `[-1, 1)` on a 2^-29 grid.
    fn next_signed(&mut self) -> f64 {
        let k = self.rng.random_range(0..1u32 << 30);
        f64::from(k) / f64::from(1u32 << 29) - 1.0
    }

    /// Next point with `x² + y² <= 1`.
    pub fn next_unit(&mut self) -> Vec2 {
        loop {
            let v = Vec2::new(self.next_signed(), self.next_signed());
            if v.hypot2() <= 1.0 {
                return v;
            }
        }
    }
}

/// An ordered list of sample offsets inside a disk.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct OffsetPattern {
    seed: u32,
    radius: f32,
    counts: SampleCounts,
    offsets: Vec<Vec2>,
}

impl OffsetPattern {
    /// Draw `counts.max` points, keeping the first `counts.kept` and storing point `s` at slot
    /// `(s + rotation) mod kept`.
    ///
    /// `radius` is clamped to `[0, MAX_RADIUS]` as in [`SampleCounts::for_disk`].
    pub fn generate(radius: f32, sample_count_percent: f32, seed: u32, rotation: u32) -> Self {
        let radius = clamp_radius(radius);
        let counts = SampleCounts::for_disk(radius, sample_count_percent);
        let mut sampler = DiskSampler::new(seed);
        let mut offsets = vec![Vec2::ZERO; counts.kept];
        let r = f64::from(radius);

        for s in 0..counts.max {
            // Discarded draws still advance the generator.
            let unit = sampler.next_unit();
            if s < counts.kept {
                let slot = (s as u64 + u64::from(rotation)) % counts.kept as u64;
                offsets[slot as usize] = unit * r;
            }
        }

        Self {
            seed,
            radius,
            counts,
            offsets,
        }
    }

    /// Offsets in ingestion order.
    pub fn offsets(&self) -> &[Vec2] {
        &self.offsets
    }

    /// Seed the pattern was drawn from.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Disk radius.
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Pattern sizes.
    pub fn counts(&self) -> SampleCounts {
        self.counts
    }

    /// Number of kept offsets.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// `true` when the pattern holds no offsets, which generated patterns never do.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Smallest rectangle containing the origin and every offset.
    pub fn bounds(&self) -> Rect {
        footprint(&self.offsets)
    }
}

fn clamp_radius(radius: f32) -> f32 {
    if radius.is_nan() {
        0.0
    } else {
        radius.clamp(0.0, MAX_RADIUS)
    }
}

/// Smallest rectangle containing the origin and every offset in `offsets`.
pub fn footprint(offsets: &[Vec2]) -> Rect {
    offsets.iter().fold(Rect::ZERO, |r, o| {
        Rect::new(
            r.x0.min(o.x),
            r.y0.min(o.y),
            r.x1.max(o.x),
            r.y1.max(o.y),
        )
    })
}

#[cfg(test)]
#[path = "../../tests/unit/ensemble/offsets.rs"]
mod tests;
