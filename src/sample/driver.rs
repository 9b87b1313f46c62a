use crate::foundation::core::{Lanes, Point, Vec2};
use crate::foundation::error::{SketchError, SketchResult};
use crate::quantile::p2::{MIN_SAMPLES, P2Estimator, P2Params};

/// Read access to the image being filtered.
///
/// Implementations own border handling and reconstruction; they must tolerate concurrent reads
/// at arbitrary offsets.
pub trait SampleSource: Sync {
    /// Sample the image at `position + offset`.
    fn sample(&self, position: Point, offset: Vec2) -> Lanes;
}

impl<T: SampleSource + ?Sized> SampleSource for &T {
    fn sample(&self, position: Point, offset: Vec2) -> Lanes {
        (**self).sample(position, offset)
    }
}

/// Drives one [`P2Estimator`] per pixel over a fixed, ordered list of offsets.
///
/// The estimate depends on offset order, not only on the multiset of sampled values.
#[derive(Clone, Copy, Debug)]
pub struct SampleDriver<'a> {
    offsets: &'a [Vec2],
    params: P2Params,
}

impl<'a> SampleDriver<'a> {
    /// Fails when fewer than five offsets are given; callers fall back to pass-through instead.
    pub fn new(offsets: &'a [Vec2], params: P2Params) -> SketchResult<Self> {
        if offsets.len() < MIN_SAMPLES {
            return Err(SketchError::validation(format!(
                "sample driver needs at least {MIN_SAMPLES} offsets, got {}",
                offsets.len()
            )));
        }
        Ok(Self::new_unchecked(offsets, params))
    }

    /// Build a driver from offsets already known to hold at least five entries.
    pub(crate) fn new_unchecked(offsets: &'a [Vec2], params: P2Params) -> Self {
        debug_assert!(offsets.len() >= MIN_SAMPLES);
        Self { offsets, params }
    }

    /// Offsets in ingestion order.
    pub fn offsets(&self) -> &'a [Vec2] {
        self.offsets
    }

    /// Estimator parameters.
    pub fn params(&self) -> &P2Params {
        &self.params
    }

    /// Estimate the target percentile of the neighborhood around `position`.
    pub fn evaluate<S: SampleSource + ?Sized>(&self, source: &S, position: Point) -> Lanes {
        let (head, tail) = self.offsets.split_at(MIN_SAMPLES);
        let first = std::array::from_fn(|i| source.sample(position, head[i]));
        let mut estimator = P2Estimator::from_first_five(self.params, first);
        for &offset in tail {
            estimator.ingest(source.sample(position, offset));
        }
        estimator.estimate()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sample/driver.rs"]
mod tests;
