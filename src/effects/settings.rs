use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::ensemble::offsets::MAX_RADIUS;
use crate::foundation::error::{SketchError, SketchResult};
use crate::quantile::p2::LinearNeighbor;
use crate::raster::border::EdgeMode;

/// Smallest accepted sample percentage.
pub const MIN_SAMPLE_COUNT_PERCENT: f32 = 0.0001;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// User-facing filter configuration.
///
/// Values are clamped into their supported ranges by [`MedianSketchSettings::clamped`]; only
/// non-finite numbers are rejected.
pub struct MedianSketchSettings {
    /// Neighborhood disk radius in pixels.
    #[serde(default = "default_radius")]
    pub radius: f32,
    /// Target percentile in `[0, 1]` (0.5 is the median).
    #[serde(default = "default_percentile")]
    pub percentile: f32,
    /// Independent estimator runs averaged per pixel.
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Fraction of the disk area sampled per run.
    #[serde(default = "default_sample_count_percent")]
    pub sample_count_percent: f32,
    /// Border policy for samples falling outside the image.
    #[serde(default)]
    pub edge_mode: EdgeMode,
    /// Base seed for the sample patterns.
    #[serde(default)]
    pub random_seed: u32,
    /// Cyclic shift of each pattern's ingestion order.
    #[serde(default)]
    pub random_offset: u32,
    /// Linear-fallback neighbor rule of the estimator.
    #[serde(default)]
    pub linear_neighbor: LinearNeighbor,
}

fn default_radius() -> f32 {
    15.0
}

fn default_percentile() -> f32 {
    0.5
}

fn default_iterations() -> u32 {
    2
}

fn default_sample_count_percent() -> f32 {
    0.10
}

impl Default for MedianSketchSettings {
    fn default() -> Self {
        Self {
            radius: default_radius(),
            percentile: default_percentile(),
            iterations: default_iterations(),
            sample_count_percent: default_sample_count_percent(),
            edge_mode: EdgeMode::default(),
            random_seed: 0,
            random_offset: 0,
            linear_neighbor: LinearNeighbor::default(),
        }
    }
}

/// Settings after clamping; every field is inside its supported range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedSettings {
    /// Radius in `[0, MAX_RADIUS]`.
    pub radius: f32,
    /// Percentile in `[0, 1]`.
    pub percentile: f32,
    /// At least 1.
    pub iterations: u32,
    /// In `[MIN_SAMPLE_COUNT_PERCENT, 1]`.
    pub sample_count_percent: f32,
    /// Border policy.
    pub edge_mode: EdgeMode,
    /// Base seed.
    pub random_seed: u32,
    /// Pattern rotation.
    pub random_offset: u32,
    /// Linear-fallback neighbor rule.
    pub linear_neighbor: LinearNeighbor,
}

impl MedianSketchSettings {
    /// The "Median Sketch" artistic preset: a wide, sparsely sampled disk with mirrored edges.
    pub fn sketch() -> Self {
        Self {
            radius: 25.0,
            percentile: 0.5,
            iterations: 3,
            sample_count_percent: 0.01,
            edge_mode: EdgeMode::Mirror,
            ..Self::default()
        }
    }

    /// Parse settings from a JSON reader. Missing fields take their defaults.
    pub fn from_reader<R: std::io::Read>(r: R) -> SketchResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| SketchError::serde(format!("parse settings JSON: {e}")))
    }

    /// Parse settings from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> SketchResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            SketchError::validation(format!("open settings JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Clamp every field into its supported range.
    pub fn clamped(&self) -> SketchResult<ResolvedSettings> {
        for (name, v) in [
            ("radius", self.radius),
            ("percentile", self.percentile),
            ("sample_count_percent", self.sample_count_percent),
        ] {
            if !v.is_finite() {
                return Err(SketchError::validation(format!(
                    "settings '{name}' must be finite, got {v}"
                )));
            }
        }

        Ok(ResolvedSettings {
            radius: self.radius.clamp(0.0, MAX_RADIUS),
            percentile: self.percentile.clamp(0.0, 1.0),
            iterations: self.iterations.max(1),
            sample_count_percent: self
                .sample_count_percent
                .clamp(MIN_SAMPLE_COUNT_PERCENT, 1.0),
            edge_mode: self.edge_mode,
            random_seed: self.random_seed,
            random_offset: self.random_offset,
            linear_neighbor: self.linear_neighbor,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/settings.rs"]
mod tests;
