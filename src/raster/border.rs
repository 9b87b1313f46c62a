use crate::foundation::core::{Lanes, Point, Vec2};
use crate::raster::surface::Surface;
use crate::sample::driver::SampleSource;

/// How texel fetches outside the surface are resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeMode {
    /// Repeat the nearest edge texel.
    Clamp,
    /// Reflect across the edge, repeating the edge texel (`abc|cba|abc`).
    Mirror,
    /// Tile the surface.
    Wrap,
    /// Everything outside is fully transparent black.
    #[default]
    Transparent,
}

impl EdgeMode {
    /// Map a possibly out-of-range texel index into `[0, len)`, or `None` for transparent fill.
    pub fn resolve(self, i: i64, len: u32) -> Option<u32> {
        if len == 0 {
            return None;
        }
        let len = i64::from(len);
        let idx = match self {
            EdgeMode::Clamp => i.clamp(0, len - 1),
            EdgeMode::Wrap => i.rem_euclid(len),
            EdgeMode::Mirror => {
                let m = i.rem_euclid(2 * len);
                if m < len { m } else { 2 * len - 1 - m }
            }
            EdgeMode::Transparent => {
                if !(0..len).contains(&i) {
                    return None;
                }
                i
            }
        };
        Some(idx as u32)
    }
}

/// A read-only [`Surface`] view with a border policy and bilinear reconstruction.
///
/// Texel `(x, y)` is centred at `(x + 0.5, y + 0.5)`.
#[derive(Clone, Copy, Debug)]
pub struct BorderedSurface<'a> {
    surface: &'a Surface,
    edge: EdgeMode,
}

impl<'a> BorderedSurface<'a> {
    /// Wrap `surface` with the given border policy.
    pub fn new(surface: &'a Surface, edge: EdgeMode) -> Self {
        Self { surface, edge }
    }

    /// Border policy in effect.
    pub fn edge_mode(&self) -> EdgeMode {
        self.edge
    }

    /// Fetch a single texel, applying the border policy.
    pub fn texel(&self, x: i64, y: i64) -> Lanes {
        match (
            self.edge.resolve(x, self.surface.width()),
            self.edge.resolve(y, self.surface.height()),
        ) {
            (Some(x), Some(y)) => self.surface.pixel(x, y),
            _ => [0.0; 4],
        }
    }

    /// Bilinearly reconstruct the image at continuous position `p`.
    pub fn bilinear(&self, p: Point) -> Lanes {
        let sx = p.x - 0.5;
        let sy = p.y - 0.5;
        let x0 = sx.floor();
        let y0 = sy.floor();
        let fx = (sx - x0) as f32;
        let fy = (sy - y0) as f32;
        let (x0, y0) = (x0 as i64, y0 as i64);

        // Texel centres are hit exactly by integer offsets; skip the blend so the fetched value
        // is returned bit-for-bit.
        if fx == 0.0 && fy == 0.0 {
            return self.texel(x0, y0);
        }

        let t00 = self.texel(x0, y0);
        let t10 = self.texel(x0 + 1, y0);
        let t01 = self.texel(x0, y0 + 1);
        let t11 = self.texel(x0 + 1, y0 + 1);

        let mut out = [0.0; 4];
        for c in 0..4 {
            let top = t00[c] + (t10[c] - t00[c]) * fx;
            let bottom = t01[c] + (t11[c] - t01[c]) * fx;
            out[c] = top + (bottom - top) * fy;
        }
        out
    }
}

impl SampleSource for BorderedSurface<'_> {
    fn sample(&self, position: Point, offset: Vec2) -> Lanes {
        self.bilinear(position + offset)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/border.rs"]
mod tests;
