pub use kurbo::{Point, Rect, Vec2};

/// Number of independent scalar lanes carried per pixel (R, G, B, A).
pub const LANES: usize = 4;

/// One value per lane. Lanes share control flow but never state.
pub type Lanes = [f32; LANES];

/// Integer counterpart of [`Lanes`], used for marker ranks.
pub type LaneRanks = [i32; LANES];

/// Broadcast `v` to every lane.
pub fn splat(v: f32) -> Lanes {
    [v; LANES]
}

pub(crate) fn add_assign(acc: &mut Lanes, v: Lanes) {
    for (a, x) in acc.iter_mut().zip(v) {
        *a += x;
    }
}

pub(crate) fn scale(v: Lanes, k: f32) -> Lanes {
    v.map(|x| x * k)
}

/// Pixel-centre position of integer pixel coordinates.
pub fn pixel_center(x: u32, y: u32) -> Point {
    Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
