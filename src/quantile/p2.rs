//! Streaming P² quantile estimation over four lockstep lanes.
//!
//! The estimator tracks five markers per lane: the two extremes, the target percentile `p`, and
//! the `p/2` and `(1+p)/2` quantiles bracketing it. Every lane executes the same sequence of
//! operations; data-dependent decisions are applied through masked selection (see
//! [`crate::quantile::lanes`]) so lanes never diverge in control flow.
//!
//! Marker ranks are zero-based: after `count` samples the top marker sits at rank `count - 1`.

use crate::foundation::core::{LANES, LaneRanks, Lanes};
use crate::foundation::error::{SketchError, SketchResult};
use crate::quantile::lanes::{select_f32, select_i32, sign, sort5};

/// Number of samples needed before an estimate exists.
pub const MIN_SAMPLES: usize = 5;

/// Neighbor height used by the linear fallback when a marker moves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinearNeighbor {
    /// Interpolate toward the adjacent marker in the direction of travel (Jain & Chlamtac).
    #[default]
    Textbook,
    /// Interpolate toward the marker's own height, which leaves it in place when the parabolic
    /// prediction is rejected. Cheaper, and close to `Textbook` on continuous data.
    ///
    /// This is the rule the GPU "Median Approximation" effect ships with; select it for output
    /// parity with that effect.
    Center,
}

/// Control constants shared by every lane of an estimator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct P2Params {
    p: f32,
    p_div2: f32,
    p_plus1_div2: f32,
    ascending: bool,
    neighbor: LinearNeighbor,
}

impl P2Params {
    /// Build parameters for target percentile `p` in `[0, 1]`.
    pub fn new(p: f32) -> SketchResult<Self> {
        if !p.is_finite() || !(0.0..=1.0).contains(&p) {
            return Err(SketchError::validation(format!(
                "percentile must be within [0, 1], got {p}"
            )));
        }
        Ok(Self {
            p,
            p_div2: p / 2.0,
            p_plus1_div2: (p + 1.0) / 2.0,
            ascending: p >= 0.5,
            neighbor: LinearNeighbor::default(),
        })
    }

    /// Median parameters.
    pub fn median() -> Self {
        Self {
            p: 0.5,
            p_div2: 0.25,
            p_plus1_div2: 0.75,
            ascending: true,
            neighbor: LinearNeighbor::default(),
        }
    }

    /// Replace the linear-fallback neighbor rule.
    pub fn with_linear_neighbor(mut self, neighbor: LinearNeighbor) -> Self {
        self.neighbor = neighbor;
        self
    }

    /// Target percentile.
    pub fn p(&self) -> f32 {
        self.p
    }

    /// Linear-fallback neighbor rule in effect.
    pub fn linear_neighbor(&self) -> LinearNeighbor {
        self.neighbor
    }
}

/// Per-lane P² state for a single neighborhood evaluation.
///
/// There is no empty state: an estimator only exists once it has seen its first five samples,
/// so [`P2Estimator::estimate`] is always defined.
#[derive(Clone, Debug)]
pub struct P2Estimator {
    params: P2Params,
    count: u32,
    /// Marker ranks.
    n: [LaneRanks; 5],
    /// Desired marker ranks.
    ns: [Lanes; 5],
    /// Marker heights.
    q: [Lanes; 5],
}

/// Marker `i` and its two neighbors, for one lane.
#[derive(Clone, Copy, Debug)]
struct MarkerWindow {
    n: [i32; 3],
    q: [f32; 3],
    desired: f32,
}

impl P2Estimator {
    /// Seed the markers from the first five samples.
    ///
    /// Each lane's five values are sorted among themselves; lanes are never reordered relative
    /// to each other.
    pub fn from_first_five(params: P2Params, first: [Lanes; MIN_SAMPLES]) -> Self {
        let p = params.p;
        let ranks = [
            0,
            (2.0 * p).round_ties_even() as i32,
            (4.0 * p).round_ties_even() as i32,
            (2.0 + 2.0 * p).round_ties_even() as i32,
            4,
        ];

        let mut q = [[0.0; LANES]; 5];
        for lane in 0..LANES {
            let mut sorted = first.map(|x| x[lane]);
            sort5(&mut sorted);
            for (k, &rank) in ranks.iter().enumerate() {
                q[k][lane] = sorted[rank as usize];
            }
        }

        Self {
            params,
            count: MIN_SAMPLES as u32,
            n: ranks.map(|r| [r; LANES]),
            ns: [0.0, 2.0 * p, 4.0 * p, 2.0 + 2.0 * p, 4.0].map(|d| [d; LANES]),
            q,
        }
    }

    /// Feed one more sample per lane.
    pub fn ingest(&mut self, x: Lanes) {
        for (lane, &x) in x.iter().enumerate() {
            let below = self.q.map(|q| x < q[lane]);
            let above_all = !below.iter().any(|&b| b);

            let inc1 = below[0] | below[1];
            let inc2 = inc1 | below[2];
            let inc3 = inc2 | below[3];

            self.q[0][lane] = select_f32(below[0], x, self.q[0][lane]);
            self.n[1][lane] += i32::from(inc1);
            self.n[2][lane] += i32::from(inc2);
            self.n[3][lane] += i32::from(inc3);
            self.n[4][lane] += 1;
            self.q[4][lane] = select_f32(above_all, x, self.q[4][lane]);
        }

        let count = self.count as f32;
        self.ns[1] = [count * self.params.p_div2; LANES];
        self.ns[2] = [count * self.params.p; LANES];
        self.ns[3] = [count * self.params.p_plus1_div2; LANES];
        self.ns[4] = [count; LANES];

        // Each adjustment reads neighbors that the previous one may have moved.
        if self.params.ascending {
            self.adjust(1);
            self.adjust(2);
            self.adjust(3);
        } else {
            self.adjust(3);
            self.adjust(2);
            self.adjust(1);
        }

        self.count += 1;
    }

    /// Current estimate of the target percentile.
    pub fn estimate(&self) -> Lanes {
        self.q[2]
    }

    /// Samples seen so far (at least five).
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Marker ranks, indexed `[marker][lane]`.
    pub fn positions(&self) -> [LaneRanks; 5] {
        self.n
    }

    /// Desired marker ranks, indexed `[marker][lane]`.
    pub fn desired_positions(&self) -> [Lanes; 5] {
        self.ns
    }

    /// Marker heights, indexed `[marker][lane]`.
    pub fn heights(&self) -> [Lanes; 5] {
        self.q
    }

    /// Target parameters.
    pub fn params(&self) -> &P2Params {
        &self.params
    }

    fn adjust(&mut self, i: usize) {
        for lane in 0..LANES {
            let window = MarkerWindow {
                n: [self.n[i - 1][lane], self.n[i][lane], self.n[i + 1][lane]],
                q: [self.q[i - 1][lane], self.q[i][lane], self.q[i + 1][lane]],
                desired: self.ns[i][lane],
            };
            let (q, n) = adjust_marker(self.params.neighbor, window);
            self.q[i][lane] = q;
            self.n[i][lane] = n;
        }
    }
}

/// Move the middle marker of `w` one rank toward its desired rank when that keeps it strictly
/// between its neighbors. Returns the new `(height, rank)`.
fn adjust_marker(neighbor: LinearNeighbor, w: MarkerWindow) -> (f32, i32) {
    let [n_prev, n_i, n_next] = w.n;
    let [q_prev, q_i, q_next] = w.q;

    let d = w.desired - n_i as f32;
    let ds = sign(d);

    let fire = ((d >= 1.0) & (n_next - n_i > 1)) | ((d <= -1.0) & (n_prev - n_i < -1));

    let q_toward = match neighbor {
        LinearNeighbor::Textbook => select_f32(ds < 0, q_prev, select_f32(ds == 0, q_i, q_next)),
        LinearNeighbor::Center => q_i,
    };
    let n_toward = select_i32(ds == 0, n_i, select_i32(ds > 0, n_next, n_prev));

    // Both candidates are evaluated unconditionally; a lane that does not fire may produce
    // inf/NaN here, which the masked selects below discard.
    let linear = q_i + ds as f32 * (q_toward - q_i) / (n_toward - n_i) as f32;
    let parabolic = parabolic(ds, w);

    let inside = (q_prev < parabolic) & (parabolic < q_next);
    let candidate = select_f32(inside, parabolic, linear);
    let q = select_f32(fire, candidate, q_i);
    let n = n_i + i32::from(fire) * ds;
    (q, n)
}

fn parabolic(ds: i32, w: MarkerWindow) -> f32 {
    let [n_prev, n_i, n_next] = w.n;
    let [q_prev, q_i, q_next] = w.q;

    let upper = (n_i - n_prev + ds) as f32 * (q_next - q_i) / (n_next - n_i) as f32;
    let lower = (n_next - n_i - ds) as f32 * (q_i - q_prev) / (n_i - n_prev) as f32;
    q_i + ds as f32 / (n_next - n_prev) as f32 * (upper + lower)
}

#[cfg(test)]
#[path = "../../tests/unit/quantile/p2.rs"]
mod tests;
