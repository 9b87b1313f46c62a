//! Lane-level primitives shared by the estimator kernels.
//!
//! Conditional updates are expressed as bit-mask selection rather than arithmetic blending:
//! `0.0 * NaN` is NaN, so zeroing a rejected value by multiplication would leak a NaN from an
//! unselected operand into the result. A masked select returns the chosen operand's bits exactly.

#[inline]
fn mask(cond: bool) -> u32 {
    u32::from(cond).wrapping_neg()
}

/// Return `a` when `cond` holds, else `b`, bit-exactly.
#[inline]
pub(crate) fn select_f32(cond: bool, a: f32, b: f32) -> f32 {
    let m = mask(cond);
    f32::from_bits((m & a.to_bits()) | (!m & b.to_bits()))
}

/// Integer counterpart of [`select_f32`].
#[inline]
pub(crate) fn select_i32(cond: bool, a: i32, b: i32) -> i32 {
    let m = mask(cond) as i32;
    (m & a) | (!m & b)
}

/// -1, 0 or +1. NaN maps to 0.
#[inline]
pub(crate) fn sign(d: f32) -> i32 {
    i32::from(d > 0.0) - i32::from(d < 0.0)
}

#[inline]
fn compare_exchange(a: &mut f32, b: &mut f32) {
    let (lo, hi) = (a.min(*b), a.max(*b));
    *a = lo;
    *b = hi;
}

/// Sort five scalars ascending with a fixed exchange network (no data-dependent branches).
pub(crate) fn sort5(v: &mut [f32; 5]) {
    let [a, b, c, d, e] = v;

    // largest into e
    compare_exchange(a, e);
    compare_exchange(b, e);
    compare_exchange(c, e);
    compare_exchange(d, e);

    compare_exchange(a, d);
    compare_exchange(b, d);
    compare_exchange(c, d);

    compare_exchange(a, c);
    compare_exchange(b, c);

    compare_exchange(a, b);
}

#[cfg(test)]
#[path = "../../tests/unit/quantile/lanes.rs"]
mod tests;
