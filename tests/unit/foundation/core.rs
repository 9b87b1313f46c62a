use super::*;

#[test]
fn splat_fills_every_lane() {
    assert_eq!(splat(0.25), [0.25, 0.25, 0.25, 0.25]);
}

#[test]
fn accumulate_then_scale() {
    let mut acc = splat(0.0);
    add_assign(&mut acc, [1.0, 2.0, 3.0, 4.0]);
    add_assign(&mut acc, [3.0, 2.0, 1.0, 0.0]);
    assert_eq!(scale(acc, 0.5), [2.0, 2.0, 2.0, 2.0]);
}

#[test]
fn pixel_center_is_offset_by_half() {
    assert_eq!(pixel_center(0, 3), Point::new(0.5, 3.5));
}
