use super::*;

#[test]
fn new_rejects_mismatched_length() {
    assert!(Surface::new(2, 2, vec![[0.0; 4]; 3]).is_err());
    assert!(Surface::new(2, 2, vec![[0.0; 4]; 4]).is_ok());
}

#[test]
fn from_fn_is_row_major() {
    let s = Surface::from_fn(3, 2, |x, y| [x as f32, y as f32, 0.0, 1.0]).unwrap();
    assert_eq!(s.pixel(2, 0), [2.0, 0.0, 0.0, 1.0]);
    assert_eq!(s.pixel(0, 1), [0.0, 1.0, 0.0, 1.0]);
    assert_eq!(s.pixels()[4], [1.0, 1.0, 0.0, 1.0]);
}

#[test]
fn rgba8_conversion_is_lossless_for_bytes() {
    let mut img = image::RgbaImage::new(2, 1);
    img.put_pixel(0, 0, image::Rgba([0, 64, 128, 255]));
    img.put_pixel(1, 0, image::Rgba([1, 2, 254, 10]));
    let s = Surface::from_rgba8(&img);
    assert_eq!(s.pixel(0, 0)[3], 1.0);
    assert_eq!(s.to_rgba8(), img);
}

#[test]
fn quantize_clamps_out_of_range_values() {
    let s = Surface::new(1, 1, vec![[-0.5, 1.5, f32::NAN, 0.5]]).unwrap();
    assert_eq!(s.to_rgba8().get_pixel(0, 0).0, [0, 255, 0, 128]);
}

#[test]
fn rgba32f_roundtrip_preserves_values() {
    let s = Surface::from_fn(2, 2, |x, y| [x as f32 * 0.25, y as f32 * 0.125, 0.3, 1.0]).unwrap();
    let back = Surface::from_dynamic(&image::DynamicImage::ImageRgba32F(s.to_rgba32f()));
    assert_eq!(back, s);
}
