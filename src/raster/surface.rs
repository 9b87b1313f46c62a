use std::path::Path;

use crate::foundation::core::{LANES, Lanes};
use crate::foundation::error::{SketchError, SketchResult};

/// Straight-alpha RGBA image with one `f32` per channel, row-major, tightly packed.
#[derive(Clone, Debug, PartialEq)]
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<Lanes>,
}

impl Surface {
    /// Wrap an existing pixel buffer. `data.len()` must equal `width * height`.
    pub fn new(width: u32, height: u32, data: Vec<Lanes>) -> SketchResult<Self> {
        let expected = pixel_count(width, height)?;
        if data.len() != expected {
            return Err(SketchError::validation(format!(
                "surface {width}x{height} expects {expected} pixels, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A surface where every pixel is `value`.
    pub fn filled(width: u32, height: u32, value: Lanes) -> SketchResult<Self> {
        let len = pixel_count(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![value; len],
        })
    }

    /// Build a surface by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(
        width: u32,
        height: u32,
        mut f: impl FnMut(u32, u32) -> Lanes,
    ) -> SketchResult<Self> {
        let mut data = Vec::with_capacity(pixel_count(width, height)?);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `true` when the surface has no pixels.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major pixel buffer.
    pub fn pixels(&self) -> &[Lanes] {
        &self.data
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [Lanes] {
        &mut self.data
    }

    /// Pixel at `(x, y)`. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Lanes {
        self.data[y as usize * self.width as usize + x as usize]
    }

    /// Convert from 8-bit RGBA, mapping `0..=255` to `0.0..=1.0`.
    pub fn from_rgba8(img: &image::RgbaImage) -> Self {
        let data = img
            .pixels()
            .map(|px| px.0.map(|c| f32::from(c) / 255.0))
            .collect();
        Self {
            width: img.width(),
            height: img.height(),
            data,
        }
    }

    /// Convert any decoded image to straight-alpha float RGBA.
    pub fn from_dynamic(img: &image::DynamicImage) -> Self {
        let rgba = img.to_rgba32f();
        let data = rgba.pixels().map(|px| px.0).collect();
        Self {
            width: rgba.width(),
            height: rgba.height(),
            data,
        }
    }

    /// Quantize to 8-bit RGBA, clamping to `[0, 1]` first.
    pub fn to_rgba8(&self) -> image::RgbaImage {
        let mut bytes = Vec::with_capacity(self.data.len() * LANES);
        for px in &self.data {
            for &c in px {
                bytes.push(quantize_u8(c));
            }
        }
        image::RgbaImage::from_raw(self.width, self.height, bytes)
            .unwrap_or_else(|| image::RgbaImage::new(self.width, self.height))
    }

    /// Copy into a 32-bit float RGBA image without quantization.
    pub fn to_rgba32f(&self) -> image::Rgba32FImage {
        let floats = self.data.iter().flatten().copied().collect();
        image::Rgba32FImage::from_raw(self.width, self.height, floats)
            .unwrap_or_else(|| image::Rgba32FImage::new(self.width, self.height))
    }

    /// Decode an image file (format inferred from its contents/extension).
    pub fn open(path: impl AsRef<Path>) -> SketchResult<Self> {
        let path = path.as_ref();
        let img = image::open(path)
            .map_err(|e| SketchError::image(format!("decode '{}': {e}", path.display())))?;
        Ok(Self::from_dynamic(&img))
    }

    /// Encode as 8-bit RGBA PNG.
    pub fn save_png(&self, path: impl AsRef<Path>) -> SketchResult<()> {
        let path = path.as_ref();
        self.to_rgba8()
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(|e| SketchError::image(format!("write png '{}': {e}", path.display())))
    }
}

fn pixel_count(width: u32, height: u32) -> SketchResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| SketchError::validation("surface size overflow"))
}

fn quantize_u8(c: f32) -> u8 {
    // NaN clamps to 0.
    let c = if c.is_nan() { 0.0 } else { c.clamp(0.0, 1.0) };
    (c * 255.0).round() as u8
}

#[cfg(test)]
#[path = "../../tests/unit/raster/surface.rs"]
mod tests;
