use rayon::prelude::*;

use crate::foundation::core::{Lanes, Point, Rect, pixel_center};
use crate::foundation::error::{SketchError, SketchResult};
use crate::raster::surface::Surface;

#[derive(Clone, Debug, Default)]
/// Threading controls for per-pixel rendering.
pub struct RenderThreading {
    /// Render rows on a rayon pool when `true`.
    pub parallel: bool,
    /// Optional explicit worker thread count (parallel mode only).
    pub threads: Option<usize>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
/// Counters describing one filter application.
pub struct RenderStats {
    /// Output pixels produced.
    pub pixels: u64,
    /// Independent estimator runs averaged per pixel.
    pub iterations: u32,
    /// Source samples read per pixel, summed over iterations.
    pub samples_per_pixel: u64,
    /// `true` when the input was copied without filtering.
    pub passthrough: bool,
    /// Union of the sampling footprints relative to the pixel centre.
    pub footprint: Option<Rect>,
}

impl RenderStats {
    /// Stats for an unfiltered copy of `surface`.
    pub fn passthrough(surface: &Surface) -> Self {
        Self {
            pixels: surface.pixels().len() as u64,
            passthrough: true,
            ..Self::default()
        }
    }
}

/// Produce a `width x height` surface by shading every pixel centre independently.
///
/// Parallel and serial modes produce identical output.
#[tracing::instrument(skip(shade))]
pub fn render_pixels<F>(
    width: u32,
    height: u32,
    threading: &RenderThreading,
    shade: F,
) -> SketchResult<Surface>
where
    F: Fn(Point) -> Lanes + Sync,
{
    let mut out = Surface::filled(width, height, [0.0; 4])?;
    if out.is_empty() {
        return Ok(out);
    }

    let row_len = width as usize;
    let shade_row = |y: usize, row: &mut [Lanes]| {
        for (x, px) in row.iter_mut().enumerate() {
            *px = shade(pixel_center(x as u32, y as u32));
        }
    };

    if threading.parallel {
        let pool = build_thread_pool(threading.threads)?;
        pool.install(|| {
            out.pixels_mut()
                .par_chunks_mut(row_len)
                .enumerate()
                .for_each(|(y, row)| shade_row(y, row));
        });
    } else {
        for (y, row) in out.pixels_mut().chunks_mut(row_len).enumerate() {
            shade_row(y, row);
        }
    }
    Ok(out)
}

fn build_thread_pool(threads: Option<usize>) -> SketchResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(SketchError::validation(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| SketchError::evaluation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
