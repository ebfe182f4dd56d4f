use std::time::Instant;

use image::{Rgb, RgbImage};
use tracing::{debug, info, warn};

use mandelgrid_core::{Pool, SampleGrid, SamplePoint};

use crate::error::RenderError;
use crate::ramp::Ramp;

/// Map every sample to its pixel slot, rejecting samples outside the image
/// and samples that share a pixel.
fn pixel_slots(grid: &SampleGrid) -> crate::Result<Vec<Option<&SamplePoint>>> {
    let (width, height) = (grid.x_res, grid.y_res);
    let mut slots = vec![None; width as usize * height as usize];
    for point in &grid.points {
        let (x, y) = point.pixel();
        if x >= width || y >= height {
            return Err(RenderError::PixelOutOfBounds { x, y, width, height });
        }
        let slot = &mut slots[y as usize * width as usize + x as usize];
        if slot.is_some() {
            return Err(RenderError::DuplicatePixel { x, y });
        }
        *slot = Some(point);
    }
    Ok(slots)
}

/// Color an evaluated grid.
///
/// Members take `set_color`; escaped points take
/// `ramp[iterations mod ramp.len()]`. Pixels without a sample stay black.
/// Coloring is read-only over the grid and runs on `pool`.
pub fn render_image(
    grid: &SampleGrid,
    ramp: &Ramp,
    set_color: Rgb<u8>,
    pool: &Pool,
) -> crate::Result<RgbImage> {
    let start = Instant::now();
    if !grid.is_evaluated() {
        warn!("rendering a grid that has not been evaluated");
    }

    let slots = pixel_slots(grid)?;
    let missing = slots.iter().filter(|s| s.is_none()).count();
    if missing > 0 {
        warn!(missing, "grid does not cover every pixel");
    }
    debug!(
        width = grid.x_res,
        height = grid.y_res,
        ramp_len = ramp.len(),
        workers = pool.workers(),
        "coloring grid"
    );

    let mut image = RgbImage::new(grid.x_res, grid.y_res);
    pool.for_each(image.pixels_mut().zip(slots), None, |(pixel, point)| {
        if let Some(point) = point {
            *pixel = if point.is_member {
                set_color
            } else {
                ramp.color_for(point.iterations)
            };
        }
    })?;

    info!(
        width = grid.x_res,
        height = grid.y_res,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "image rendered"
    );
    Ok(image)
}
