//! Rasterizing the transformed photo and extracting the crop window.
//!
//! Rendering uses inverse mapping: for each pixel of the view-sized canvas the
//! photo transform is inverted to find the contributing source location, which
//! is sampled bilinearly. [`render`] is the single rendering path - hosts
//! display its output and [`crop_to_bitmap`] extracts from it - so the crop
//! output is exactly what was visible under the crop window. The host's
//! overlay dimming is drawn outside the engine and never appears here.

use log::debug;

use crate::geometry::{Rect, Vec2};
use crate::transform::Transform2D;
use crate::types::{Bitmap, CropError};

/// Draw `photo` through `transform` onto a transparent canvas of the view's
/// size.
///
/// # Errors
///
/// - `CropError::InvalidDimensions` for a zero-sized view.
/// - `CropError::DegenerateTransform` when the transform cannot be inverted.
pub fn render(
    photo: &Bitmap,
    transform: &Transform2D,
    view_width: u32,
    view_height: u32,
) -> Result<Bitmap, CropError> {
    if view_width == 0 || view_height == 0 {
        return Err(CropError::InvalidDimensions);
    }
    let inverse = transform.invert().ok_or(CropError::DegenerateTransform)?;

    let mut canvas = Bitmap::blank(view_width, view_height);
    for dst_y in 0..view_height {
        for dst_x in 0..view_width {
            // Map the pixel center back into photo-local space.
            let src = inverse.apply(Vec2::new(dst_x as f32 + 0.5, dst_y as f32 + 0.5));
            let rgba = sample_bilinear(photo, src.x - 0.5, src.y - 0.5);
            canvas.put_pixel(dst_x, dst_y, rgba);
        }
    }
    Ok(canvas)
}

/// Copy the sub-rectangle `region` out of `canvas` into a new bitmap of
/// exactly `region.width x region.height` pixels.
///
/// # Errors
///
/// `CropError::RegionOutOfBounds` when the rectangle is empty or escapes the
/// canvas; the output is never silently truncated.
pub fn extract(canvas: &Bitmap, region: Rect) -> Result<Bitmap, CropError> {
    if region.width <= 0
        || region.height <= 0
        || region.x < 0
        || region.y < 0
        || region.right() > canvas.width as i32
        || region.bottom() > canvas.height as i32
    {
        return Err(CropError::RegionOutOfBounds {
            x: region.x,
            y: region.y,
            width: region.width,
            height: region.height,
            canvas_width: canvas.width,
            canvas_height: canvas.height,
        });
    }

    let out_width = region.width as u32;
    let out_height = region.height as u32;
    let mut output = vec![0u8; (out_width * out_height * 4) as usize];

    // Copy pixel data row by row for efficiency
    for y in 0..out_height {
        let src_y = region.y as u32 + y;
        let src_start = ((src_y * canvas.width + region.x as u32) * 4) as usize;
        let dst_start = (y * out_width * 4) as usize;
        let row_len = (out_width * 4) as usize;
        output[dst_start..dst_start + row_len]
            .copy_from_slice(&canvas.pixels[src_start..src_start + row_len]);
    }

    Ok(Bitmap::new(out_width, out_height, output))
}

/// Render the transformed photo at view size and extract the crop window.
///
/// The output has exactly `region.width x region.height` pixels and holds
/// exactly what was visible under the crop window at the moment of commit.
pub fn crop_to_bitmap(
    photo: &Bitmap,
    transform: &Transform2D,
    view_width: u32,
    view_height: u32,
    region: Rect,
) -> Result<Bitmap, CropError> {
    debug!(
        "cropping {}x{} region at {},{} from a {}x{} canvas",
        region.width, region.height, region.x, region.y, view_width, view_height
    );
    let canvas = render(photo, transform, view_width, view_height)?;
    let output = extract(&canvas, region)?;
    debug!("crop successful");
    Ok(output)
}

/// Get a pixel as [f32; 4] from a bitmap at the given coordinates.
#[inline]
fn get_pixel_f32(photo: &Bitmap, px: usize, py: usize) -> [f32; 4] {
    let idx = (py * photo.width as usize + px) * 4;
    [
        photo.pixels[idx] as f32,
        photo.pixels[idx + 1] as f32,
        photo.pixels[idx + 2] as f32,
        photo.pixels[idx + 3] as f32,
    ]
}

/// Sample a pixel using bilinear interpolation; out-of-bounds locations are
/// transparent.
fn sample_bilinear(photo: &Bitmap, x: f32, y: f32) -> [u8; 4] {
    let (w, h) = (photo.width as i64, photo.height as i64);
    if w == 0 || h == 0 {
        return [0, 0, 0, 0];
    }

    if x < 0.0 || x > (w - 1) as f32 || y < 0.0 || y > (h - 1) as f32 {
        return [0, 0, 0, 0];
    }

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(w as usize - 1);
    let y1 = (y0 + 1).min(h as usize - 1);

    // Fractional distances
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = get_pixel_f32(photo, x0, y0);
    let p10 = get_pixel_f32(photo, x1, y0);
    let p01 = get_pixel_f32(photo, x0, y1);
    let p11 = get_pixel_f32(photo, x1, y1);

    let mut result = [0u8; 4];
    for (i, out) in result.iter_mut().enumerate() {
        let v = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
        *out = v.clamp(0.0, 255.0).round() as u8;
    }
    result
}
