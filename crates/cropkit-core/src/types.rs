//! Core pixel-buffer and error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for crop-session operations.
#[derive(Debug, Error)]
pub enum CropError {
    /// A crop or snapshot was requested before any photo was assigned.
    #[error("No photo loaded")]
    PhotoNotLoaded,

    /// The crop rectangle escapes the view canvas.
    #[error("Crop region {x},{y} {width}x{height} escapes the {canvas_width}x{canvas_height} canvas")]
    RegionOutOfBounds {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        canvas_width: u32,
        canvas_height: u32,
    },

    /// The photo transform cannot be inverted (degenerate scale).
    #[error("Photo transform is not invertible")]
    DegenerateTransform,

    /// The host's decode step failed; fatal to the session.
    #[error("Failed to decode photo: {0}")]
    DecodeFailed(String),

    /// A zero-sized bitmap or view was supplied.
    #[error("Invalid dimensions")]
    InvalidDimensions,

    /// The session was torn down while a background task was outstanding.
    #[error("Crop session was cancelled")]
    Cancelled,
}

/// Filter type for bitmap resizing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterType {
    /// Nearest neighbor interpolation (fastest, lowest quality).
    Nearest,
    /// Bilinear interpolation (fast, acceptable quality).
    #[default]
    Bilinear,
    /// Lanczos3 interpolation (slower, highest quality).
    Lanczos3,
}

impl FilterType {
    /// Convert to the image crate's FilterType.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            FilterType::Nearest => image::imageops::FilterType::Nearest,
            FilterType::Bilinear => image::imageops::FilterType::Triangle,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// A decoded RGBA8 pixel buffer.
///
/// `pixels` holds `width * height * 4` bytes in row-major RGBA order. This is
/// the only raster representation the engine works with; hosts decode into it
/// and receive crop output from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Raw RGBA pixel data (4 bytes per pixel).
    pub pixels: Vec<u8>,
}

impl Bitmap {
    /// Create a bitmap from raw RGBA data.
    ///
    /// # Panics
    ///
    /// Panics if `pixels.len() != width * height * 4`.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        assert_eq!(
            pixels.len(),
            (width as usize) * (height as usize) * 4,
            "pixel buffer length must be width * height * 4"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a fully transparent bitmap.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; (width as usize) * (height as usize) * 4],
        }
    }

    /// Read the RGBA value at `(x, y)`. Coordinates must be in bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    /// Write the RGBA value at `(x, y)`. Coordinates must be in bounds.
    #[inline]
    pub fn put_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let idx = ((y * self.width + x) * 4) as usize;
        self.pixels[idx..idx + 4].copy_from_slice(&rgba);
    }

    /// Convert to an `image::RgbaImage` for interop with the image crate.
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Build a bitmap from an `image::RgbaImage`.
    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }

    /// Resize to exact dimensions with the given filter.
    ///
    /// # Errors
    ///
    /// Returns `CropError::InvalidDimensions` if either target dimension is zero.
    pub fn resize(&self, width: u32, height: u32, filter: FilterType) -> Result<Bitmap, CropError> {
        if width == 0 || height == 0 {
            return Err(CropError::InvalidDimensions);
        }

        // Fast path: if dimensions match, just clone
        if self.width == width && self.height == height {
            return Ok(self.clone());
        }

        let rgba = self.to_rgba_image().ok_or(CropError::InvalidDimensions)?;
        let resized = image::imageops::resize(&rgba, width, height, filter.to_image_filter());

        Ok(Bitmap::from_rgba_image(resized))
    }
}
