//! Cropkit Core - interactive 2D transform-and-crop engine
//!
//! This crate provides the core of an image-cropping UI: it maintains a
//! composable affine transform of a photo in response to multi-touch gestures
//! (drag, pinch-scale, two-finger rotate), an independent crop-window
//! geometry, and a deterministic rasterization of the transformed photo under
//! the crop window into an output bitmap.
//!
//! # Architecture
//!
//! Hosts feed decoded photos and raw pointer events into a [`CropSession`]
//! and draw [`CropSession::render`] plus their own crop overlay. Heavy steps
//! (decode, final composition) run on a [`Workers`] pool and are collected
//! with the session's `poll_*` methods on the owning thread.
//!
//! Output persistence, photo fetching/decoding, and UI chrome live in the
//! host; the engine starts at a decoded [`Bitmap`] and ends at a cropped one.

pub mod compositor;
pub mod geometry;
pub mod gesture;
pub mod photo;
pub mod region;
pub mod session;
pub mod transform;
pub mod types;
pub mod workers;

pub use compositor::{crop_to_bitmap, extract, render};
pub use geometry::{Rect, Vec2};
pub use gesture::{
    DragRecognizer, GestureEvent, PinchRecognizer, Pointer, PointerEvent, PointerId, PointerPhase,
    PointerTrack, RotationRecognizer,
};
pub use photo::{PhotoTransformState, StateOrigin, TransformSnapshot};
pub use region::{CropAreaSnapshot, CropRegion};
pub use session::{CropSession, SessionState};
pub use transform::Transform2D;
pub use types::{Bitmap, CropError, FilterType};
pub use workers::Workers;

use serde::{Deserialize, Serialize};

/// Which geometry receives drag/pinch input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CropMode {
    /// Gestures transform the photo under a fixed crop window.
    #[default]
    MoveImage,
    /// Gestures move and resize the crop window over a fixed photo.
    MoveCrop,
}

/// Configuration surface for a crop session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropConfig {
    /// Crop window aspect ratio as width/height.
    pub aspect_ratio: f32,
    /// Upper bound on the crop window width in px (`None` = view-bounded).
    pub max_crop_width: Option<f32>,
    /// Upper bound on the crop window height in px (`None` = view-bounded).
    pub max_crop_height: Option<f32>,
    /// Minimum inset of the default crop window from the left/right edges.
    pub horizontal_border: f32,
    /// Minimum inset of the default crop window from the top/bottom edges.
    pub vertical_border: f32,
    /// Which geometry receives gestures.
    pub crop_mode: CropMode,
    /// Smallest crop window size as a fraction of its constrained maximum.
    pub min_crop_scale: f32,
    /// Optional `(min, max)` bounds on the photo zoom; `None` leaves pinch
    /// scaling unclamped.
    pub scale_limits: Option<(f32, f32)>,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: 1.0,
            max_crop_width: None,
            max_crop_height: None,
            horizontal_border: 0.0,
            vertical_border: 0.0,
            crop_mode: CropMode::MoveImage,
            min_crop_scale: 0.5,
            scale_limits: None,
        }
    }
}

impl CropConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if all values are at their defaults.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}
