//! Crop window geometry: position, size, and constraints.
//!
//! The crop rectangle lives in view space and is the only bounded geometry in
//! the engine: it always honors the configured aspect ratio and never leaves
//! the view. The photo underneath may be transformed arbitrarily.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::geometry::Rect;
use crate::GestureEvent;

/// Serializable capture of the crop rectangle, for persisting interactive
/// state across a host destroy/recreate cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropAreaSnapshot {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// The crop window's rectangle plus its sizing constraints.
///
/// The rectangle is recomputed to a default (centered, maximum size honoring
/// borders and aspect ratio) whenever the view size or any constraint changes.
/// Once a snapshot is applied its position and size take precedence over the
/// defaults until [`CropRegion::reset_defaults`] is called.
#[derive(Debug)]
pub struct CropRegion {
    rect: Rect,
    aspect_ratio: f32,
    max_width: Option<f32>,
    max_height: Option<f32>,
    horizontal_border: f32,
    vertical_border: f32,
    min_scale: f32,
    view: Option<(u32, u32)>,
    restored: Option<CropAreaSnapshot>,
}

impl Default for CropRegion {
    fn default() -> Self {
        Self {
            rect: Rect::ZERO,
            aspect_ratio: 1.0,
            max_width: None,
            max_height: None,
            horizontal_border: 0.0,
            vertical_border: 0.0,
            min_scale: 0.5,
            view: None,
            restored: None,
        }
    }
}

impl CropRegion {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current crop rectangle.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Aspect ratio as width/height. Values `<= 0` are ignored.
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        if aspect_ratio > 0.0 {
            self.aspect_ratio = aspect_ratio;
            self.initialize_placement();
        }
    }

    /// Upper size limits in pixels; `None` means bounded by the view only.
    pub fn set_max_size(&mut self, max_width: Option<f32>, max_height: Option<f32>) {
        self.max_width = max_width;
        self.max_height = max_height;
        self.initialize_placement();
    }

    /// Minimum inset from the left/right view edges for the default rectangle.
    pub fn set_horizontal_border(&mut self, border_px: f32) {
        self.horizontal_border = border_px;
        self.initialize_placement();
    }

    /// Minimum inset from the top/bottom view edges for the default rectangle.
    pub fn set_vertical_border(&mut self, border_px: f32) {
        self.vertical_border = border_px;
        self.initialize_placement();
    }

    /// Smallest allowed size as a fraction of the constrained maximum, used
    /// when pinch-resizing the crop window.
    pub fn set_min_scale(&mut self, min_scale: f32) {
        self.min_scale = min_scale.clamp(0.0, 1.0);
    }

    pub fn set_view_size(&mut self, width: u32, height: u32) {
        debug!("crop region view size {}x{}", width, height);
        self.view = Some((width, height));
        self.initialize_placement();
    }

    fn view_proportion(&self) -> Option<f32> {
        let (w, h) = self.view?;
        if w > 0 && h > 0 {
            Some(w as f32 / h as f32)
        } else {
            None
        }
    }

    /// The largest crop size allowed by the view and the configured limits,
    /// at the configured aspect ratio.
    fn constrained_max(&self) -> Option<(f32, f32)> {
        let (view_w, view_h) = self.view?;
        let view_proportion = self.view_proportion()?;
        let (view_w, view_h) = (view_w as f32, view_h as f32);

        let (base_w, base_h) = if view_proportion <= self.aspect_ratio {
            (view_w, view_w / self.aspect_ratio)
        } else {
            (view_h * self.aspect_ratio, view_h)
        };

        let mut factor = 1.0f32;
        if let Some(max_w) = self.max_width {
            factor = factor.min(max_w / base_w);
        }
        if let Some(max_h) = self.max_height {
            factor = factor.min(max_h / base_h);
        }
        Some((base_w * factor, base_h * factor))
    }

    /// The default rectangle size: as large as the border-inset view allows at
    /// the configured aspect ratio, uniformly shrunk when a dimension exceeds
    /// its limit. A restored snapshot overrides the computation.
    fn default_size(&self) -> Option<(i32, i32)> {
        let view_proportion = self.view_proportion()?;
        if let Some(restored) = &self.restored {
            return Some((restored.width, restored.height));
        }

        let (view_w, view_h) = self.view?;
        let mut width_limit = (view_w as f32 - self.horizontal_border).max(1.0);
        let mut height_limit = (view_h as f32 - self.vertical_border).max(1.0);
        if let Some(max_w) = self.max_width {
            width_limit = width_limit.min(max_w);
        }
        if let Some(max_h) = self.max_height {
            height_limit = height_limit.min(max_h);
        }

        let (candidate_w, candidate_h) = if view_proportion <= self.aspect_ratio {
            (width_limit, width_limit / self.aspect_ratio)
        } else {
            (height_limit * self.aspect_ratio, height_limit)
        };

        let shrink = 1.0f32
            .min(width_limit / candidate_w)
            .min(height_limit / candidate_h);

        Some((
            (candidate_w * shrink).round().max(1.0) as i32,
            (candidate_h * shrink).round().max(1.0) as i32,
        ))
    }

    /// The default top-left corner: restored position, or centered.
    fn default_position(&self) -> (f32, f32) {
        if let Some(restored) = &self.restored {
            return (restored.x as f32, restored.y as f32);
        }
        let (view_w, view_h) = self.view.unwrap_or((0, 0));
        (
            (view_w as f32 - self.rect.width as f32) / 2.0,
            (view_h as f32 - self.rect.height as f32) / 2.0,
        )
    }

    /// Recompute the rectangle from defaults (or the restored snapshot).
    /// Silently deferred while the view has no size yet.
    ///
    /// The default size already honors every limit, so the pinch-resize
    /// min-size clamp is not applied here; a border tighter than half the
    /// view must win over `min_scale`.
    fn initialize_placement(&mut self) {
        let Some((width, height)) = self.default_size() else {
            return;
        };
        let Some((view_w, view_h)) = self.view else {
            return;
        };
        self.rect = self
            .rect
            .with_size_about_center(width, height)
            .clamped_within(view_w as i32, view_h as i32);
        let (x, y) = self.default_position();
        self.update_position(x, y);
    }

    fn update_position(&mut self, x: f32, y: f32) {
        let Some((view_w, view_h)) = self.view else {
            return;
        };
        self.rect = self
            .rect
            .offset_to(x.round() as i32, y.round() as i32)
            .clamped_within(view_w as i32, view_h as i32);
    }

    /// Resize preserving the rectangle's center, clamped into
    /// `[min_scale * max, max]` per dimension.
    fn resize_to(&mut self, new_width: i32, new_height: i32) {
        let Some((max_w, max_h)) = self.constrained_max() else {
            return;
        };
        let Some((view_w, view_h)) = self.view else {
            return;
        };

        let width = (new_width as f32)
            .clamp(max_w * self.min_scale, max_w)
            .round() as i32;
        let height = (new_height as f32)
            .clamp(max_h * self.min_scale, max_h)
            .round() as i32;

        self.rect = self
            .rect
            .with_size_about_center(width, height)
            .clamped_within(view_w as i32, view_h as i32);
    }

    /// Translate the rectangle, keeping it fully inside the view.
    pub fn move_by(&mut self, dx: f32, dy: f32) {
        self.update_position(self.rect.x as f32 + dx, self.rect.y as f32 + dy);
    }

    /// Scale the rectangle about its center, within the size bounds.
    pub fn scale_by(&mut self, factor: f32) {
        self.resize_to(
            (self.rect.width as f32 * factor).round() as i32,
            (self.rect.height as f32 * factor).round() as i32,
        );
    }

    /// Route a gesture delta. Drag moves the window, pinch resizes it;
    /// rotation does not apply to the crop window.
    pub fn apply(&mut self, event: GestureEvent) {
        match event {
            GestureEvent::Drag { dx, dy } => self.move_by(dx, dy),
            GestureEvent::Scale { factor, .. } => self.scale_by(factor),
            GestureEvent::Rotate { .. } => {}
        }
    }

    pub fn take_snapshot(&self) -> CropAreaSnapshot {
        CropAreaSnapshot {
            x: self.rect.x,
            y: self.rect.y,
            width: self.rect.width,
            height: self.rect.height,
        }
    }

    /// Restore a previously captured rectangle. The snapshot's position and
    /// size override the defaults (and survive view-size events) until
    /// [`CropRegion::reset_defaults`].
    pub fn apply_snapshot(&mut self, snapshot: CropAreaSnapshot) {
        if snapshot.width > 0 && snapshot.height > 0 {
            self.aspect_ratio = snapshot.width as f32 / snapshot.height as f32;
        }
        self.restored = Some(snapshot);
        self.initialize_placement();
    }

    /// Drop any restored snapshot and constraint overrides and recompute the
    /// default centered rectangle.
    pub fn reset_defaults(&mut self) {
        self.horizontal_border = 0.0;
        self.vertical_border = 0.0;
        self.aspect_ratio = 1.0;
        self.restored = None;
        self.initialize_placement();
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: the default rectangle matches the configured aspect ratio
        /// to within integer rounding and never exceeds the border-inset view.
        #[test]
        fn prop_default_size_honors_aspect_and_limits(
            view_w in 50u32..1000,
            view_h in 50u32..1000,
            aspect in 0.2f32..5.0,
            h_border in 0.0f32..40.0,
            v_border in 0.0f32..40.0,
        ) {
            let mut region = CropRegion::new();
            region.set_aspect_ratio(aspect);
            region.set_horizontal_border(h_border);
            region.set_vertical_border(v_border);
            region.set_view_size(view_w, view_h);

            let rect = region.rect();
            prop_assert!(rect.width >= 1);
            prop_assert!(rect.height >= 1);
            prop_assert!(rect.width as f32 <= view_w as f32 - h_border + 1.0);
            prop_assert!(rect.height as f32 <= view_h as f32 - v_border + 1.0);

            let actual = rect.width as f32 / rect.height as f32;
            // Integer rounding bounds how close the ratio can get.
            let tolerance = aspect * (1.0 / rect.width as f32 + 1.0 / rect.height as f32) + 0.02;
            prop_assert!(
                (actual - aspect).abs() <= tolerance,
                "aspect {} vs configured {}", actual, aspect
            );
        }

        /// Property: pinch-resizing preserves the center within 1 px and keeps
        /// the rectangle inside the view.
        #[test]
        fn prop_resize_preserves_center_within_rounding(
            view_w in 100u32..800,
            view_h in 100u32..800,
            factor in 0.3f32..3.0,
        ) {
            let mut region = CropRegion::new();
            region.set_view_size(view_w, view_h);
            let before = region.rect().center();

            region.scale_by(factor);
            let rect = region.rect();
            let after = rect.center();

            prop_assert!((before.x - after.x).abs() <= 1.0);
            prop_assert!((before.y - after.y).abs() <= 1.0);
            prop_assert!(rect.x >= 0 && rect.y >= 0);
            prop_assert!(rect.right() <= view_w as i32);
            prop_assert!(rect.bottom() <= view_h as i32);
        }

        /// Property: snapshots restore the identical rectangle.
        #[test]
        fn prop_snapshot_round_trip(
            view_w in 100u32..800,
            view_h in 100u32..800,
            dx in -200.0f32..200.0,
            dy in -200.0f32..200.0,
            factor in 0.5f32..1.5,
        ) {
            let mut region = CropRegion::new();
            region.set_view_size(view_w, view_h);
            region.move_by(dx, dy);
            region.scale_by(factor);

            let mut restored = CropRegion::new();
            restored.set_view_size(view_w, view_h);
            restored.apply_snapshot(region.take_snapshot());

            prop_assert_eq!(restored.rect(), region.rect());
        }
    }
}
