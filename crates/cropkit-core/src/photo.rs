//! Photo transform state: the scaled source photo plus the composed affine
//! transform gestures build up on it.

use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::transform::Transform2D;
use crate::types::{Bitmap, CropError, FilterType};
use crate::GestureEvent;

/// Serializable capture of the photo transform, for persisting interactive
/// state across a host destroy/recreate cycle.
///
/// `photo_width`/`photo_height` record the scaled photo's dimensions so a
/// restored composition survives a view-size change instead of being refit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformSnapshot {
    pub photo_width: u32,
    pub photo_height: u32,
    pub matrix: [f32; 6],
}

/// Whether the current state was built fresh from defaults or restored from a
/// snapshot. Restored state suppresses automatic refit/recentering until the
/// next explicit reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateOrigin {
    #[default]
    Fresh,
    Restored,
}

/// Owns the photo bitmaps and the composed photo-to-view transform.
#[derive(Debug, Default)]
pub struct PhotoTransformState {
    source: Option<Bitmap>,
    scaled: Option<Bitmap>,
    transform: Transform2D,
    base_size: Option<(u32, u32)>,
    origin: StateOrigin,
    view: Option<(u32, u32)>,
    scale_limits: Option<(f32, f32)>,
    filter: FilterType,
}

impl PhotoTransformState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The composed photo-to-view transform.
    pub fn transform(&self) -> &Transform2D {
        &self.transform
    }

    /// The photo scaled to the view under the fit rule, if ready.
    pub fn scaled(&self) -> Option<&Bitmap> {
        self.scaled.as_ref()
    }

    pub fn origin(&self) -> StateOrigin {
        self.origin
    }

    /// Bounds `(min, max)` on the transform's uniform scale applied to pinch
    /// factors; `None` leaves zoom unclamped.
    pub fn set_scale_limits(&mut self, limits: Option<(f32, f32)>) {
        self.scale_limits = limits;
    }

    pub fn set_filter(&mut self, filter: FilterType) {
        self.filter = filter;
    }

    /// Assign a freshly decoded photo. Clears nothing if the same bitmap is
    /// assigned again.
    pub fn set_photo(&mut self, photo: Bitmap) {
        if self.source.as_ref() == Some(&photo) {
            return;
        }
        self.source = Some(photo);
        self.invalidate_photo();
    }

    pub fn set_view_size(&mut self, width: u32, height: u32) {
        debug!("photo view size {}x{}", width, height);
        self.view = Some((width, height));
        self.invalidate_photo();
    }

    fn photo_proportion(&self) -> Option<f32> {
        let source = self.source.as_ref()?;
        if source.width > 0 && source.height > 0 {
            Some(source.width as f32 / source.height as f32)
        } else {
            None
        }
    }

    fn view_proportion(&self) -> Option<f32> {
        let (w, h) = self.view?;
        if w > 0 && h > 0 {
            Some(w as f32 / h as f32)
        } else {
            None
        }
    }

    /// The scaled photo size under the cover-fit rule: the photo fully covers
    /// the smaller view dimension, overflowing the other. A restored
    /// `base_size` is used verbatim instead.
    fn fit_size(&self) -> Option<(u32, u32)> {
        if let Some(base) = self.base_size {
            return Some(base);
        }
        let photo_proportion = self.photo_proportion()?;
        let view_proportion = self.view_proportion()?;
        let (view_w, view_h) = self.view?;

        let (w, h) = if view_proportion <= photo_proportion {
            ((view_h as f32 * photo_proportion) as u32, view_h)
        } else {
            (view_w, (view_w as f32 / photo_proportion) as u32)
        };
        Some((w.max(1), h.max(1)))
    }

    /// Rescale the photo and (for fresh state) recenter it in the view.
    /// Silently deferred while either the photo or the view size is missing.
    fn invalidate_photo(&mut self) {
        let Some((scaled_w, scaled_h)) = self.fit_size() else {
            return;
        };
        let Some(source) = self.source.as_ref() else {
            return;
        };

        match source.resize(scaled_w, scaled_h, self.filter) {
            Ok(scaled) => self.scaled = Some(scaled),
            Err(e) => {
                error!("failed to scale photo to {}x{}: {}", scaled_w, scaled_h, e);
                return;
            }
        }

        if self.origin == StateOrigin::Fresh {
            let (view_w, view_h) = self.view.unwrap_or((0, 0));
            self.transform = Transform2D::from_translation(
                (view_w as f32 - scaled_w as f32) / 2.0,
                (view_h as f32 - scaled_h as f32) / 2.0,
            );
        }
    }

    /// Clamp an incremental pinch factor so the resulting uniform scale stays
    /// within the configured limits.
    fn clamped_factor(&self, factor: f32) -> f32 {
        let Some((min, max)) = self.scale_limits else {
            return factor;
        };
        let current = self.transform.uniform_scale();
        if current <= 0.0 {
            return factor;
        }
        (current * factor).clamp(min, max) / current
    }

    /// Apply a gesture delta to the transform, in view space.
    pub fn apply(&mut self, event: GestureEvent) {
        match event {
            GestureEvent::Drag { dx, dy } => self.transform.translate_by(dx, dy),
            GestureEvent::Scale { factor, focus } => {
                self.transform.scale_by(self.clamped_factor(factor), focus);
            }
            GestureEvent::Rotate { degrees, pivot } => self.transform.rotate_by(degrees, pivot),
        }
    }

    /// Capture the current composition.
    ///
    /// # Errors
    ///
    /// `CropError::PhotoNotLoaded` when no photo has been scaled yet.
    pub fn take_snapshot(&self) -> Result<TransformSnapshot, CropError> {
        let scaled = self.scaled.as_ref().ok_or(CropError::PhotoNotLoaded)?;
        Ok(TransformSnapshot {
            photo_width: scaled.width,
            photo_height: scaled.height,
            matrix: self.transform.coeffs(),
        })
    }

    /// Restore a captured composition: the snapshot's scaled size and matrix
    /// are used verbatim and auto-recentering is suppressed until
    /// [`PhotoTransformState::reset_defaults`].
    pub fn apply_snapshot(&mut self, snapshot: TransformSnapshot) {
        self.base_size = Some((snapshot.photo_width, snapshot.photo_height));
        self.transform = Transform2D::from_coeffs(snapshot.matrix);
        self.origin = StateOrigin::Restored;
        self.invalidate_photo();
    }

    /// Drop any restored state and refit the photo from defaults.
    pub fn reset_defaults(&mut self) {
        self.base_size = None;
        self.transform = Transform2D::identity();
        self.origin = StateOrigin::Fresh;
        self.invalidate_photo();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec2;

    fn photo(width: u32, height: u32) -> Bitmap {
        Bitmap::blank(width, height)
    }

    fn loaded_state(photo_w: u32, photo_h: u32, view_w: u32, view_h: u32) -> PhotoTransformState {
        let mut state = PhotoTransformState::new();
        state.set_view_size(view_w, view_h);
        state.set_photo(photo(photo_w, photo_h));
        state
    }

    #[test]
    fn test_fit_covers_height_for_wide_photo() {
        // View 1.0 <= photo 4/3: height is matched, width overflows.
        let state = loaded_state(400, 300, 200, 200);
        let scaled = state.scaled().unwrap();
        assert_eq!((scaled.width, scaled.height), (266, 200));
        // Centered horizontally: (200 - 266) / 2 = -33.
        assert_eq!(state.transform().coeffs(), [1.0, 0.0, 0.0, 1.0, -33.0, 0.0]);
    }

    #[test]
    fn test_fit_covers_width_for_tall_photo() {
        // View 2.0 > photo 0.5: width is matched, height overflows.
        let state = loaded_state(100, 200, 400, 200);
        let scaled = state.scaled().unwrap();
        assert_eq!((scaled.width, scaled.height), (400, 800));
        assert_eq!(state.transform().coeffs(), [1.0, 0.0, 0.0, 1.0, 0.0, -300.0]);
    }

    #[test]
    fn test_geometry_deferred_until_both_inputs_present() {
        let mut state = PhotoTransformState::new();
        state.set_photo(photo(100, 100));
        assert!(state.scaled().is_none());

        state.set_view_size(50, 50);
        assert!(state.scaled().is_some());
    }

    #[test]
    fn test_gestures_compose_onto_transform() {
        let mut state = loaded_state(100, 100, 100, 100);
        state.apply(GestureEvent::Drag { dx: 5.0, dy: -3.0 });
        state.apply(GestureEvent::Scale {
            factor: 2.0,
            focus: Vec2::ZERO,
        });

        let coeffs = state.transform().coeffs();
        assert!((coeffs[0] - 2.0).abs() < 1e-5);
        assert!((coeffs[4] - 10.0).abs() < 1e-5);
        assert!((coeffs[5] - -6.0).abs() < 1e-5);
    }

    #[test]
    fn test_scale_limits_clamp_zoom() {
        let mut state = loaded_state(100, 100, 100, 100);
        state.set_scale_limits(Some((0.5, 2.0)));

        state.apply(GestureEvent::Scale {
            factor: 10.0,
            focus: Vec2::ZERO,
        });
        assert!((state.transform().uniform_scale() - 2.0).abs() < 1e-4);

        state.apply(GestureEvent::Scale {
            factor: 0.01,
            focus: Vec2::ZERO,
        });
        assert!((state.transform().uniform_scale() - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_unclamped_by_default() {
        let mut state = loaded_state(100, 100, 100, 100);
        state.apply(GestureEvent::Scale {
            factor: 100.0,
            focus: Vec2::ZERO,
        });
        assert!((state.transform().uniform_scale() - 100.0).abs() < 1e-2);
    }

    #[test]
    fn test_snapshot_round_trip_and_restore_suppresses_refit() {
        let mut state = loaded_state(400, 300, 200, 200);
        state.apply(GestureEvent::Drag { dx: 12.0, dy: 8.0 });
        state.apply(GestureEvent::Rotate {
            degrees: 30.0,
            pivot: Vec2::new(100.0, 100.0),
        });
        let snapshot = state.take_snapshot().unwrap();

        // Restore into a differently sized view: the saved composition wins.
        let mut restored = PhotoTransformState::new();
        restored.set_view_size(300, 300);
        restored.apply_snapshot(snapshot);
        restored.set_photo(photo(400, 300));

        assert_eq!(restored.origin(), StateOrigin::Restored);
        let scaled = restored.scaled().unwrap();
        assert_eq!((scaled.width, scaled.height), (266, 200));
        assert_eq!(restored.transform().coeffs(), snapshot.matrix);

        // A later view-size event must not recenter restored state either.
        restored.set_view_size(500, 500);
        assert_eq!(restored.transform().coeffs(), snapshot.matrix);
    }

    #[test]
    fn test_reset_defaults_returns_to_fresh_fit() {
        let mut state = loaded_state(400, 300, 200, 200);
        let fresh = state.transform().coeffs();

        state.apply_snapshot(TransformSnapshot {
            photo_width: 100,
            photo_height: 75,
            matrix: [2.0, 0.0, 0.0, 2.0, 5.0, 5.0],
        });
        assert_eq!(state.scaled().unwrap().width, 100);

        state.reset_defaults();
        assert_eq!(state.origin(), StateOrigin::Fresh);
        assert_eq!(state.scaled().unwrap().width, 266);
        assert_eq!(state.transform().coeffs(), fresh);
    }

    #[test]
    fn test_snapshot_without_photo_fails() {
        let state = PhotoTransformState::new();
        assert!(matches!(
            state.take_snapshot(),
            Err(CropError::PhotoNotLoaded)
        ));
    }
}
