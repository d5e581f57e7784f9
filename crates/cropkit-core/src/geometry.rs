//! 2D point and rectangle value types.
//!
//! Both types are plain values: every operation returns a new value instead of
//! mutating in place, so resize-then-reposition sequences compose as pure
//! functions.

use std::ops::{Add, Div, Sub};

/// A 2D point or displacement in view space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean length.
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Midpoint of two points.
    pub fn midpoint(a: Vec2, b: Vec2) -> Vec2 {
        (a + b) / 2.0
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }
}

impl Div<f32> for Vec2 {
    type Output = Vec2;

    fn div(self, divisor: f32) -> Vec2 {
        Vec2::new(self.x / divisor, self.y / divisor)
    }
}

/// An integer rectangle in view space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        x: 0,
        y: 0,
        width: 0,
        height: 0,
    };

    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle of the given size anchored at the origin.
    pub fn from_size(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn right(self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(self) -> i32 {
        self.y + self.height
    }

    /// Exact (floating point) center.
    pub fn center(self) -> Vec2 {
        Vec2::new(
            self.x as f32 + self.width as f32 / 2.0,
            self.y as f32 + self.height as f32 / 2.0,
        )
    }

    /// Move the rectangle so its top-left corner sits at `(x, y)`.
    pub fn offset_to(self, x: i32, y: i32) -> Rect {
        Rect::new(x, y, self.width, self.height)
    }

    /// Clamp the origin so the rectangle lies fully inside a
    /// `view_width x view_height` canvas. A rectangle larger than the canvas
    /// is pinned to the origin.
    pub fn clamped_within(self, view_width: i32, view_height: i32) -> Rect {
        let max_x = (view_width - self.width).max(0);
        let max_y = (view_height - self.height).max(0);
        Rect::new(
            self.x.clamp(0, max_x),
            self.y.clamp(0, max_y),
            self.width,
            self.height,
        )
    }

    /// Resize keeping the same center.
    ///
    /// The rectangle is first normalized to the origin at the new size, then
    /// repositioned so the old center is preserved (to within rounding).
    pub fn with_size_about_center(self, width: i32, height: i32) -> Rect {
        let center = self.center();
        let resized = Rect::from_size(width, height);
        resized.offset_to(
            (center.x - width as f32 / 2.0).round() as i32,
            (center.y - height as f32 / 2.0).round() as i32,
        )
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
        /// Property: center-preserving resize keeps the center within 1 px.
        #[test]
        fn prop_resize_preserves_center(
            x in -500i32..500,
            y in -500i32..500,
            w in 1i32..400,
            h in 1i32..400,
            new_w in 1i32..400,
            new_h in 1i32..400,
        ) {
            let rect = Rect::new(x, y, w, h);
            let resized = rect.with_size_about_center(new_w, new_h);

            let before = rect.center();
            let after = resized.center();
            prop_assert!((before.x - after.x).abs() <= 1.0);
            prop_assert!((before.y - after.y).abs() <= 1.0);
            prop_assert_eq!(resized.width, new_w);
            prop_assert_eq!(resized.height, new_h);
        }

        /// Property: clamping keeps a rectangle that fits inside the view.
        #[test]
        fn prop_clamped_rect_inside_view(
            x in -1000i32..1000,
            y in -1000i32..1000,
            w in 1i32..200,
            h in 1i32..200,
        ) {
            let clamped = Rect::new(x, y, w, h).clamped_within(200, 200);
            prop_assert!(clamped.x >= 0);
            prop_assert!(clamped.y >= 0);
            prop_assert!(clamped.right() <= 200);
            prop_assert!(clamped.bottom() <= 200);
        }
    }
}
