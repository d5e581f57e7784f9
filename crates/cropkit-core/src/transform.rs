//! 2D affine transform mapping the scaled photo's local pixel space to view
//! space.
//!
//! Gesture deltas compose in *view* space: each `translate_by` / `scale_by` /
//! `rotate_by` call applies its delta after the existing transform
//! (post-composition), so repeated pinch, rotate, and drag steps stack
//! correctly regardless of their order.
//!
//! A point `(x, y)` is mapped by:
//!
//! ```text
//! X = a * x + c * y + tx
//! Y = b * x + d * y + ty
//! ```

use crate::geometry::Vec2;

/// A 2D affine transform stored as the six coefficients of a 2x3 matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform2D {
    /// The identity transform.
    pub fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// A pure translation.
    pub fn from_translation(dx: f32, dy: f32) -> Self {
        Self {
            tx: dx,
            ty: dy,
            ..Self::identity()
        }
    }

    /// Rebuild a transform from coefficients `[a, b, c, d, tx, ty]`, as
    /// produced by [`Transform2D::coeffs`]. Used by snapshot restore.
    pub fn from_coeffs(m: [f32; 6]) -> Self {
        Self {
            a: m[0],
            b: m[1],
            c: m[2],
            d: m[3],
            tx: m[4],
            ty: m[5],
        }
    }

    /// The coefficients `[a, b, c, d, tx, ty]`. Used by snapshot capture.
    pub fn coeffs(&self) -> [f32; 6] {
        [self.a, self.b, self.c, self.d, self.tx, self.ty]
    }

    /// Map a point through the transform.
    pub fn apply(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            self.a * p.x + self.c * p.y + self.tx,
            self.b * p.x + self.d * p.y + self.ty,
        )
    }

    /// Compose `outer` after `self`: the result maps a point through `self`
    /// first, then through `outer`.
    fn post_compose(&mut self, outer: &Transform2D) {
        let r = *self;
        let l = outer;
        *self = Transform2D {
            a: l.a * r.a + l.c * r.b,
            b: l.b * r.a + l.d * r.b,
            c: l.a * r.c + l.c * r.d,
            d: l.b * r.c + l.d * r.d,
            tx: l.a * r.tx + l.c * r.ty + l.tx,
            ty: l.b * r.tx + l.d * r.ty + l.ty,
        };
    }

    /// Translate by `(dx, dy)` in view space.
    pub fn translate_by(&mut self, dx: f32, dy: f32) {
        self.tx += dx;
        self.ty += dy;
    }

    /// Scale by `factor` about a view-space pivot.
    pub fn scale_by(&mut self, factor: f32, pivot: Vec2) {
        self.post_compose(&Transform2D {
            a: factor,
            b: 0.0,
            c: 0.0,
            d: factor,
            tx: pivot.x - factor * pivot.x,
            ty: pivot.y - factor * pivot.y,
        });
    }

    /// Rotate by `degrees` about a view-space pivot.
    pub fn rotate_by(&mut self, degrees: f32, pivot: Vec2) {
        let rad = degrees.to_radians();
        let (sin, cos) = rad.sin_cos();
        self.post_compose(&Transform2D {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            tx: pivot.x - (cos * pivot.x - sin * pivot.y),
            ty: pivot.y - (sin * pivot.x + cos * pivot.y),
        });
    }

    /// The uniform scale factor currently carried by the transform, measured
    /// as the length of the mapped X basis vector.
    pub fn uniform_scale(&self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }

    /// Invert the transform, or `None` if it is degenerate.
    pub fn invert(&self) -> Option<Transform2D> {
        let det = self.a * self.d - self.c * self.b;
        if det.abs() < f32::EPSILON {
            return None;
        }
        Some(Transform2D {
            a: self.d / det,
            b: -self.b / det,
            c: -self.c / det,
            d: self.a / det,
            tx: (self.c * self.ty - self.d * self.tx) / det,
            ty: (self.b * self.tx - self.a * self.ty) / det,
        })
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
