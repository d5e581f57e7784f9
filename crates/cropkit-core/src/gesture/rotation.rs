//! Two-pointer rotation recognition.

use crate::geometry::Vec2;

use super::{GestureEvent, PointerEvent, PointerPhase, PointerTrack};

/// Tracks a primary pointer (first down) and a secondary pointer (first
/// additional down while the primary is active) and reports the signed angle,
/// in degrees, between the previous and current pointer-connecting vectors,
/// about the midpoint of the current positions.
///
/// The first move after the pair is acquired only seeds the reference
/// positions: emitting there would compare against nothing and produce a
/// spurious large-angle jump. Pointer churn is tolerated; losing either
/// pointer just breaks the pair until a replacement arrives.
#[derive(Debug, Default)]
pub struct RotationRecognizer {
    primary: PointerTrack,
    secondary: PointerTrack,
    last_pair: Option<(Vec2, Vec2)>,
}

/// Signed angle (degrees) from the old connecting vector to the new one,
/// normalized into `(-180, 180]`.
fn angle_between_lines(old_primary: Vec2, old_secondary: Vec2, new_primary: Vec2, new_secondary: Vec2) -> f32 {
    let old = old_secondary - old_primary;
    let new = new_secondary - new_primary;
    let degrees = (new.y.atan2(new.x) - old.y.atan2(old.x)).to_degrees();
    normalize_degrees(degrees)
}

fn normalize_degrees(degrees: f32) -> f32 {
    let mut d = degrees % 360.0;
    if d > 180.0 {
        d -= 360.0;
    } else if d <= -180.0 {
        d += 360.0;
    }
    d
}

impl RotationRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    fn reset(&mut self) {
        self.primary = PointerTrack::Idle;
        self.secondary = PointerTrack::Idle;
        self.last_pair = None;
    }

    /// Feed one pointer event; returns a [`GestureEvent::Rotate`] while two
    /// pointers are moving.
    pub fn handle(&mut self, ev: &PointerEvent) -> Option<GestureEvent> {
        match ev.phase {
            PointerPhase::Down => {
                if let Some(p) = ev.first() {
                    self.primary = PointerTrack::Tracking(p.id);
                }
                self.last_pair = None;
                None
            }
            PointerPhase::PointerDown => {
                if self.secondary.is_idle() {
                    if let Some(p) = ev.action_pointer() {
                        self.secondary = PointerTrack::Tracking(p.id);
                        self.last_pair = None;
                    }
                }
                None
            }
            PointerPhase::Move => {
                let (primary_id, secondary_id) = (self.primary.id()?, self.secondary.id()?);
                let primary = ev.position_of(primary_id)?;
                let secondary = ev.position_of(secondary_id)?;

                let Some((last_primary, last_secondary)) = self.last_pair else {
                    self.last_pair = Some((primary, secondary));
                    return None;
                };

                let degrees =
                    angle_between_lines(last_primary, last_secondary, primary, secondary);
                let pivot = Vec2::midpoint(primary, secondary);
                self.last_pair = Some((primary, secondary));

                Some(GestureEvent::Rotate { degrees, pivot })
            }
            PointerPhase::Up => {
                // Primary lift breaks the pair; the remaining pointer may
                // continue alone without producing rotation.
                self.primary = PointerTrack::Idle;
                self.last_pair = None;
                None
            }
            PointerPhase::PointerUp => {
                if let Some(p) = ev.action_pointer() {
                    let released =
                        self.primary.release(p.id) || self.secondary.release(p.id);
                    if released {
                        self.last_pair = None;
                    }
                }
                None
            }
            PointerPhase::Cancel => {
                self.reset();
                None
            }
        }
    }
}
