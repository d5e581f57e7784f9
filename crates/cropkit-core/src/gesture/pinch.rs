//! Two-pointer pinch-to-scale recognition.

use crate::geometry::Vec2;

use super::{GestureEvent, PointerEvent, PointerPhase, PointerTrack};

/// Pointer pairs closer than this (px) produce no scale factor; avoids the
/// asymptote when the separation collapses.
const MIN_SPAN: f32 = 1.0;

/// Tracks two pointers and reports the ratio of their current separation to
/// their previous separation, together with the midpoint as focal point.
///
/// On the first move after a pair is acquired the recognizer only seeds its
/// reference positions; there is no previous span to compare against yet.
#[derive(Debug, Default)]
pub struct PinchRecognizer {
    primary: PointerTrack,
    secondary: PointerTrack,
    last_pair: Option<(Vec2, Vec2)>,
}

impl PinchRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    fn reset(&mut self) {
        self.primary = PointerTrack::Idle;
        self.secondary = PointerTrack::Idle;
        self.last_pair = None;
    }

    /// Feed one pointer event; returns a [`GestureEvent::Scale`] while two
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

                let old_span = (last_secondary - last_primary).length();
                let new_span = (secondary - primary).length();
                self.last_pair = Some((primary, secondary));

                if old_span < MIN_SPAN || new_span < MIN_SPAN {
                    return None;
                }

                Some(GestureEvent::Scale {
                    factor: new_span / old_span,
                    focus: Vec2::midpoint(primary, secondary),
                })
            }
            PointerPhase::Up => {
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
