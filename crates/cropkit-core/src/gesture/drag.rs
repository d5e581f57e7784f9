//! Single-pointer drag recognition.

use crate::geometry::Vec2;

use super::{GestureEvent, PointerEvent, PointerPhase, PointerTrack};

/// Tracks one active pointer across a multi-touch stream and reports its
/// incremental displacement.
///
/// Drag is suspended while more than one pointer is down; when the stream
/// returns to a single pointer the recognizer re-acquires it, seeds a fresh
/// reference position, and resumes reporting from the next move.
#[derive(Debug, Default)]
pub struct DragRecognizer {
    active: PointerTrack,
    last_touch: Option<Vec2>,
}

impl DragRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    fn acquire(&mut self, ev: &PointerEvent) {
        if let Some(p) = ev.first() {
            self.active = PointerTrack::Tracking(p.id);
            self.last_touch = Some(p.position);
        }
    }

    fn reset(&mut self) {
        self.active = PointerTrack::Idle;
        self.last_touch = None;
    }

    /// Feed one pointer event; returns a [`GestureEvent::Drag`] when the
    /// active pointer moved.
    pub fn handle(&mut self, ev: &PointerEvent) -> Option<GestureEvent> {
        match ev.phase {
            PointerPhase::Down => {
                self.acquire(ev);
                None
            }
            PointerPhase::Move => {
                if ev.pointers.len() > 1 {
                    // Multi-touch suspends dragging until one pointer remains.
                    self.reset();
                    return None;
                }

                let id = match self.active {
                    PointerTrack::Tracking(id) => id,
                    PointerTrack::Idle => {
                        // Re-acquire and seed; no delta to report yet.
                        self.acquire(ev);
                        return None;
                    }
                };

                // A stale id is a normal race, fail soft.
                let position = ev.position_of(id)?;
                let last = self.last_touch?;

                let walk = position - last;
                self.last_touch = Some(position);
                Some(GestureEvent::Drag {
                    dx: walk.x,
                    dy: walk.y,
                })
            }
            PointerPhase::Up | PointerPhase::Cancel => {
                self.reset();
                None
            }
            PointerPhase::PointerDown | PointerPhase::PointerUp => None,
        }
    }
}
