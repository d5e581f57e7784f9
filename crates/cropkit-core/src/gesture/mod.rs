//! Multi-touch gesture recognition.
//!
//! Raw pointer events stream into three small recognizers (drag, pinch,
//! rotation). Each recognizer holds only pointer-tracking state and emits a
//! [`GestureEvent`] delta; the session routes those deltas to the photo
//! transform or the crop region.

mod drag;
mod pinch;
mod rotation;

pub use drag::DragRecognizer;
pub use pinch::PinchRecognizer;
pub use rotation::RotationRecognizer;

use crate::geometry::Vec2;

/// Host-assigned identifier for one touch pointer. Stable for the lifetime of
/// the touch, may be recycled afterwards.
pub type PointerId = u32;

/// One touch pointer within an event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pub id: PointerId,
    pub position: Vec2,
}

/// The phase of a pointer event, following the usual platform convention:
/// `Down`/`Up` bracket the whole gesture (first finger down, last finger up),
/// `PointerDown`/`PointerUp` mark additional fingers joining or leaving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    PointerDown,
    Move,
    Up,
    PointerUp,
    Cancel,
}

/// A snapshot of all live pointers at one moment, plus which pointer the
/// phase refers to (`action_index`, meaningful for `PointerDown`/`PointerUp`).
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub pointers: Vec<Pointer>,
    pub action_index: usize,
}

impl PointerEvent {
    pub fn new(phase: PointerPhase, pointers: Vec<Pointer>, action_index: usize) -> Self {
        Self {
            phase,
            pointers,
            action_index,
        }
    }

    /// The first reported pointer, if any.
    pub fn first(&self) -> Option<&Pointer> {
        self.pointers.first()
    }

    /// The pointer the phase refers to.
    pub fn action_pointer(&self) -> Option<&Pointer> {
        self.pointers.get(self.action_index)
    }

    /// Resolve a pointer id to its current position.
    ///
    /// Returns `None` when the id is not present in this event. A stale id is
    /// a normal race in multi-touch streams, not an error.
    pub fn position_of(&self, id: PointerId) -> Option<Vec2> {
        self.pointers
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.position)
    }
}

/// A recognized gesture delta.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    /// Incremental displacement of the active pointer.
    Drag { dx: f32, dy: f32 },
    /// Incremental pinch scale about a focal point.
    Scale { factor: f32, focus: Vec2 },
    /// Incremental rotation (degrees) about a pivot point.
    Rotate { degrees: f32, pivot: Vec2 },
}

/// Which pointer a recognizer slot is following.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerTrack {
    #[default]
    Idle,
    Tracking(PointerId),
}

impl PointerTrack {
    pub fn id(self) -> Option<PointerId> {
        match self {
            PointerTrack::Idle => None,
            PointerTrack::Tracking(id) => Some(id),
        }
    }

    pub fn is_idle(self) -> bool {
        matches!(self, PointerTrack::Idle)
    }

    /// Clear the slot if it is tracking `id`.
    pub fn release(&mut self, id: PointerId) -> bool {
        if *self == PointerTrack::Tracking(id) {
            *self = PointerTrack::Idle;
            true
        } else {
            false
        }
    }
}
