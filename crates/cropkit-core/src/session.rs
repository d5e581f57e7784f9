//! The crop session: composition root binding gestures, photo transform,
//! crop region, and the compositor.
//!
//! A session is owned and mutated by a single (UI) thread. The two heavy
//! operations - photo decode and final composition - run on [`Workers`]
//! threads; their results come back over channels and are applied by
//! [`CropSession::poll_photo`] / [`CropSession::poll_commit`] on the owning
//! thread, so no state is ever mutated concurrently.

use crossbeam_channel::{bounded, Receiver, TryRecvError};
use log::debug;

use crate::compositor;
use crate::geometry::Rect;
use crate::gesture::{DragRecognizer, PinchRecognizer, PointerEvent, PointerPhase, RotationRecognizer};
use crate::photo::{PhotoTransformState, TransformSnapshot};
use crate::region::{CropAreaSnapshot, CropRegion};
use crate::types::{Bitmap, CropError};
use crate::workers::Workers;
use crate::{CropConfig, CropMode};

/// Lifecycle of one crop session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No photo assigned yet.
    Empty,
    /// Photo assigned, default geometry computed.
    Loaded,
    /// Touch in progress; transform or crop geometry mutating.
    Interacting,
    /// Crop-to-bitmap in flight on a worker.
    Committing,
    /// Output bitmap produced and handed off.
    Committed,
    /// Load or crop failed, or the session was torn down.
    Cancelled,
}

/// One interactive crop session over one photo.
pub struct CropSession {
    photo: PhotoTransformState,
    region: CropRegion,
    mode: CropMode,
    drag: DragRecognizer,
    pinch: PinchRecognizer,
    rotation: RotationRecognizer,
    state: SessionState,
    view: Option<(u32, u32)>,
    needs_redraw: bool,
    pending_photo: Option<Receiver<Result<Bitmap, CropError>>>,
    pending_crop: Option<Receiver<Result<Bitmap, CropError>>>,
}

impl CropSession {
    pub fn new(config: CropConfig) -> Self {
        let mut photo = PhotoTransformState::new();
        photo.set_scale_limits(config.scale_limits);

        let mut region = CropRegion::new();
        region.set_aspect_ratio(config.aspect_ratio);
        region.set_max_size(config.max_crop_width, config.max_crop_height);
        region.set_horizontal_border(config.horizontal_border);
        region.set_vertical_border(config.vertical_border);
        region.set_min_scale(config.min_crop_scale);

        Self {
            photo,
            region,
            mode: config.crop_mode,
            drag: DragRecognizer::new(),
            pinch: PinchRecognizer::new(),
            rotation: RotationRecognizer::new(),
            state: SessionState::Empty,
            view: None,
            needs_redraw: false,
            pending_photo: None,
            pending_crop: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn mode(&self) -> CropMode {
        self.mode
    }

    /// Select which geometry receives gestures.
    pub fn set_mode(&mut self, mode: CropMode) {
        self.mode = mode;
    }

    pub fn photo(&self) -> &PhotoTransformState {
        &self.photo
    }

    pub fn region(&self) -> &CropRegion {
        &self.region
    }

    /// The crop window rectangle, for the host's overlay drawing.
    pub fn crop_rect(&self) -> Rect {
        self.region.rect()
    }

    /// True once per change; hosts drain this to schedule a redraw.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    pub fn set_view_size(&mut self, width: u32, height: u32) {
        self.view = Some((width, height));
        self.photo.set_view_size(width, height);
        self.region.set_view_size(width, height);
        self.needs_redraw = true;
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.region.set_aspect_ratio(aspect_ratio);
        self.needs_redraw = true;
    }

    pub fn set_crop_borders(&mut self, horizontal_px: f32, vertical_px: f32) {
        self.region.set_horizontal_border(horizontal_px);
        self.region.set_vertical_border(vertical_px);
        self.needs_redraw = true;
    }

    /// Assign an already-decoded photo. `Empty -> Loaded`.
    pub fn set_photo(&mut self, photo: Bitmap) {
        self.photo.set_photo(photo);
        if self.state == SessionState::Empty {
            self.state = SessionState::Loaded;
        }
        self.needs_redraw = true;
    }

    /// Decode a photo on a worker thread. `decode` is the host's decode step
    /// (EXIF-corrected); its result is applied by [`CropSession::poll_photo`].
    pub fn load_photo<F>(&mut self, workers: &Workers, decode: F)
    where
        F: FnOnce() -> Result<Bitmap, CropError> + Send + 'static,
    {
        let (tx, rx) = bounded(1);
        self.pending_photo = Some(rx);
        workers.execute_with_epoch(workers.current_epoch(), move || {
            let result = decode();
            tx.send(result).ok();
        });
    }

    /// Apply a finished decode, if any. Call from the owning thread.
    ///
    /// Returns `Some(Err(_))` when the load failed; the session is then
    /// `Cancelled` and the host should close the crop screen.
    pub fn poll_photo(&mut self) -> Option<Result<(), CropError>> {
        let rx = self.pending_photo.as_ref()?;
        match rx.try_recv() {
            Ok(Ok(bitmap)) => {
                self.pending_photo = None;
                self.set_photo(bitmap);
                Some(Ok(()))
            }
            Ok(Err(e)) => {
                debug!("photo load failed: {}", e);
                self.pending_photo = None;
                self.state = SessionState::Cancelled;
                Some(Err(e))
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.pending_photo = None;
                self.state = SessionState::Cancelled;
                Some(Err(CropError::Cancelled))
            }
        }
    }

    /// Route one pointer event to the recognizers and apply the resulting
    /// deltas. Ignored unless the session is `Loaded` or `Interacting`.
    pub fn handle_pointer_event(&mut self, ev: &PointerEvent) {
        if !matches!(self.state, SessionState::Loaded | SessionState::Interacting) {
            return;
        }

        match ev.phase {
            PointerPhase::Down => self.state = SessionState::Interacting,
            PointerPhase::Up | PointerPhase::Cancel => self.state = SessionState::Loaded,
            _ => {}
        }

        // Event order is authoritative: drag, then pinch, then rotation.
        let drag = self.drag.handle(ev);
        let pinch = self.pinch.handle(ev);
        let rotation = match self.mode {
            CropMode::MoveImage => self.rotation.handle(ev),
            // The crop window never rotates.
            CropMode::MoveCrop => None,
        };

        for event in [drag, pinch, rotation].into_iter().flatten() {
            match self.mode {
                CropMode::MoveImage => self.photo.apply(event),
                CropMode::MoveCrop => self.region.apply(event),
            }
        }
        self.needs_redraw = true;
    }

    /// Render the current composition at view size, exactly as the crop
    /// output will see it. Hosts draw this plus their overlay.
    pub fn render(&self) -> Result<Bitmap, CropError> {
        let (view_w, view_h) = self.view.ok_or(CropError::InvalidDimensions)?;
        let photo = self.photo.scaled().ok_or(CropError::PhotoNotLoaded)?;
        compositor::render(photo, self.photo.transform(), view_w, view_h)
    }

    /// Start the final crop on a worker thread. `Interacting -> Committing`.
    ///
    /// The worker reads a snapshot of the photo, transform, and crop
    /// rectangle taken synchronously here, so later gestures cannot tear the
    /// composition.
    ///
    /// # Errors
    ///
    /// Fails fast with `CropError::PhotoNotLoaded` /
    /// `CropError::InvalidDimensions` instead of producing a partial bitmap.
    pub fn commit(&mut self, workers: &Workers) -> Result<(), CropError> {
        if !matches!(self.state, SessionState::Loaded | SessionState::Interacting) {
            return Err(CropError::Cancelled);
        }
        let (view_w, view_h) = self.view.ok_or(CropError::InvalidDimensions)?;
        let photo = self
            .photo
            .scaled()
            .ok_or(CropError::PhotoNotLoaded)?
            .clone();
        let transform = *self.photo.transform();
        let region = self.region.rect();

        debug!("starting crop commit");
        self.state = SessionState::Committing;
        let (tx, rx) = bounded(1);
        self.pending_crop = Some(rx);
        workers.execute_with_epoch(workers.current_epoch(), move || {
            let result = compositor::crop_to_bitmap(&photo, &transform, view_w, view_h, region);
            tx.send(result).ok();
        });
        Ok(())
    }

    /// Collect a finished commit, if any. Call from the owning thread.
    ///
    /// `Committing -> Committed` with the output bitmap on success; any
    /// failure (including a cancelled worker job) moves to `Cancelled`.
    pub fn poll_commit(&mut self) -> Option<Result<Bitmap, CropError>> {
        let rx = self.pending_crop.as_ref()?;
        match rx.try_recv() {
            Ok(Ok(bitmap)) => {
                self.pending_crop = None;
                self.state = SessionState::Committed;
                debug!("crop committed: {}x{}", bitmap.width, bitmap.height);
                Some(Ok(bitmap))
            }
            Ok(Err(e)) => {
                debug!("crop failed: {}", e);
                self.pending_crop = None;
                self.state = SessionState::Cancelled;
                Some(Err(e))
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.pending_crop = None;
                self.state = SessionState::Cancelled;
                Some(Err(CropError::Cancelled))
            }
        }
    }

    /// Tear the session down: outstanding decode/composition jobs are
    /// invalidated and will never deliver into this session.
    pub fn abort(&mut self, workers: &Workers) {
        workers.bump_epoch();
        self.pending_photo = None;
        self.pending_crop = None;
        self.state = SessionState::Cancelled;
    }

    pub fn take_crop_snapshot(&self) -> CropAreaSnapshot {
        self.region.take_snapshot()
    }

    pub fn apply_crop_snapshot(&mut self, snapshot: CropAreaSnapshot) {
        self.region.apply_snapshot(snapshot);
        self.needs_redraw = true;
    }

    pub fn take_transform_snapshot(&self) -> Result<TransformSnapshot, CropError> {
        self.photo.take_snapshot()
    }

    pub fn apply_transform_snapshot(&mut self, snapshot: TransformSnapshot) {
        self.photo.apply_snapshot(snapshot);
        self.needs_redraw = true;
    }

    /// Clear restored snapshots and recompute default geometry.
    pub fn reset_defaults(&mut self) {
        self.photo.reset_defaults();
        self.region.reset_defaults();
        self.needs_redraw = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::extract;
    use crate::gesture::testutil::*;
    use crate::types::FilterType;
    use std::time::Duration;

    fn gradient_photo(width: u32, height: u32) -> Bitmap {
        let mut bmp = Bitmap::blank(width, height);
        for y in 0..height {
            for x in 0..width {
                bmp.put_pixel(x, y, [(x % 256) as u8, (y % 256) as u8, 7, 255]);
            }
        }
        bmp
    }

    fn wait_for_commit(session: &mut CropSession) -> Result<Bitmap, CropError> {
        for _ in 0..500 {
            if let Some(result) = session.poll_commit() {
                return result;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        panic!("commit never completed");
    }

    #[test]
    fn test_lifecycle_empty_to_loaded_to_interacting() {
        let mut session = CropSession::new(CropConfig::default());
        assert_eq!(session.state(), SessionState::Empty);

        session.set_view_size(200, 200);
        session.set_photo(gradient_photo(100, 100));
        assert_eq!(session.state(), SessionState::Loaded);

        session.handle_pointer_event(&down(1, 10.0, 10.0));
        assert_eq!(session.state(), SessionState::Interacting);
        session.handle_pointer_event(&up(1, 10.0, 10.0));
        assert_eq!(session.state(), SessionState::Loaded);
    }

    #[test]
    fn test_touch_ignored_while_empty() {
        let mut session = CropSession::new(CropConfig::default());
        session.set_view_size(200, 200);
        session.handle_pointer_event(&down(1, 10.0, 10.0));
        assert_eq!(session.state(), SessionState::Empty);
    }

    #[test]
    fn test_move_image_mode_routes_drag_to_photo() {
        let mut session = CropSession::new(CropConfig::default());
        session.set_view_size(200, 200);
        session.set_photo(gradient_photo(200, 200));
        let crop_before = session.crop_rect();

        session.handle_pointer_event(&down(1, 50.0, 50.0));
        session.handle_pointer_event(&moved(vec![pointer(1, 60.0, 45.0)]));

        let coeffs = session.photo().transform().coeffs();
        assert_eq!((coeffs[4], coeffs[5]), (10.0, -5.0));
        // The crop window does not move in MoveImage mode.
        assert_eq!(session.crop_rect(), crop_before);
    }

    #[test]
    fn test_move_crop_mode_routes_drag_to_region() {
        let mut config = CropConfig::default();
        config.crop_mode = CropMode::MoveCrop;
        config.max_crop_width = Some(100.0);
        config.max_crop_height = Some(100.0);

        let mut session = CropSession::new(config);
        session.set_view_size(200, 200);
        session.set_photo(gradient_photo(200, 200));
        let transform_before = *session.photo().transform();
        let rect_before = session.crop_rect();

        session.handle_pointer_event(&down(1, 50.0, 50.0));
        session.handle_pointer_event(&moved(vec![pointer(1, 70.0, 50.0)]));

        assert_eq!(session.crop_rect().x, rect_before.x + 20);
        // The photo does not move in MoveCrop mode.
        assert_eq!(*session.photo().transform(), transform_before);
    }

    #[test]
    fn test_redraw_flag_drains_once() {
        let mut session = CropSession::new(CropConfig::default());
        session.set_view_size(100, 100);
        assert!(session.take_redraw());
        assert!(!session.take_redraw());
    }

    #[test]
    fn test_commit_without_photo_fails_fast() {
        let workers = Workers::new(1);
        let mut session = CropSession::new(CropConfig::default());
        session.set_view_size(200, 200);
        // Still Empty: commit refuses outright.
        assert!(session.commit(&workers).is_err());
        assert_eq!(session.state(), SessionState::Empty);
    }

    #[test]
    fn test_end_to_end_center_crop() {
        // A 400x300 photo in a 200x200 view with a square, borderless crop:
        // the photo covers by height (266x200) and the commit output is the
        // centered 200x200 of that scaled photo.
        let workers = Workers::new(2);
        let mut session = CropSession::new(CropConfig::default());
        session.set_view_size(200, 200);

        let photo = gradient_photo(400, 300);
        session.set_photo(photo.clone());
        assert_eq!(session.crop_rect(), Rect::new(0, 0, 200, 200));

        session.commit(&workers).unwrap();
        assert_eq!(session.state(), SessionState::Committing);

        let output = wait_for_commit(&mut session).unwrap();
        assert_eq!(session.state(), SessionState::Committed);
        assert_eq!((output.width, output.height), (200, 200));

        let scaled = photo.resize(266, 200, FilterType::Bilinear).unwrap();
        let expected = extract(&scaled, Rect::new(33, 0, 200, 200)).unwrap();
        assert_eq!(output, expected);
    }

    #[test]
    fn test_commit_after_gestures_matches_live_render() {
        let workers = Workers::new(1);
        let mut session = CropSession::new(CropConfig::default());
        session.set_view_size(120, 120);
        session.set_photo(gradient_photo(120, 120));

        session.handle_pointer_event(&down(1, 60.0, 60.0));
        session.handle_pointer_event(&moved(vec![pointer(1, 67.0, 51.0)]));
        session.handle_pointer_event(&up(1, 67.0, 51.0));

        let live = session.render().unwrap();
        let rect = session.crop_rect();

        session.commit(&workers).unwrap();
        let output = wait_for_commit(&mut session).unwrap();

        let expected = extract(&live, rect).unwrap();
        assert_eq!(output, expected);
    }

    #[test]
    fn test_abort_cancels_outstanding_commit() {
        let workers = Workers::new(1);
        let mut session = CropSession::new(CropConfig::default());
        session.set_view_size(200, 200);
        session.set_photo(gradient_photo(400, 300));

        session.commit(&workers).unwrap();
        session.abort(&workers);
        assert_eq!(session.state(), SessionState::Cancelled);

        // Nothing ever delivers into the aborted session.
        assert!(session.poll_commit().is_none());
    }

    #[test]
    fn test_load_photo_success_and_failure() {
        let workers = Workers::new(1);

        let mut session = CropSession::new(CropConfig::default());
        session.set_view_size(100, 100);
        session.load_photo(&workers, || Ok(Bitmap::blank(50, 50)));
        let result = loop {
            if let Some(r) = session.poll_photo() {
                break r;
            }
            std::thread::sleep(Duration::from_millis(5));
        };
        assert!(result.is_ok());
        assert_eq!(session.state(), SessionState::Loaded);

        let mut failing = CropSession::new(CropConfig::default());
        failing.set_view_size(100, 100);
        failing.load_photo(&workers, || {
            Err(CropError::DecodeFailed("corrupt image".into()))
        });
        let result = loop {
            if let Some(r) = failing.poll_photo() {
                break r;
            }
            std::thread::sleep(Duration::from_millis(5));
        };
        assert!(matches!(result, Err(CropError::DecodeFailed(_))));
        assert_eq!(failing.state(), SessionState::Cancelled);
    }
}
