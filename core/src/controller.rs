// Copyright 2025 HEM Sp. z o.o.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use log::{debug, info, warn};
use uuid::Uuid;

use crate::events::{OverlayId, SessionEventSender};
use crate::item::SharedItem;
use crate::playback::QueuePlayer;
use crate::surface::{PhysicalBounds, ScreenSurface, SurfaceId};
use crate::window::{BackendError, OverlayBackend, OverlayWindow};

/// Owns exactly one overlay window and the state machine feeding it.
/// Everything here runs on the single context that created the window.
pub struct SurfaceController<W: OverlayWindow> {
    overlay_id: OverlayId,
    surface_id: Option<SurfaceId>,
    physical: Option<PhysicalBounds>,
    window: W,
    player: QueuePlayer,
    placed: bool,
    disposed: bool,
}

impl<W: OverlayWindow> SurfaceController<W> {
    /// Creates and shows the overlay window, then applies phase-one physical
    /// placement. Without a resolvable surface, or when the placement call
    /// fails, the window keeps the backend's default placement and a warning
    /// is logged; only failing to create the window at all is an error.
    pub fn create<B>(
        backend: &mut B,
        surface: Option<&ScreenSurface>,
        events: &SessionEventSender,
    ) -> Result<Self, BackendError>
    where
        B: OverlayBackend<Window = W>,
    {
        let overlay_id = Uuid::new_v4();
        let mut window = backend.create_window(overlay_id, events.clone())?;

        let physical = surface.map(|s| s.bounds);
        match surface {
            Some(surface) => {
                if let Err(err) = window.place_physical(surface.bounds) {
                    warn!(
                        "overlay {overlay_id}: physical placement on {} failed ({err}), keeping default placement",
                        surface.id
                    );
                }
            }
            None => {
                warn!("overlay {overlay_id}: no surface to bind, keeping default placement");
            }
        }

        info!(
            "overlay {overlay_id} created for surface {}",
            surface.map(|s| s.id.as_str()).unwrap_or("<unbound>")
        );
        Ok(SurfaceController {
            overlay_id,
            surface_id: surface.map(|s| s.id.clone()),
            physical,
            window,
            player: QueuePlayer::new(overlay_id, events.clone()),
            placed: false,
            disposed: false,
        })
    }

    pub fn overlay_id(&self) -> OverlayId {
        self.overlay_id
    }

    pub fn surface_id(&self) -> Option<&SurfaceId> {
        self.surface_id.as_ref()
    }

    pub fn player(&self) -> &QueuePlayer {
        &self.player
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn set_queue(&mut self, items: Vec<SharedItem>) {
        self.player.set_queue(items, &mut self.window);
    }

    pub fn play(&mut self) {
        self.player.play(&mut self.window);
    }

    pub fn pause(&mut self) {
        self.player.pause(&mut self.window);
    }

    pub fn stop(&mut self) {
        self.player.stop(&mut self.window);
    }

    pub fn override_volume(&mut self, volume: f64) {
        self.player.override_volume(volume, &mut self.window);
    }

    pub fn override_opacity(&mut self, opacity: f64) {
        self.player.override_opacity(opacity, &mut self.window);
    }

    pub fn sync_item_settings(&mut self) {
        self.player.sync_item_settings(&mut self.window);
    }

    pub fn handle_media_ended(&mut self) {
        self.player.on_media_ended(&mut self.window);
    }

    pub fn handle_media_failed(&mut self, error: &str) {
        self.player.on_media_failed(error, &mut self.window);
    }

    /// Phase-two placement, run once the window reports its first layout
    /// pass done: mirror the physical bounds into the logical coordinate
    /// model using the now-known scale factor.
    pub fn complete_placement(&mut self) {
        if self.disposed || self.placed {
            return;
        }
        let Some(physical) = self.physical else {
            // Unbound window at default placement, nothing to mirror.
            self.placed = true;
            return;
        };
        match self.window.scale_factor() {
            Some(scale) => {
                let logical = physical.to_logical(scale);
                debug!(
                    "overlay {}: logical placement {:?} from {:?} at scale ({}, {})",
                    self.overlay_id, logical, physical, scale.x, scale.y
                );
                self.window.place_logical(logical);
                self.placed = true;
            }
            None => {
                warn!(
                    "overlay {}: window ready without a scale factor, keeping physical placement only",
                    self.overlay_id
                );
            }
        }
    }

    /// Stops playback, releases the media resource and closes the window.
    /// Calling it again, or on an already-closed window, is a no-op.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.player.stop(&mut self.window);
        self.window.close();
        info!("overlay {} disposed", self.overlay_id);
    }
}

impl<W: OverlayWindow> Drop for SurfaceController<W> {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::session_channel;
    use crate::item::{MediaSource, VideoItem};
    use crate::surface::{LogicalBounds, ScaleFactor};
    use crate::window::{PlacementError, PlaybackCommands};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        PlacePhysical(PhysicalBounds),
        PlaceLogical(LogicalBounds),
        Play,
        Pause,
        Stop,
        Close,
    }

    struct TestWindow {
        scale: Option<ScaleFactor>,
        fail_placement: bool,
        calls: Rc<RefCell<Vec<Call>>>,
    }

    impl PlaybackCommands for TestWindow {
        fn load(&mut self, _source: &MediaSource) {}
        fn play(&mut self) {
            self.calls.borrow_mut().push(Call::Play);
        }
        fn pause(&mut self) {
            self.calls.borrow_mut().push(Call::Pause);
        }
        fn stop(&mut self) {
            self.calls.borrow_mut().push(Call::Stop);
        }
        fn set_volume(&mut self, _volume: f64) {}
        fn set_opacity(&mut self, _opacity: f64) {}
    }

    impl OverlayWindow for TestWindow {
        fn place_physical(&mut self, bounds: PhysicalBounds) -> Result<(), PlacementError> {
            if self.fail_placement {
                return Err(PlacementError::Os("denied".to_string()));
            }
            self.calls.borrow_mut().push(Call::PlacePhysical(bounds));
            Ok(())
        }
        fn scale_factor(&self) -> Option<ScaleFactor> {
            self.scale
        }
        fn place_logical(&mut self, bounds: LogicalBounds) {
            self.calls.borrow_mut().push(Call::PlaceLogical(bounds));
        }
        fn close(&mut self) {
            self.calls.borrow_mut().push(Call::Close);
        }
    }

    struct TestBackend {
        scale: Option<ScaleFactor>,
        fail_placement: bool,
        calls: Rc<RefCell<Vec<Call>>>,
    }

    impl TestBackend {
        fn new(scale: Option<ScaleFactor>) -> Self {
            TestBackend { scale, fail_placement: false, calls: Rc::new(RefCell::new(Vec::new())) }
        }
    }

    impl OverlayBackend for TestBackend {
        type Window = TestWindow;

        fn create_window(
            &mut self,
            _overlay_id: OverlayId,
            _events: SessionEventSender,
        ) -> Result<TestWindow, BackendError> {
            Ok(TestWindow {
                scale: self.scale,
                fail_placement: self.fail_placement,
                calls: self.calls.clone(),
            })
        }
    }

    fn surface() -> ScreenSurface {
        ScreenSurface {
            id: SurfaceId::from("\\\\.\\DISPLAY1"),
            bounds: PhysicalBounds::new(0, 0, 1920, 1080),
            is_primary: true,
        }
    }

    #[tokio::test]
    async fn creation_places_physically_and_ready_completes_logical_placement() {
        let mut backend = TestBackend::new(Some(ScaleFactor::uniform(1.25)));
        let calls = backend.calls.clone();
        let (tx, _rx) = session_channel();

        let mut controller = SurfaceController::create(&mut backend, Some(&surface()), &tx).unwrap();
        assert!(calls.borrow().contains(&Call::PlacePhysical(surface().bounds)));

        controller.complete_placement();
        let expected = LogicalBounds { x: 0.0, y: 0.0, width: 1536.0, height: 864.0 };
        assert!(calls.borrow().contains(&Call::PlaceLogical(expected)));
    }

    #[tokio::test]
    async fn placement_failure_still_yields_a_controller() {
        let mut backend = TestBackend::new(None);
        backend.fail_placement = true;
        let calls = backend.calls.clone();
        let (tx, _rx) = session_channel();

        let controller = SurfaceController::create(&mut backend, Some(&surface()), &tx).unwrap();
        assert!(!controller.is_disposed());
        assert!(!calls.borrow().iter().any(|c| matches!(c, Call::PlacePhysical(_))));
    }

    #[tokio::test]
    async fn missing_scale_factor_defers_phase_two() {
        let mut backend = TestBackend::new(None);
        let calls = backend.calls.clone();
        let (tx, _rx) = session_channel();

        let mut controller = SurfaceController::create(&mut backend, Some(&surface()), &tx).unwrap();
        controller.complete_placement();
        assert!(!calls.borrow().iter().any(|c| matches!(c, Call::PlaceLogical(_))));
    }

    #[tokio::test]
    async fn dispose_is_idempotent() {
        let mut backend = TestBackend::new(None);
        let calls = backend.calls.clone();
        let (tx, _rx) = session_channel();

        let mut controller = SurfaceController::create(&mut backend, Some(&surface()), &tx).unwrap();
        controller.set_queue(vec![VideoItem::new(
            std::env::temp_dir().join("a.mp4").to_string_lossy().into_owned(),
        )]);

        controller.dispose();
        controller.dispose();
        drop(controller);

        let recorded = calls.borrow();
        assert_eq!(recorded.iter().filter(|c| **c == Call::Close).count(), 1);
        assert_eq!(recorded.iter().filter(|c| **c == Call::Stop).count(), 1);
    }
}
