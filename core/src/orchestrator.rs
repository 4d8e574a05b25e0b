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
use thiserror::Error;

use crate::controller::SurfaceController;
use crate::events::{session_channel, SessionEvent, SessionEventReceiver, SessionEventSender};
use crate::item::SharedItem;
use crate::planner::AssignmentPlan;
use crate::surface::ScreenSurface;
use crate::window::{BackendError, OverlayBackend};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session start failed: {0}")]
    Start(#[from] BackendError),
}

/// Top-level playback façade. Owns the one active session, creates and
/// destroys surface controllers, and is the single source of truth for
/// whether anything is playing. Not internally synchronized: the owner
/// serializes every call, including [`Orchestrator::dispatch`], on the one
/// context that also owns the windows.
pub struct Orchestrator<B: OverlayBackend> {
    backend: B,
    active: Vec<SurfaceController<B::Window>>,
    events: SessionEventSender,
}

impl<B: OverlayBackend> Orchestrator<B> {
    /// Returns the orchestrator plus the session event stream its owner must
    /// drain and feed back through [`Orchestrator::dispatch`].
    pub fn new(backend: B) -> (Self, SessionEventReceiver) {
        let (events, receiver) = session_channel();
        (Orchestrator { backend, active: Vec::new(), events }, receiver)
    }

    /// Starts a session playing the same ordered sequence independently on
    /// every given surface. Any previous session is fully torn down first;
    /// an empty item list tears down and starts nothing.
    pub fn play_on_surfaces(
        &mut self,
        items: &[SharedItem],
        surfaces: &[ScreenSurface],
    ) -> Result<(), SessionError> {
        self.stop_all();
        if items.is_empty() {
            return Ok(());
        }
        for surface in surfaces {
            self.start_controller(Some(surface), items.to_vec())?;
        }
        info!(
            "session started: {} items shared across {} surfaces",
            items.len(),
            self.active.len()
        );
        Ok(())
    }

    /// Starts a session with one controller per non-empty plan group. A
    /// group whose surface id is absent from `surfaces` still gets a window,
    /// at default placement.
    pub fn play_per_surface(
        &mut self,
        plan: AssignmentPlan,
        surfaces: &[ScreenSurface],
    ) -> Result<(), SessionError> {
        self.stop_all();
        for (surface_id, items) in plan.into_groups() {
            if items.is_empty() {
                continue;
            }
            let surface = surfaces.iter().find(|s| s.id == surface_id);
            if surface.is_none() {
                warn!("surface {surface_id} is not in the catalog, window gets default placement");
            }
            self.start_controller(surface, items)?;
        }
        info!("session started: {} surface controllers", self.active.len());
        Ok(())
    }

    fn start_controller(
        &mut self,
        surface: Option<&ScreenSurface>,
        items: Vec<SharedItem>,
    ) -> Result<(), SessionError> {
        let events = self.events.clone();
        match SurfaceController::create(&mut self.backend, surface, &events) {
            Ok(mut controller) => {
                controller.set_queue(items);
                self.active.push(controller);
                Ok(())
            }
            Err(err) => {
                // No partial sessions: whatever was already created goes
                // down with the failed start.
                self.stop_all();
                Err(SessionError::Start(err))
            }
        }
    }

    /// Broadcasts pause to every active machine. No session, no effect.
    pub fn pause_all(&mut self) {
        for controller in &mut self.active {
            controller.pause();
        }
    }

    /// Broadcasts play to every active machine, resuming paused ones.
    pub fn continue_all(&mut self) {
        for controller in &mut self.active {
            controller.play();
        }
    }

    /// Disposes every active controller and clears the set. Idempotent.
    pub fn stop_all(&mut self) {
        if self.active.is_empty() {
            return;
        }
        info!("stopping session with {} overlays", self.active.len());
        for mut controller in self.active.drain(..) {
            controller.dispose();
        }
    }

    /// Transient volume override broadcast to every active machine. Items
    /// keep their stored values.
    pub fn set_volume_all(&mut self, volume: f64) {
        for controller in &mut self.active {
            controller.override_volume(volume);
        }
    }

    /// Transient opacity override broadcast to every active machine.
    pub fn set_opacity_all(&mut self, opacity: f64) {
        for controller in &mut self.active {
            controller.override_opacity(opacity);
        }
    }

    pub fn is_playing(&self) -> bool {
        !self.active.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Ids of the live controllers, in creation order.
    pub fn active_overlays(&self) -> Vec<crate::events::OverlayId> {
        self.active.iter().map(|c| c.overlay_id()).collect()
    }

    /// Routes one session event to the controller it addresses. Events for
    /// overlays no longer in the active set are stale by definition, for
    /// example a media-ended fired just before its controller was disposed,
    /// and are dropped.
    pub fn dispatch(&mut self, event: SessionEvent) {
        let overlay_id = event.overlay_id();
        let Some(controller) = self.active.iter_mut().find(|c| c.overlay_id() == overlay_id)
        else {
            debug!("dropping stale session event {event:?}");
            return;
        };
        match event {
            SessionEvent::MediaEnded { .. } => controller.handle_media_ended(),
            SessionEvent::MediaFailed { error, .. } => controller.handle_media_failed(&error),
            SessionEvent::WindowReady { .. } => controller.complete_placement(),
            SessionEvent::SettingsChanged { .. } => controller.sync_item_settings(),
        }
    }
}

impl<B: OverlayBackend> Drop for Orchestrator<B> {
    fn drop(&mut self) {
        self.stop_all();
    }
}
