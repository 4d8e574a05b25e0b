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

use thiserror::Error;

use crate::events::{OverlayId, SessionEventSender};
use crate::item::MediaSource;
use crate::surface::{LogicalBounds, PhysicalBounds, ScaleFactor};

/// One-way commands the playback state machine issues against the media
/// primitive hosted by an overlay window. None of them report back; faults
/// surface asynchronously as session events.
pub trait PlaybackCommands {
    fn load(&mut self, source: &MediaSource);
    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);
    fn set_volume(&mut self, volume: f64);
    fn set_opacity(&mut self, opacity: f64);
}

#[derive(Debug, Error)]
pub enum PlacementError {
    #[error("window placement call failed: {0}")]
    Os(String),
}

/// A realized overlay window bound to at most one surface. Implementations
/// are not required to be `Send`; every call happens on the context that
/// created the window.
pub trait OverlayWindow: PlaybackCommands {
    /// Phase-one placement: physical pixel bounds through an OS call that
    /// bypasses logical scaling, without changing the z-order, with a forced
    /// visual refresh.
    fn place_physical(&mut self, bounds: PhysicalBounds) -> Result<(), PlacementError>;

    /// Display scale of the backing window. `None` until the window has gone
    /// through its first layout pass.
    fn scale_factor(&self) -> Option<ScaleFactor>;

    /// Phase-two placement: logical bounds derived from the physical ones,
    /// keeping the toolkit's logical model consistent with what phase one
    /// already put on screen.
    fn place_logical(&mut self, bounds: LogicalBounds);

    /// Destroys the native window. Idempotent.
    fn close(&mut self);
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed to create overlay window: {0}")]
    WindowCreation(String),
}

/// Creates overlay windows. Borderless chrome and the click-through extended
/// style are the backend's concern and are applied before the window is
/// shown. The backend queues a `WindowReady` event on `events` once the
/// window's first layout pass is done.
pub trait OverlayBackend {
    type Window: OverlayWindow;

    fn create_window(
        &mut self,
        overlay_id: OverlayId,
        events: SessionEventSender,
    ) -> Result<Self::Window, BackendError>;
}
