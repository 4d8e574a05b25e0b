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

use tokio::sync::mpsc;
use uuid::Uuid;

/// Identifies one live overlay controller instance. Freshly generated per
/// controller and never reused, so an event carrying an id from a torn-down
/// session can always be recognized as stale.
pub type OverlayId = Uuid;

/// Events flowing from overlay windows and item watches back to the session
/// loop. The loop feeds them into the orchestrator, which routes each to the
/// controller it addresses.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The hosted media primitive finished playing the current item.
    MediaEnded { overlay_id: OverlayId },

    /// The hosted media primitive failed to load or decode the current item.
    MediaFailed { overlay_id: OverlayId, error: String },

    /// The overlay window completed its first layout pass; scale-dependent
    /// placement may run now.
    WindowReady { overlay_id: OverlayId },

    /// The stored opacity/volume of the overlay's current item changed.
    SettingsChanged { overlay_id: OverlayId },
}

impl SessionEvent {
    pub fn overlay_id(&self) -> OverlayId {
        match self {
            SessionEvent::MediaEnded { overlay_id }
            | SessionEvent::MediaFailed { overlay_id, .. }
            | SessionEvent::WindowReady { overlay_id }
            | SessionEvent::SettingsChanged { overlay_id } => *overlay_id,
        }
    }
}

pub type SessionEventSender = mpsc::UnboundedSender<SessionEvent>;
pub type SessionEventReceiver = mpsc::UnboundedReceiver<SessionEvent>;

pub fn session_channel() -> (SessionEventSender, SessionEventReceiver) {
    mpsc::unbounded_channel()
}
