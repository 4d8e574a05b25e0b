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

use log::{debug, warn};
use tokio::task::JoinHandle;

use crate::events::{OverlayId, SessionEvent, SessionEventSender};
use crate::item::{clamp_unit, ItemSettings, SharedItem};
use crate::window::PlaybackCommands;

/// Coarse bookkeeping state of one surface's playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerPhase {
    #[default]
    Idle,
    Playing,
    Paused,
}

/// Forwards stored-settings changes of the current item to the session
/// channel. Dropping the guard aborts the forwarder, which ties the release
/// of the subscription to every transition path, error paths included.
struct SettingsWatch {
    task: JoinHandle<()>,
}

impl SettingsWatch {
    fn spawn(item: &SharedItem, overlay_id: OverlayId, events: &SessionEventSender) -> Self {
        let mut rx = item.watch_settings();
        let events = events.clone();
        let task = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                if events.send(SessionEvent::SettingsChanged { overlay_id }).is_err() {
                    break;
                }
            }
        });
        SettingsWatch { task }
    }
}

impl Drop for SettingsWatch {
    fn drop(&mut self) {
        self.task.abort();
    }
}

struct CurrentItem {
    item: SharedItem,
    _watch: SettingsWatch,
}

/// Per-surface playback state machine: an owned queue, a wrapping cursor and
/// live opacity/volume outputs mirroring the current item. Every method that
/// can issue media commands borrows the command sink for the duration of the
/// call; the machine never owns the window it drives.
pub struct QueuePlayer {
    overlay_id: OverlayId,
    events: SessionEventSender,
    queue: Vec<SharedItem>,
    cursor: Option<usize>,
    current: Option<CurrentItem>,
    // Stored settings of the current item as last seen; the sync diff runs
    // against this, not against `live`, which overrides may have replaced.
    stored: ItemSettings,
    live: ItemSettings,
    phase: PlayerPhase,
}

impl QueuePlayer {
    pub fn new(overlay_id: OverlayId, events: SessionEventSender) -> Self {
        QueuePlayer {
            overlay_id,
            events,
            queue: Vec::new(),
            cursor: None,
            current: None,
            stored: ItemSettings::default(),
            live: ItemSettings::default(),
            phase: PlayerPhase::Idle,
        }
    }

    pub fn phase(&self) -> PlayerPhase {
        self.phase
    }

    /// Live outputs currently applied to the window: the current item's
    /// stored settings, unless a transient override replaced them.
    pub fn live_settings(&self) -> ItemSettings {
        self.live
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current_item(&self) -> Option<&SharedItem> {
        self.current.as_ref().map(|current| &current.item)
    }

    /// Replaces the queue, resets the cursor to before-first and immediately
    /// advances to the first item. An empty queue leaves the machine idle
    /// and issues no command at all.
    pub fn set_queue<S>(&mut self, items: Vec<SharedItem>, sink: &mut S)
    where
        S: PlaybackCommands + ?Sized,
    {
        self.current = None;
        self.queue = items;
        self.cursor = None;
        if self.queue.is_empty() {
            self.phase = PlayerPhase::Idle;
            debug!("overlay {}: queue cleared, staying idle", self.overlay_id);
            return;
        }
        self.advance(sink);
    }

    /// Moves the cursor forward by one, wrapping past the end, and loads the
    /// item it lands on. There is no end-of-playlist state.
    pub fn advance<S>(&mut self, sink: &mut S)
    where
        S: PlaybackCommands + ?Sized,
    {
        if self.queue.is_empty() {
            return;
        }
        let next = match self.cursor {
            Some(pos) if pos + 1 < self.queue.len() => pos + 1,
            _ => 0,
        };
        self.cursor = Some(next);
        self.load_current(sink);
    }

    fn load_current<S>(&mut self, sink: &mut S)
    where
        S: PlaybackCommands + ?Sized,
    {
        // Release the previous item's watch before anything else so the
        // subscription never outlives its item being current.
        self.current = None;
        let Some(pos) = self.cursor else {
            return;
        };
        let Some(item) = self.queue.get(pos).cloned() else {
            return;
        };

        let watch = SettingsWatch::spawn(&item, self.overlay_id, &self.events);
        self.stored = item.settings();
        self.live = self.stored;
        let source = item.source();
        let locator = item.locator().to_string();
        self.current = Some(CurrentItem { item, _watch: watch });

        sink.set_opacity(self.live.opacity);
        sink.set_volume(self.live.volume);

        match source {
            Some(source) => {
                debug!("overlay {}: loading {source}", self.overlay_id);
                sink.load(&source);
                sink.play();
                self.phase = PlayerPhase::Playing;
            }
            None => {
                // Not an absolute locator, so no load and no play. Nothing
                // will fire media-ended for it; the machine sits on this
                // item until an external command moves it.
                debug!(
                    "overlay {}: locator {locator:?} is not playable, load aborted",
                    self.overlay_id
                );
            }
        }
    }

    /// The current item finished normally; move to the next one.
    pub fn on_media_ended<S>(&mut self, sink: &mut S)
    where
        S: PlaybackCommands + ?Sized,
    {
        debug!("overlay {}: media ended", self.overlay_id);
        self.advance(sink);
    }

    /// A playback fault counts as end-of-item so the surface never sticks on
    /// a broken entry.
    pub fn on_media_failed<S>(&mut self, error: &str, sink: &mut S)
    where
        S: PlaybackCommands + ?Sized,
    {
        warn!("overlay {}: media failed ({error}), advancing", self.overlay_id);
        self.advance(sink);
    }

    /// Mirrors a stored-settings change of the current item into the live
    /// outputs. Only the field whose stored value actually changed is
    /// re-read and pushed; a transient override of the other field stays in
    /// force. No reload, no play command.
    pub fn sync_item_settings<S>(&mut self, sink: &mut S)
    where
        S: PlaybackCommands + ?Sized,
    {
        let Some(current) = self.current.as_ref() else {
            return;
        };
        let fresh = current.item.settings();
        if fresh.opacity != self.stored.opacity {
            self.live.opacity = fresh.opacity;
            sink.set_opacity(self.live.opacity);
        }
        if fresh.volume != self.stored.volume {
            self.live.volume = fresh.volume;
            sink.set_volume(self.live.volume);
        }
        self.stored = fresh;
    }

    /// Transient volume override. The next item load replaces it with the
    /// item's stored value; the items themselves are never written to.
    pub fn override_volume<S>(&mut self, volume: f64, sink: &mut S)
    where
        S: PlaybackCommands + ?Sized,
    {
        self.live.volume = clamp_unit(volume);
        sink.set_volume(self.live.volume);
    }

    /// Transient opacity override, same lifetime as [`override_volume`].
    pub fn override_opacity<S>(&mut self, opacity: f64, sink: &mut S)
    where
        S: PlaybackCommands + ?Sized,
    {
        self.live.opacity = clamp_unit(opacity);
        sink.set_opacity(self.live.opacity);
    }

    /// Issues a play command regardless of bookkeeping state; the cursor does
    /// not move.
    pub fn play<S>(&mut self, sink: &mut S)
    where
        S: PlaybackCommands + ?Sized,
    {
        sink.play();
        if !self.queue.is_empty() {
            self.phase = PlayerPhase::Playing;
        }
    }

    /// Issues a pause command regardless of bookkeeping state.
    pub fn pause<S>(&mut self, sink: &mut S)
    where
        S: PlaybackCommands + ?Sized,
    {
        sink.pause();
        if self.phase == PlayerPhase::Playing {
            self.phase = PlayerPhase::Paused;
        }
    }

    /// Issues a stop command and goes idle. The queue and cursor survive so
    /// a later play can resume; the current-item watch does not.
    pub fn stop<S>(&mut self, sink: &mut S)
    where
        S: PlaybackCommands + ?Sized,
    {
        sink.stop();
        self.current = None;
        self.phase = PlayerPhase::Idle;
    }
}
