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

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use url::Url;

use crate::surface::SurfaceId;
use crate::validate;

pub const DEFAULT_OPACITY: f64 = 0.9;
pub const DEFAULT_VOLUME: f64 = 0.5;

pub(crate) fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Live playback settings of one item, broadcast through a watch channel so
/// the state machine currently holding the item can mirror changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemSettings {
    pub opacity: f64,
    pub volume: f64,
}

impl Default for ItemSettings {
    fn default() -> Self {
        ItemSettings { opacity: DEFAULT_OPACITY, volume: DEFAULT_VOLUME }
    }
}

impl ItemSettings {
    pub(crate) fn clamped(self) -> Self {
        ItemSettings { opacity: clamp_unit(self.opacity), volume: clamp_unit(self.volume) }
    }
}

/// Result of the last on-demand validation pass over an item's locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationStatus {
    #[default]
    Unknown,
    Valid,
    Missing,
    Invalid,
}

#[derive(Debug, Default)]
struct ValidationSlot {
    status: ValidationStatus,
    message: Option<String>,
}

/// A playable source parsed out of a raw locator. Only absolute http(s) URLs
/// and absolute filesystem paths qualify; everything else is unplayable and
/// parses to `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaSource {
    File(PathBuf),
    Url(Url),
}

impl MediaSource {
    pub fn parse(locator: &str) -> Option<MediaSource> {
        if let Ok(url) = Url::parse(locator) {
            // Drive-letter paths parse as URLs with a one-letter scheme, so
            // the scheme check has to come before the path check.
            if matches!(url.scheme(), "http" | "https") {
                return Some(MediaSource::Url(url));
            }
        }
        let path = Path::new(locator);
        if path.is_absolute() {
            return Some(MediaSource::File(path.to_path_buf()));
        }
        None
    }
}

impl fmt::Display for MediaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaSource::File(path) => write!(f, "{}", path.display()),
            MediaSource::Url(url) => f.write_str(url.as_str()),
        }
    }
}

pub type SharedItem = Arc<VideoItem>;

/// One playlist entry. The raw locator is kept exactly as entered and parsed
/// on use; opacity and volume are live values observable through
/// [`VideoItem::watch_settings`]. The surface assignment is a lookup key into
/// the catalog, never ownership of a surface.
#[derive(Debug)]
pub struct VideoItem {
    locator: String,
    title: Mutex<Option<String>>,
    assigned_surface: Mutex<Option<SurfaceId>>,
    validation: Mutex<ValidationSlot>,
    settings: watch::Sender<ItemSettings>,
}

impl VideoItem {
    pub fn new(locator: impl Into<String>) -> SharedItem {
        Self::with_settings(locator, ItemSettings::default())
    }

    pub fn with_settings(locator: impl Into<String>, settings: ItemSettings) -> SharedItem {
        Arc::new(VideoItem {
            locator: locator.into(),
            title: Mutex::new(None),
            assigned_surface: Mutex::new(None),
            validation: Mutex::new(ValidationSlot::default()),
            settings: watch::Sender::new(settings.clamped()),
        })
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }

    /// Parses the raw locator into a playable source, if it is one.
    pub fn source(&self) -> Option<MediaSource> {
        MediaSource::parse(&self.locator)
    }

    pub fn is_url(&self) -> bool {
        matches!(self.source(), Some(MediaSource::Url(_)))
    }

    pub fn settings(&self) -> ItemSettings {
        *self.settings.borrow()
    }

    /// Subscribes to stored-settings changes. The receiver sees values sent
    /// after subscription only.
    pub fn watch_settings(&self) -> watch::Receiver<ItemSettings> {
        self.settings.subscribe()
    }

    pub fn set_opacity(&self, opacity: f64) {
        let opacity = clamp_unit(opacity);
        self.settings.send_if_modified(|s| {
            if s.opacity == opacity {
                return false;
            }
            s.opacity = opacity;
            true
        });
    }

    pub fn set_volume(&self, volume: f64) {
        let volume = clamp_unit(volume);
        self.settings.send_if_modified(|s| {
            if s.volume == volume {
                return false;
            }
            s.volume = volume;
            true
        });
    }

    pub fn title(&self) -> Option<String> {
        self.title.lock().unwrap().clone()
    }

    pub fn set_title(&self, title: Option<String>) {
        *self.title.lock().unwrap() = title;
    }

    pub fn assigned_surface(&self) -> Option<SurfaceId> {
        self.assigned_surface.lock().unwrap().clone()
    }

    pub fn assign_surface(&self, surface: Option<SurfaceId>) {
        *self.assigned_surface.lock().unwrap() = surface;
    }

    pub fn validation_status(&self) -> ValidationStatus {
        self.validation.lock().unwrap().status
    }

    pub fn validation_error(&self) -> Option<String> {
        self.validation.lock().unwrap().message.clone()
    }

    /// Re-runs locator classification and stores the outcome. Validation is
    /// on demand only; mutating the item never triggers it.
    pub fn revalidate(&self) -> ValidationStatus {
        let outcome = validate::classify_locator(&self.locator);
        let mut slot = self.validation.lock().unwrap();
        slot.status = outcome.status;
        slot.message = outcome.message;
        slot.status
    }

    /// Human-readable name: the explicit title when set, the last URL path
    /// segment (or host) for URLs, the file name for paths, the raw locator
    /// as a last resort.
    pub fn display_name(&self) -> String {
        if let Some(title) = self.title() {
            if !title.trim().is_empty() {
                return title;
            }
        }
        match self.source() {
            Some(MediaSource::Url(url)) => {
                let segment = url
                    .path_segments()
                    .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
                    .map(str::to_string);
                match segment {
                    Some(name) => name,
                    None => url.host_str().unwrap_or(&self.locator).to_string(),
                }
            }
            Some(MediaSource::File(path)) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.locator.clone()),
            None => self.locator.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abs(name: &str) -> String {
        std::env::temp_dir().join(name).to_string_lossy().into_owned()
    }

    #[test]
    fn parse_classifies_urls_and_absolute_paths() {
        assert!(matches!(
            MediaSource::parse("https://example.com/clip.mp4"),
            Some(MediaSource::Url(_))
        ));
        assert!(matches!(MediaSource::parse(&abs("clip.mp4")), Some(MediaSource::File(_))));
        assert_eq!(MediaSource::parse("clips/relative.mp4"), None);
        assert_eq!(MediaSource::parse(""), None);
    }

    #[test]
    fn display_name_prefers_title_over_locator() {
        let item = VideoItem::new("https://example.com/videos/intro.mp4");
        assert_eq!(item.display_name(), "intro.mp4");
        item.set_title(Some("Welcome clip".to_string()));
        assert_eq!(item.display_name(), "Welcome clip");
    }

    #[test]
    fn display_name_falls_back_to_host_for_bare_urls() {
        let item = VideoItem::new("https://example.com/");
        assert_eq!(item.display_name(), "example.com");
    }

    #[test]
    fn display_name_uses_file_name_for_paths() {
        let item = VideoItem::new(abs("session.mkv"));
        assert_eq!(item.display_name(), "session.mkv");
    }

    #[tokio::test]
    async fn settings_watch_sees_mutations() {
        let item = VideoItem::new(abs("clip.mp4"));
        let mut rx = item.watch_settings();

        item.set_volume(0.3);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().volume, 0.3);

        // Same value again must not wake the watcher.
        item.set_volume(0.3);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn setters_clamp_into_unit_range() {
        let item = VideoItem::with_settings(abs("clip.mp4"), ItemSettings { opacity: 7.0, volume: -1.0 });
        assert_eq!(item.settings(), ItemSettings { opacity: 1.0, volume: 0.0 });
        item.set_volume(2.5);
        assert_eq!(item.settings().volume, 1.0);
    }
}
