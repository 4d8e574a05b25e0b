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

//! Durable playlist form. A snapshot keeps only what survives a restart:
//! locator, surface binding, per-item settings and the resolved title.
//! Runtime state like validation results or the playback cursor is rebuilt.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::item::{ItemSettings, SharedItem, VideoItem};
use crate::surface::{rebind_surface, ScreenSurface, SurfaceId};

#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error("playlist io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("playlist parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaylistEntry {
    pub locator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface: Option<SurfaceId>,
    pub opacity: f64,
    pub volume: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PlaylistSnapshot {
    pub items: Vec<PlaylistEntry>,
}

impl PlaylistSnapshot {
    /// Freezes the live items into their durable form, preserving order.
    pub fn capture(items: &[SharedItem]) -> Self {
        let items = items
            .iter()
            .map(|item| {
                let settings = item.settings();
                PlaylistEntry {
                    locator: item.locator().to_string(),
                    surface: item.assigned_surface(),
                    opacity: settings.opacity,
                    volume: settings.volume,
                    title: item.title(),
                }
            })
            .collect();
        PlaylistSnapshot { items }
    }

    /// Rebuilds live items against the current surface catalog. A persisted
    /// surface id that no longer enumerates is rebound to the primary
    /// surface, then to the first one; with an empty catalog the item comes
    /// back unassigned.
    pub fn restore(&self, surfaces: &[ScreenSurface]) -> Vec<SharedItem> {
        self.items
            .iter()
            .map(|entry| {
                let item = VideoItem::with_settings(
                    entry.locator.clone(),
                    ItemSettings { opacity: entry.opacity, volume: entry.volume },
                );
                item.set_title(entry.title.clone());
                let bound = rebind_surface(surfaces, entry.surface.as_ref());
                item.assign_surface(bound.map(|s| s.id.clone()));
                item
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

pub fn save_playlist(path: &Path, snapshot: &PlaylistSnapshot) -> Result<(), PlaylistError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn load_playlist(path: &Path) -> Result<PlaylistSnapshot, PlaylistError> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}
