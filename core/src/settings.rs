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

use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::item::ItemSettings;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// User preferences that outlive a session. `opacity` and `volume` are the
/// last positions of the global sliders; `default_opacity` and
/// `default_volume` seed newly added items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub opacity: f64,
    pub volume: f64,
    pub default_opacity: f64,
    pub default_volume: f64,
    pub auto_load_session: bool,
    pub prevent_overlay_minimize: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        UserSettings {
            opacity: 0.2,
            volume: 0.5,
            default_opacity: 0.9,
            default_volume: 0.5,
            auto_load_session: false,
            prevent_overlay_minimize: true,
        }
    }
}

impl UserSettings {
    /// Loads settings, falling back to defaults when the file is missing
    /// (first run) or unreadable. Never fails the startup path.
    pub fn load_from(path: &Path) -> UserSettings {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return UserSettings::default();
            }
            Err(err) => {
                warn!("settings file {} is unreadable ({err}), using defaults", path.display());
                return UserSettings::default();
            }
        };
        match serde_json::from_str(&json) {
            Ok(settings) => settings,
            Err(err) => {
                warn!("settings file {} is corrupt ({err}), using defaults", path.display());
                UserSettings::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Settings a freshly added item starts with.
    pub fn item_defaults(&self) -> ItemSettings {
        ItemSettings { opacity: self.default_opacity, volume: self.default_volume }.clamped()
    }
}

/// Per-user settings file location.
pub fn default_settings_path() -> Option<PathBuf> {
    dirs_next::config_dir().map(|dir| dir.join("ovp").join("settings.json"))
}
