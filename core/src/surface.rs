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

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Stable device identifier of one physical display, as reported by the OS
/// (for example `\\.\DISPLAY1`). Survives re-enumeration as long as the
/// display stays connected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurfaceId(String);

impl SurfaceId {
    pub fn new(id: impl Into<String>) -> Self {
        SurfaceId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SurfaceId {
    fn from(id: &str) -> Self {
        SurfaceId(id.to_string())
    }
}

/// Monitor rectangle in physical device pixels, unaffected by display
/// scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicalBounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl PhysicalBounds {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        PhysicalBounds { x, y, width, height }
    }

    /// Converts to toolkit logical units, dividing each axis by its own
    /// scale component.
    pub fn to_logical(&self, scale: ScaleFactor) -> LogicalBounds {
        LogicalBounds {
            x: self.x as f64 / scale.x,
            y: self.y as f64 / scale.y,
            width: self.width as f64 / scale.x,
            height: self.height as f64 / scale.y,
        }
    }
}

/// Window rectangle in toolkit logical units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogicalBounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Display scale per axis. Only known once a window is realized on the
/// display, which is why placement runs in two phases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactor {
    pub x: f64,
    pub y: f64,
}

impl ScaleFactor {
    pub fn uniform(scale: f64) -> Self {
        ScaleFactor { x: scale, y: scale }
    }
}

impl Default for ScaleFactor {
    fn default() -> Self {
        ScaleFactor::uniform(1.0)
    }
}

/// Immutable snapshot of one physical display taken at enumeration time.
/// Re-query the catalog to refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenSurface {
    pub id: SurfaceId,
    pub bounds: PhysicalBounds,
    pub is_primary: bool,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("display enumeration failed: {0}")]
    Enumeration(String),
}

/// Enumerates the displays currently available to the process.
pub trait SurfaceCatalog {
    fn list_surfaces(&self) -> Result<Vec<ScreenSurface>, CatalogError>;
}

/// Resolves a persisted surface id against a fresh enumeration. Falls back
/// from exact id match to the primary surface to the first one; `None` only
/// when the catalog is empty.
pub fn rebind_surface<'a>(
    surfaces: &'a [ScreenSurface],
    wanted: Option<&SurfaceId>,
) -> Option<&'a ScreenSurface> {
    wanted
        .and_then(|id| surfaces.iter().find(|s| s.id == *id))
        .or_else(|| surfaces.iter().find(|s| s.is_primary))
        .or_else(|| surfaces.first())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface(id: &str, primary: bool) -> ScreenSurface {
        ScreenSurface {
            id: SurfaceId::from(id),
            bounds: PhysicalBounds::new(0, 0, 1920, 1080),
            is_primary: primary,
        }
    }

    #[test]
    fn logical_bounds_divide_physical_by_scale() {
        let bounds = PhysicalBounds::new(0, 0, 1920, 1080);
        let logical = bounds.to_logical(ScaleFactor::uniform(1.25));
        assert_eq!(logical, LogicalBounds { x: 0.0, y: 0.0, width: 1536.0, height: 864.0 });
    }

    #[test]
    fn logical_bounds_scale_axes_independently() {
        let bounds = PhysicalBounds::new(200, 100, 1000, 500);
        let logical = bounds.to_logical(ScaleFactor { x: 2.0, y: 1.0 });
        assert_eq!(logical, LogicalBounds { x: 100.0, y: 100.0, width: 500.0, height: 500.0 });
    }

    #[test]
    fn rebind_prefers_exact_id_match() {
        let surfaces = vec![surface("\\\\.\\DISPLAY1", true), surface("\\\\.\\DISPLAY2", false)];
        let wanted = SurfaceId::from("\\\\.\\DISPLAY2");
        let resolved = rebind_surface(&surfaces, Some(&wanted)).unwrap();
        assert_eq!(resolved.id, wanted);
    }

    #[test]
    fn rebind_falls_back_to_primary_then_first() {
        let with_primary = vec![surface("a", false), surface("b", true)];
        let wanted = SurfaceId::from("gone");
        assert_eq!(rebind_surface(&with_primary, Some(&wanted)).unwrap().id, SurfaceId::from("b"));

        let without_primary = vec![surface("a", false), surface("b", false)];
        assert_eq!(rebind_surface(&without_primary, Some(&wanted)).unwrap().id, SurfaceId::from("a"));

        assert!(rebind_surface(&[], Some(&wanted)).is_none());
    }
}
