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
use std::path::{Component, Path};

use url::Url;

use crate::item::ValidationStatus;

/// File types the embedded renderer is known to handle.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mov", "wmv"];

/// Outcome of one classification pass, with a message for everything but
/// [`ValidationStatus::Valid`].
#[derive(Debug, Clone, PartialEq)]
pub struct Validation {
    pub status: ValidationStatus,
    pub message: Option<String>,
}

impl Validation {
    fn valid() -> Self {
        Validation { status: ValidationStatus::Valid, message: None }
    }

    fn missing(message: impl Into<String>) -> Self {
        Validation { status: ValidationStatus::Missing, message: Some(message.into()) }
    }

    fn invalid(message: impl Into<String>) -> Self {
        Validation { status: ValidationStatus::Invalid, message: Some(message.into()) }
    }
}

/// Classifies a raw locator. Remote URLs pass on scheme alone, reachability
/// is the renderer's problem. Local paths must be absolute, have a known
/// video extension and point at an existing regular file.
pub fn classify_locator(locator: &str) -> Validation {
    let trimmed = locator.trim();
    if trimmed.is_empty() {
        return Validation::invalid("empty locator");
    }

    if let Ok(url) = Url::parse(trimmed) {
        match url.scheme() {
            "http" | "https" => return Validation::valid(),
            // Single letters are Windows drives, not schemes; fall through
            // to the path rules.
            scheme if scheme.len() > 1 => {
                return Validation::invalid(format!("unsupported scheme {scheme}"));
            }
            _ => {}
        }
    }

    classify_path(Path::new(trimmed))
}

fn classify_path(path: &Path) -> Validation {
    if !path.is_absolute() {
        return Validation::invalid("path is not absolute");
    }
    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        return Validation::invalid("path contains parent traversal");
    }

    let extension_known = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VIDEO_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext)))
        .unwrap_or(false);
    if !extension_known {
        return Validation::invalid("not a supported video type");
    }

    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => Validation::valid(),
        Ok(_) => Validation::invalid("not a regular file"),
        Err(_) => Validation::missing("file not found"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_locator_is_invalid() {
        assert_eq!(classify_locator("").status, ValidationStatus::Invalid);
        assert_eq!(classify_locator("   ").status, ValidationStatus::Invalid);
    }

    #[test]
    fn http_urls_are_valid_without_probing() {
        assert_eq!(classify_locator("https://example.com/clip.mp4").status, ValidationStatus::Valid);
        assert_eq!(classify_locator("http://example.com/live").status, ValidationStatus::Valid);
    }

    #[test]
    fn other_schemes_are_invalid() {
        assert_eq!(classify_locator("ftp://example.com/clip.mp4").status, ValidationStatus::Invalid);
        assert_eq!(classify_locator("file:///media/clip.mp4").status, ValidationStatus::Invalid);
    }

    #[test]
    fn relative_paths_are_invalid() {
        assert_eq!(classify_locator("media/clip.mp4").status, ValidationStatus::Invalid);
    }

    #[test]
    fn unknown_extensions_are_invalid() {
        let path = std::env::temp_dir().join("notes.txt");
        let classified = classify_locator(path.to_str().unwrap());
        assert_eq!(classified.status, ValidationStatus::Invalid);
    }

    #[test]
    fn absent_file_is_missing() {
        let path = std::env::temp_dir().join("definitely-not-here.mp4");
        let classified = classify_locator(path.to_str().unwrap());
        assert_eq!(classified.status, ValidationStatus::Missing);
        assert!(classified.message.is_some());
    }

    #[test]
    fn existing_video_file_is_valid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.MP4");
        std::fs::write(&path, b"").unwrap();

        let classified = classify_locator(path.to_str().unwrap());
        assert_eq!(classified, Validation::valid());
    }

    #[test]
    fn directory_with_video_extension_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::create_dir(&path).unwrap();

        assert_eq!(classify_locator(path.to_str().unwrap()).status, ValidationStatus::Invalid);
    }
}
