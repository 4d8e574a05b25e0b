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

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, warn};
use tokio::task::JoinHandle;

use crate::item::SharedItem;
use crate::playlist::{load_playlist, save_playlist, PlaylistError, PlaylistSnapshot};

/// Quiescence window before an autosave hits the disk.
pub const AUTOSAVE_DELAY: Duration = Duration::from_millis(500);

/// Debounced session persistence. Every playlist mutation calls
/// [`SessionStore::touch`]; the write only happens once the mutations stop
/// for the delay window, so a burst of edits costs one disk write.
pub struct SessionStore {
    path: PathBuf,
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl SessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self::with_delay(path, AUTOSAVE_DELAY)
    }

    pub fn with_delay(path: PathBuf, delay: Duration) -> Self {
        SessionStore { path, delay, pending: None }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Schedules a save of the current playlist state. A save already
    /// pending is cancelled and the delay starts over.
    pub fn touch(&mut self, items: &[SharedItem]) {
        let snapshot = PlaylistSnapshot::capture(items);
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
        let path = self.path.clone();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            write_snapshot(&path, &snapshot);
        }));
    }

    /// Writes the current state right now, cancelling any pending save.
    /// Used on shutdown, where waiting out the delay would lose the write.
    pub fn flush(&mut self, items: &[SharedItem]) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
        write_snapshot(&self.path, &PlaylistSnapshot::capture(items));
    }

    /// Reads the persisted session, if there is one. A missing file is the
    /// normal first-run case and stays silent.
    pub fn load(&self) -> Option<PlaylistSnapshot> {
        match load_playlist(&self.path) {
            Ok(snapshot) => Some(snapshot),
            Err(PlaylistError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                warn!("session file {} is unreadable: {err}", self.path.display());
                None
            }
        }
    }
}

impl Drop for SessionStore {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}

fn write_snapshot(path: &Path, snapshot: &PlaylistSnapshot) {
    match save_playlist(path, snapshot) {
        Ok(()) => debug!("session saved to {} ({} items)", path.display(), snapshot.items.len()),
        Err(err) => warn!("session save to {} failed: {err}", path.display()),
    }
}

/// Per-user session file, next to the settings file.
pub fn default_session_path() -> Option<PathBuf> {
    dirs_next::config_dir().map(|dir| dir.join("ovp").join("session.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::VideoItem;

    fn store(dir: &tempfile::TempDir, delay_ms: u64) -> SessionStore {
        SessionStore::with_delay(dir.path().join("session.json"), Duration::from_millis(delay_ms))
    }

    #[tokio::test]
    async fn touch_writes_after_the_quiet_window() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store(&dir, 100);
        let items = vec![VideoItem::new("/media/a.mp4")];

        store.touch(&items);
        assert!(!store.path().exists());

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(store.path().exists());
        assert_eq!(store.load().unwrap().items.len(), 1);
    }

    #[tokio::test]
    async fn touch_bursts_coalesce_into_one_write_of_the_last_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store(&dir, 200);

        store.touch(&[VideoItem::new("/media/a.mp4")]);
        tokio::time::sleep(Duration::from_millis(60)).await;
        store.touch(&[VideoItem::new("/media/b.mp4")]);
        tokio::time::sleep(Duration::from_millis(60)).await;
        store.touch(&[VideoItem::new("/media/c.mp4")]);

        // The first touch alone would have fired by now; the restarts keep
        // pushing the write out.
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(!store.path().exists());

        tokio::time::sleep(Duration::from_millis(250)).await;
        let snapshot = store.load().unwrap();
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items[0].locator, "/media/c.mp4");
    }

    #[tokio::test]
    async fn flush_writes_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store(&dir, 60_000);
        let items = vec![VideoItem::new("/media/a.mp4")];

        store.touch(&items);
        store.flush(&items);
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn dropping_the_store_cancels_the_pending_write() {
        let dir = tempfile::tempdir().unwrap();
        let path;
        {
            let mut store = store(&dir, 100);
            path = store.path().to_path_buf();
            store.touch(&[VideoItem::new("/media/a.mp4")]);
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn load_without_a_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir, 100);
        assert!(store.load().is_none());
    }

    #[tokio::test]
    async fn load_with_a_corrupt_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir, 100);
        std::fs::write(store.path(), "not json").unwrap();
        assert!(store.load().is_none());
    }
}
