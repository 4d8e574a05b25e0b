use std::path::PathBuf;

/// What the host process should play and how.
#[derive(Debug, Clone, Default)]
pub struct ServiceOptions {
    /// Playlist file to load instead of the saved session.
    pub playlist: Option<PathBuf>,
    /// Shuffle the selection before the session starts.
    pub shuffle: bool,
    /// Ignore per-item surface assignments and run one shared queue on
    /// every display.
    pub shared_queue: bool,
}

#[cfg(target_os = "windows")]
pub async fn run(options: ServiceOptions) -> anyhow::Result<()> {
    use anyhow::{bail, Context};
    use log::{info, warn};
    use ovp_core::planner;
    use ovp_core::platform::windows::{WindowsCatalog, WindowsOverlayBackend};
    use ovp_core::{
        default_session_path, default_settings_path, load_playlist, panic_channel, Orchestrator,
        SessionStore, SurfaceCatalog, UserSettings, ValidationStatus,
    };

    let settings = match default_settings_path() {
        Some(path) => UserSettings::load_from(&path),
        None => {
            warn!("no user configuration directory, using default settings");
            UserSettings::default()
        }
    };

    let surfaces = WindowsCatalog.list_surfaces().context("display enumeration failed")?;
    if surfaces.is_empty() {
        bail!("no displays available");
    }
    info!("found {} display(s)", surfaces.len());

    let session_path = default_session_path().context("no user configuration directory")?;
    let mut store = SessionStore::new(session_path);

    let mut items = match &options.playlist {
        Some(path) => load_playlist(path)
            .with_context(|| format!("cannot load playlist {}", path.display()))?
            .restore(&surfaces),
        None if settings.auto_load_session => match store.load() {
            Some(snapshot) => snapshot.restore(&surfaces),
            None => bail!("no saved session to load"),
        },
        None => bail!("nothing to play: pass --playlist or enable auto_load_session"),
    };

    let before = items.len();
    items.retain(|item| item.revalidate() == ValidationStatus::Valid);
    if items.len() < before {
        warn!("dropped {} item(s) that failed validation", before - items.len());
    }
    if items.is_empty() {
        bail!("no playable items");
    }

    let (mut orchestrator, mut session_rx) = Orchestrator::new(WindowsOverlayBackend::default());
    if options.shared_queue {
        let queue = if options.shuffle { planner::shuffled(&items) } else { items.clone() };
        orchestrator.play_on_surfaces(&queue, &surfaces)?;
    } else {
        let plan = planner::plan(&items, options.shuffle)
            .context("every item needs a surface assignment in per-surface mode")?;
        orchestrator.play_per_surface(plan, &surfaces)?;
    }
    store.touch(&items);

    // The trigger end stays here until an input layer (global hotkey, tray)
    // is wired up to clone it.
    let (_panic_trigger, mut panic_signal) = panic_channel();

    info!("session running on {} overlay(s)", orchestrator.active_count());
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, shutting down");
                break;
            }
            Some(()) = panic_signal.recv() => {
                info!("panic stop requested");
                break;
            }
            event = session_rx.recv() => match event {
                Some(event) => orchestrator.dispatch(event),
                None => break,
            },
        }
    }

    orchestrator.stop_all();
    store.flush(&items);
    Ok(())
}

#[cfg(not(target_os = "windows"))]
pub async fn run(_options: ServiceOptions) -> anyhow::Result<()> {
    anyhow::bail!("no native overlay backend for this platform")
}
