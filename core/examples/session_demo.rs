// Example showing how to wire a backend + planner + Orchestrator into a session loop
use anyhow::Result;
use log::info;
use ovp_core::item::VideoItem;
use ovp_core::planner;
use ovp_core::surface::{PhysicalBounds, ScaleFactor, ScreenSurface};
use ovp_core::window::{OverlayBackend, OverlayWindow, PlacementError, PlaybackCommands};
use ovp_core::{
    BackendError, LogicalBounds, MediaSource, Orchestrator, OverlayId, SessionEvent,
    SessionEventSender, SurfaceId,
};

// Stand-in for a real windowing backend: every window just logs the
// commands it receives.
struct LoggingWindow {
    overlay_id: OverlayId,
}

impl PlaybackCommands for LoggingWindow {
    fn load(&mut self, source: &MediaSource) {
        info!("[{}] load {source}", self.overlay_id);
    }
    fn play(&mut self) {
        info!("[{}] play", self.overlay_id);
    }
    fn pause(&mut self) {
        info!("[{}] pause", self.overlay_id);
    }
    fn stop(&mut self) {
        info!("[{}] stop", self.overlay_id);
    }
    fn set_volume(&mut self, volume: f64) {
        info!("[{}] volume {volume}", self.overlay_id);
    }
    fn set_opacity(&mut self, opacity: f64) {
        info!("[{}] opacity {opacity}", self.overlay_id);
    }
}

impl OverlayWindow for LoggingWindow {
    fn place_physical(&mut self, bounds: PhysicalBounds) -> Result<(), PlacementError> {
        info!("[{}] physical placement {bounds:?}", self.overlay_id);
        Ok(())
    }
    fn scale_factor(&self) -> Option<ScaleFactor> {
        Some(ScaleFactor::uniform(1.25))
    }
    fn place_logical(&mut self, bounds: LogicalBounds) {
        info!("[{}] logical placement {bounds:?}", self.overlay_id);
    }
    fn close(&mut self) {
        info!("[{}] close", self.overlay_id);
    }
}

struct LoggingBackend;

impl OverlayBackend for LoggingBackend {
    type Window = LoggingWindow;

    fn create_window(
        &mut self,
        overlay_id: OverlayId,
        events: SessionEventSender,
    ) -> Result<LoggingWindow, BackendError> {
        let _ = events.send(SessionEvent::WindowReady { overlay_id });
        Ok(LoggingWindow { overlay_id })
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();

    let surfaces = vec![
        ScreenSurface {
            id: SurfaceId::from(r"\\.\DISPLAY1"),
            bounds: PhysicalBounds::new(0, 0, 1920, 1080),
            is_primary: true,
        },
        ScreenSurface {
            id: SurfaceId::from(r"\\.\DISPLAY2"),
            bounds: PhysicalBounds::new(1920, 0, 2560, 1440),
            is_primary: false,
        },
    ];

    let items = vec![
        VideoItem::new("https://example.com/ambient/rain.mp4"),
        VideoItem::new("https://example.com/ambient/fireplace.mp4"),
        VideoItem::new("https://example.com/ambient/waves.mp4"),
    ];
    items[0].assign_surface(Some(surfaces[0].id.clone()));
    items[1].assign_surface(Some(surfaces[0].id.clone()));
    items[2].assign_surface(Some(surfaces[1].id.clone()));

    let plan = planner::plan(&items, false).expect("all items are assigned");
    let (mut orchestrator, mut session_rx) = Orchestrator::new(LoggingBackend);
    orchestrator.play_per_surface(plan, &surfaces)?;

    // Live mutation: picked up through the session channel without a reload.
    items[0].set_volume(0.3);

    info!("Session demo running; press Ctrl+C to exit");
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = session_rx.recv() => match event {
                Some(event) => orchestrator.dispatch(event),
                None => break,
            },
        }
    }
    orchestrator.stop_all();
    Ok(())
}
