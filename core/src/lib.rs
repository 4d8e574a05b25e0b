pub mod controller;
pub mod events;
pub mod extract;
pub mod hotkey;
pub mod item;
pub mod orchestrator;
pub mod planner;
pub mod platform;
pub mod playback;
pub mod playlist;
pub mod session;
pub mod settings;
pub mod surface;
pub mod validate;
pub mod window;

pub use controller::SurfaceController;
pub use events::{OverlayId, SessionEvent, SessionEventReceiver, SessionEventSender};
pub use hotkey::{panic_channel, PanicSignal, PanicTrigger};
pub use item::{ItemSettings, MediaSource, SharedItem, ValidationStatus, VideoItem};
pub use orchestrator::{Orchestrator, SessionError};
pub use planner::AssignmentPlan;
pub use playback::QueuePlayer;
pub use playlist::{load_playlist, save_playlist, PlaylistSnapshot};
pub use session::{default_session_path, SessionStore};
pub use settings::{default_settings_path, UserSettings};
pub use surface::{
    rebind_surface, LogicalBounds, PhysicalBounds, ScaleFactor, ScreenSurface, SurfaceCatalog,
    SurfaceId,
};
pub use window::{BackendError, OverlayBackend, OverlayWindow, PlacementError, PlaybackCommands};
