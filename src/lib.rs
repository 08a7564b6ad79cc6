// VidSlice Library - Core modules for the segment-looping media controller
// Modular design makes it easy to swap out the playback engine

pub mod config;     // settings and preferences
pub mod controller; // loop region + play/pause/seek state machine
pub mod engine;     // playback engine capability + simulated engine
pub mod media;      // id extraction, library lookup, fetch capability
pub mod ui;         // command parsing and time display

// Export the stuff other modules actually use
pub use config::Config;
pub use controller::{ControlError, LoopController, LoopRegion, PlaybackState, Phase};
pub use engine::{EngineEvent, PlaybackEngine, SimEngine};
pub use media::{MediaHandle, MediaId, MediaSource};
