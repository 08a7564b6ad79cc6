pub mod looper;
pub mod region;

pub use looper::{LoopController, Phase, PlaybackState};
pub use region::LoopRegion;

use thiserror::Error;

/// Everything a command can fail with. Reported synchronously at the command
/// boundary; stored state is never touched on the error path.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    #[error("no media with that id is available")]
    InvalidMediaId,

    #[error("invalid loop region: start {start}s must be below end {end}s")]
    InvalidRegion { start: f64, end: f64 },

    #[error("seek target {0}s is outside the playable range")]
    OutOfRange(f64),

    #[error("playback engine is unavailable")]
    EngineUnavailable,

    #[error("media fetch failed: {0}")]
    FetchFailed(String),
}
