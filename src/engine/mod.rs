pub mod sim;

pub use sim::SimEngine;

use crate::media::{MediaHandle, MediaId};
use thiserror::Error;

/// What the engine reports back, asynchronously. The controller treats these
/// as the source of truth - its own commands are just requests.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Periodic position report, default cadence 100ms.
    Position(f64),
    /// Total length learned after load. Can lag the load by a while.
    DurationKnown(f64),
    /// Play/pause actually took effect (true = playing).
    PlayStateChanged(bool),
    /// Playback ran off the end of the media.
    Ended,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("engine has no media with id '{0}'")]
    UnknownMedia(String),

    #[error("no media is loaded")]
    NothingLoaded,

    #[error("engine unavailable: {0}")]
    Unavailable(String),
}

/// Playback engine capability. The controller drives one of these with
/// synchronous commands and hears back through `EngineEvent`s, so the state
/// machine never depends on a particular player implementation.
pub trait PlaybackEngine {
    fn load(&mut self, id: &MediaId) -> Result<MediaHandle, EngineError>;
    fn seek(&mut self, seconds: f64) -> Result<(), EngineError>;
    fn play(&mut self) -> Result<(), EngineError>;
    fn pause(&mut self) -> Result<(), EngineError>;
    fn position(&self) -> f64;
    fn duration(&self) -> Option<f64>;
}
