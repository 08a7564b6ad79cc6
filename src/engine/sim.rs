// Simulated playback engine - a wall clock pretending to be a video player.
// There is no decoder behind it; position advances by tick and duration is
// announced a few ticks after load so callers have to survive the window
// where it is unknown, same as with a real player.

use super::{EngineError, EngineEvent, PlaybackEngine};
use crate::media::{MediaHandle, MediaId};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::debug;

/// Ticks between load and the duration announcement.
const DURATION_DELAY_TICKS: u32 = 3;

struct LoadedMedia {
    id: MediaId,
    duration: f64,
    position: f64,
    playing: bool,
    duration_announced: bool,
    ticks_until_duration: u32,
}

pub struct SimEngine {
    catalog: HashMap<String, f64>,
    loaded: Option<LoadedMedia>,
    event_sender: Option<mpsc::UnboundedSender<EngineEvent>>,
}

impl SimEngine {
    pub fn new() -> Self {
        Self {
            catalog: HashMap::new(),
            loaded: None,
            event_sender: None,
        }
    }

    /// Register a media item the engine will accept, with its real length.
    pub fn add_media(&mut self, id: impl Into<String>, duration_seconds: f64) {
        self.catalog.insert(id.into(), duration_seconds);
    }

    pub fn set_event_sender(&mut self, sender: mpsc::UnboundedSender<EngineEvent>) {
        self.event_sender = Some(sender);
    }

    /// Advance the simulated clock by `dt` seconds. Emits the position
    /// report for this tick plus whatever else became true (duration
    /// learned, playback ended).
    pub fn tick(&mut self, dt: f64) {
        let Some(media) = self.loaded.as_mut() else {
            return;
        };

        if !media.duration_announced {
            if media.ticks_until_duration > 0 {
                media.ticks_until_duration -= 1;
            }
            if media.ticks_until_duration == 0 {
                media.duration_announced = true;
                let duration = media.duration;
                debug!("sim engine learned duration {duration:.1}s for {}", media.id);
                send(&self.event_sender, EngineEvent::DurationKnown(duration));
            }
        }

        if media.playing {
            media.position += dt;
            if media.position >= media.duration {
                media.position = media.duration;
                media.playing = false;
                send(&self.event_sender, EngineEvent::PlayStateChanged(false));
                send(&self.event_sender, EngineEvent::Ended);
            }
        }

        let position = media.position;
        send(&self.event_sender, EngineEvent::Position(position));
    }
}

impl Default for SimEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackEngine for SimEngine {
    fn load(&mut self, id: &MediaId) -> Result<MediaHandle, EngineError> {
        let duration = *self
            .catalog
            .get(id.as_str())
            .ok_or_else(|| EngineError::UnknownMedia(id.to_string()))?;

        self.loaded = Some(LoadedMedia {
            id: id.clone(),
            duration,
            position: 0.0,
            playing: false,
            duration_announced: false,
            ticks_until_duration: DURATION_DELAY_TICKS,
        });

        // Duration comes later, through DurationKnown
        Ok(MediaHandle::new(id.clone()))
    }

    fn seek(&mut self, seconds: f64) -> Result<(), EngineError> {
        let media = self.loaded.as_mut().ok_or(EngineError::NothingLoaded)?;
        media.position = seconds.clamp(0.0, media.duration);
        Ok(())
    }

    fn play(&mut self) -> Result<(), EngineError> {
        let media = self.loaded.as_mut().ok_or(EngineError::NothingLoaded)?;
        if !media.playing {
            media.playing = true;
            send(&self.event_sender, EngineEvent::PlayStateChanged(true));
        }
        Ok(())
    }

    fn pause(&mut self) -> Result<(), EngineError> {
        let media = self.loaded.as_mut().ok_or(EngineError::NothingLoaded)?;
        if media.playing {
            media.playing = false;
            send(&self.event_sender, EngineEvent::PlayStateChanged(false));
        }
        Ok(())
    }

    fn position(&self) -> f64 {
        self.loaded.as_ref().map(|m| m.position).unwrap_or(0.0)
    }

    fn duration(&self) -> Option<f64> {
        self.loaded
            .as_ref()
            .filter(|m| m.duration_announced)
            .map(|m| m.duration)
    }
}

fn send(sender: &Option<mpsc::UnboundedSender<EngineEvent>>, event: EngineEvent) {
    if let Some(sender) = sender {
        let _ = sender.send(event);
    }
}
