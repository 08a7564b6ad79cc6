// The loop controller - owns playback position, loop boundaries, and the
// play/pause/seek state machine, and enforces the loop against an engine it
// does not own. Boundary enforcement is edge-triggered: one seek per
// crossing of the end time, re-armed only when a later position report
// lands back below the boundary. The engine lagging a tick or two behind a
// seek must not turn into a seek storm.

use super::{ControlError, LoopRegion};
use crate::engine::{EngineError, EngineEvent, PlaybackEngine};
use crate::media::{MediaHandle, MediaId};
use tracing::{debug, info, warn};

/// Where the controller is in its lifecycle. `looping` is not a phase - it
/// overlays whichever of these we are in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loaded,
    Playing,
    Paused,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub position_seconds: f64,
    pub is_playing: bool,
    pub looping: bool,
}

impl PlaybackState {
    fn reset() -> Self {
        Self {
            position_seconds: 0.0,
            is_playing: false,
            looping: false,
        }
    }
}

pub struct LoopController<E: PlaybackEngine> {
    engine: E,
    phase: Phase,
    state: PlaybackState,
    region: Option<LoopRegion>,
    duration: Option<f64>,
    handle: Option<MediaHandle>,
    /// Edge trigger for the boundary check. Armed while we are below the
    /// end boundary; firing disarms until a report lands below it again.
    boundary_armed: bool,
    /// Natural whole-media restart when no region loop is active.
    restart_on_end: bool,
}

impl<E: PlaybackEngine> LoopController<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            phase: Phase::Idle,
            state: PlaybackState::reset(),
            region: None,
            duration: None,
            handle: None,
            boundary_armed: false,
            restart_on_end: true,
        }
    }

    /// Hosts that want media to stop dead at the end can turn the natural
    /// whole-media restart off.
    pub fn set_restart_on_end(&mut self, enabled: bool) {
        self.restart_on_end = enabled;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn region(&self) -> Option<LoopRegion> {
        self.region
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn current_handle(&self) -> Option<&MediaHandle> {
        self.handle.as_ref()
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Load a new media item. Discards the previous item's region, position
    /// and any pending loop enforcement, whether or not the load succeeds;
    /// on failure the controller is left Idle and ready for another load.
    pub fn load(&mut self, id: &MediaId) -> Result<MediaHandle, ControlError> {
        info!("loading media '{id}'");

        self.phase = Phase::Idle;
        self.state = PlaybackState::reset();
        self.region = None;
        self.duration = None;
        self.handle = None;
        self.boundary_armed = false;

        let handle = self.engine.load(id).map_err(|e| match e {
            EngineError::UnknownMedia(_) => ControlError::InvalidMediaId,
            _ => ControlError::EngineUnavailable,
        })?;

        // The engine may already know the length; usually it arrives later
        // through DurationKnown.
        if let Some(duration) = handle.duration {
            self.duration = Some(duration);
            self.region = Some(LoopRegion::full(duration));
        }

        self.handle = Some(handle.clone());
        self.phase = Phase::Loaded;
        Ok(handle)
    }

    /// Replace the loop region. An invalid pair leaves the current region
    /// exactly as it was.
    pub fn set_region(&mut self, start: f64, end: f64) -> Result<(), ControlError> {
        let region = LoopRegion::new(start, end)?;
        debug!("loop region set to [{start}, {end})");
        self.region = Some(region);
        // Re-judge the edge trigger against the new boundary
        self.boundary_armed = self.state.position_seconds < region.end_seconds;
        Ok(())
    }

    /// Flip loop enforcement. Turning it on seeks to the region start and
    /// begins playback; turning it off stops enforcement but lets playback
    /// run on.
    pub fn toggle_loop(&mut self) -> Result<(), ControlError> {
        if self.handle.is_none() {
            return Err(ControlError::EngineUnavailable);
        }

        if self.state.looping {
            self.state.looping = false;
            info!("loop enforcement off");
            return Ok(());
        }

        let start = self.region.map(|r| r.start_seconds).unwrap_or(0.0);
        self.engine
            .seek(start)
            .and_then(|_| self.engine.play())
            .map_err(|_| ControlError::EngineUnavailable)?;

        self.state.looping = true;
        self.state.position_seconds = start;
        self.boundary_armed = true;
        info!("loop enforcement on, starting at {start}s");
        Ok(())
    }

    /// Ask the engine to play or pause, based on what we currently believe.
    /// The engine's acknowledgment, not this call, flips `is_playing`.
    pub fn toggle_play_pause(&mut self) -> Result<(), ControlError> {
        if self.handle.is_none() {
            return Err(ControlError::EngineUnavailable);
        }

        let result = if self.state.is_playing {
            self.engine.pause()
        } else {
            self.engine.play()
        };
        result.map_err(|_| ControlError::EngineUnavailable)
    }

    /// Seek within the loaded media. Rejected outright until the duration
    /// is known - there is no range to validate against yet.
    pub fn seek(&mut self, position: f64) -> Result<(), ControlError> {
        if self.handle.is_none() {
            return Err(ControlError::EngineUnavailable);
        }

        let duration = self.duration.ok_or(ControlError::OutOfRange(position))?;
        if !position.is_finite() || position < 0.0 || position > duration {
            return Err(ControlError::OutOfRange(position));
        }

        self.engine
            .seek(position)
            .map_err(|_| ControlError::EngineUnavailable)?;
        self.state.position_seconds = position;

        // A manual jump past the boundary counts as a crossing already
        // consumed; a jump back below it re-arms.
        if let Some(region) = self.region {
            self.boundary_armed = position < region.end_seconds;
        }
        Ok(())
    }

    /// Apply one engine event. Events arrive in order; anything referring
    /// to a media item we no longer have loaded is dropped.
    pub fn on_engine_event(&mut self, event: EngineEvent) {
        if self.handle.is_none() {
            return;
        }

        match event {
            EngineEvent::Position(position) => self.on_position_report(position),
            EngineEvent::DurationKnown(duration) => self.on_duration_known(duration),
            EngineEvent::PlayStateChanged(playing) => self.on_play_state(playing),
            EngineEvent::Ended => self.on_playback_ended(),
        }
    }

    /// Periodic position report from the engine. This is where the loop
    /// boundary is enforced.
    pub fn on_position_report(&mut self, position: f64) {
        if self.phase == Phase::Idle || self.handle.is_none() {
            return;
        }

        self.state.position_seconds = position;

        if !self.state.looping {
            return;
        }
        let Some(region) = self.region else {
            return;
        };

        if position >= region.end_seconds {
            if self.boundary_armed {
                self.boundary_armed = false;
                debug!(
                    "boundary crossed at {position}s, seeking back to {}s",
                    region.start_seconds
                );
                if self.engine.seek(region.start_seconds).is_ok() {
                    self.state.position_seconds = region.start_seconds;
                } else {
                    warn!("loop seek failed, engine unavailable");
                }
            }
            // Already fired for this crossing; wait for the engine to come
            // back around before arming again.
        } else {
            self.boundary_armed = true;
        }
    }

    /// Terminal "ended" signal. Without a loop active this is the natural
    /// whole-media loop: restart from zero and keep playing. With a loop
    /// active the boundary check normally preempts it, but a late tick can
    /// let it through - treat that as a boundary crossing.
    pub fn on_playback_ended(&mut self) {
        if self.handle.is_none() {
            return;
        }

        let target = if self.state.looping {
            self.region.map(|r| r.start_seconds).unwrap_or(0.0)
        } else if self.restart_on_end {
            0.0
        } else {
            debug!("playback ended, restart disabled");
            self.state.is_playing = false;
            return;
        };

        debug!("playback ended, restarting at {target}s");
        if self
            .engine
            .seek(target)
            .and_then(|_| self.engine.play())
            .is_ok()
        {
            self.state.position_seconds = target;
            self.boundary_armed = false;
        } else {
            warn!("restart after end failed, engine unavailable");
        }
    }

    fn on_duration_known(&mut self, duration: f64) {
        if duration <= 0.0 || !duration.is_finite() {
            warn!("engine reported nonsense duration {duration}, ignoring");
            return;
        }

        debug!("duration known: {duration}s");
        self.duration = Some(duration);
        if let Some(handle) = self.handle.as_mut() {
            handle.duration = Some(duration);
        }
        // Default region covers the whole item; never stomp an explicit one
        if self.region.is_none() {
            self.region = Some(LoopRegion::full(duration));
        }
    }

    fn on_play_state(&mut self, playing: bool) {
        self.state.is_playing = playing;
        self.phase = if playing {
            Phase::Playing
        } else if self.phase == Phase::Playing {
            Phase::Paused
        } else {
            self.phase
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Debug, Clone, PartialEq)]
    enum Cmd {
        Load(String),
        Seek(f64),
        Play,
        Pause,
    }

    /// Records every command the controller issues; knows media durations
    /// up front but only admits them through DurationKnown, like a real
    /// engine would.
    struct FakeEngine {
        catalog: HashMap<String, f64>,
        commands: Vec<Cmd>,
    }

    impl FakeEngine {
        fn new() -> Self {
            let mut catalog = HashMap::new();
            catalog.insert("clip".to_string(), 120.0);
            Self {
                catalog,
                commands: Vec::new(),
            }
        }

        fn seeks(&self) -> Vec<f64> {
            self.commands
                .iter()
                .filter_map(|c| match c {
                    Cmd::Seek(s) => Some(*s),
                    _ => None,
                })
                .collect()
        }
    }

    impl PlaybackEngine for FakeEngine {
        fn load(&mut self, id: &MediaId) -> Result<MediaHandle, EngineError> {
            if !self.catalog.contains_key(id.as_str()) {
                return Err(EngineError::UnknownMedia(id.to_string()));
            }
            self.commands.push(Cmd::Load(id.to_string()));
            Ok(MediaHandle::new(id.clone()))
        }

        fn seek(&mut self, seconds: f64) -> Result<(), EngineError> {
            self.commands.push(Cmd::Seek(seconds));
            Ok(())
        }

        fn play(&mut self) -> Result<(), EngineError> {
            self.commands.push(Cmd::Play);
            Ok(())
        }

        fn pause(&mut self) -> Result<(), EngineError> {
            self.commands.push(Cmd::Pause);
            Ok(())
        }

        fn position(&self) -> f64 {
            0.0
        }

        fn duration(&self) -> Option<f64> {
            None
        }
    }

    /// Controller with "clip" loaded and its 120s duration announced.
    fn loaded_controller() -> LoopController<FakeEngine> {
        let mut controller = LoopController::new(FakeEngine::new());
        controller.load(&MediaId::new("clip")).unwrap();
        controller.on_engine_event(EngineEvent::DurationKnown(120.0));
        controller.engine_mut().commands.clear();
        controller
    }

    #[test]
    fn test_load_resets_state() {
        let mut controller = loaded_controller();
        controller.set_region(5.0, 10.0).unwrap();
        controller.toggle_loop().unwrap();
        controller.on_engine_event(EngineEvent::PlayStateChanged(true));
        controller.on_position_report(7.0);

        controller.load(&MediaId::new("clip")).unwrap();
        assert_eq!(controller.phase(), Phase::Loaded);
        assert_eq!(
            *controller.state(),
            PlaybackState {
                position_seconds: 0.0,
                is_playing: false,
                looping: false,
            }
        );
        assert_eq!(controller.region(), None);
        assert_eq!(controller.duration(), None);
    }

    #[test]
    fn test_load_unknown_id_leaves_idle() {
        let mut controller = LoopController::new(FakeEngine::new());
        assert_eq!(
            controller.load(&MediaId::new("nope")),
            Err(ControlError::InvalidMediaId)
        );
        assert_eq!(controller.phase(), Phase::Idle);

        // Still ready for a good load
        assert!(controller.load(&MediaId::new("clip")).is_ok());
        assert_eq!(controller.phase(), Phase::Loaded);
    }

    #[test]
    fn test_duration_known_sets_default_region() {
        let mut controller = LoopController::new(FakeEngine::new());
        controller.load(&MediaId::new("clip")).unwrap();
        assert_eq!(controller.region(), None);

        controller.on_engine_event(EngineEvent::DurationKnown(120.0));
        assert_eq!(controller.region(), Some(LoopRegion::full(120.0)));
    }

    #[test]
    fn test_duration_known_keeps_explicit_region() {
        let mut controller = LoopController::new(FakeEngine::new());
        controller.load(&MediaId::new("clip")).unwrap();
        controller.set_region(5.0, 10.0).unwrap();

        controller.on_engine_event(EngineEvent::DurationKnown(120.0));
        assert_eq!(controller.region(), Some(LoopRegion::new(5.0, 10.0).unwrap()));
    }

    #[test]
    fn test_invalid_region_keeps_previous() {
        let mut controller = loaded_controller();
        controller.set_region(5.0, 10.0).unwrap();

        assert_eq!(
            controller.set_region(10.0, 5.0),
            Err(ControlError::InvalidRegion {
                start: 10.0,
                end: 5.0
            })
        );
        assert_eq!(controller.region(), Some(LoopRegion::new(5.0, 10.0).unwrap()));

        // and a later valid one wins
        controller.set_region(2.0, 8.0).unwrap();
        assert_eq!(controller.region(), Some(LoopRegion::new(2.0, 8.0).unwrap()));
    }

    #[test]
    fn test_boundary_seek_is_edge_triggered() {
        let mut controller = loaded_controller();
        controller.set_region(5.0, 10.0).unwrap();
        controller.toggle_loop().unwrap();
        controller.engine_mut().commands.clear();

        // One seek, fired at the 10.1 report, target 5
        for report in [4.9, 9.8, 10.1] {
            controller.on_position_report(report);
        }
        assert_eq!(controller.engine_mut().seeks(), vec![5.0]);
        assert_eq!(controller.state().position_seconds, 5.0);

        // Engine still lagging past the boundary: no second seek
        controller.on_position_report(10.3);
        assert_eq!(controller.engine_mut().seeks(), vec![5.0]);

        // Engine comes back around, next crossing fires again
        controller.on_position_report(5.2);
        controller.on_position_report(10.05);
        assert_eq!(controller.engine_mut().seeks(), vec![5.0, 5.0]);
    }

    #[test]
    fn test_no_enforcement_when_not_looping() {
        let mut controller = loaded_controller();
        controller.set_region(5.0, 10.0).unwrap();

        controller.on_position_report(11.0);
        assert!(controller.engine_mut().seeks().is_empty());
        assert_eq!(controller.state().position_seconds, 11.0);
    }

    #[test]
    fn test_toggle_loop_seeks_and_plays() {
        let mut controller = loaded_controller();
        controller.set_region(5.0, 10.0).unwrap();
        controller.toggle_loop().unwrap();

        assert_eq!(
            controller.engine_mut().commands,
            vec![Cmd::Seek(5.0), Cmd::Play]
        );
        assert!(controller.state().looping);
    }

    #[test]
    fn test_toggle_loop_off_keeps_region_and_playback() {
        let mut controller = loaded_controller();
        controller.set_region(5.0, 10.0).unwrap();
        controller.toggle_loop().unwrap();
        controller.engine_mut().commands.clear();

        controller.toggle_loop().unwrap();
        assert!(!controller.state().looping);
        // no pause issued, region preserved
        assert!(controller.engine_mut().commands.is_empty());
        assert_eq!(controller.region(), Some(LoopRegion::new(5.0, 10.0).unwrap()));

        // back on: same region, same start
        controller.toggle_loop().unwrap();
        assert_eq!(
            controller.engine_mut().commands,
            vec![Cmd::Seek(5.0), Cmd::Play]
        );
    }

    #[test]
    fn test_play_pause_waits_for_ack() {
        let mut controller = loaded_controller();

        controller.toggle_play_pause().unwrap();
        assert_eq!(controller.engine_mut().commands, vec![Cmd::Play]);
        // not playing until the engine says so
        assert!(!controller.state().is_playing);
        assert_eq!(controller.phase(), Phase::Loaded);

        controller.on_engine_event(EngineEvent::PlayStateChanged(true));
        assert!(controller.state().is_playing);
        assert_eq!(controller.phase(), Phase::Playing);

        // believing we play, the next toggle pauses
        controller.toggle_play_pause().unwrap();
        assert_eq!(
            controller.engine_mut().commands,
            vec![Cmd::Play, Cmd::Pause]
        );
        controller.on_engine_event(EngineEvent::PlayStateChanged(false));
        assert_eq!(controller.phase(), Phase::Paused);
    }

    #[test]
    fn test_seek_rejected_until_duration_known() {
        let mut controller = LoopController::new(FakeEngine::new());
        controller.load(&MediaId::new("clip")).unwrap();

        assert_eq!(controller.seek(3.0), Err(ControlError::OutOfRange(3.0)));

        controller.on_engine_event(EngineEvent::DurationKnown(120.0));
        assert!(controller.seek(3.0).is_ok());
        assert_eq!(controller.seek(121.0), Err(ControlError::OutOfRange(121.0)));
        assert_eq!(controller.seek(-1.0), Err(ControlError::OutOfRange(-1.0)));
    }

    #[test]
    fn test_seek_rearms_boundary() {
        let mut controller = loaded_controller();
        controller.set_region(5.0, 10.0).unwrap();
        controller.toggle_loop().unwrap();

        // fire the boundary once
        controller.on_position_report(10.2);
        controller.engine_mut().commands.clear();

        // manual jump below the boundary re-arms it
        controller.seek(6.0).unwrap();
        controller.on_position_report(10.4);
        assert_eq!(controller.engine_mut().seeks(), vec![6.0, 5.0]);
    }

    #[test]
    fn test_ended_without_loop_restarts_from_zero() {
        let mut controller = loaded_controller();
        controller.toggle_play_pause().unwrap();
        controller.on_engine_event(EngineEvent::PlayStateChanged(true));
        controller.on_position_report(119.9);
        controller.engine_mut().commands.clear();

        controller.on_playback_ended();
        assert_eq!(
            controller.engine_mut().commands,
            vec![Cmd::Seek(0.0), Cmd::Play]
        );
        assert_eq!(controller.state().position_seconds, 0.0);
    }

    #[test]
    fn test_ended_while_looping_acts_like_a_crossing() {
        let mut controller = loaded_controller();
        controller.set_region(5.0, 10.0).unwrap();
        controller.toggle_loop().unwrap();
        controller.engine_mut().commands.clear();

        controller.on_playback_ended();
        assert_eq!(
            controller.engine_mut().commands,
            vec![Cmd::Seek(5.0), Cmd::Play]
        );
        assert_eq!(controller.state().position_seconds, 5.0);
    }

    #[test]
    fn test_ended_with_restart_disabled_stays_put() {
        let mut controller = loaded_controller();
        controller.set_restart_on_end(false);
        controller.toggle_play_pause().unwrap();
        controller.on_engine_event(EngineEvent::PlayStateChanged(true));
        controller.engine_mut().commands.clear();

        controller.on_playback_ended();
        assert!(controller.engine_mut().commands.is_empty());
        assert!(!controller.state().is_playing);
    }

    #[test]
    fn test_commands_rejected_while_idle() {
        let mut controller: LoopController<FakeEngine> = LoopController::new(FakeEngine::new());
        assert_eq!(controller.toggle_loop(), Err(ControlError::EngineUnavailable));
        assert_eq!(
            controller.toggle_play_pause(),
            Err(ControlError::EngineUnavailable)
        );
        assert_eq!(controller.seek(1.0), Err(ControlError::EngineUnavailable));
        // region can be staged before load? No - load clears it, but the
        // validation itself has nothing to do with the engine
        assert!(controller.set_region(1.0, 2.0).is_ok());
    }

    #[test]
    fn test_stale_reports_after_idle_are_dropped() {
        let mut controller = LoopController::new(FakeEngine::new());
        controller.on_position_report(42.0);
        controller.on_playback_ended();
        assert_eq!(controller.state().position_seconds, 0.0);
        assert!(controller.engine_mut().commands.is_empty());
    }
}
