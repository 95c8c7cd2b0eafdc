//! Playback driver: one session at a time, advanced on the host's frame tick.
//!
//! Starting a session cancels the active one before the new session produces
//! anything, so no two sessions ever interleave writes. Cancellation is
//! cooperative and complete: once a session is stopped or superseded, no
//! event tagged with it is emitted again.

use serde::{Deserialize, Serialize};

use crate::data::{
    validate_sequence, AnimationOptions, Easing, FrameSnapshot, Keyframe, KeyframeError, LoopMode,
};
use crate::sampling::sample_frame;

/// Tags every event with the session that produced it. Monotonic per driver.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub u64);

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PlaybackState {
    Playing,
    Paused,
}

/// Discrete signals produced while stepping or controlling a session.
#[derive(Clone, Debug, PartialEq)]
pub enum PlaybackEvent {
    /// An interpolated frame; `progress` is the fraction of the current pass.
    Frame {
        session: SessionId,
        progress: f64,
        frame: FrameSnapshot,
    },
    /// A looping session wrapped; `iteration` counts completed passes.
    Looped { session: SessionId, iteration: u32 },
    /// Natural completion. The final frame at progress 1.0 precedes this.
    Ended { session: SessionId },
    /// Explicit cancellation or supersession.
    Stopped { session: SessionId },
    Paused { session: SessionId },
    Resumed { session: SessionId },
}

#[derive(Debug)]
struct Session {
    id: SessionId,
    keys: Vec<Keyframe>,
    easing: Easing,
    mode: LoopMode,
    /// Pass duration in seconds.
    duration: f64,
    /// Elapsed seconds within the current pass.
    elapsed: f64,
    /// Completed passes.
    iteration: u32,
    state: PlaybackState,
}

#[derive(Debug, Default)]
pub struct AnimationDriver {
    session: Option<Session>,
    next_session: u64,
}

impl AnimationDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_session(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.id)
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn state(&self) -> Option<PlaybackState> {
        self.session.as_ref().map(|s| s.state)
    }

    /// Progress fraction of the current pass, if a session exists.
    pub fn progress(&self) -> Option<f64> {
        self.session
            .as_ref()
            .map(|s| (s.elapsed / s.duration).clamp(0.0, 1.0))
    }

    /// Begin a session. The caller supplies the model's current state as the
    /// implicit starting frame; it is prepended at stamp 0. Any active
    /// session is cancelled first (its `Stopped` event leads the returned
    /// list). Validation failures leave the active session untouched.
    pub fn start(
        &mut self,
        key_frames: Vec<Keyframe>,
        options: &AnimationOptions,
        start_frame: FrameSnapshot,
    ) -> Result<Vec<PlaybackEvent>, KeyframeError> {
        validate_sequence(&key_frames, options)?;

        let mut events = Vec::new();
        if let Some(ev) = self.stop() {
            events.push(ev);
        }

        let mut keys = Vec::with_capacity(key_frames.len() + 1);
        keys.push(Keyframe {
            stamp: 0.0,
            frame: start_frame,
            transitions: None,
        });
        keys.extend(key_frames);

        let id = SessionId(self.next_session);
        self.next_session = self.next_session.wrapping_add(1);
        self.session = Some(Session {
            id,
            keys,
            easing: options.easing,
            mode: options.loop_mode,
            duration: f64::from(options.duration_ms) / 1000.0,
            elapsed: 0.0,
            iteration: 0,
            state: PlaybackState::Playing,
        });
        Ok(events)
    }

    /// Advance the active session by `dt` seconds. Paused or idle drivers
    /// deliver nothing. A tick that crosses the pass boundary emits `Looped`
    /// per wrap (or the final frame plus `Ended` on the last pass) before the
    /// frame at the new phase.
    pub fn tick(&mut self, dt: f64) -> Vec<PlaybackEvent> {
        let Some(mut session) = self.session.take() else {
            return Vec::new();
        };
        if session.state == PlaybackState::Paused {
            self.session = Some(session);
            return Vec::new();
        }

        let mut events = Vec::new();
        session.elapsed += dt.max(0.0);

        while session.elapsed >= session.duration {
            let completed = session.iteration + 1;
            let last_pass = match session.mode {
                LoopMode::Once => true,
                LoopMode::Repeat(n) => completed >= n,
                LoopMode::Infinite => false,
            };
            if last_pass {
                let frame = sample_frame(&session.keys, 1.0, &session.easing);
                events.push(PlaybackEvent::Frame {
                    session: session.id,
                    progress: 1.0,
                    frame,
                });
                events.push(PlaybackEvent::Ended {
                    session: session.id,
                });
                return events;
            }
            session.iteration = completed;
            session.elapsed -= session.duration;
            events.push(PlaybackEvent::Looped {
                session: session.id,
                iteration: completed,
            });
        }

        let progress = (session.elapsed / session.duration).clamp(0.0, 1.0);
        let frame = sample_frame(&session.keys, progress, &session.easing);
        events.push(PlaybackEvent::Frame {
            session: session.id,
            progress,
            frame,
        });
        self.session = Some(session);
        events
    }

    /// Cancel the active session. Idempotent.
    pub fn stop(&mut self) -> Option<PlaybackEvent> {
        self.session
            .take()
            .map(|s| PlaybackEvent::Stopped { session: s.id })
    }

    /// Suspend frame delivery without discarding elapsed progress.
    pub fn pause(&mut self) -> Option<PlaybackEvent> {
        let session = self.session.as_mut()?;
        if session.state == PlaybackState::Paused {
            return None;
        }
        session.state = PlaybackState::Paused;
        Some(PlaybackEvent::Paused {
            session: session.id,
        })
    }

    /// Continue a paused session from where it left off.
    pub fn resume(&mut self) -> Option<PlaybackEvent> {
        let session = self.session.as_mut()?;
        if session.state == PlaybackState::Playing {
            return None;
        }
        session.state = PlaybackState::Playing;
        Some(PlaybackEvent::Resumed {
            session: session.id,
        })
    }
}
