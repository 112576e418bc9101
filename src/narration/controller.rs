//! Narration controller — the playback state machine.
//!
//! [`NarrationController`] owns the [`PlaybackState`], the active
//! [`NarrationSession`] and every capability that reacts to them.  Each
//! operation decides from the current state, drives the engine, and then
//! runs the post-transition side effects explicitly:
//!
//! ```text
//! → Playing | Paused : publish now-playing record, notify watchers
//! → NotPlaying       : drop session, release claims, clear now-playing, notify watchers
//! ```
//!
//! Claims are taken only after the engine has accepted the whole session,
//! so a refused start leaves nothing to undo.

use std::sync::Arc;

use tokio::sync::watch;

use crate::config::SettingsStore;
use crate::now_playing::{NowPlayingMetadata, NowPlayingPublisher, NowPlayingSurface};
use crate::speech::{EngineEvent, RateBounds, SpeechEngine, Utterance, UtteranceId};
use crate::system::{ClaimGuard, PlaybackClaims};

use super::error::NarrationError;
use super::session::NarrationSession;
use super::state::{PlaybackState, Transition};

/// The session currently queued on the engine.
#[derive(Debug)]
struct ActiveSession {
    session: NarrationSession,
    generation: u64,
    rate: f32,
}

// ---------------------------------------------------------------------------
// NarrationController
// ---------------------------------------------------------------------------

/// Sole authority on narration state.
///
/// Methods take `&mut self`; share the controller through
/// [`NarrationService`](super::NarrationService) rather than a lock held by
/// several callers.
pub struct NarrationController {
    engine: Box<dyn SpeechEngine>,
    settings: Arc<dyn SettingsStore>,
    publisher: NowPlayingPublisher,
    claims: ClaimGuard,
    bounds: RateBounds,

    state: PlaybackState,
    active: Option<ActiveSession>,
    last_queued: Option<NarrationSession>,
    generation: u64,
    state_tx: watch::Sender<PlaybackState>,
}

impl NarrationController {
    /// Create a controller in `NotPlaying`.
    ///
    /// # Arguments
    ///
    /// * `engine`   — speech engine that receives utterances.
    /// * `settings` — where the default rate and voice are read and stored.
    /// * `surface`  — system now-playing centre.
    /// * `claims`   — idle-timer and remote-event switches.
    /// * `bounds`   — allowed speaking-rate range.
    pub fn new(
        engine: Box<dyn SpeechEngine>,
        settings: Arc<dyn SettingsStore>,
        surface: Box<dyn NowPlayingSurface>,
        claims: Box<dyn PlaybackClaims>,
        bounds: RateBounds,
    ) -> Self {
        let (state_tx, _) = watch::channel(PlaybackState::NotPlaying);
        Self {
            engine,
            settings,
            publisher: NowPlayingPublisher::new(surface),
            claims: ClaimGuard::new(claims),
            bounds,
            state: PlaybackState::NotPlaying,
            active: None,
            last_queued: None,
            generation: 0,
            state_tx,
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// The active session, if playing or paused.
    pub fn session(&self) -> Option<&NarrationSession> {
        self.active.as_ref().map(|a| &a.session)
    }

    /// The session `toggle_play_pause` would restart from `NotPlaying`.
    pub fn last_queued(&self) -> Option<&NarrationSession> {
        self.last_queued.as_ref()
    }

    /// Stored default rate, clamped.
    pub fn rate(&self) -> f32 {
        self.bounds.clamp(self.settings.speech_rate())
    }

    pub fn bounds(&self) -> RateBounds {
        self.bounds
    }

    /// Id of the utterance currently being spoken.
    pub fn current_utterance(&self) -> Option<UtteranceId> {
        self.active.as_ref().map(|a| UtteranceId {
            generation: a.generation,
            index: a.session.current_index(),
        })
    }

    /// Now-playing record for the active session.
    pub fn metadata(&self) -> Option<NowPlayingMetadata> {
        self.active
            .as_ref()
            .map(|a| NowPlayingMetadata::for_session(&a.session, self.state, a.rate))
    }

    /// Receive every state change.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.state_tx.subscribe()
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Queue `session` on the engine and start playing.
    ///
    /// No-op unless `NotPlaying`, and for a session with no units.
    ///
    /// # Errors
    ///
    /// [`NarrationError::EngineUnavailable`] if the engine refuses any
    /// unit; the engine is halted and the state stays `NotPlaying`.
    pub fn start(&mut self, session: NarrationSession) -> Result<Transition, NarrationError> {
        if self.state != PlaybackState::NotPlaying {
            log::debug!("narration: start ignored while {}", self.state.label());
            return Ok(Transition::Unchanged);
        }
        if session.is_empty() {
            log::debug!(
                "narration: '{}' has nothing to speak; not starting",
                session.title()
            );
            return Ok(Transition::Unchanged);
        }

        let session = session.rewound();
        let rate = self.rate();
        let voice = self.settings.speech_voice();
        // Bumped even if the engine refuses, so events from a half-queued
        // session can never match a later one.
        self.generation += 1;
        let generation = self.generation;

        for (index, unit) in session.units().iter().enumerate() {
            let utterance = Utterance {
                id: UtteranceId { generation, index },
                text: unit.text().to_string(),
                rate,
                voice: voice.clone(),
            };
            if let Err(e) = self.engine.speak(utterance) {
                log::warn!(
                    "narration: engine refused unit {index} of '{}': {e}",
                    session.title()
                );
                self.engine.stop_immediate();
                return Err(e.into());
            }
        }

        self.claims.acquire();

        log::info!(
            "narration: starting '{}' ({} units, rate {rate})",
            session.title(),
            session.units().len()
        );

        self.last_queued = Some(session.clone());
        self.active = Some(ActiveSession {
            session,
            generation,
            rate,
        });

        Ok(self.transition(PlaybackState::Playing))
    }

    /// Pause at the next word boundary.  No-op unless `Playing`.
    pub fn pause(&mut self) -> Transition {
        if self.state != PlaybackState::Playing {
            return Transition::Unchanged;
        }
        if !self.engine.pause_at_boundary() {
            log::debug!("narration: engine had nothing to pause");
        }
        self.transition(PlaybackState::Paused)
    }

    /// Continue from the last boundary.  No-op unless `Paused`.
    pub fn resume(&mut self) -> Transition {
        if self.state != PlaybackState::Paused {
            return Transition::Unchanged;
        }
        if !self.engine.continue_speaking() {
            log::debug!("narration: engine had nothing to continue");
        }
        self.transition(PlaybackState::Playing)
    }

    /// Halt immediately and drop the session.  No-op from `NotPlaying`.
    ///
    /// When this returns the engine has been told to stop and the claims
    /// are released.
    pub fn stop(&mut self) -> Transition {
        if self.state == PlaybackState::NotPlaying {
            return Transition::Unchanged;
        }
        self.engine.stop_immediate();
        self.transition(PlaybackState::NotPlaying)
    }

    /// Pause if playing, resume if paused, restart the last queued session
    /// if stopped.
    ///
    /// # Errors
    ///
    /// [`NarrationError::NoActiveContent`] when stopped with nothing ever
    /// queued, or whatever [`start`](Self::start) returns.
    pub fn toggle_play_pause(&mut self) -> Result<Transition, NarrationError> {
        match self.state {
            PlaybackState::Playing => Ok(self.pause()),
            PlaybackState::Paused => Ok(self.resume()),
            PlaybackState::NotPlaying => match self.last_queued.clone() {
                Some(session) => self.start(session),
                None => Err(NarrationError::NoActiveContent),
            },
        }
    }

    /// Clamp `rate`, store it as the default and return the stored value.
    ///
    /// Utterances already queued keep the rate they were queued with; the
    /// new rate applies from the next `start`.
    pub fn set_rate(&mut self, rate: f32) -> f32 {
        let clamped = self.bounds.clamp(rate);
        if clamped != rate {
            log::debug!("narration: rate {rate} clamped to {clamped}");
        }
        self.settings.set_speech_rate(clamped);
        clamped
    }

    /// Fold an engine completion event into the state machine.
    ///
    /// Events from an earlier session are ignored.  Finishing the last unit
    /// ends the session exactly like [`stop`](Self::stop).  A cancellation
    /// the controller did not ask for means the engine dropped the session.
    pub fn handle_engine_event(&mut self, event: EngineEvent) -> Transition {
        let id = event.id();
        let Some(active) = self.active.as_mut() else {
            log::debug!("narration: ignoring {event:?} with no active session");
            return Transition::Unchanged;
        };
        if id.generation != active.generation {
            log::debug!("narration: ignoring stale {event:?}");
            return Transition::Unchanged;
        }

        match event {
            EngineEvent::Finished(_) => {
                let next = id.index + 1;
                if next >= active.session.units().len() {
                    log::info!("narration: finished '{}'", active.session.title());
                    return self.transition(PlaybackState::NotPlaying);
                }
                if next > active.session.current_index() {
                    active.session.set_current_index(next);
                    self.publish();
                }
                Transition::Unchanged
            }
            EngineEvent::Cancelled(_) => {
                log::warn!(
                    "narration: engine dropped unit {} of '{}'",
                    id.index,
                    active.session.title()
                );
                self.engine.stop_immediate();
                self.transition(PlaybackState::NotPlaying)
            }
        }
    }

    /// Forced teardown (app backgrounded or terminating).  Same effect as
    /// [`stop`](Self::stop).
    pub fn teardown(&mut self) -> Transition {
        if self.state.has_session() {
            log::info!("narration: forced teardown while {}", self.state.label());
        }
        self.stop()
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Set the state and run the side effects for entering it.
    fn transition(&mut self, to: PlaybackState) -> Transition {
        let from = self.state;
        self.state = to;

        match to {
            PlaybackState::NotPlaying => {
                self.active = None;
                self.claims.release();
                self.publisher.clear();
            }
            PlaybackState::Playing | PlaybackState::Paused => self.publish(),
        }

        self.state_tx.send_replace(to);
        log::debug!("narration: {} → {}", from.label(), to.label());
        Transition::Changed { from, to }
    }

    fn publish(&mut self) {
        if let Some(metadata) = self.metadata() {
            self.publisher.publish(&metadata);
        }
    }
}

impl Drop for NarrationController {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for NarrationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NarrationController")
            .field("state", &self.state)
            .field("active", &self.active)
            .field("generation", &self.generation)
            .field("claims", &self.claims)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
