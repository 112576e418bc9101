//! Speech-engine capability.
//!
//! # Overview
//!
//! [`SpeechEngine`] is the interface the narration controller drives.  It is
//! object-safe and `Send` so the controller can own a `Box<dyn SpeechEngine>`
//! and live inside a tokio task.
//!
//! Every call returns without waiting for audio to quiesce.  Progress is
//! reported later as [`EngineEvent`]s, which the engine implementation sends
//! to whoever drives the controller (see
//! [`NarrationService`](crate::narration::NarrationService)).

use thiserror::Error;

// ---------------------------------------------------------------------------
// SpeechError
// ---------------------------------------------------------------------------

/// Reasons an engine refuses an utterance.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpeechError {
    /// The engine is already speaking for someone else.
    #[error("speech engine is busy")]
    Busy,

    /// The requested voice is not installed.
    #[error("voice not supported: {0}")]
    UnsupportedVoice(String),

    /// The engine cannot be reached at all.
    #[error("speech engine unavailable: {0}")]
    Unavailable(String),
}

// ---------------------------------------------------------------------------
// Utterance
// ---------------------------------------------------------------------------

/// Identifies one utterance: which session issued it and which unit it is.
///
/// The generation increases with every started session, so completion
/// events from a stopped session can be told apart from the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtteranceId {
    pub generation: u64,
    pub index: usize,
}

/// One unit of text queued on the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub id: UtteranceId,
    pub text: String,
    pub rate: f32,
    /// `None` selects the engine default voice.
    pub voice: Option<String>,
}

/// Asynchronous progress reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    /// The utterance was spoken to the end.
    Finished(UtteranceId),
    /// The utterance was dropped by `stop_immediate` before finishing.
    Cancelled(UtteranceId),
}

impl EngineEvent {
    pub fn id(&self) -> UtteranceId {
        match self {
            EngineEvent::Finished(id) | EngineEvent::Cancelled(id) => *id,
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechEngine trait
// ---------------------------------------------------------------------------

/// Asynchronous text-to-speech engine.
///
/// # Contract
///
/// - `speak` queues one utterance behind any already queued; utterances are
///   spoken in the order they were queued.
/// - `pause_at_boundary` pauses at the next word boundary so that
///   `continue_speaking` resumes cleanly.
/// - `stop_immediate` drops the current and all queued utterances without
///   waiting for a boundary.
pub trait SpeechEngine: Send {
    /// Queue `utterance`.  An error means nothing was queued.
    fn speak(&mut self, utterance: Utterance) -> Result<(), SpeechError>;

    /// Request a word-boundary pause.  Returns `false` if nothing is playing.
    fn pause_at_boundary(&mut self) -> bool;

    /// Continue from the last boundary.  Returns `false` if nothing is paused.
    fn continue_speaking(&mut self) -> bool;

    /// Halt now and discard the queue.
    fn stop_immediate(&mut self);

    /// `true` while an utterance is being spoken or is queued.
    fn is_speaking(&self) -> bool;
}

// Compile-time assertion: Box<dyn SpeechEngine> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn SpeechEngine>) {}
};
