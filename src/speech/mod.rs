//! Speech capability consumed by the narration controller.
//!
//! * [`SpeechEngine`] — trait for the platform text-to-speech engine.
//! * [`Utterance`] / [`UtteranceId`] / [`EngineEvent`] — what goes in and
//!   what comes back.
//! * [`RateBounds`] — clamping and the advertised rate ladder.

pub mod engine;
pub mod rate;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use engine::{EngineEvent, SpeechEngine, SpeechError, Utterance, UtteranceId};
pub use rate::RateBounds;
