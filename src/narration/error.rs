//! Errors reported by narration operations.
//!
//! Only failures the caller can act on are errors.  Starting an empty
//! session, pausing while stopped and similar misfires are no-ops that show
//! up as [`Transition::Unchanged`](super::Transition::Unchanged), and
//! out-of-range rates are clamped.

use thiserror::Error;

use crate::speech::SpeechError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NarrationError {
    /// Toggle/play was requested but no article was ever queued.
    #[error("no article has been queued for narration")]
    NoActiveContent,

    /// The speech engine refused the session; nothing is playing.
    #[error("speech engine refused the session: {0}")]
    EngineUnavailable(#[from] SpeechError),

    /// The narration service task is gone.
    #[error("narration service has shut down")]
    ServiceClosed,
}
