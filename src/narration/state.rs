//! Playback state and transition results.

// ---------------------------------------------------------------------------
// PlaybackState
// ---------------------------------------------------------------------------

/// States of the narration controller.
///
/// ```text
/// NotPlaying ──start──▶ Playing ──pause──▶ Paused
///      ▲                  ▲  ◀──resume────   │
///      │                  │                  │
///      └──stop / last unit finished / teardown (from either)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// No session.  Initial state.
    #[default]
    NotPlaying,

    /// A session is queued on the engine and speaking.
    Playing,

    /// A session is held at a word boundary.
    Paused,
}

impl PlaybackState {
    /// `true` while a session exists (playing or paused).
    ///
    /// ```
    /// use listen_later::narration::PlaybackState;
    ///
    /// assert!(!PlaybackState::NotPlaying.has_session());
    /// assert!(PlaybackState::Playing.has_session());
    /// assert!(PlaybackState::Paused.has_session());
    /// ```
    pub fn has_session(&self) -> bool {
        !matches!(self, PlaybackState::NotPlaying)
    }

    /// A short human-readable label for the UI.
    pub fn label(&self) -> &'static str {
        match self {
            PlaybackState::NotPlaying => "Not playing",
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
        }
    }
}

// ---------------------------------------------------------------------------
// Transition
// ---------------------------------------------------------------------------

/// What an operation did to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Changed {
        from: PlaybackState,
        to: PlaybackState,
    },
    /// The operation did not apply in the current state.
    Unchanged,
}

impl Transition {
    pub fn is_changed(&self) -> bool {
        matches!(self, Transition::Changed { .. })
    }
}
