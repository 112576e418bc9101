//! The now-playing record.

use serde::Serialize;

use crate::narration::{NarrationSession, PlaybackState};

/// Playback status as shown by the system surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NowPlayingStatus {
    /// Mapping target for `NotPlaying` only.  The controller clears the
    /// surface on reaching `NotPlaying`, so no published record carries it.
    Stopped,
    Playing,
    Paused,
}

impl From<PlaybackState> for NowPlayingStatus {
    fn from(state: PlaybackState) -> Self {
        match state {
            PlaybackState::NotPlaying => NowPlayingStatus::Stopped,
            PlaybackState::Playing => NowPlayingStatus::Playing,
            PlaybackState::Paused => NowPlayingStatus::Paused,
        }
    }
}

/// Kind of media advertised to the surface.  Narration is always audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Audio,
}

/// Derived description of the narrated article.
///
/// Built fresh from controller state on every publish; nothing mutates a
/// record after it is built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NowPlayingMetadata {
    pub content_id: String,
    pub title: String,
    pub origin_label: String,
    pub rate: f32,
    pub is_live: bool,
    pub status: NowPlayingStatus,
    pub media_kind: MediaKind,
    /// Zero-based index of the unit being spoken.
    pub unit_index: usize,
    pub unit_count: usize,
}

impl NowPlayingMetadata {
    pub fn for_session(session: &NarrationSession, state: PlaybackState, rate: f32) -> Self {
        Self {
            content_id: session.content_id().to_string(),
            title: session.title().to_string(),
            origin_label: session.origin_label().to_string(),
            rate,
            is_live: false,
            status: state.into(),
            media_kind: MediaKind::Audio,
            unit_index: session.current_index(),
            unit_count: session.units().len(),
        }
    }
}
