//! Narration core for the listen-later reading-list client.
//!
//! Turns marked-up article bodies into speakable units ([`segment`]) and
//! drives a playback state machine ([`narration`]) that receives commands
//! from both the in-app UI and the system media-remote surface ([`remote`]),
//! mirroring its state onto the now-playing surface ([`now_playing`]).

pub mod config;
pub mod narration;
pub mod now_playing;
pub mod remote;
pub mod segment;
pub mod speech;
pub mod system;

#[cfg(test)]
pub(crate) mod testing;
