//! Narration module — the playback state machine and its serialized front.
//!
//! # Architecture
//!
//! ```text
//! UI ──────────────┐
//!                  ├─▶ NarrationHandle ──mpsc──▶ NarrationService::run()
//! RemoteCommand ───┘                               │  (one message at a time)
//! EngineEvent ─────────────unbounded mpsc──────────┤
//!                                                  ▼
//!                                       NarrationController
//!                                         ├─ SpeechEngine
//!                                         ├─ ClaimGuard (idle timer, remote events)
//!                                         ├─ NowPlayingPublisher
//!                                         └─ watch::Sender<PlaybackState> ─▶ UI
//! ```
//!
//! The controller is the only owner of [`PlaybackState`] and the active
//! [`NarrationSession`].  Code that shares it across tasks goes through
//! [`NarrationService`], so every read-decide-transition step is atomic.

pub mod controller;
pub mod error;
pub mod service;
pub mod session;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use controller::NarrationController;
pub use error::NarrationError;
pub use service::{NarrationHandle, NarrationService};
pub use session::{Article, NarrationSession};
pub use state::{PlaybackState, Transition};
