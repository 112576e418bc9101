//! Now-playing surface — mirrors narration state onto the system display.
//!
//! * [`NowPlayingMetadata`] — the derived record handed to the surface.
//! * [`NowPlayingSurface`] — trait for the platform now-playing centre.
//! * [`NowPlayingPublisher`] — best-effort wrapper the controller calls
//!   after every transition; surface errors are logged, never returned.

pub mod metadata;
pub mod publisher;

pub use metadata::{MediaKind, NowPlayingMetadata, NowPlayingStatus};
pub use publisher::{NowPlayingPublisher, NowPlayingSurface, SurfaceError};
