//! Best-effort publisher in front of the system now-playing surface.

use thiserror::Error;

use super::NowPlayingMetadata;

/// Errors a surface may report.  The publisher only logs them.
#[derive(Debug, Clone, Error)]
pub enum SurfaceError {
    #[error("now-playing surface unavailable: {0}")]
    Unavailable(String),

    #[error("now-playing record rejected: {0}")]
    Rejected(String),
}

/// Platform now-playing centre (lock screen, notification, car display).
pub trait NowPlayingSurface: Send {
    fn publish(&mut self, metadata: &NowPlayingMetadata) -> Result<(), SurfaceError>;
    fn clear(&mut self) -> Result<(), SurfaceError>;
}

/// Forwards records to a [`NowPlayingSurface`], swallowing failures.
pub struct NowPlayingPublisher {
    surface: Box<dyn NowPlayingSurface>,
}

impl NowPlayingPublisher {
    pub fn new(surface: Box<dyn NowPlayingSurface>) -> Self {
        Self { surface }
    }

    pub fn publish(&mut self, metadata: &NowPlayingMetadata) {
        log::debug!(
            "now-playing: {:?} '{}' unit {}/{}",
            metadata.status,
            metadata.title,
            metadata.unit_index + 1,
            metadata.unit_count
        );
        if let Err(e) = self.surface.publish(metadata) {
            log::warn!("now-playing: publish failed ({e}); continuing");
        }
    }

    pub fn clear(&mut self) {
        log::debug!("now-playing: clear");
        if let Err(e) = self.surface.clear() {
            log::warn!("now-playing: clear failed ({e}); continuing");
        }
    }
}

impl std::fmt::Debug for NowPlayingPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NowPlayingPublisher").finish_non_exhaustive()
    }
}
