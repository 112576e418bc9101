//! Commands arriving from the system media-remote surface and the status
//! codes returned for them.

/// A transport request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RemoteCommand {
    TogglePlayPause,
    Play,
    Pause,
    Stop,
    /// Requested speaking rate, unclamped.
    ChangeRate(f32),
}

/// Why a command was not carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Nothing is loaded to play or pause.
    NoSuchContent,
    /// The narration service is no longer running.
    CommandFailed,
}

/// Result code handed back to the transport.  Never an error value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Accepted,
    Rejected(RejectReason),
}

impl CommandStatus {
    pub fn is_accepted(&self) -> bool {
        matches!(self, CommandStatus::Accepted)
    }
}
