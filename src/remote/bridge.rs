//! State-keyed dispatch of remote commands.
//!
//! | Command         | NotPlaying              | Playing          | Paused            |
//! |-----------------|-------------------------|------------------|-------------------|
//! | TogglePlayPause | Rejected(NoSuchContent) | pause            | resume            |
//! | Play            | Rejected(NoSuchContent) | accepted, no-op  | resume            |
//! | Pause           | Rejected(NoSuchContent) | pause            | accepted, no-op   |
//! | Stop            | accepted, no-op         | stop             | stop              |
//! | ChangeRate(r)   | set_rate(r)             | set_rate(r)      | set_rate(r)       |
//!
//! [`RemoteControlBridge::plan`] is the table itself, a pure function.
//! [`RemoteControlBridge::dispatch`] applies it to a controller.

use crate::config::NarrationConfig;
use crate::narration::{NarrationController, PlaybackState};

use super::command::{CommandStatus, RejectReason, RemoteCommand};

/// The controller operation chosen for a (command, state) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RemoteAction {
    Pause,
    Resume,
    Stop,
    SetRate(f32),
    /// Accept without touching the controller.
    Ignore,
    Reject(RejectReason),
}

/// Stateless translator between the remote transport and the controller.
pub struct RemoteControlBridge;

impl RemoteControlBridge {
    /// Look up the action for `command` in `state`.
    ///
    /// ```
    /// use listen_later::narration::PlaybackState;
    /// use listen_later::remote::{RejectReason, RemoteAction, RemoteCommand, RemoteControlBridge};
    ///
    /// assert_eq!(
    ///     RemoteControlBridge::plan(RemoteCommand::Play, PlaybackState::NotPlaying),
    ///     RemoteAction::Reject(RejectReason::NoSuchContent)
    /// );
    /// assert_eq!(
    ///     RemoteControlBridge::plan(RemoteCommand::TogglePlayPause, PlaybackState::Paused),
    ///     RemoteAction::Resume
    /// );
    /// ```
    pub fn plan(command: RemoteCommand, state: PlaybackState) -> RemoteAction {
        use crate::narration::PlaybackState::{NotPlaying, Paused, Playing};

        match (command, state) {
            (RemoteCommand::ChangeRate(rate), _) => RemoteAction::SetRate(rate),

            (RemoteCommand::Stop, NotPlaying) => RemoteAction::Ignore,
            (RemoteCommand::Stop, Playing | Paused) => RemoteAction::Stop,

            (
                RemoteCommand::TogglePlayPause | RemoteCommand::Play | RemoteCommand::Pause,
                NotPlaying,
            ) => RemoteAction::Reject(RejectReason::NoSuchContent),

            (RemoteCommand::TogglePlayPause, Playing) => RemoteAction::Pause,
            (RemoteCommand::TogglePlayPause, Paused) => RemoteAction::Resume,

            (RemoteCommand::Play, Playing) => RemoteAction::Ignore,
            (RemoteCommand::Play, Paused) => RemoteAction::Resume,

            (RemoteCommand::Pause, Playing) => RemoteAction::Pause,
            (RemoteCommand::Pause, Paused) => RemoteAction::Ignore,
        }
    }

    /// Apply `command` to `controller` and report the outcome.
    pub fn dispatch(
        controller: &mut NarrationController,
        command: RemoteCommand,
    ) -> CommandStatus {
        let state = controller.state();
        let action = Self::plan(command, state);
        log::debug!("remote: {command:?} while {} → {action:?}", state.label());

        match action {
            RemoteAction::Pause => {
                controller.pause();
            }
            RemoteAction::Resume => {
                controller.resume();
            }
            RemoteAction::Stop => {
                controller.stop();
            }
            RemoteAction::SetRate(rate) => {
                controller.set_rate(rate);
            }
            RemoteAction::Ignore => {}
            RemoteAction::Reject(reason) => return CommandStatus::Rejected(reason),
        }
        CommandStatus::Accepted
    }

    /// Rates the transport's change-rate control should offer.
    pub fn supported_rates(config: &NarrationConfig) -> Vec<f32> {
        config.rate_bounds().supported_rates(config.rate_increment)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
