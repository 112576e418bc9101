//! Remote transport commands — lock screen, headset buttons, car controls.
//!
//! [`RemoteControlBridge`] maps a [`RemoteCommand`] onto a controller
//! operation using only the controller's current state, and answers with a
//! [`CommandStatus`] for the transport layer.  It holds no state.

pub mod bridge;
pub mod command;

pub use bridge::{RemoteAction, RemoteControlBridge};
pub use command::{CommandStatus, RejectReason, RemoteCommand};
