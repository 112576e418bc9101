//! Narration service — serializes every entry point through one task.
//!
//! [`NarrationService`] owns the [`NarrationController`] and processes
//! messages one at a time:
//!
//! ```text
//! NarrationHandle::pause() ──┐
//! NarrationHandle::remote() ─┼─ mpsc ─▶ run() ─▶ controller.pause()
//!                            │                   RemoteControlBridge::dispatch()
//! SpeechEngine callbacks ────┘ (unbounded)       controller.handle_engine_event()
//! ```
//!
//! Because one task decides and transitions, a UI toggle racing a headset
//! toggle is applied in some order, never interleaved.

use tokio::sync::{mpsc, oneshot};

use crate::remote::{CommandStatus, RejectReason, RemoteCommand, RemoteControlBridge};
use crate::speech::EngineEvent;

use super::controller::NarrationController;
use super::error::NarrationError;
use super::session::NarrationSession;
use super::state::{PlaybackState, Transition};

/// Capacity of the request channel.
const REQUEST_QUEUE: usize = 32;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

enum Request {
    Start {
        session: NarrationSession,
        reply: oneshot::Sender<Result<Transition, NarrationError>>,
    },
    Pause {
        reply: oneshot::Sender<Transition>,
    },
    Resume {
        reply: oneshot::Sender<Transition>,
    },
    Stop {
        reply: oneshot::Sender<Transition>,
    },
    Toggle {
        reply: oneshot::Sender<Result<Transition, NarrationError>>,
    },
    SetRate {
        rate: f32,
        reply: oneshot::Sender<f32>,
    },
    Remote {
        command: RemoteCommand,
        reply: oneshot::Sender<CommandStatus>,
    },
    State {
        reply: oneshot::Sender<PlaybackState>,
    },
    Teardown {
        reply: oneshot::Sender<Transition>,
    },
}

// ---------------------------------------------------------------------------
// NarrationService
// ---------------------------------------------------------------------------

/// Owns the controller inside a tokio task.
///
/// ```rust,no_run
/// # use listen_later::narration::{NarrationController, NarrationService};
/// # async fn example(controller: NarrationController) {
/// let (engine_tx, engine_rx) = tokio::sync::mpsc::unbounded_channel();
/// // engine_tx goes to the speech engine so it can report completions.
/// # drop(engine_tx);
/// let (service, handle) = NarrationService::new(controller);
/// tokio::spawn(service.run(engine_rx));
///
/// handle.pause().await.ok();
/// # }
/// ```
pub struct NarrationService {
    controller: NarrationController,
    requests: mpsc::Receiver<Request>,
}

impl NarrationService {
    /// Wrap `controller` and return the handle used to reach it.
    pub fn new(controller: NarrationController) -> (Self, NarrationHandle) {
        let (tx, requests) = mpsc::channel(REQUEST_QUEUE);
        (
            Self {
                controller,
                requests,
            },
            NarrationHandle { tx },
        )
    }

    /// Watch the controller's state from outside the task.
    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<PlaybackState> {
        self.controller.subscribe()
    }

    /// Process requests and engine events until every [`NarrationHandle`]
    /// is dropped, then tear the controller down.
    pub async fn run(mut self, mut engine_events: mpsc::UnboundedReceiver<EngineEvent>) {
        let mut engine_open = true;

        loop {
            tokio::select! {
                request = self.requests.recv() => match request {
                    Some(request) => self.handle(request),
                    None => break,
                },
                event = engine_events.recv(), if engine_open => match event {
                    Some(event) => {
                        self.controller.handle_engine_event(event);
                    }
                    None => {
                        log::debug!("narration: engine event channel closed");
                        engine_open = false;
                    }
                },
            }
        }

        self.controller.teardown();
        log::info!("narration: all handles dropped, service shutting down");
    }

    fn handle(&mut self, request: Request) {
        // A dropped reply receiver just means the caller stopped waiting.
        match request {
            Request::Start { session, reply } => {
                let _ = reply.send(self.controller.start(session));
            }
            Request::Pause { reply } => {
                let _ = reply.send(self.controller.pause());
            }
            Request::Resume { reply } => {
                let _ = reply.send(self.controller.resume());
            }
            Request::Stop { reply } => {
                let _ = reply.send(self.controller.stop());
            }
            Request::Toggle { reply } => {
                let _ = reply.send(self.controller.toggle_play_pause());
            }
            Request::SetRate { rate, reply } => {
                let _ = reply.send(self.controller.set_rate(rate));
            }
            Request::Remote { command, reply } => {
                let status = RemoteControlBridge::dispatch(&mut self.controller, command);
                let _ = reply.send(status);
            }
            Request::State { reply } => {
                let _ = reply.send(self.controller.state());
            }
            Request::Teardown { reply } => {
                let _ = reply.send(self.controller.teardown());
            }
        }
    }
}

// ---------------------------------------------------------------------------
// NarrationHandle
// ---------------------------------------------------------------------------

/// Cheap, cloneable front door to a running [`NarrationService`].
///
/// Every method waits for the service to apply the request and returns the
/// controller's answer.  Once the service is gone, methods return
/// [`NarrationError::ServiceClosed`] (or
/// `Rejected(CommandFailed)` for remote commands).
#[derive(Clone, Debug)]
pub struct NarrationHandle {
    tx: mpsc::Sender<Request>,
}

impl NarrationHandle {
    pub async fn start(&self, session: NarrationSession) -> Result<Transition, NarrationError> {
        self.call(|reply| Request::Start { session, reply }).await?
    }

    pub async fn pause(&self) -> Result<Transition, NarrationError> {
        self.call(|reply| Request::Pause { reply }).await
    }

    pub async fn resume(&self) -> Result<Transition, NarrationError> {
        self.call(|reply| Request::Resume { reply }).await
    }

    pub async fn stop(&self) -> Result<Transition, NarrationError> {
        self.call(|reply| Request::Stop { reply }).await
    }

    pub async fn toggle_play_pause(&self) -> Result<Transition, NarrationError> {
        self.call(|reply| Request::Toggle { reply }).await?
    }

    /// Returns the rate actually stored after clamping.
    pub async fn set_rate(&self, rate: f32) -> Result<f32, NarrationError> {
        self.call(|reply| Request::SetRate { rate, reply }).await
    }

    /// Forward a transport command.  Never fails; a stopped service answers
    /// `Rejected(CommandFailed)`.
    pub async fn remote(&self, command: RemoteCommand) -> CommandStatus {
        self.call(|reply| Request::Remote { command, reply })
            .await
            .unwrap_or(CommandStatus::Rejected(RejectReason::CommandFailed))
    }

    pub async fn state(&self) -> Result<PlaybackState, NarrationError> {
        self.call(|reply| Request::State { reply }).await
    }

    /// Forced teardown, e.g. when the app is backgrounded.
    pub async fn teardown(&self) -> Result<Transition, NarrationError> {
        self.call(|reply| Request::Teardown { reply }).await
    }

    async fn call<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Request,
    ) -> Result<T, NarrationError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| NarrationError::ServiceClosed)?;
        rx.await.map_err(|_| NarrationError::ServiceClosed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narration::PlaybackState::{NotPlaying, Paused, Playing};
    use crate::speech::UtteranceId;
    use crate::testing::{session, ClaimCounts, CountingClaims, Fixture, MockSpeechEngine};
    use tokio::sync::watch;

    struct Running {
        handle: NarrationHandle,
        engine_tx: mpsc::UnboundedSender<EngineEvent>,
        state: watch::Receiver<PlaybackState>,
        engine: MockSpeechEngine,
        claims: CountingClaims,
        task: tokio::task::JoinHandle<()>,
    }

    impl Running {
        fn claims(&self) -> ClaimCounts {
            self.claims.snapshot()
        }
    }

    fn spawn() -> Running {
        let Fixture {
            controller,
            engine,
            claims,
            ..
        } = Fixture::new();
        let (service, handle) = NarrationService::new(controller);
        let state = service.subscribe();
        let (engine_tx, engine_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(service.run(engine_rx));
        Running {
            handle,
            engine_tx,
            state,
            engine,
            claims,
            task,
        }
    }

    #[tokio::test]
    async fn handle_drives_full_cycle() {
        let rt = spawn();
        let handle = &rt.handle;

        assert!(handle.start(session(2)).await.unwrap().is_changed());
        assert_eq!(handle.state().await.unwrap(), Playing);

        handle.pause().await.unwrap();
        assert_eq!(handle.state().await.unwrap(), Paused);

        handle.resume().await.unwrap();
        handle.stop().await.unwrap();
        assert_eq!(handle.state().await.unwrap(), NotPlaying);

        assert_eq!(rt.engine.spoken().len(), 2);
        assert_eq!(rt.claims().remote_ends, 1);
    }

    #[tokio::test]
    async fn toggle_without_content_reports_error() {
        let rt = spawn();
        assert_eq!(
            rt.handle.toggle_play_pause().await,
            Err(NarrationError::NoActiveContent)
        );
    }

    #[tokio::test]
    async fn remote_play_while_not_playing_is_rejected() {
        let rt = spawn();
        assert_eq!(
            rt.handle.remote(RemoteCommand::Play).await,
            CommandStatus::Rejected(RejectReason::NoSuchContent)
        );
        assert_eq!(rt.handle.state().await.unwrap(), NotPlaying);
    }

    #[tokio::test]
    async fn set_rate_reports_clamped_value() {
        let rt = spawn();
        assert_eq!(rt.handle.set_rate(12.0).await.unwrap(), 1.0);
    }

    #[tokio::test]
    async fn engine_completion_ends_session() {
        let mut rt = spawn();
        rt.handle.start(session(2)).await.unwrap();
        let generation = rt.engine.spoken()[0].id.generation;

        for index in 0..2 {
            rt.engine_tx
                .send(EngineEvent::Finished(UtteranceId { generation, index }))
                .unwrap();
        }

        while *rt.state.borrow_and_update() != NotPlaying {
            rt.state.changed().await.unwrap();
        }
        assert_eq!(rt.claims().remote_ends, 1);
        assert_eq!(rt.engine.stops(), 0);
    }

    #[tokio::test]
    async fn concurrent_toggles_never_tear() {
        let rt = spawn();
        rt.handle.start(session(3)).await.unwrap();

        let mut local = Vec::new();
        let mut remote = Vec::new();
        for _ in 0..50 {
            let h = rt.handle.clone();
            local.push(tokio::spawn(async move { h.toggle_play_pause().await }));
            let h = rt.handle.clone();
            remote.push(tokio::spawn(async move {
                h.remote(RemoteCommand::TogglePlayPause).await
            }));
        }
        for join in local {
            assert!(join.await.unwrap().unwrap().is_changed());
        }
        for join in remote {
            assert_eq!(join.await.unwrap(), CommandStatus::Accepted);
        }

        // An even number of toggles from Playing lands back on Playing.
        assert_eq!(rt.handle.state().await.unwrap(), Playing);
        assert_eq!(rt.engine.pauses(), 50);
        assert_eq!(rt.engine.continues(), 50);
        assert_eq!(rt.claims().remote_begins, 1);
    }

    #[tokio::test]
    async fn dropping_all_handles_tears_down() {
        let rt = spawn();
        rt.handle.start(session(1)).await.unwrap();

        drop(rt.handle);
        rt.task.await.unwrap();

        let claims = rt.claims.snapshot();
        assert_eq!(claims.remote_ends, 1);
        assert!(!claims.idle_timer_disabled);
        assert_eq!(rt.engine.stops(), 1);
    }

    #[tokio::test]
    async fn closed_service_reports_closed() {
        let rt = spawn();
        rt.task.abort();
        let _ = rt.task.await;

        assert_eq!(rt.handle.pause().await, Err(NarrationError::ServiceClosed));
        assert_eq!(
            rt.handle.remote(RemoteCommand::Pause).await,
            CommandStatus::Rejected(RejectReason::CommandFailed)
        );
    }
}
