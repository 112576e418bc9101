//! Application entry point — listen to a saved article.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Open the settings store (defaults on first run).
//! 3. Read the article file and segment it into a session.
//! 4. Create the [`tokio`] runtime.
//! 5. Spawn the console speech engine and the narration service.
//! 6. Start narration and map stdin lines to commands until `quit` or EOF.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::{bail, Context};
use listen_later::{
    config::{AppConfig, AppPaths, SettingsStore, TomlSettingsStore},
    narration::{Article, NarrationController, NarrationHandle, NarrationService, NarrationSession},
    now_playing::{NowPlayingMetadata, NowPlayingSurface, SurfaceError},
    remote::{RemoteCommand, RemoteControlBridge},
    speech::{EngineEvent, SpeechEngine, SpeechError, Utterance, UtteranceId},
    system::PlaybackClaims,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, Notify};

const USAGE: &str = "usage: listen-later <article.html> [title]";

const HELP: &str = "commands: toggle | play | pause | stop | rate <0.0-1.0> | quit";

// ---------------------------------------------------------------------------
// Console speech engine
// ---------------------------------------------------------------------------

#[derive(Default)]
struct ConsoleQueue {
    pending: VecDeque<Utterance>,
    current: Option<UtteranceId>,
    paused: bool,
}

/// "Speaks" by printing each utterance and waiting roughly as long as a
/// voice would take at the utterance's rate.
///
/// Pausing takes effect between utterances, never mid-utterance.
struct ConsoleEngine {
    queue: Arc<Mutex<ConsoleQueue>>,
    wake: Arc<Notify>,
    /// Cuts the worker's current utterance short.
    halt: Arc<Notify>,
    events: mpsc::UnboundedSender<EngineEvent>,
}

impl ConsoleEngine {
    /// Create the engine and spawn its worker on the current runtime.
    fn spawn(events: mpsc::UnboundedSender<EngineEvent>) -> Self {
        let queue = Arc::new(Mutex::new(ConsoleQueue::default()));
        let wake = Arc::new(Notify::new());
        let halt = Arc::new(Notify::new());
        tokio::spawn(run_console_worker(
            Arc::clone(&queue),
            Arc::clone(&wake),
            Arc::clone(&halt),
            events.clone(),
        ));
        Self {
            queue,
            wake,
            halt,
            events,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ConsoleQueue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SpeechEngine for ConsoleEngine {
    fn speak(&mut self, utterance: Utterance) -> Result<(), SpeechError> {
        if utterance.text.is_empty() {
            return Err(SpeechError::Unavailable("empty utterance".into()));
        }
        self.lock().pending.push_back(utterance);
        self.wake.notify_one();
        Ok(())
    }

    fn pause_at_boundary(&mut self) -> bool {
        let mut queue = self.lock();
        let speaking = queue.current.is_some() || !queue.pending.is_empty();
        queue.paused = true;
        speaking
    }

    fn continue_speaking(&mut self) -> bool {
        let was_paused = std::mem::replace(&mut self.lock().paused, false);
        self.wake.notify_one();
        was_paused
    }

    fn stop_immediate(&mut self) {
        let dropped: Vec<UtteranceId> = {
            let mut queue = self.lock();
            queue.paused = false;
            queue
                .current
                .take()
                .into_iter()
                .chain(queue.pending.drain(..).map(|u| u.id))
                .collect()
        };
        self.halt.notify_waiters();
        for id in dropped {
            let _ = self.events.send(EngineEvent::Cancelled(id));
        }
    }

    fn is_speaking(&self) -> bool {
        let queue = self.lock();
        queue.current.is_some() || !queue.pending.is_empty()
    }
}

/// Roughly 150 words per minute at rate 0.5, twice that at rate 1.0.
fn speaking_time(utterance: &Utterance) -> Duration {
    let words = utterance.text.split_whitespace().count().max(1) as f32;
    let words_per_minute = 75.0 + 150.0 * utterance.rate.clamp(0.0, 1.0);
    Duration::from_secs_f32(words * 60.0 / words_per_minute)
}

async fn run_console_worker(
    queue: Arc<Mutex<ConsoleQueue>>,
    wake: Arc<Notify>,
    halt: Arc<Notify>,
    events: mpsc::UnboundedSender<EngineEvent>,
) {
    loop {
        let next = {
            let mut queue = queue.lock().unwrap_or_else(PoisonError::into_inner);
            if queue.paused {
                None
            } else {
                let next = queue.pending.pop_front();
                queue.current = next.as_ref().map(|u| u.id);
                next
            }
        };

        let Some(utterance) = next else {
            wake.notified().await;
            continue;
        };

        println!("🔊 [{}] {}", utterance.id.index, utterance.text);
        tokio::select! {
            _ = tokio::time::sleep(speaking_time(&utterance)) => {}
            _ = halt.notified() => {
                log::debug!("console engine: cut off unit {}", utterance.id.index);
            }
        }

        // stop_immediate clears `current` and reports the cancellation itself.
        let finished = {
            let mut queue = queue.lock().unwrap_or_else(PoisonError::into_inner);
            if queue.current == Some(utterance.id) {
                queue.current = None;
                true
            } else {
                false
            }
        };
        if finished && events.send(EngineEvent::Finished(utterance.id)).is_err() {
            log::debug!("console engine: event receiver gone, worker exiting");
            break;
        }
    }
}

// ---------------------------------------------------------------------------
// Logging surface and claims
// ---------------------------------------------------------------------------

/// Prints now-playing records as JSON.
struct LogSurface;

impl NowPlayingSurface for LogSurface {
    fn publish(&mut self, metadata: &NowPlayingMetadata) -> Result<(), SurfaceError> {
        let json =
            serde_json::to_string(metadata).map_err(|e| SurfaceError::Rejected(e.to_string()))?;
        log::info!("now playing: {json}");
        Ok(())
    }

    fn clear(&mut self) -> Result<(), SurfaceError> {
        log::info!("now playing: cleared");
        Ok(())
    }
}

struct LogClaims;

impl PlaybackClaims for LogClaims {
    fn set_idle_timer_disabled(&mut self, disabled: bool) {
        log::debug!("claims: idle timer disabled = {disabled}");
    }

    fn begin_receiving_remote_events(&mut self) {
        log::debug!("claims: receiving remote events");
    }

    fn end_receiving_remote_events(&mut self) {
        log::debug!("claims: stopped receiving remote events");
    }
}

// ---------------------------------------------------------------------------
// Console commands
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
enum ConsoleCommand {
    /// The in-app play/pause button.
    Toggle,
    /// A transport command, as a headset or lock screen would send.
    Remote(RemoteCommand),
    Quit,
}

fn parse_command(line: &str) -> Option<ConsoleCommand> {
    let mut words = line.split_whitespace();
    let command = match (words.next()?, words.next()) {
        ("toggle", None) => ConsoleCommand::Toggle,
        ("play", None) => ConsoleCommand::Remote(RemoteCommand::Play),
        ("pause", None) => ConsoleCommand::Remote(RemoteCommand::Pause),
        ("stop", None) => ConsoleCommand::Remote(RemoteCommand::Stop),
        ("rate", Some(value)) => {
            ConsoleCommand::Remote(RemoteCommand::ChangeRate(value.parse().ok()?))
        }
        ("quit" | "exit", None) => ConsoleCommand::Quit,
        _ => return None,
    };
    words.next().is_none().then_some(command)
}

async fn read_commands(handle: &NarrationHandle) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line) {
            Some(ConsoleCommand::Toggle) => {
                if let Err(e) = handle.toggle_play_pause().await {
                    println!("{e}");
                }
            }
            Some(ConsoleCommand::Remote(command)) => {
                let status = handle.remote(command).await;
                if !status.is_accepted() {
                    println!("{command:?}: {status:?}");
                }
            }
            Some(ConsoleCommand::Quit) => break,
            None => println!("{HELP}"),
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

async fn run(session: NarrationSession, store: Arc<TomlSettingsStore>) -> anyhow::Result<()> {
    let config = store.config();
    log::info!(
        "supported rates: {:?}",
        RemoteControlBridge::supported_rates(&config.narration)
    );

    let (engine_tx, engine_rx) = mpsc::unbounded_channel();
    let controller = NarrationController::new(
        Box::new(ConsoleEngine::spawn(engine_tx)),
        store as Arc<dyn SettingsStore>,
        Box::new(LogSurface),
        Box::new(LogClaims),
        config.narration.rate_bounds(),
    );

    let (service, handle) = NarrationService::new(controller);
    let mut state_rx = service.subscribe();
    let service_task = tokio::spawn(service.run(engine_rx));

    tokio::spawn(async move {
        while state_rx.changed().await.is_ok() {
            let state = *state_rx.borrow_and_update();
            println!("── {} ──", state.label());
        }
    });

    handle.start(session).await?;
    println!("{HELP}");

    read_commands(&handle).await?;

    handle.teardown().await?;
    drop(handle);
    service_task.await?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        bail!(USAGE);
    };

    // 2. Configuration
    let paths = AppPaths::new();
    let store = TomlSettingsStore::open(&paths.settings_file).unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        TomlSettingsStore::new(&paths.settings_file, AppConfig::default())
    });
    let config = store.config();

    // 3. Article
    let content =
        std::fs::read_to_string(&path).with_context(|| format!("failed to read {path}"))?;
    let title = args.next().unwrap_or_else(|| {
        Path::new(&path)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.clone())
    });
    let article = Article {
        id: path.clone(),
        title,
        origin_label: "local file".into(),
        content,
    };
    let session = NarrationSession::from_article(&article, config.narration.announce_title);
    if session.is_empty() {
        bail!("{path} has nothing to read aloud");
    }
    log::info!(
        "Listen Later: '{}' ({} units)",
        session.title(),
        session.units().len()
    );

    // 4. Tokio runtime
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    rt.block_on(run(session, Arc::new(store)))
}
