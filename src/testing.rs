//! Test doubles shared by the unit tests.
//!
//! Every double is `Clone` over shared interior state, so a test keeps one
//! copy for assertions while the controller owns a boxed copy.

use std::sync::{Arc, Mutex};

use crate::config::{MemorySettingsStore, SettingsStore, SpeechConfig};
use crate::narration::{NarrationController, NarrationSession};
use crate::now_playing::{NowPlayingMetadata, NowPlayingSurface, SurfaceError};
use crate::segment::SpeakableUnit;
use crate::speech::{RateBounds, SpeechEngine, SpeechError, Utterance};
use crate::system::PlaybackClaims;

// ---------------------------------------------------------------------------
// MockSpeechEngine
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct EngineLog {
    pub spoken: Vec<Utterance>,
    pub pauses: usize,
    pub continues: usize,
    pub stops: usize,
    pub speaking: bool,
    pub paused: bool,
}

/// Records every call; optionally refuses the utterance at `fail_at`.
#[derive(Clone, Default)]
pub struct MockSpeechEngine {
    log: Arc<Mutex<EngineLog>>,
    fail_at: Option<(usize, SpeechError)>,
}

impl MockSpeechEngine {
    /// Refuse the `index`-th `speak` call of each session with `error`.
    pub fn failing_at(index: usize, error: SpeechError) -> Self {
        Self {
            log: Arc::default(),
            fail_at: Some((index, error)),
        }
    }

    pub fn spoken(&self) -> Vec<Utterance> {
        self.log.lock().unwrap().spoken.clone()
    }

    pub fn spoken_texts(&self) -> Vec<String> {
        self.spoken().into_iter().map(|u| u.text).collect()
    }

    pub fn pauses(&self) -> usize {
        self.log.lock().unwrap().pauses
    }

    pub fn continues(&self) -> usize {
        self.log.lock().unwrap().continues
    }

    pub fn stops(&self) -> usize {
        self.log.lock().unwrap().stops
    }
}

impl SpeechEngine for MockSpeechEngine {
    fn speak(&mut self, utterance: Utterance) -> Result<(), SpeechError> {
        if let Some((index, error)) = &self.fail_at {
            if utterance.id.index == *index {
                return Err(error.clone());
            }
        }
        let mut log = self.log.lock().unwrap();
        log.spoken.push(utterance);
        log.speaking = true;
        Ok(())
    }

    fn pause_at_boundary(&mut self) -> bool {
        let mut log = self.log.lock().unwrap();
        log.pauses += 1;
        let was_speaking = log.speaking && !log.paused;
        log.paused = true;
        was_speaking
    }

    fn continue_speaking(&mut self) -> bool {
        let mut log = self.log.lock().unwrap();
        log.continues += 1;
        let was_paused = log.paused;
        log.paused = false;
        was_paused
    }

    fn stop_immediate(&mut self) {
        let mut log = self.log.lock().unwrap();
        log.stops += 1;
        log.speaking = false;
        log.paused = false;
    }

    fn is_speaking(&self) -> bool {
        self.log.lock().unwrap().speaking
    }
}

// ---------------------------------------------------------------------------
// RecordingSurface
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    Publish(NowPlayingMetadata),
    Clear,
}

/// Records publishes and clears; `failing()` also returns an error from each.
#[derive(Clone, Default)]
pub struct RecordingSurface {
    calls: Arc<Mutex<Vec<SurfaceCall>>>,
    fail: bool,
}

impl RecordingSurface {
    pub fn failing() -> Self {
        Self {
            calls: Arc::default(),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<SurfaceCall> {
        self.calls.lock().unwrap().last().cloned()
    }

    fn result(&self) -> Result<(), SurfaceError> {
        if self.fail {
            Err(SurfaceError::Unavailable("test surface".into()))
        } else {
            Ok(())
        }
    }
}

impl NowPlayingSurface for RecordingSurface {
    fn publish(&mut self, metadata: &NowPlayingMetadata) -> Result<(), SurfaceError> {
        self.calls
            .lock()
            .unwrap()
            .push(SurfaceCall::Publish(metadata.clone()));
        self.result()
    }

    fn clear(&mut self) -> Result<(), SurfaceError> {
        self.calls.lock().unwrap().push(SurfaceCall::Clear);
        self.result()
    }
}

// ---------------------------------------------------------------------------
// CountingClaims
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct ClaimCounts {
    pub idle_disables: usize,
    pub idle_enables: usize,
    pub remote_begins: usize,
    pub remote_ends: usize,
    pub idle_timer_disabled: bool,
}

#[derive(Clone, Default)]
pub struct CountingClaims {
    counts: Arc<Mutex<ClaimCounts>>,
}

impl CountingClaims {
    pub fn snapshot(&self) -> ClaimCounts {
        *self.counts.lock().unwrap()
    }
}

impl PlaybackClaims for CountingClaims {
    fn set_idle_timer_disabled(&mut self, disabled: bool) {
        let mut counts = self.counts.lock().unwrap();
        if disabled {
            counts.idle_disables += 1;
        } else {
            counts.idle_enables += 1;
        }
        counts.idle_timer_disabled = disabled;
    }

    fn begin_receiving_remote_events(&mut self) {
        self.counts.lock().unwrap().remote_begins += 1;
    }

    fn end_receiving_remote_events(&mut self) {
        self.counts.lock().unwrap().remote_ends += 1;
    }
}

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

/// A controller wired to doubles, with handles to all of them.
pub struct Fixture {
    pub controller: NarrationController,
    pub engine: MockSpeechEngine,
    pub surface: RecordingSurface,
    pub claims: CountingClaims,
    pub settings: Arc<MemorySettingsStore>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_engine(MockSpeechEngine::default())
    }

    pub fn with_engine(engine: MockSpeechEngine) -> Self {
        let surface = RecordingSurface::default();
        let claims = CountingClaims::default();
        let settings = Arc::new(MemorySettingsStore::new(SpeechConfig::default()));

        let controller = NarrationController::new(
            Box::new(engine.clone()),
            Arc::clone(&settings) as Arc<dyn SettingsStore>,
            Box::new(surface.clone()),
            Box::new(claims.clone()),
            RateBounds::default(),
        );

        Self {
            controller,
            engine,
            surface,
            claims,
            settings,
        }
    }
}

/// A session with `n` units: "unit 0", "unit 1", …
pub fn session(n: usize) -> NarrationSession {
    NarrationSession::new(
        "article-1",
        "Test article",
        "example.org",
        (0..n).map(|i| SpeakableUnit::new(format!("unit {i}"))).collect(),
    )
}
