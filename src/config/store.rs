//! Settings capability — where the narration controller reads and writes the
//! default speaking rate and selected voice.
//!
//! [`TomlSettingsStore`] writes through to `settings.toml` on every change;
//! [`MemorySettingsStore`] keeps values in memory only.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use super::{AppConfig, SpeechConfig};

// ---------------------------------------------------------------------------
// SettingsStore trait
// ---------------------------------------------------------------------------

/// Get/set access to persisted speech preferences.
///
/// Setters never fail from the caller's point of view; persistence problems
/// are logged by the implementation.
pub trait SettingsStore: Send + Sync {
    fn speech_rate(&self) -> f32;
    fn set_speech_rate(&self, rate: f32);
    fn speech_voice(&self) -> Option<String>;
    fn set_speech_voice(&self, voice: Option<String>);
}

// ---------------------------------------------------------------------------
// MemorySettingsStore
// ---------------------------------------------------------------------------

/// Non-persistent store.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    speech: Mutex<SpeechConfig>,
}

impl MemorySettingsStore {
    pub fn new(speech: SpeechConfig) -> Self {
        Self {
            speech: Mutex::new(speech),
        }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn speech_rate(&self) -> f32 {
        self.speech.lock().unwrap_or_else(PoisonError::into_inner).rate
    }

    fn set_speech_rate(&self, rate: f32) {
        self.speech.lock().unwrap_or_else(PoisonError::into_inner).rate = rate;
    }

    fn speech_voice(&self) -> Option<String> {
        self.speech
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .voice
            .clone()
    }

    fn set_speech_voice(&self, voice: Option<String>) {
        self.speech.lock().unwrap_or_else(PoisonError::into_inner).voice = voice;
    }
}

// ---------------------------------------------------------------------------
// TomlSettingsStore
// ---------------------------------------------------------------------------

/// Store backed by an [`AppConfig`] TOML file.
///
/// The whole config is held in memory and re-saved on every write so that
/// unrelated sections of the file survive.
#[derive(Debug)]
pub struct TomlSettingsStore {
    path: PathBuf,
    config: Mutex<AppConfig>,
}

impl TomlSettingsStore {
    /// Wrap an already loaded config that should be saved back to `path`.
    pub fn new(path: impl Into<PathBuf>, config: AppConfig) -> Self {
        Self {
            path: path.into(),
            config: Mutex::new(config),
        }
    }

    /// Load `path` (defaults when missing) and wrap it.
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let config = AppConfig::load_from(&path)?;
        Ok(Self::new(path, config))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of the current config.
    pub fn config(&self) -> AppConfig {
        self.config
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update(&self, apply: impl FnOnce(&mut SpeechConfig)) {
        let mut config = self.config.lock().unwrap_or_else(PoisonError::into_inner);
        apply(&mut config.speech);
        if let Err(e) = config.save_to(&self.path) {
            log::warn!(
                "settings: failed to save {} ({e}); keeping value in memory",
                self.path.display()
            );
        }
    }
}

impl SettingsStore for TomlSettingsStore {
    fn speech_rate(&self) -> f32 {
        self.config
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .speech
            .rate
    }

    fn set_speech_rate(&self, rate: f32) {
        self.update(|speech| speech.rate = rate);
    }

    fn speech_voice(&self) -> Option<String> {
        self.config
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .speech
            .voice
            .clone()
    }

    fn set_speech_voice(&self, voice: Option<String>) {
        self.update(|speech| speech.voice = voice);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
