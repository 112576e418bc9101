//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::speech::RateBounds;

// ---------------------------------------------------------------------------
// SpeechConfig
// ---------------------------------------------------------------------------

/// User-selected speech settings.  These are the values the settings
/// capability reads and writes at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Default speaking rate for new sessions.
    pub rate: f32,
    /// Voice identifier handed to the speech engine — `None` means the
    /// engine's default voice.
    pub voice: Option<String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            rate: RateBounds::DEFAULT_RATE,
            voice: None,
        }
    }
}

// ---------------------------------------------------------------------------
// NarrationConfig
// ---------------------------------------------------------------------------

/// Limits and behaviour of the narration controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrationConfig {
    /// Slowest rate the engine accepts.
    pub min_rate: f32,
    /// Fastest rate the engine accepts.
    pub max_rate: f32,
    /// Rate used when nothing has been stored yet.
    pub default_rate: f32,
    /// Step between rates advertised to remote transports.
    pub rate_increment: f32,
    /// Speak the article title before its body.
    pub announce_title: bool,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            min_rate: RateBounds::MIN_RATE,
            max_rate: RateBounds::MAX_RATE,
            default_rate: RateBounds::DEFAULT_RATE,
            rate_increment: 0.5,
            announce_title: true,
        }
    }
}

impl NarrationConfig {
    /// Rate limits as a normalised [`RateBounds`].
    pub fn rate_bounds(&self) -> RateBounds {
        RateBounds::new(self.min_rate, self.max_rate, self.default_rate)
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use listen_later::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// println!("rate = {}", config.speech.rate);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Stored speech preferences.
    pub speech: SpeechConfig,
    /// Narration limits.
    pub narration: NarrationConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
