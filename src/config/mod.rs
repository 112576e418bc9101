//! Configuration module for listen-later.
//!
//! Provides `AppConfig` (top-level settings), its speech and narration
//! sub-configs, `AppPaths` for cross-platform directories, TOML persistence
//! via `AppConfig::load` / `AppConfig::save`, and the [`SettingsStore`]
//! capability the narration controller reads its rate and voice through.

pub mod paths;
pub mod settings;
pub mod store;

pub use paths::AppPaths;
pub use settings::{AppConfig, NarrationConfig, SpeechConfig};
pub use store::{MemorySettingsStore, SettingsStore, TomlSettingsStore};
