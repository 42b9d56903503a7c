//! Match settings and preferences
//!
//! Loaded from a JSON file on native builds; defaults otherwise.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::minutes_to_ms;
use crate::sim::GameMode;

/// AI difficulty tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "med" | "normal" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Match configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Match length in whole minutes (1-8)
    pub duration_minutes: u8,
    /// Single-player AI tier
    pub difficulty: Difficulty,
    pub mode: GameMode,
    /// Seed for the AI's random decisions
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            duration_minutes: DEFAULT_DURATION_MINUTES,
            difficulty: Difficulty::default(),
            mode: GameMode::default(),
            seed: 0x51_1e,
        }
    }
}

impl Settings {
    /// Clamp a requested duration into the supported range
    pub fn clamp_duration(minutes: u8) -> u8 {
        minutes.clamp(MIN_DURATION_MINUTES, MAX_DURATION_MINUTES)
    }

    pub fn set_duration_minutes(&mut self, minutes: u8) {
        self.duration_minutes = Self::clamp_duration(minutes);
    }

    /// Match length in milliseconds
    pub fn duration_ms(&self) -> f64 {
        minutes_to_ms(Self::clamp_duration(self.duration_minutes))
    }

    /// Parse settings JSON, clamping out-of-range values
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.duration_minutes = Self::clamp_duration(settings.duration_minutes);
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!(
            "Loaded settings: {} min, {} AI, {:?} mode",
            settings.duration_minutes,
            settings.difficulty.as_str(),
            settings.mode
        );
        Ok(settings)
    }

    /// Like `load`, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Using default settings: {e}");
                Self::default()
            }
        }
    }
}
