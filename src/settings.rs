//! Game settings
//!
//! Tunables a host may want to change without recompiling. Loaded from a
//! JSON file; every field is optional and falls back to its default.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{FRAME_DT, SPIN_TIMEOUT_SECS, VOWEL_COST};
use crate::error::LoadError;

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Rules ===
    /// Points deducted per vowel purchase
    pub vowel_cost: u32,

    // === Wheel ===
    /// Wall-clock limit for one spin before the wheel is forced to stop
    pub spin_timeout_secs: f64,
    /// Frame step used when the session drives the wheel itself
    pub frame_dt: f64,

    // === Phrases ===
    /// Seed for all randomness (random when absent)
    pub seed: Option<u64>,
    /// Restrict puzzles to one category
    pub category: Option<String>,
    /// Pick categories by weight instead of uniformly
    pub weighted_categories: bool,
    /// Per-category weights (missing categories weigh 1)
    pub category_weights: HashMap<String, f64>,
    /// Optional phrase database path (bundled set when absent)
    pub phrases_path: Option<String>,

    // === Demo runner ===
    /// Rounds the headless runner plays
    pub rounds: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            vowel_cost: VOWEL_COST,

            spin_timeout_secs: SPIN_TIMEOUT_SECS,
            frame_dt: FRAME_DT,

            seed: None,
            category: None,
            weighted_categories: false,
            category_weights: HashMap::new(),
            phrases_path: None,

            rounds: 3,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let settings: Settings = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let json = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, LoadError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Replace nonsensical timing values with defaults
    pub(crate) fn sanitized(mut self) -> Self {
        if !(self.frame_dt.is_finite() && self.frame_dt > 0.0) {
            log::warn!("frame_dt {} invalid, using default", self.frame_dt);
            self.frame_dt = FRAME_DT;
        }
        if !(self.spin_timeout_secs.is_finite() && self.spin_timeout_secs > 0.0) {
            log::warn!(
                "spin_timeout_secs {} invalid, using default",
                self.spin_timeout_secs
            );
            self.spin_timeout_secs = SPIN_TIMEOUT_SECS;
        }
        self
    }
}
