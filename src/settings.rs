//! Field balance settings
//!
//! Every tunable constant of the simulation lives here so a run can be
//! replayed with different balance from a JSON file.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Difficulty presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Relaxed,
    #[default]
    Standard,
    Harsh,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Relaxed => "Relaxed",
            Difficulty::Standard => "Standard",
            Difficulty::Harsh => "Harsh",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "relaxed" | "easy" => Some(Difficulty::Relaxed),
            "standard" | "normal" => Some(Difficulty::Standard),
            "harsh" | "hard" => Some(Difficulty::Harsh),
            _ => None,
        }
    }

    /// Solidity lost per second by every tile
    pub fn decay_rate(&self) -> f32 {
        match self {
            Difficulty::Relaxed => 0.35,
            Difficulty::Standard => 0.5,
            Difficulty::Harsh => 0.7,
        }
    }

    /// Chance that a freshly generated tile starts torn
    pub fn tear_chance(&self) -> f32 {
        match self {
            Difficulty::Relaxed => 0.1,
            Difficulty::Standard => 0.15,
            Difficulty::Harsh => 0.2,
        }
    }

    /// Vulnerable tiles per extra disaster warp
    pub fn vulnerable_divisor(&self) -> f32 {
        match self {
            Difficulty::Relaxed => 60.0,
            Difficulty::Standard => 40.0,
            Difficulty::Harsh => 25.0,
        }
    }
}

/// Field generation and simulation balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSettings {
    /// Difficulty the balance values were derived from
    pub difficulty: Difficulty,

    // === Generation ===
    /// Number of rings generated around the center tile
    pub radius: u32,
    /// Rings around the center that start fully solid
    pub stable_rings: u32,
    /// Ring distance the Origin is placed on
    pub origin_ring: u32,
    /// Chance that a generated tile starts as a Tear
    pub tear_chance: f32,

    // === Update loop ===
    /// Solidity lost per second by every tile
    pub decay_rate: f32,
    /// Solidity per second a Spacer restores to itself and its surroundings
    pub spacer_repair: f32,
    /// Base reach of a Spacer's repair, extended by its boost
    pub spacer_reach: u32,

    // === Building ===
    /// Minimum solidity a tile needs before anything can be built on it
    pub build_threshold: f32,

    // === Disaster ===
    /// Vulnerable tiles per extra warp in each disaster
    pub vulnerable_divisor: f32,
    /// Rings searched outward from the Origin by the seeking pass
    pub origin_seek_levels: u32,
    /// Warps placed by the seeking pass per disaster
    pub origin_seek_budget: u32,
}

impl Default for FieldSettings {
    fn default() -> Self {
        Self::from_difficulty(Difficulty::Standard)
    }
}

impl FieldSettings {
    /// Create settings from a difficulty preset
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        Self {
            difficulty,

            radius: 50,
            stable_rings: 1,
            origin_ring: 20,
            tear_chance: difficulty.tear_chance(),

            decay_rate: difficulty.decay_rate(),
            spacer_repair: 2.0,
            spacer_reach: 2,

            build_threshold: 0.9,

            vulnerable_divisor: difficulty.vulnerable_divisor(),
            origin_seek_levels: 50,
            origin_seek_budget: 1,
        }
    }

    /// Apply a difficulty preset (updates difficulty-dependent values only)
    pub fn apply_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.decay_rate = difficulty.decay_rate();
        self.tear_chance = difficulty.tear_chance();
        self.vulnerable_divisor = difficulty.vulnerable_divisor();
    }

    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Could not read settings {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match Self::from_json(&json) {
            Ok(settings) => {
                log::info!(
                    "Loaded settings from {} ({})",
                    path.display(),
                    settings.difficulty.as_str()
                );
                settings
            }
            Err(e) => {
                log::warn!("Invalid settings {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}
