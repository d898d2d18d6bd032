//! Spacer Field - hexagonal survival simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (geometry, tiles, patterns, disasters)
//! - `settings`: Data-driven game balance

pub mod settings;
pub mod sim;

pub use settings::{Difficulty, FieldSettings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Nominal frame step used by the headless runner (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Corner radius of a hex tile in world units
    pub const HEX_RADIUS: f32 = 0.3;
    /// Inner radius of a hex tile, `sqrt(3 * r^2 / 4)`; neighbors are `2 * HEX_SIZE` apart
    pub const HEX_SIZE: f32 = 0.259_807_62;
    /// Visual gap between rendered tiles (fraction of radius)
    pub const HEX_GAP: f32 = 0.9;
}

/// World-space distance between two tile centers, in neighbor steps
#[inline]
pub fn neighbor_units(world_distance: f32) -> f32 {
    world_distance / (consts::HEX_SIZE * 2.0)
}

/// Rotate a world-space vector counter-clockwise by `angle` radians
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}
