//! Simulation context, game phase and field events
//!
//! Everything random or time-dependent flows through [`SimContext`], so a
//! seed fully determines a run.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::coord::AxialCoord;
use super::pattern::TriangleId;
use super::tile::Building;

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    Playing,
    /// The Origin was reinforced
    Won,
    /// No open space with any solidity is left
    Lost,
}

impl GamePhase {
    pub fn is_over(&self) -> bool {
        !matches!(self, GamePhase::Playing)
    }
}

/// Something that happened during a field operation.
///
/// Every mutating field operation returns the events it produced, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldEvent {
    BuildingChanged {
        coord: AxialCoord,
        from: Building,
        to: Building,
    },
    TriangleFormed {
        id: TriangleId,
        boost: u32,
    },
    TriangleBroken {
        id: TriangleId,
    },
    ClusterFormed {
        center: AxialCoord,
    },
    ClusterBroken {
        center: AxialCoord,
    },
    /// A disaster marked this tile to tear on the next disaster
    WarpPlaced {
        coord: AxialCoord,
    },
    GameOver {
        won: bool,
    },
}

/// Clock and random source for one run
#[derive(Debug, Clone)]
pub struct SimContext {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    /// Simulated seconds since the run started
    pub elapsed: f32,
    /// Frames simulated so far
    pub frame: u64,
}

impl SimContext {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            elapsed: 0.0,
            frame: 0,
        }
    }

    /// Advance the clock by one frame of `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt;
        self.frame += 1;
    }
}
