//! A single hex tile and its structural state

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::coord::AxialCoord;
use super::pattern::TriangleId;

/// What stands on a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Building {
    /// Open space
    #[default]
    None,
    /// Player structure that repairs nearby tiles
    Spacer,
    /// Destroyed space
    Tear,
    /// The goal tile; reinforcing it wins
    Origin,
}

/// Index of a tile inside its field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(pub u32);

impl TileId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A triangle the tile belongs to, with the boost it grants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriangleLink {
    pub id: TriangleId,
    pub boost: u32,
}

/// One hex cell
#[derive(Debug, Clone)]
pub struct Tile {
    coord: AxialCoord,
    solidity: f32,
    building: Building,
    /// Min boost over all linked triangles (0 when unlinked)
    boost: u32,
    reinforced: bool,
    /// Disasters left before this tile tears
    warp: u32,
    triangles: Vec<TriangleLink>,
    /// Per-tile phase so tiles don't pulse in lockstep
    dither: f32,
}

impl Tile {
    pub fn new(coord: AxialCoord, solidity: f32) -> Self {
        Self {
            coord,
            solidity: solidity.clamp(0.0, 1.0),
            building: Building::None,
            boost: 0,
            reinforced: false,
            warp: 0,
            triangles: Vec::new(),
            dither: 0.0,
        }
    }

    /// Roll a fresh tile for field generation.
    ///
    /// Solidity falls off with distance from the field center; a share of
    /// tiles start torn.
    pub fn generate(coord: AxialCoord, tear_chance: f32, rng: &mut impl Rng) -> Self {
        let spread = (coord.x.abs() + coord.y.abs()) as f32 / 6.0;
        let solidity = rng.random::<f32>() * 0.4 + 0.6 / (spread * spread + 1.0);

        let mut tile = Self::new(coord, solidity);
        tile.dither = rng.random::<f32>();
        if rng.random::<f32>() < tear_chance {
            tile.building = Building::Tear;
        }
        tile
    }

    pub fn coord(&self) -> AxialCoord {
        self.coord
    }

    pub fn solidity(&self) -> f32 {
        self.solidity
    }

    pub fn building(&self) -> Building {
        self.building
    }

    pub fn boost(&self) -> u32 {
        self.boost
    }

    pub fn is_reinforced(&self) -> bool {
        self.reinforced
    }

    pub fn warp(&self) -> u32 {
        self.warp
    }

    pub fn dither(&self) -> f32 {
        self.dither
    }

    pub fn triangles(&self) -> &[TriangleLink] {
        &self.triangles
    }

    pub fn is_collapsed(&self) -> bool {
        self.solidity <= 0.0
    }

    /// Whether a disaster may mark this tile for destruction
    pub fn is_vulnerable(&self) -> bool {
        self.warp == 0
            && !matches!(self.building, Building::Tear | Building::Origin)
            && !self.reinforced
            && self.solidity >= 1.0
    }

    pub(crate) fn set_solidity(&mut self, value: f32) {
        self.solidity = value.clamp(0.0, 1.0);
    }

    pub(crate) fn add_solidity(&mut self, delta: f32) {
        self.set_solidity(self.solidity + delta);
    }

    /// Raw building write; pattern bookkeeping is the field's job
    pub(crate) fn set_building(&mut self, building: Building) {
        self.building = building;
    }

    /// Raw flag write; transition effects are the field's job
    pub(crate) fn set_reinforced(&mut self, reinforced: bool) {
        self.reinforced = reinforced;
    }

    pub(crate) fn set_warp(&mut self, warp: u32) {
        self.warp = warp;
    }

    /// Count the warp down by one; true when it just ran out
    pub(crate) fn tick_warp(&mut self) -> bool {
        if self.warp == 0 {
            return false;
        }
        self.warp -= 1;
        self.warp == 0
    }

    pub(crate) fn add_triangle(&mut self, link: TriangleLink) {
        self.boost = if self.triangles.is_empty() {
            link.boost
        } else {
            self.boost.min(link.boost)
        };
        self.triangles.push(link);
    }

    /// Unlink a triangle; returns false if the tile was not a member
    pub(crate) fn remove_triangle(&mut self, id: TriangleId) -> bool {
        let Some(pos) = self.triangles.iter().position(|t| t.id == id) else {
            return false;
        };
        let removed = self.triangles.swap_remove(pos);
        if removed.boost > self.boost {
            return true;
        }
        self.boost = self.triangles.iter().map(|t| t.boost).min().unwrap_or(0);
        true
    }

    /// Drop every triangle link and reset boost
    pub(crate) fn take_triangles(&mut self) -> Vec<TriangleLink> {
        self.boost = 0;
        std::mem::take(&mut self.triangles)
    }

    /// Short description for hover text
    pub fn status_label(&self) -> String {
        let mut text = match self.building {
            Building::Tear => "Spatial Anomaly".to_string(),
            Building::Spacer => format!("Level {} Spacer", self.boost + 1),
            Building::Origin => "Research Station".to_string(),
            Building::None => {
                let prefix = if self.reinforced {
                    "Reinforced "
                } else if self.is_collapsed() {
                    "Collapsed "
                } else {
                    ""
                };
                format!("{prefix}Space")
            }
        };
        if self.warp > 0 {
            text.push_str(" [WARPING]");
        }
        text
    }

    /// Display color (linear RGB) at simulation time `elapsed`
    pub fn tint(&self, elapsed: f32) -> Vec3 {
        let base = match self.building {
            Building::Spacer => Vec3::new((0.5 + 0.1 * self.boost as f32).min(1.0), 0.0, 0.6),
            Building::Origin => Vec3::new(0.8, 0.8, 0.0),
            Building::Tear => Vec3::new(0.1, 0.1, 1.0),
            Building::None => Vec3::new(1.0, 0.9, 1.0),
        };

        match self.building {
            Building::None | Building::Spacer => {
                let shade = 0.05 + self.dither * 0.05 + 0.9 * self.solidity;
                let dim = if self.reinforced { 1.0 } else { 0.7 };
                base * shade * dim
            }
            Building::Tear | Building::Origin => {
                let wave = (std::f32::consts::PI * (elapsed + self.dither * 2.0) / 3.0).sin();
                base * (0.2 + (wave + 1.0) * 3.0 / 20.0)
            }
        }
    }

    /// Opacity of the pending-warp overlay (0 when no warp is pending)
    pub fn warp_overlay(&self, elapsed: f32) -> f32 {
        if self.warp == 0 {
            return 0.0;
        }
        0.2 + ((std::f32::consts::PI * elapsed * 3.0).sin() + 1.0) / 3.0
    }
}
