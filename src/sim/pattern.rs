//! Spacer patterns: triangles and clusters
//!
//! Both patterns are described with lattice vectors, so membership checks are
//! exact integer comparisons.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::coord::{AxialCoord, lattice_norm2, lattice_to_world, rotate_lattice};
use super::tile::TileId;

/// Field-unique triangle id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TriangleId(pub u32);

/// Boost granted by a pattern whose side has squared lattice length `norm2`.
///
/// `floor(log2(sqrt(n)))` computed as `floor(log2(n)) / 2`.
#[inline]
pub fn boost_for_norm2(norm2: u32) -> u32 {
    if norm2 == 0 { 0 } else { norm2.ilog2() / 2 }
}

/// Three Spacer tiles forming an equilateral triangle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triangle {
    /// Anchor tile first, then the two partners
    pub tiles: [TileId; 3],
    /// Squared side length in neighbor-distance units
    pub norm2: u32,
}

impl Triangle {
    pub fn new(tiles: [TileId; 3], side: IVec2) -> Self {
        Self {
            tiles,
            norm2: lattice_norm2(side),
        }
    }

    /// Side length in neighbor-distance units
    pub fn size(&self) -> f32 {
        (self.norm2 as f32).sqrt()
    }

    pub fn boost(&self) -> u32 {
        boost_for_norm2(self.norm2)
    }

    pub fn contains(&self, tile: TileId) -> bool {
        self.tiles.contains(&tile)
    }
}

/// Six Spacer tiles forming a hexagonal ring around a center tile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    pub center: AxialCoord,
    pub center_tile: TileId,
    /// Lattice vector from the center to the ring vertex the cluster was found from
    pub radius: IVec2,
}

impl Cluster {
    /// Ring vertices, counter-clockwise starting at the anchor vertex
    pub fn ring(&self) -> [AxialCoord; 6] {
        std::array::from_fn(|k| self.center.offset_by(rotate_lattice(self.radius, k as i32)))
    }

    /// Whether `coord` is one of the six ring vertices
    pub fn ring_contains(&self, coord: AxialCoord) -> bool {
        let offset = self.center.lattice_offset(coord);
        (0..6).any(|k| rotate_lattice(self.radius, k) == offset)
    }

    /// Whether both clusters share the same center and ring vertices
    pub fn same_ring(&self, other: &Cluster) -> bool {
        self.center == other.center
            && lattice_norm2(self.radius) == lattice_norm2(other.radius)
            && self.ring_contains(other.center.offset_by(other.radius))
    }

    /// Radius in neighbor-distance units
    pub fn radius_len(&self) -> f32 {
        (lattice_norm2(self.radius) as f32).sqrt()
    }

    /// Tile steps around the center that the cluster reinforces
    pub fn reach(&self) -> u32 {
        lattice_norm2(self.radius).isqrt() + 1
    }

    /// World-space radius vector
    pub fn radius_world(&self) -> Vec2 {
        lattice_to_world(self.radius)
    }
}
