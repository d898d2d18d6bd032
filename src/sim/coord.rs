//! Tile coordinates and hex ring geometry
//!
//! Tiles are addressed by an integer pair `(x, y)` where `y` is the row and
//! odd rows are shifted half a tile to the right. Ring walks use the
//! parity-dependent direction vectors of that addressing scheme.
//!
//! Pattern detection needs exact rotations, so coordinates also convert to a
//! skewed lattice form `(q, r)` where every 60 degree rotation is an integer
//! permutation:
//! - `q = x - floor(y / 2)`, `r = y`
//! - world `x = HEX_SIZE * (2q + r)`, world `y = 1.5 * HEX_RADIUS * r`

use std::fmt;

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::consts::{HEX_RADIUS, HEX_SIZE};

/// Unit lattice steps for the 6 ring directions, counter-clockwise from +x
pub const LATTICE_DIRECTIONS: [IVec2; 6] = [
    IVec2::new(1, 0),
    IVec2::new(0, 1),
    IVec2::new(-1, 1),
    IVec2::new(-1, 0),
    IVec2::new(0, -1),
    IVec2::new(1, -1),
];

/// Integer tile address
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct AxialCoord {
    pub x: i32,
    pub y: i32,
}

impl AxialCoord {
    pub const ZERO: Self = Self::new(0, 0);

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Stable string key, `"x{x}y{y}"`
    pub fn identity_key(&self) -> String {
        self.to_string()
    }

    /// 1 on odd rows (negative rows included), 0 on even rows
    #[inline]
    fn parity(&self) -> i32 {
        (self.y % 2).abs()
    }

    /// Center of the tile in world space
    pub fn world_position(&self) -> Vec2 {
        Vec2::new(
            HEX_SIZE * (2 * self.x + self.parity()) as f32,
            HEX_RADIUS * self.y as f32 * 1.5,
        )
    }

    /// Nearest tile address for a world point (row first, then column)
    pub fn from_world(point: Vec2) -> Self {
        let y = (point.y / HEX_RADIUS / 1.5).round() as i32;
        let parity = (y % 2).abs() as f32;
        let x = ((point.x / HEX_SIZE - parity) / 2.0).round() as i32;
        Self::new(x, y)
    }

    /// Offset `distance` steps along `direction` (0..6) from this tile.
    ///
    /// The horizontal component depends on the row parity of `self`: moving
    /// diagonally across rows shifts by half a column per row.
    pub fn ring_vector(&self, direction: usize, distance: u32) -> AxialCoord {
        let d = distance as i32;
        let p = self.parity();
        match direction % 6 {
            0 => AxialCoord::new(d, 0),
            1 => AxialCoord::new((d + p) / 2, d),
            2 => AxialCoord::new(-((d + 1 - p) / 2), d),
            3 => AxialCoord::new(-d, 0),
            4 => AxialCoord::new(-((d + 1 - p) / 2), -d),
            _ => AxialCoord::new((d + p) / 2, -d),
        }
    }

    /// Coordinate at position `ring_index` (0..6*distance) on the ring of
    /// `distance` around this tile.
    pub fn point_at_ring_index(&self, ring_index: u32, distance: u32) -> AxialCoord {
        if distance == 0 {
            return *self;
        }
        let direction = (ring_index / distance) as usize;
        let rib = *self + self.ring_vector(direction, distance);
        rib + rib.ring_vector((direction + 2) % 6, ring_index % distance)
    }

    /// All coordinates at exactly `distance` steps, in ring index order.
    ///
    /// Distance 0 yields this coordinate once.
    pub fn ring(&self, distance: u32) -> Vec<AxialCoord> {
        if distance == 0 {
            return vec![*self];
        }
        (0..6 * distance)
            .map(|i| self.point_at_ring_index(i, distance))
            .collect()
    }

    pub fn to_lattice(&self) -> IVec2 {
        IVec2::new(self.x - self.y.div_euclid(2), self.y)
    }

    pub fn from_lattice(v: IVec2) -> Self {
        Self::new(v.x + v.y.div_euclid(2), v.y)
    }

    /// Lattice vector pointing from `self` to `other`
    pub fn lattice_offset(&self, other: AxialCoord) -> IVec2 {
        other.to_lattice() - self.to_lattice()
    }

    /// Coordinate reached by adding a lattice vector
    pub fn offset_by(&self, v: IVec2) -> AxialCoord {
        Self::from_lattice(self.to_lattice() + v)
    }

    /// Grid distance in tile steps
    pub fn distance(&self, other: AxialCoord) -> u32 {
        lattice_steps(self.lattice_offset(other))
    }
}

impl std::ops::Add for AxialCoord {
    type Output = AxialCoord;

    fn add(self, rhs: AxialCoord) -> AxialCoord {
        AxialCoord::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl fmt::Display for AxialCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}y{}", self.x, self.y)
    }
}

/// All coordinates on the ring of `distance` around `origin`
pub fn ring_coordinates(origin: AxialCoord, distance: u32) -> Vec<AxialCoord> {
    origin.ring(distance)
}

/// Rotate a lattice vector counter-clockwise by `sixths` * 60 degrees
pub fn rotate_lattice(v: IVec2, sixths: i32) -> IVec2 {
    let mut v = v;
    for _ in 0..sixths.rem_euclid(6) {
        // (q, r, s) -> (-r, -s, -q) with s = -q - r
        v = IVec2::new(-v.y, v.x + v.y);
    }
    v
}

/// Squared length of a lattice vector, in neighbor-distance units
#[inline]
pub fn lattice_norm2(v: IVec2) -> u32 {
    (v.x * v.x + v.x * v.y + v.y * v.y) as u32
}

/// Number of tile steps covered by a lattice vector
#[inline]
pub fn lattice_steps(v: IVec2) -> u32 {
    ((v.x.abs() + v.y.abs() + (v.x + v.y).abs()) / 2) as u32
}

/// World-space vector for a lattice vector
#[inline]
pub fn lattice_to_world(v: IVec2) -> Vec2 {
    Vec2::new(
        HEX_SIZE * (2 * v.x + v.y) as f32,
        HEX_RADIUS * 1.5 * v.y as f32,
    )
}
