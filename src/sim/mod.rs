//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only, passed in through `SimContext`
//! - Stable iteration order (by tile id)
//! - No rendering or platform dependencies

pub mod coord;
pub mod disaster;
pub mod field;
pub mod pattern;
pub mod state;
pub mod tick;
pub mod tile;

pub use coord::{AxialCoord, lattice_norm2, ring_coordinates, rotate_lattice};
pub use field::Field;
pub use pattern::{Cluster, Triangle, TriangleId, boost_for_norm2};
pub use state::{FieldEvent, GamePhase, SimContext};
pub use tick::{TickInput, autoplay_target, tick};
pub use tile::{Building, Tile, TileId};
