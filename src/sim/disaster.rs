//! Disaster scheduling
//!
//! Each build or wait triggers one disaster:
//! 1. Pending warps count down; tiles reaching zero tear.
//! 2. Random vulnerable tiles are marked to warp, one per zero-boost Spacer
//!    plus one per `vulnerable_divisor` vulnerable tiles.
//! 3. While the Origin is fully solid, the disaster also seeks it outward
//!    ring by ring and marks the nearest vulnerable tiles.

use rand::Rng;

use super::field::Field;
use super::state::{FieldEvent, SimContext};
use super::tile::{Building, TileId};

impl Field {
    /// Run one disaster
    pub fn disaster(&mut self, ctx: &mut SimContext) -> Vec<FieldEvent> {
        let mut events = Vec::new();
        self.disaster_into(ctx, &mut events);
        events
    }

    pub(crate) fn disaster_into(&mut self, ctx: &mut SimContext, events: &mut Vec<FieldEvent>) {
        self.advance_warps(events);

        let mut targets = self.vulnerable_tiles();
        let warps = self.boost_cost(targets.len()).ceil() as usize;
        log::debug!(
            "Disaster: {} vulnerable tiles, {} warps",
            targets.len(),
            warps
        );

        for _ in 0..warps {
            if targets.is_empty() {
                break;
            }
            let victim = targets.swap_remove(ctx.rng.random_range(0..targets.len()));
            self.mark_warp(victim, events);
        }

        self.seek_origin(ctx, events);
    }

    /// Count every pending warp down; expired ones tear their tile
    fn advance_warps(&mut self, events: &mut Vec<FieldEvent>) {
        let warping: Vec<TileId> = self
            .tiles()
            .iter()
            .enumerate()
            .filter(|(_, t)| t.warp() > 0)
            .map(|(i, _)| TileId(i as u32))
            .collect();

        for id in warping {
            if self.tile_mut(id).tick_warp() {
                self.apply_building(id, Building::Tear, events);
            }
        }
    }

    /// Warps the disaster places for a given vulnerable tile count
    pub fn boost_cost(&self, vulnerable: usize) -> f32 {
        let unboosted = self
            .tiles()
            .iter()
            .filter(|t| t.building() == Building::Spacer && t.boost() == 0)
            .count();
        unboosted as f32 + vulnerable as f32 / self.settings().vulnerable_divisor
    }

    pub fn vulnerable_tiles(&self) -> Vec<TileId> {
        self.tiles()
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_vulnerable())
            .map(|(i, _)| TileId(i as u32))
            .collect()
    }

    fn mark_warp(&mut self, id: TileId, events: &mut Vec<FieldEvent>) {
        let tile = self.tile_mut(id);
        tile.set_warp(1);
        events.push(FieldEvent::WarpPlaced { coord: tile.coord() });
    }

    /// Warp the nearest vulnerable tiles around a fully solid Origin
    fn seek_origin(&mut self, ctx: &mut SimContext, events: &mut Vec<FieldEvent>) {
        let Some(origin) = self.origin() else {
            return;
        };
        if self.tiles()[origin.index()].solidity() < 1.0 {
            return;
        }

        let mut budget = self.settings().origin_seek_budget;
        for level in 1..self.settings().origin_seek_levels {
            if budget == 0 {
                break;
            }
            let mut items: Vec<TileId> = self
                .adjacents(origin, level)
                .into_iter()
                .filter(|id| self.tiles()[id.index()].is_vulnerable())
                .collect();
            while !items.is_empty() {
                let victim = items.swap_remove(ctx.rng.random_range(0..items.len()));
                self.mark_warp(victim, events);
                budget -= 1;
                if budget == 0 {
                    break;
                }
            }
        }
    }
}
