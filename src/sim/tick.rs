//! Per-frame simulation tick
//!
//! Applies the frame's input (click, wait or autoplay), then advances the
//! field by the frame delta.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use glam::Vec2;

use super::field::Field;
use super::state::{FieldEvent, SimContext};
use super::tile::{Building, TileId};

/// Frames between autoplayer moves
pub const AUTOPLAY_INTERVAL: u64 = 30;

/// Most buildable tiles the autoplayer scores per move
pub const AUTOPLAY_CANDIDATES: usize = 256;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// World point the player clicked (from pointer ray intersection)
    pub build_at: Option<Vec2>,
    /// Skip a turn: run a disaster without building
    pub wait: bool,
    /// Idle/demo mode - AI plays the game
    pub idle_mode: bool,
}

/// Advance the field by one frame
pub fn tick(
    field: &mut Field,
    ctx: &mut SimContext,
    input: &TickInput,
    dt: f32,
) -> Vec<FieldEvent> {
    let mut events = Vec::new();
    if field.phase().is_over() {
        return events;
    }

    let mut input = input.clone();
    if input.idle_mode && input.build_at.is_none() && ctx.frame % AUTOPLAY_INTERVAL == 0 {
        input.build_at = autoplay_target(field)
            .and_then(|id| field.tile(id))
            .map(|tile| tile.coord().world_position());
        // Nothing worth building: take the disaster anyway
        if input.build_at.is_none() {
            input.wait = true;
        }
    }
    let input = &input;

    if let Some(point) = input.build_at {
        match field.resolve_tile_at_world_point(point) {
            Some(id) => events.extend(field.try_build(ctx, id)),
            None => log::debug!("Click at {point} hit no tile"),
        }
    } else if input.wait {
        events.extend(field.build(ctx, Building::None, None));
    }

    events.extend(field.update(ctx, dt));
    events
}

/// Pick where the autoplayer builds next.
///
/// Considers buildable tiles up to two steps from an existing Spacer (the
/// first `AUTOPLAY_CANDIDATES` in id order) and prefers completing clusters,
/// then triangles, then tiles closer to the Origin.
pub fn autoplay_target(field: &Field) -> Option<TileId> {
    let mut candidates = BTreeSet::new();
    for spacer in field.spacers() {
        candidates.extend(
            field
                .tiles_within(spacer, 2)
                .into_iter()
                .filter(|id| field.can_build(*id)),
        );
    }

    let origin = field
        .origin()
        .and_then(|id| field.tile(id))
        .map(|tile| tile.coord());

    candidates
        .into_iter()
        .take(AUTOPLAY_CANDIDATES)
        .max_by_key(|id| {
            let (triangles, clusters) = field.hover_links(*id);
            let distance = match (origin, field.tile(*id)) {
                (Some(origin), Some(tile)) => origin.distance(tile.coord()),
                _ => 0,
            };
            (clusters.len(), triangles.len(), Reverse(distance))
        })
}
