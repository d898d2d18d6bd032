//! The tile field: generation, building, patterns, reinforcement and the
//! per-frame update.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use glam::{IVec2, Vec2};
use rand::Rng;

use super::coord::{AxialCoord, rotate_lattice};
use super::pattern::{Cluster, Triangle, TriangleId};
use super::state::{FieldEvent, GamePhase, SimContext};
use super::tile::{Building, Tile, TileId, TriangleLink};
use crate::settings::FieldSettings;

/// Owns every tile and the patterns formed between them
#[derive(Debug, Clone)]
pub struct Field {
    settings: FieldSettings,
    /// Tiles in generation order (indexed by `TileId`)
    tiles: Vec<Tile>,
    index: HashMap<AxialCoord, TileId>,
    /// Tiles currently holding a Spacer, in id order
    spacers: BTreeSet<TileId>,
    triangles: BTreeMap<TriangleId, Triangle>,
    next_triangle_id: u32,
    /// Active clusters keyed by center coordinate
    clusters: BTreeMap<AxialCoord, Cluster>,
    origin: Option<TileId>,
    phase: GamePhase,
}

impl Field {
    /// Create an empty field; call [`Field::generate`] to populate it
    pub fn new(settings: FieldSettings) -> Self {
        Self {
            settings,
            tiles: Vec::new(),
            index: HashMap::new(),
            spacers: BTreeSet::new(),
            triangles: BTreeMap::new(),
            next_triangle_id: 1,
            clusters: BTreeMap::new(),
            origin: None,
            phase: GamePhase::Playing,
        }
    }

    /// Populate the field and place the starting Spacer at the center
    pub fn generate(&mut self, ctx: &mut SimContext) -> Vec<FieldEvent> {
        let Some(center) = self.create_tile(AxialCoord::ZERO, ctx) else {
            return Vec::new();
        };

        for distance in 1..=self.settings.radius {
            for coord in AxialCoord::ZERO.ring(distance) {
                if let Some(id) = self.create_tile(coord, ctx) {
                    if distance <= self.settings.stable_rings {
                        self.tiles[id.index()].set_solidity(1.0);
                    }
                }
            }
        }

        let mut events = Vec::new();
        let candidates = self.adjacents(center, self.settings.origin_ring);
        if !candidates.is_empty() {
            let origin = candidates[ctx.rng.random_range(0..candidates.len())];
            self.apply_building(origin, Building::Origin, &mut events);
            self.origin = Some(origin);
        }

        log::info!(
            "Generated field: {} tiles, radius {}, origin {}",
            self.tiles.len(),
            self.settings.radius,
            self.origin
                .map(|id| self.tiles[id.index()].coord().identity_key())
                .unwrap_or_else(|| "none".to_string())
        );

        events.extend(self.build(ctx, Building::Spacer, Some(center)));
        events
    }

    fn create_tile(&mut self, coord: AxialCoord, ctx: &mut SimContext) -> Option<TileId> {
        if self.index.contains_key(&coord) {
            return None;
        }
        let id = TileId(self.tiles.len() as u32);
        self.tiles
            .push(Tile::generate(coord, self.settings.tear_chance, &mut ctx.rng));
        self.index.insert(coord, id);
        Some(id)
    }

    pub fn settings(&self) -> &FieldSettings {
        &self.settings
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn origin(&self) -> Option<TileId> {
        self.origin
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id.index())
    }

    pub(crate) fn tile_mut(&mut self, id: TileId) -> &mut Tile {
        &mut self.tiles[id.index()]
    }

    pub fn tile_by_coord(&self, coord: AxialCoord) -> Option<TileId> {
        self.index.get(&coord).copied()
    }

    pub fn tile_at(&self, x: i32, y: i32) -> Option<TileId> {
        self.tile_by_coord(AxialCoord::new(x, y))
    }

    /// Number of active triangles
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn triangle(&self, id: TriangleId) -> Option<&Triangle> {
        self.triangles.get(&id)
    }

    /// Tiles holding a Spacer, in id order
    pub fn spacers(&self) -> impl Iterator<Item = TileId> + '_ {
        self.spacers.iter().copied()
    }

    pub fn clusters(&self) -> impl Iterator<Item = &Cluster> {
        self.clusters.values()
    }

    pub fn cluster(&self, center: AxialCoord) -> Option<&Cluster> {
        self.clusters.get(&center)
    }

    /// Resolve a world-space point (e.g. a pointer hit) to a tile
    pub fn resolve_tile_at_world_point(&self, point: Vec2) -> Option<TileId> {
        self.tile_by_coord(AxialCoord::from_world(point))
    }

    /// Ring coordinates at `distance` around a tile, existing or not
    pub fn adjacent_vectors(&self, id: TileId, distance: u32) -> Vec<AxialCoord> {
        match self.tile(id) {
            Some(tile) if distance > 0 => tile.coord().ring(distance),
            _ => Vec::new(),
        }
    }

    /// Existing tiles on the ring of `distance` around a tile
    pub fn adjacents(&self, id: TileId, distance: u32) -> Vec<TileId> {
        self.adjacent_vectors(id, distance)
            .into_iter()
            .filter_map(|c| self.tile_by_coord(c))
            .collect()
    }

    /// Existing tiles 1..=`distance` steps from a tile (the tile itself excluded)
    pub fn tiles_within(&self, id: TileId, distance: u32) -> Vec<TileId> {
        (1..=distance).flat_map(|d| self.adjacents(id, d)).collect()
    }

    fn is_spacer(&self, coord: AxialCoord) -> bool {
        self.tile_by_coord(coord)
            .is_some_and(|id| self.tiles[id.index()].building() == Building::Spacer)
    }

    /// Change what stands on a tile, maintaining patterns
    pub fn set_building(&mut self, id: TileId, building: Building) -> Vec<FieldEvent> {
        let mut events = Vec::new();
        self.apply_building(id, building, &mut events);
        events
    }

    pub(crate) fn apply_building(
        &mut self,
        id: TileId,
        building: Building,
        events: &mut Vec<FieldEvent>,
    ) {
        let Some(tile) = self.tiles.get(id.index()) else {
            return;
        };
        let previous = tile.building();
        let coord = tile.coord();
        if previous == building || previous == Building::Origin {
            return;
        }

        if previous == Building::Spacer {
            self.destroy_super_hexes_into(coord, events);
            self.unlink_triangles(id, events);
            debug_assert_eq!(self.tiles[id.index()].boost(), 0);
        }

        self.tiles[id.index()].set_building(building);
        if building == Building::Spacer {
            self.spacers.insert(id);
        } else {
            self.spacers.remove(&id);
        }
        events.push(FieldEvent::BuildingChanged {
            coord,
            from: previous,
            to: building,
        });

        // A torn Spacer is displaced onto open space next to it
        if previous == Building::Spacer && building == Building::Tear {
            let open = self
                .adjacents(id, 1)
                .into_iter()
                .find(|adj| self.tiles[adj.index()].building() == Building::None);
            if let Some(open) = open {
                self.apply_building(open, Building::Spacer, events);
            }
        }

        if building == Building::Spacer {
            self.create_super_hexes(id, events);
            self.link_triangles(id, events);
        }
    }

    /// Every equilateral triangle of Spacer tiles with `id` as a vertex.
    ///
    /// For each other Spacer `a`, the partner is `a` rotated 60 degrees
    /// around `id`; each unordered pair is found exactly once.
    pub fn get_triangles(&self, id: TileId) -> Vec<Triangle> {
        let Some(tile) = self.tile(id) else {
            return Vec::new();
        };
        let anchor = tile.coord();

        let mut triangles = Vec::new();
        for &other_id in &self.spacers {
            if other_id == id {
                continue;
            }
            let side = anchor.lattice_offset(self.tiles[other_id.index()].coord());
            let partner = anchor.offset_by(rotate_lattice(side, 1));
            if !self.is_spacer(partner) {
                continue;
            }
            if let Some(partner_id) = self.tile_by_coord(partner) {
                triangles.push(Triangle::new([id, other_id, partner_id], side));
            }
        }
        triangles
    }

    fn link_triangles(&mut self, id: TileId, events: &mut Vec<FieldEvent>) {
        for triangle in self.get_triangles(id) {
            let tri_id = TriangleId(self.next_triangle_id);
            self.next_triangle_id += 1;
            let boost = triangle.boost();
            for member in triangle.tiles {
                self.tiles[member.index()].add_triangle(TriangleLink { id: tri_id, boost });
            }
            log::debug!("Triangle {} formed (size {:.2})", tri_id.0, triangle.size());
            self.triangles.insert(tri_id, triangle);
            events.push(FieldEvent::TriangleFormed { id: tri_id, boost });
        }
    }

    fn unlink_triangles(&mut self, id: TileId, events: &mut Vec<FieldEvent>) {
        for link in self.tiles[id.index()].take_triangles() {
            let Some(triangle) = self.triangles.remove(&link.id) else {
                continue;
            };
            for member in triangle.tiles {
                if member != id {
                    self.tiles[member.index()].remove_triangle(link.id);
                }
            }
            log::debug!("Triangle {} broken", link.id.0);
            events.push(FieldEvent::TriangleBroken { id: link.id });
        }
    }

    /// Every cluster that has `id` on its ring with the other five ring
    /// vertices holding Spacers. The tile's own building is not checked.
    ///
    /// For a ring vertex `t` with neighbors `t + a` and `t + b` on the ring,
    /// `b` is `a` rotated 120 degrees, the center is `t + a + b` and the
    /// remaining vertices are `t + 2a + b`, `t + 2a + 2b`, `t + a + 2b`.
    pub fn get_super_hexes(&self, id: TileId) -> Vec<Cluster> {
        let Some(tile) = self.tile(id) else {
            return Vec::new();
        };
        let anchor = tile.coord();

        let mut clusters = Vec::new();
        for &other_id in &self.spacers {
            if other_id == id {
                continue;
            }
            let a = anchor.lattice_offset(self.tiles[other_id.index()].coord());
            let b = rotate_lattice(a, 2);
            let rest: [IVec2; 4] = [b, a * 2 + b, a * 2 + b * 2, a + b * 2];
            if !rest.iter().all(|v| self.is_spacer(anchor.offset_by(*v))) {
                continue;
            }
            let center = anchor.offset_by(a + b);
            if let Some(center_tile) = self.tile_by_coord(center) {
                clusters.push(Cluster {
                    center,
                    center_tile,
                    radius: -(a + b),
                });
            }
        }
        clusters
    }

    fn create_super_hexes(&mut self, id: TileId, events: &mut Vec<FieldEvent>) {
        for cluster in self.get_super_hexes(id) {
            if let Some(old) = self.clusters.get(&cluster.center) {
                if old.same_ring(&cluster) {
                    continue;
                }
                // One cluster per center: the new ring replaces the old one
                log::debug!("Cluster around {} replaced", cluster.center);
                events.push(FieldEvent::ClusterBroken {
                    center: cluster.center,
                });
            }
            log::debug!("Cluster formed around {}", cluster.center);
            events.push(FieldEvent::ClusterFormed {
                center: cluster.center,
            });
            self.clusters.insert(cluster.center, cluster);
        }
    }

    /// Drop every cluster whose ring passes through the tile
    pub fn destroy_super_hexes(&mut self, id: TileId) -> Vec<FieldEvent> {
        let mut events = Vec::new();
        if let Some(tile) = self.tile(id) {
            let coord = tile.coord();
            self.destroy_super_hexes_into(coord, &mut events);
        }
        events
    }

    fn destroy_super_hexes_into(&mut self, coord: AxialCoord, events: &mut Vec<FieldEvent>) {
        let broken: Vec<AxialCoord> = self
            .clusters
            .values()
            .filter(|c| c.ring_contains(coord))
            .map(|c| c.center)
            .collect();
        for center in broken {
            self.clusters.remove(&center);
            log::debug!("Cluster around {} broken", center);
            events.push(FieldEvent::ClusterBroken { center });
        }
    }

    /// Triangles and clusters building on this tile would complete
    pub fn hover_links(&self, id: TileId) -> (Vec<Triangle>, Vec<Cluster>) {
        (self.get_triangles(id), self.get_super_hexes(id))
    }

    /// Closed outline (first point repeated) of a cluster ring in world space
    pub fn cluster_outline(&self, cluster: &Cluster) -> [Vec2; 7] {
        let center = cluster.center.world_position();
        let radius = cluster.radius_world();
        std::array::from_fn(|i| {
            center + crate::rotate(radius, std::f32::consts::PI * i as f32 / 3.0)
        })
    }

    /// Set a tile's reinforcement flag.
    ///
    /// Becoming reinforced clears any pending warp, mends a Tear, and wins
    /// the game on the Origin. Re-setting the current value does nothing.
    pub fn set_reinforced(&mut self, id: TileId, reinforced: bool) -> Vec<FieldEvent> {
        let mut events = Vec::new();
        self.apply_reinforced(id, reinforced, &mut events);
        events
    }

    fn apply_reinforced(&mut self, id: TileId, reinforced: bool, events: &mut Vec<FieldEvent>) {
        let Some(tile) = self.tiles.get_mut(id.index()) else {
            return;
        };
        if tile.is_reinforced() == reinforced {
            return;
        }
        tile.set_reinforced(reinforced);
        if !reinforced {
            return;
        }

        tile.set_warp(0);
        match tile.building() {
            Building::Tear => self.apply_building(id, Building::None, events),
            Building::Origin => {
                log::info!("Origin reinforced");
                self.phase = GamePhase::Won;
                events.push(FieldEvent::GameOver { won: true });
            }
            _ => {}
        }
    }

    /// Whether the player may build a Spacer on this tile
    pub fn can_build(&self, id: TileId) -> bool {
        let Some(tile) = self.tile(id) else {
            return false;
        };
        if tile.solidity() < self.settings.build_threshold {
            return false;
        }
        match tile.building() {
            Building::None => true,
            Building::Tear => !self.get_super_hexes(id).is_empty(),
            _ => false,
        }
    }

    /// Player click: build a Spacer if the tile allows it
    pub fn try_build(&mut self, ctx: &mut SimContext, id: TileId) -> Vec<FieldEvent> {
        if !self.can_build(id) {
            return Vec::new();
        }
        self.build(ctx, Building::Spacer, Some(id))
    }

    /// Place a building (unless `None`), run a disaster and recompute
    /// reinforcement. `build(ctx, Building::None, None)` just waits a turn.
    pub fn build(
        &mut self,
        ctx: &mut SimContext,
        building: Building,
        target: Option<TileId>,
    ) -> Vec<FieldEvent> {
        let mut events = Vec::new();
        if self.phase.is_over() {
            return events;
        }

        if let Some(id) = target {
            let Some(tile) = self.tile(id) else {
                log::debug!("Build target {} is not on the field", id.0);
                return events;
            };
            if building != Building::None {
                log::info!("Building {:?} at {}", building, tile.coord());
                self.apply_building(id, building, &mut events);
            }
        }

        self.disaster_into(ctx, &mut events);
        self.reinforce(&mut events);
        events
    }

    /// Recompute reinforcement from the active clusters
    fn reinforce(&mut self, events: &mut Vec<FieldEvent>) {
        let mut reinforced = vec![false; self.tiles.len()];
        for cluster in self.clusters.values() {
            reinforced[cluster.center_tile.index()] = true;
            for id in self.tiles_within(cluster.center_tile, cluster.reach()) {
                reinforced[id.index()] = true;
            }
        }

        for (i, flag) in reinforced.into_iter().enumerate() {
            self.apply_reinforced(TileId(i as u32), flag, events);
        }
    }

    /// Advance the field by `delta` seconds
    pub fn update(&mut self, ctx: &mut SimContext, delta: f32) -> Vec<FieldEvent> {
        let mut events = Vec::new();
        if self.phase.is_over() {
            return events;
        }
        ctx.advance(delta);

        let decay = self.settings.decay_rate * delta;
        let repair = self.settings.spacer_repair * delta;

        let mut spacers = Vec::new();
        for (i, tile) in self.tiles.iter_mut().enumerate() {
            if tile.building() == Building::Spacer {
                spacers.push((TileId(i as u32), tile.boost()));
            }
            tile.add_solidity(-decay);
        }

        for (id, boost) in spacers {
            self.tiles[id.index()].add_solidity(repair);
            for near in self.tiles_within(id, self.settings.spacer_reach + boost) {
                self.tiles[near.index()].add_solidity(repair);
            }
        }

        let open_space = self
            .tiles
            .iter()
            .any(|t| t.solidity() > 0.0 && t.building() == Building::None);
        if !open_space {
            log::info!("No open space left after {:.1}s", ctx.elapsed);
            self.phase = GamePhase::Lost;
            events.push(FieldEvent::GameOver { won: false });
        }
        events
    }

    /// Expected boost of a tile from the live triangle map
    pub fn expected_boost(&self, id: TileId) -> u32 {
        self.triangles
            .values()
            .filter(|t| t.contains(id))
            .map(|t| t.boost())
            .min()
            .unwrap_or(0)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Field of the given radius with no random tears
    pub(crate) fn small_field(radius: u32, seed: u64) -> (Field, SimContext) {
        let settings = FieldSettings {
            radius,
            origin_ring: radius.min(20),
            tear_chance: 0.0,
            ..FieldSettings::default()
        };
        let mut ctx = SimContext::new(seed);
        let mut field = Field::new(settings);
        field.generate(&mut ctx);
        (field, ctx)
    }

    pub(crate) fn id(field: &Field, x: i32, y: i32) -> TileId {
        field.tile_at(x, y).expect("tile exists")
    }

    /// Place Spacers without triggering a disaster
    pub(crate) fn place(field: &mut Field, coords: &[AxialCoord]) {
        for c in coords {
            let id = field.tile_by_coord(*c).expect("tile exists");
            field.set_building(id, Building::Spacer);
        }
    }

    fn assert_boost_invariant(field: &Field) {
        for (i, tile) in field.tiles().iter().enumerate() {
            let id = TileId(i as u32);
            assert_eq!(tile.boost(), field.expected_boost(id), "boost of {}", tile.coord());
            assert_eq!(
                tile.triangles().len(),
                field.triangles.values().filter(|t| t.contains(id)).count()
            );
        }
    }

    #[test]
    fn test_generate_tile_count() {
        let (field, _) = small_field(50, 1);
        // 1 + 3 * r * (r + 1)
        assert_eq!(field.tiles().len(), 1 + 3 * 50 * 51);
        assert!(field.origin().is_some());
        let center = field.tile(id(&field, 0, 0)).expect("center");
        assert_eq!(center.building(), Building::Spacer);
    }

    #[test]
    fn test_generate_origin_on_ring() {
        let (field, _) = small_field(25, 3);
        let origin = field.tile(field.origin().expect("origin")).expect("tile");
        assert_eq!(origin.building(), Building::Origin);
        assert_eq!(origin.coord().distance(AxialCoord::ZERO), 20);
        let count = field
            .tiles()
            .iter()
            .filter(|t| t.building() == Building::Origin)
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_no_origin_when_ring_missing() {
        let settings = FieldSettings {
            radius: 5,
            tear_chance: 0.0,
            ..FieldSettings::default()
        };
        let mut ctx = SimContext::new(9);
        let mut field = Field::new(settings);
        field.generate(&mut ctx);
        assert!(field.origin().is_none());
    }

    #[test]
    fn test_first_ring_is_stable() {
        let (field, _) = small_field(10, 5);
        for c in AxialCoord::ZERO.ring(1) {
            let tile = field.tile(field.tile_by_coord(c).expect("tile")).expect("tile");
            assert_eq!(tile.solidity(), 1.0);
        }
    }

    #[test]
    fn test_world_round_trip_every_tile() {
        let (field, _) = small_field(50, 2);
        for (i, tile) in field.tiles().iter().enumerate() {
            assert_eq!(
                field.resolve_tile_at_world_point(tile.coord().world_position()),
                Some(TileId(i as u32))
            );
        }
    }

    #[test]
    fn test_missing_tile_lookups() {
        let (mut field, _) = small_field(4, 2);
        assert!(field.tile_at(100, 100).is_none());
        assert!(field.resolve_tile_at_world_point(Vec2::new(500.0, 0.0)).is_none());
        let ghost = TileId(u32::MAX);
        assert!(field.set_building(ghost, Building::Spacer).is_empty());
        assert!(field.get_triangles(ghost).is_empty());
        assert!(!field.can_build(ghost));
    }

    #[test]
    fn test_center_ring_forms_six_triangles() {
        let (mut field, _) = small_field(50, 4);
        let ring = AxialCoord::ZERO.ring(1);
        place(&mut field, &ring);

        let center = id(&field, 0, 0);
        let triangles = field.get_triangles(center);
        assert_eq!(triangles.len(), 6);
        for t in &triangles {
            assert!((t.size() - 1.0).abs() < 1e-6);
            assert_eq!(t.boost(), 0);
        }
        assert!(field.get_super_hexes(center).is_empty());
        // Plus the two sqrt(3) triangles formed by alternating ring tiles
        assert_eq!(field.triangle_count(), 8);
        assert_boost_invariant(&field);
    }

    #[test]
    fn test_ring_forms_cluster() {
        let (mut field, _) = small_field(12, 4);
        let center = AxialCoord::new(4, 4);
        place(&mut field, &center.ring(1));

        let cluster = field.cluster(center).expect("cluster formed");
        assert_eq!(cluster.center_tile, field.tile_by_coord(center).expect("tile"));
        assert_eq!(cluster.reach(), 2);
        assert_eq!(field.clusters().count(), 1);
    }

    #[test]
    fn test_wide_cluster_and_boost() {
        let (mut field, _) = small_field(12, 4);
        let center = AxialCoord::new(-3, 2);
        // Ring corners at distance 2 form a cluster with side 2
        let corners: Vec<_> = (0..6).map(|k| center.point_at_ring_index(k * 2, 2)).collect();
        place(&mut field, &corners);

        let cluster = field.cluster(center).expect("cluster formed");
        assert_eq!(cluster.reach(), 3);
        for c in &corners {
            let tile = field.tile(field.tile_by_coord(*c).expect("tile")).expect("tile");
            // Alternating corners form triangles of side 2*sqrt(3)
            assert!(tile.boost() >= 1, "boost at {c}");
        }
        assert_boost_invariant(&field);
    }

    #[test]
    fn test_removing_spacer_breaks_patterns() {
        let (mut field, _) = small_field(12, 6);
        let center = AxialCoord::new(2, -4);
        let ring = center.ring(1);
        place(&mut field, &ring);
        assert!(field.cluster(center).is_some());
        let before = field.triangle_count();
        assert!(before > 0);

        let gone = field.tile_by_coord(ring[0]).expect("tile");
        let events = field.set_building(gone, Building::None);
        assert!(events.contains(&FieldEvent::ClusterBroken { center }));
        assert!(field.cluster(center).is_none());
        assert!(field.triangle_count() < before);
        assert_eq!(field.tile(gone).expect("tile").boost(), 0);
        assert!(field.tile(gone).expect("tile").triangles().is_empty());
        assert_boost_invariant(&field);
    }

    #[test]
    fn test_set_building_same_type_is_noop() {
        let (mut field, _) = small_field(8, 6);
        place(&mut field, &AxialCoord::ZERO.ring(1));
        let count = field.triangle_count();
        let center = id(&field, 0, 0);
        assert!(field.set_building(center, Building::Spacer).is_empty());
        assert_eq!(field.triangle_count(), count);
    }

    #[test]
    fn test_origin_never_changes() {
        let (mut field, _) = small_field(22, 6);
        let origin = field.origin().expect("origin");
        assert!(field.set_building(origin, Building::Tear).is_empty());
        assert_eq!(field.tile(origin).expect("tile").building(), Building::Origin);
    }

    #[test]
    fn test_torn_spacer_is_displaced() {
        let (mut field, _) = small_field(8, 8);
        let target = id(&field, 3, 0);
        field.set_building(target, Building::Spacer);
        let events = field.set_building(target, Building::Tear);

        // First open neighbor in ring order is (4, 0)
        let moved = AxialCoord::new(4, 0);
        assert!(events.contains(&FieldEvent::BuildingChanged {
            coord: moved,
            from: Building::None,
            to: Building::Spacer,
        }));
        let spacers = field
            .tiles()
            .iter()
            .filter(|t| t.building() == Building::Spacer)
            .count();
        // Center plus the displaced spacer
        assert_eq!(spacers, 2);
    }

    #[test]
    fn test_boost_invariant_through_churn() {
        let (mut field, _) = small_field(12, 10);
        let coords = [
            AxialCoord::new(1, 0),
            AxialCoord::new(0, 1),
            AxialCoord::new(2, 0),
            AxialCoord::new(1, 2),
            AxialCoord::new(-1, 2),
            AxialCoord::new(2, 2),
            AxialCoord::new(-2, 0),
            AxialCoord::new(0, -2),
            AxialCoord::new(1, -2),
        ];
        place(&mut field, &coords);
        assert_boost_invariant(&field);

        for (i, c) in coords.iter().enumerate() {
            let tile = field.tile_by_coord(*c).expect("tile");
            let next = if i % 2 == 0 { Building::None } else { Building::Tear };
            field.set_building(tile, next);
            assert_boost_invariant(&field);
        }
        place(&mut field, &coords[..4]);
        assert_boost_invariant(&field);
    }

    #[test]
    fn test_reinforce_origin_wins_once_per_transition() {
        let (mut field, _) = small_field(22, 12);
        let origin = field.origin().expect("origin");

        let events = field.set_reinforced(origin, true);
        assert_eq!(events, vec![FieldEvent::GameOver { won: true }]);
        assert_eq!(field.phase(), GamePhase::Won);
        assert!(field.set_reinforced(origin, true).is_empty());

        assert!(field.set_reinforced(origin, false).is_empty());
        let again = field.set_reinforced(origin, true);
        assert_eq!(again, vec![FieldEvent::GameOver { won: true }]);
    }

    #[test]
    fn test_reinforce_mends_tear() {
        let (mut field, _) = small_field(8, 12);
        let tile = id(&field, 2, 2);
        field.set_building(tile, Building::Tear);
        field.tiles[tile.index()].set_warp(3);
        field.set_reinforced(tile, true);
        let tile = field.tile(tile).expect("tile");
        assert_eq!(tile.building(), Building::None);
        assert_eq!(tile.warp(), 0);
    }

    #[test]
    fn test_build_reinforces_cluster_area() {
        let (mut field, mut ctx) = small_field(12, 14);
        let center = AxialCoord::new(4, 4);
        place(&mut field, &center.ring(1));
        field.build(&mut ctx, Building::None, None);

        let center_id = field.tile_by_coord(center).expect("tile");
        assert!(field.tile(center_id).expect("tile").is_reinforced());
        for near in field.tiles_within(center_id, 2) {
            assert!(field.tile(near).expect("tile").is_reinforced());
        }
        let far = id(&field, -6, -6);
        assert!(!field.tile(far).expect("tile").is_reinforced());
    }

    #[test]
    fn test_reinforcement_recomputed_each_build() {
        let (mut field, mut ctx) = small_field(12, 14);
        let center = AxialCoord::new(4, 4);
        let ring = center.ring(1);
        place(&mut field, &ring);
        field.build(&mut ctx, Building::None, None);
        let center_id = field.tile_by_coord(center).expect("tile");
        assert!(field.tile(center_id).expect("tile").is_reinforced());

        let broken = field.tile_by_coord(ring[3]).expect("tile");
        field.set_building(broken, Building::None);
        field.build(&mut ctx, Building::None, None);
        assert!(!field.tile(center_id).expect("tile").is_reinforced());
    }

    #[test]
    fn test_can_build_rules() {
        let (mut field, _) = small_field(12, 16);
        let open = id(&field, 1, 0);
        assert!(field.can_build(open));

        field.tiles[open.index()].set_solidity(0.5);
        assert!(!field.can_build(open));

        let center = id(&field, 0, 0);
        assert!(!field.can_build(center), "already a Spacer");

        // A Tear on an otherwise complete ring may be rebuilt
        let ring_center = AxialCoord::new(-4, 3);
        let ring = ring_center.ring(1);
        place(&mut field, &ring[1..]);
        let torn = field.tile_by_coord(ring[0]).expect("tile");
        field.set_building(torn, Building::Tear);
        field.tiles[torn.index()].set_solidity(1.0);
        assert!(field.can_build(torn));

        // A lone Tear may not
        let lone = id(&field, 6, -6);
        field.set_building(lone, Building::Tear);
        field.tiles[lone.index()].set_solidity(1.0);
        assert!(!field.can_build(lone));
    }

    #[test]
    fn test_update_decay_and_repair() {
        let (mut field, mut ctx) = small_field(12, 18);
        let far = id(&field, 8, -8);
        field.tiles[far.index()].set_solidity(0.5);
        let near = id(&field, 2, 0);
        field.tiles[near.index()].set_solidity(0.5);

        field.update(&mut ctx, 0.1);
        // Decays by 0.05
        assert!((field.tile(far).expect("tile").solidity() - 0.45).abs() < 1e-5);
        // Within reach of the center Spacer: -0.05 + 0.2
        assert!((field.tile(near).expect("tile").solidity() - 0.65).abs() < 1e-5);
        assert!((ctx.elapsed - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_update_detects_loss_once() {
        let (mut field, mut ctx) = small_field(3, 20);
        for tile in field.tiles.iter_mut() {
            if tile.building() == Building::None {
                tile.set_building(Building::Tear);
            }
        }
        let events = field.update(&mut ctx, 0.016);
        assert_eq!(events, vec![FieldEvent::GameOver { won: false }]);
        assert_eq!(field.phase(), GamePhase::Lost);
        assert!(field.update(&mut ctx, 0.016).is_empty());
        assert!(field.build(&mut ctx, Building::None, None).is_empty());
    }

    #[test]
    fn test_cluster_outline_closes() {
        let (mut field, _) = small_field(8, 22);
        let center = AxialCoord::new(1, 1);
        place(&mut field, &center.ring(1));
        let cluster = field.cluster(center).expect("cluster").clone();
        let outline = field.cluster_outline(&cluster);
        assert!((outline[0] - outline[6]).length() < 1e-4);
        for p in outline {
            let d = (p - center.world_position()).length();
            assert!((crate::neighbor_units(d) - 1.0).abs() < 1e-3);
        }
        // Every outline point is a ring tile center
        for p in &outline[..6] {
            let hit = field.resolve_tile_at_world_point(*p).expect("tile");
            assert!(cluster.ring_contains(field.tile(hit).expect("tile").coord()));
        }
    }

    #[test]
    fn test_build_on_missing_tile_is_noop() {
        // Build logging must not touch the target before it is resolved
        log::set_max_level(log::LevelFilter::Info);
        let (mut field, mut ctx) = small_field(6, 26);
        let ghost = TileId(u32::MAX);
        let warps_before: Vec<u32> = field.tiles().iter().map(|t| t.warp()).collect();

        let events = field.build(&mut ctx, Building::Spacer, Some(ghost));
        assert!(events.is_empty(), "{events:?}");
        let warps_after: Vec<u32> = field.tiles().iter().map(|t| t.warp()).collect();
        assert_eq!(warps_before, warps_after);
        assert!(field.try_build(&mut ctx, ghost).is_empty());
    }

    #[test]
    fn test_wider_ring_replaces_cluster_on_same_center() {
        let (mut field, _) = small_field(12, 28);
        let center = AxialCoord::new(4, 4);
        place(&mut field, &center.ring(1));
        assert_eq!(field.cluster(center).expect("cluster").reach(), 2);

        let corners: Vec<_> = (0..6).map(|k| center.point_at_ring_index(k * 2, 2)).collect();
        place(&mut field, &corners[..5]);
        let last = field.tile_by_coord(corners[5]).expect("tile");
        let events = field.set_building(last, Building::Spacer);

        let broken = events
            .iter()
            .position(|e| *e == FieldEvent::ClusterBroken { center })
            .expect("old cluster reported broken");
        let formed = events
            .iter()
            .position(|e| *e == FieldEvent::ClusterFormed { center })
            .expect("new cluster reported");
        assert!(broken < formed);
        assert_eq!(field.cluster(center).expect("cluster").reach(), 3);
        assert_eq!(field.clusters().filter(|c| c.center == center).count(), 1);
    }

    #[test]
    fn test_spacer_index_tracks_buildings() {
        let (mut field, mut ctx) = small_field(10, 30);
        let coords = [
            AxialCoord::new(3, 0),
            AxialCoord::new(2, 2),
            AxialCoord::new(-2, 1),
        ];
        place(&mut field, &coords);
        // Torn Spacer moves to a neighbor
        field.set_building(id(&field, 3, 0), Building::Tear);
        field.set_building(id(&field, 2, 2), Building::None);
        field.build(&mut ctx, Building::None, None);

        let expected: Vec<TileId> = field
            .tiles()
            .iter()
            .enumerate()
            .filter(|(_, t)| t.building() == Building::Spacer)
            .map(|(i, _)| TileId(i as u32))
            .collect();
        assert_eq!(field.spacers().collect::<Vec<_>>(), expected);
        assert_eq!(expected.len(), 3);
    }

    #[test]
    fn test_hover_links_preview() {
        let (mut field, _) = small_field(8, 24);
        place(&mut field, &[AxialCoord::new(1, 0)]);
        // (0, 1) would close a triangle with the center and (1, 0)
        let candidate = id(&field, 0, 1);
        let (triangles, clusters) = field.hover_links(candidate);
        assert_eq!(triangles.len(), 1);
        assert!(clusters.is_empty());
    }
}
