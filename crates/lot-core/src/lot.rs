//! Lot data model
//!
//! A lot owns its placed objects, walls and floor tiles. Each collection is
//! an `Arc<[T]>` that is replaced as a whole whenever it changes, so a
//! snapshot is cheap to take and two snapshots can be compared by pointer.

use std::sync::Arc;

use glam::Vec3;
use lot_history::{Budget, Ledger};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::Aabb;

/// An instance of a catalog item placed on the lot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedObject {
    pub id: Uuid,
    /// Catalog item this instance was created from
    pub catalog_ref_id: String,
    pub position: Vec3,
    /// Yaw in degrees (quarter turns in normal editing)
    pub rotation: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

impl PlacedObject {
    /// Create a new instance with a fresh id
    pub fn new(catalog_ref_id: impl Into<String>, position: Vec3, rotation: f32) -> Self {
        Self {
            id: Uuid::new_v4(),
            catalog_ref_id: catalog_ref_id.into(),
            position,
            rotation,
            variant: None,
        }
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }
}

/// A straight wall between two points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallSegment {
    pub id: Uuid,
    pub a: Vec3,
    pub b: Vec3,
}

impl WallSegment {
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            id: Uuid::new_v4(),
            a,
            b,
        }
    }

    /// Length along the floor plane
    pub fn length(&self) -> f32 {
        let d = self.b - self.a;
        (d.x * d.x + d.z * d.z).sqrt()
    }

    /// Bounds of the segment, extended upwards by `height`
    pub fn bounds(&self, height: f32) -> Aabb {
        let bbox = Aabb::from_corners(self.a, self.b);
        Aabb::new(bbox.min, bbox.max + Vec3::new(0.0, height, 0.0))
    }
}

/// A painted floor cell
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FloorTile {
    pub x: i32,
    pub z: i32,
    pub material: String,
}

impl FloorTile {
    pub fn new(x: i32, z: i32, material: impl Into<String>) -> Self {
        Self {
            x,
            z,
            material: material.into(),
        }
    }

    /// World bounds of the cell for a given tile size
    pub fn bounds(&self, tile_size: f32) -> Aabb {
        let min = Vec3::new(self.x as f32 * tile_size, 0.0, self.z as f32 * tile_size);
        Aabb::new(min, min + Vec3::new(tile_size, 0.0, tile_size))
    }
}

/// Horizontal extent of a lot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LotBounds {
    pub width: f32,
    pub depth: f32,
}

impl LotBounds {
    pub fn new(width: f32, depth: f32) -> Self {
        Self { width, depth }
    }

    /// True if the box lies within `[0,width] x [0,depth]` on the floor plane
    pub fn contains(&self, bbox: &Aabb) -> bool {
        bbox.is_valid()
            && bbox.min.x >= 0.0
            && bbox.min.z >= 0.0
            && bbox.max.x <= self.width
            && bbox.max.z <= self.depth
    }

    /// True if the point lies on the lot floor
    pub fn contains_point(&self, point: Vec3) -> bool {
        (0.0..=self.width).contains(&point.x) && (0.0..=self.depth).contains(&point.z)
    }
}

/// A buildable lot and everything on it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lot {
    pub width: f32,
    pub depth: f32,
    pub height: f32,
    objects: Arc<[PlacedObject]>,
    walls: Arc<[WallSegment]>,
    floor: Arc<[FloorTile]>,
    pub budget: Budget,
    /// Incremented on every change
    pub version: u64,
}

impl Default for Lot {
    fn default() -> Self {
        Self::new(30.0, 30.0, 10.0, 20_000.0)
    }
}

impl Lot {
    /// Create an empty lot
    pub fn new(width: f32, depth: f32, height: f32, funds: f64) -> Self {
        Self {
            width,
            depth,
            height,
            objects: Arc::from(Vec::new()),
            walls: Arc::from(Vec::new()),
            floor: Arc::from(Vec::new()),
            budget: Budget::new(funds),
            version: 0,
        }
    }

    /// Floor extent for bounds checks
    pub fn bounds(&self) -> LotBounds {
        LotBounds::new(self.width, self.depth)
    }

    // ============== Objects ==============

    /// Snapshot of the placed objects
    pub fn objects(&self) -> &Arc<[PlacedObject]> {
        &self.objects
    }

    /// Look up a placed object by id
    pub fn object(&self, id: Uuid) -> Option<&PlacedObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Position of an object in placement order
    pub fn object_index(&self, id: Uuid) -> Option<usize> {
        self.objects.iter().position(|o| o.id == id)
    }

    /// Insert an object at `index` (clamped to the end)
    pub fn insert_object(&mut self, index: usize, object: PlacedObject) {
        let mut objects = self.objects.to_vec();
        objects.insert(index.min(objects.len()), object);
        self.objects = objects.into();
        self.touch();
    }

    /// Append an object
    pub fn push_object(&mut self, object: PlacedObject) {
        self.insert_object(usize::MAX, object);
    }

    /// Remove an object, returning it with its former index
    pub fn remove_object(&mut self, id: Uuid) -> Option<(usize, PlacedObject)> {
        let index = self.object_index(id)?;
        let mut objects = self.objects.to_vec();
        let object = objects.remove(index);
        self.objects = objects.into();
        self.touch();
        Some((index, object))
    }

    /// Replace an object's transform, returning the previous one
    pub fn set_object_transform(
        &mut self,
        id: Uuid,
        position: Vec3,
        rotation: f32,
    ) -> Option<(Vec3, f32)> {
        let index = self.object_index(id)?;
        let mut objects = self.objects.to_vec();
        let object = &mut objects[index];
        let previous = (object.position, object.rotation);
        object.position = position;
        object.rotation = rotation;
        self.objects = objects.into();
        self.touch();
        Some(previous)
    }

    // ============== Walls ==============

    /// Snapshot of the wall segments
    pub fn walls(&self) -> &Arc<[WallSegment]> {
        &self.walls
    }

    /// Position of a wall in build order
    pub fn wall_index(&self, id: Uuid) -> Option<usize> {
        self.walls.iter().position(|w| w.id == id)
    }

    /// Insert a wall at `index` (clamped to the end)
    pub fn insert_wall(&mut self, index: usize, wall: WallSegment) {
        let mut walls = self.walls.to_vec();
        walls.insert(index.min(walls.len()), wall);
        self.walls = walls.into();
        self.touch();
    }

    /// Append a wall
    pub fn push_wall(&mut self, wall: WallSegment) {
        self.insert_wall(usize::MAX, wall);
    }

    /// Remove a wall, returning it with its former index
    pub fn remove_wall(&mut self, id: Uuid) -> Option<(usize, WallSegment)> {
        let index = self.wall_index(id)?;
        let mut walls = self.walls.to_vec();
        let wall = walls.remove(index);
        self.walls = walls.into();
        self.touch();
        Some((index, wall))
    }

    // ============== Floor ==============

    /// Snapshot of the painted tiles
    pub fn floor(&self) -> &Arc<[FloorTile]> {
        &self.floor
    }

    /// Position of the tile at cell `(x, z)`
    pub fn tile_index(&self, x: i32, z: i32) -> Option<usize> {
        self.floor.iter().position(|t| t.x == x && t.z == z)
    }

    /// Insert a tile at `index` (clamped to the end)
    pub fn insert_tile(&mut self, index: usize, tile: FloorTile) {
        let mut floor = self.floor.to_vec();
        floor.insert(index.min(floor.len()), tile);
        self.floor = floor.into();
        self.touch();
    }

    /// Paint a cell, returning the tile it replaced and its index
    pub fn set_tile(&mut self, tile: FloorTile) -> Option<(usize, FloorTile)> {
        let mut floor = self.floor.to_vec();
        let previous = match floor.iter().position(|t| t.x == tile.x && t.z == tile.z) {
            Some(index) => Some((index, std::mem::replace(&mut floor[index], tile))),
            None => {
                floor.push(tile);
                None
            }
        };
        self.floor = floor.into();
        self.touch();
        previous
    }

    /// Clear a cell, returning the removed tile with its former index
    pub fn remove_tile(&mut self, x: i32, z: i32) -> Option<(usize, FloorTile)> {
        let index = self.tile_index(x, z)?;
        let mut floor = self.floor.to_vec();
        let tile = floor.remove(index);
        self.floor = floor.into();
        self.touch();
        Some((index, tile))
    }

    /// Equality ignoring the change counter
    pub fn content_eq(&self, other: &Lot) -> bool {
        self.width == other.width
            && self.depth == other.depth
            && self.height == other.height
            && self.objects == other.objects
            && self.walls == other.walls
            && self.floor == other.floor
            && self.budget == other.budget
    }

    fn touch(&mut self) {
        self.version += 1;
    }
}

/// A lot shared between the world and the commands that mutate it
pub type SharedLot = Arc<Mutex<Lot>>;

/// Ledger view over a shared lot's budget
#[derive(Debug, Clone)]
pub struct LotLedger(pub SharedLot);

impl Ledger for LotLedger {
    fn budget(&self) -> Budget {
        self.0.lock().budget
    }

    fn charge(&self, cost: f64) {
        let mut lot = self.0.lock();
        lot.budget.charge(cost);
        lot.version += 1;
    }

    fn restore(&self, budget: Budget) {
        let mut lot = self.0.lock();
        lot.budget = budget;
        lot.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutation_replaces_collection() {
        let mut lot = Lot::new(10.0, 10.0, 3.0, 100.0);
        let before = lot.objects().clone();

        let chair = PlacedObject::new("chair", Vec3::ZERO, 0.0);
        let id = chair.id;
        lot.push_object(chair);

        assert!(!Arc::ptr_eq(&before, lot.objects()));
        assert!(before.is_empty());
        assert_eq!(lot.objects().len(), 1);
        assert_eq!(lot.version, 1);
        assert!(lot.object(id).is_some());
    }

    #[test]
    fn test_remove_and_reinsert_at_index() {
        let mut lot = Lot::default();
        let ids: Vec<Uuid> = (0..3)
            .map(|i| {
                let o = PlacedObject::new("lamp", Vec3::new(i as f32, 0.0, 0.0), 0.0);
                let id = o.id;
                lot.push_object(o);
                id
            })
            .collect();

        let (index, object) = lot.remove_object(ids[1]).expect("present");
        assert_eq!(index, 1);
        lot.insert_object(index, object);
        let order: Vec<Uuid> = lot.objects().iter().map(|o| o.id).collect();
        assert_eq!(order, ids);
    }

    #[test]
    fn test_set_tile_reports_previous() {
        let mut lot = Lot::default();
        assert_eq!(lot.set_tile(FloorTile::new(1, 2, "wood")), None);
        let previous = lot.set_tile(FloorTile::new(1, 2, "tile"));
        assert_eq!(previous, Some((0, FloorTile::new(1, 2, "wood"))));
        assert_eq!(lot.floor().len(), 1);
    }

    #[test]
    fn test_ledger_restore_is_exact() {
        let lot: SharedLot = Arc::new(Mutex::new(Lot::new(10.0, 10.0, 3.0, 1000.0)));
        let ledger = LotLedger(lot.clone());
        let before = ledger.budget();

        ledger.charge(30.26);
        ledger.charge(7.28);
        ledger.restore(before);

        assert_eq!(lot.lock().budget, Budget::new(1000.0));
        assert_eq!(lot.lock().version, 3);
    }

    #[test]
    fn test_lot_bounds() {
        let bounds = LotBounds::new(10.0, 5.0);
        assert!(bounds.contains(&Aabb::new(Vec3::ZERO, Vec3::new(10.0, 3.0, 5.0))));
        assert!(!bounds.contains(&Aabb::new(Vec3::ZERO, Vec3::new(10.5, 3.0, 5.0))));
        assert!(!bounds.contains(&Aabb::empty()));
        assert!(bounds.contains_point(Vec3::new(10.0, 0.0, 0.0)));
    }

    #[test]
    fn test_wall_length() {
        let wall = WallSegment::new(Vec3::ZERO, Vec3::new(3.0, 0.0, 4.0));
        assert_eq!(wall.length(), 5.0);
    }
}
