//! Undoable lot edits
//!
//! Each command holds a handle to the shared lot and records exactly what it
//! changed, so `undo` puts every collection back in its previous order.
//! Costs are not handled here; the world wraps paid edits in a
//! [`lot_history::BudgetCommand`].

use chrono::{DateTime, Utc};
use glam::Vec3;
use lot_history::Command;
use uuid::Uuid;

use crate::lot::{FloorTile, PlacedObject, SharedLot, WallSegment};

// ============== Objects ==============

/// Add a new object to the lot
pub struct PlaceObjectCommand {
    lot: SharedLot,
    object: PlacedObject,
    description: String,
    timestamp: DateTime<Utc>,
}

impl PlaceObjectCommand {
    pub fn new(lot: SharedLot, object: PlacedObject) -> Self {
        Self {
            description: format!("Place {}", object.catalog_ref_id),
            lot,
            object,
            timestamp: Utc::now(),
        }
    }

    /// Id of the object this command places
    pub fn object_id(&self) -> Uuid {
        self.object.id
    }
}

impl Command for PlaceObjectCommand {
    fn description(&self) -> &str {
        &self.description
    }

    fn execute(&mut self) -> bool {
        let mut lot = self.lot.lock();
        if lot.object_index(self.object.id).is_some() {
            return false;
        }
        lot.push_object(self.object.clone());
        true
    }

    fn undo(&mut self) {
        self.lot.lock().remove_object(self.object.id);
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Change an object's position and yaw
pub struct MoveObjectCommand {
    lot: SharedLot,
    id: Uuid,
    position: Vec3,
    rotation: f32,
    previous: Option<(Vec3, f32)>,
    timestamp: DateTime<Utc>,
}

impl MoveObjectCommand {
    pub fn new(lot: SharedLot, id: Uuid, position: Vec3, rotation: f32) -> Self {
        Self {
            lot,
            id,
            position,
            rotation,
            previous: None,
            timestamp: Utc::now(),
        }
    }
}

impl Command for MoveObjectCommand {
    fn description(&self) -> &str {
        "Move object"
    }

    fn execute(&mut self) -> bool {
        let mut lot = self.lot.lock();
        match lot.object(self.id) {
            None => return false,
            Some(object) if object.position == self.position && object.rotation == self.rotation => {
                return false;
            }
            Some(_) => {}
        }
        self.previous = lot.set_object_transform(self.id, self.position, self.rotation);
        self.previous.is_some()
    }

    fn undo(&mut self) {
        if let Some((position, rotation)) = self.previous.take() {
            self.lot
                .lock()
                .set_object_transform(self.id, position, rotation);
        }
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Take an object off the lot
pub struct RemoveObjectCommand {
    lot: SharedLot,
    id: Uuid,
    removed: Option<(usize, PlacedObject)>,
    timestamp: DateTime<Utc>,
}

impl RemoveObjectCommand {
    pub fn new(lot: SharedLot, id: Uuid) -> Self {
        Self {
            lot,
            id,
            removed: None,
            timestamp: Utc::now(),
        }
    }
}

impl Command for RemoveObjectCommand {
    fn description(&self) -> &str {
        "Remove object"
    }

    fn execute(&mut self) -> bool {
        self.removed = self.lot.lock().remove_object(self.id);
        self.removed.is_some()
    }

    fn undo(&mut self) {
        if let Some((index, object)) = self.removed.take() {
            self.lot.lock().insert_object(index, object);
        }
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

// ============== Walls ==============

pub struct AddWallCommand {
    lot: SharedLot,
    wall: WallSegment,
    timestamp: DateTime<Utc>,
}

impl AddWallCommand {
    pub fn new(lot: SharedLot, wall: WallSegment) -> Self {
        Self {
            lot,
            wall,
            timestamp: Utc::now(),
        }
    }

    pub fn wall_id(&self) -> Uuid {
        self.wall.id
    }
}

impl Command for AddWallCommand {
    fn description(&self) -> &str {
        "Build wall"
    }

    fn execute(&mut self) -> bool {
        let mut lot = self.lot.lock();
        if lot.wall_index(self.wall.id).is_some() {
            return false;
        }
        lot.push_wall(self.wall.clone());
        true
    }

    fn undo(&mut self) {
        self.lot.lock().remove_wall(self.wall.id);
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

pub struct RemoveWallCommand {
    lot: SharedLot,
    id: Uuid,
    removed: Option<(usize, WallSegment)>,
    timestamp: DateTime<Utc>,
}

impl RemoveWallCommand {
    pub fn new(lot: SharedLot, id: Uuid) -> Self {
        Self {
            lot,
            id,
            removed: None,
            timestamp: Utc::now(),
        }
    }
}

impl Command for RemoveWallCommand {
    fn description(&self) -> &str {
        "Remove wall"
    }

    fn execute(&mut self) -> bool {
        self.removed = self.lot.lock().remove_wall(self.id);
        self.removed.is_some()
    }

    fn undo(&mut self) {
        if let Some((index, wall)) = self.removed.take() {
            self.lot.lock().insert_wall(index, wall);
        }
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

// ============== Floor ==============

/// Paint one floor cell
pub struct PaintFloorCommand {
    lot: SharedLot,
    tile: FloorTile,
    /// `Some(None)` once executed on an unpainted cell
    previous: Option<Option<(usize, FloorTile)>>,
    timestamp: DateTime<Utc>,
}

impl PaintFloorCommand {
    pub fn new(lot: SharedLot, tile: FloorTile) -> Self {
        Self {
            lot,
            tile,
            previous: None,
            timestamp: Utc::now(),
        }
    }
}

impl Command for PaintFloorCommand {
    fn description(&self) -> &str {
        "Paint floor"
    }

    fn execute(&mut self) -> bool {
        let mut lot = self.lot.lock();
        let unchanged = lot
            .tile_index(self.tile.x, self.tile.z)
            .is_some_and(|index| lot.floor()[index].material == self.tile.material);
        if unchanged {
            return false;
        }
        self.previous = Some(lot.set_tile(self.tile.clone()));
        true
    }

    fn undo(&mut self) {
        let mut lot = self.lot.lock();
        match self.previous.take() {
            Some(Some((_, tile))) => {
                lot.set_tile(tile);
            }
            Some(None) => {
                lot.remove_tile(self.tile.x, self.tile.z);
            }
            None => {}
        }
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

// ============== Bulldoze ==============

/// What a bulldoze pass removed, in removal order
#[derive(Debug, Default)]
struct Cleared {
    objects: Vec<(usize, PlacedObject)>,
    walls: Vec<(usize, WallSegment)>,
    tiles: Vec<(usize, FloorTile)>,
}

impl Cleared {
    fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.walls.is_empty() && self.tiles.is_empty()
    }
}

/// Clear a set of objects, walls and tiles in one step.
///
/// The targets are resolved by the caller; ids that no longer exist are
/// skipped. Fails if nothing was removed.
pub struct BulldozeCommand {
    lot: SharedLot,
    objects: Vec<Uuid>,
    walls: Vec<Uuid>,
    tiles: Vec<(i32, i32)>,
    cleared: Option<Cleared>,
    timestamp: DateTime<Utc>,
}

impl BulldozeCommand {
    pub fn new(lot: SharedLot, objects: Vec<Uuid>, walls: Vec<Uuid>, tiles: Vec<(i32, i32)>) -> Self {
        Self {
            lot,
            objects,
            walls,
            tiles,
            cleared: None,
            timestamp: Utc::now(),
        }
    }
}

impl Command for BulldozeCommand {
    fn description(&self) -> &str {
        "Bulldoze"
    }

    fn execute(&mut self) -> bool {
        let mut lot = self.lot.lock();
        let cleared = Cleared {
            objects: self
                .objects
                .iter()
                .filter_map(|id| lot.remove_object(*id))
                .collect(),
            walls: self
                .walls
                .iter()
                .filter_map(|id| lot.remove_wall(*id))
                .collect(),
            tiles: self
                .tiles
                .iter()
                .filter_map(|(x, z)| lot.remove_tile(*x, *z))
                .collect(),
        };
        if cleared.is_empty() {
            return false;
        }
        tracing::debug!(
            "Bulldozed {} object(s), {} wall(s), {} tile(s)",
            cleared.objects.len(),
            cleared.walls.len(),
            cleared.tiles.len()
        );
        self.cleared = Some(cleared);
        true
    }

    fn undo(&mut self) {
        let Some(cleared) = self.cleared.take() else {
            return;
        };
        let mut lot = self.lot.lock();
        for (index, tile) in cleared.tiles.into_iter().rev() {
            lot.insert_tile(index, tile);
        }
        for (index, wall) in cleared.walls.into_iter().rev() {
            lot.insert_wall(index, wall);
        }
        for (index, object) in cleared.objects.into_iter().rev() {
            lot.insert_object(index, object);
        }
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lot::Lot;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn shared(lot: Lot) -> SharedLot {
        Arc::new(Mutex::new(lot))
    }

    fn furnished() -> (SharedLot, Vec<Uuid>) {
        let mut lot = Lot::new(20.0, 20.0, 3.0, 1000.0);
        let ids = (0..3)
            .map(|i| {
                let object = PlacedObject::new("crate", Vec3::new(i as f32 * 3.0, 0.0, 0.0), 0.0);
                let id = object.id;
                lot.push_object(object);
                id
            })
            .collect();
        lot.push_wall(WallSegment::new(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)));
        lot.set_tile(FloorTile::new(0, 0, "oak"));
        lot.set_tile(FloorTile::new(1, 0, "oak"));
        (shared(lot), ids)
    }

    /// Execute then undo, asserting the lot content is unchanged
    fn assert_round_trip(lot: &SharedLot, mut command: impl Command) {
        let before = lot.lock().clone();
        assert!(command.execute(), "{} should apply", command.description());
        assert!(!lot.lock().content_eq(&before));
        command.undo();
        assert!(lot.lock().content_eq(&before));
    }

    #[test]
    fn test_place_and_undo() {
        let (lot, _) = furnished();
        let object = PlacedObject::new("bench", Vec3::new(5.0, 0.0, 5.0), 90.0);
        let command = PlaceObjectCommand::new(lot.clone(), object);
        assert_eq!(command.description(), "Place bench");
        assert_round_trip(&lot, command);
    }

    #[test]
    fn test_place_duplicate_id_fails() {
        let (lot, ids) = furnished();
        let existing = lot.lock().object(ids[0]).cloned().expect("present");
        let mut command = PlaceObjectCommand::new(lot.clone(), existing);
        let version = lot.lock().version;
        assert!(!command.execute());
        assert_eq!(lot.lock().version, version);
    }

    #[test]
    fn test_move_and_undo() {
        let (lot, ids) = furnished();
        assert_round_trip(
            &lot,
            MoveObjectCommand::new(lot.clone(), ids[1], Vec3::new(8.0, 0.0, 8.0), 90.0),
        );
    }

    #[test]
    fn test_move_to_same_transform_is_a_no_op() {
        let (lot, ids) = furnished();
        let mut command = MoveObjectCommand::new(lot.clone(), ids[1], Vec3::new(3.0, 0.0, 0.0), 0.0);
        assert!(!command.execute());
        let mut missing = MoveObjectCommand::new(lot, Uuid::new_v4(), Vec3::ONE, 0.0);
        assert!(!missing.execute());
    }

    #[test]
    fn test_remove_restores_order() {
        let (lot, ids) = furnished();
        assert_round_trip(&lot, RemoveObjectCommand::new(lot.clone(), ids[1]));
        let order: Vec<Uuid> = lot.lock().objects().iter().map(|o| o.id).collect();
        assert_eq!(order, ids);
    }

    #[test]
    fn test_walls_round_trip() {
        let (lot, _) = furnished();
        let wall = WallSegment::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(5.0, 0.0, 5.0));
        assert_round_trip(&lot, AddWallCommand::new(lot.clone(), wall));

        let id = lot.lock().walls()[0].id;
        assert_round_trip(&lot, RemoveWallCommand::new(lot.clone(), id));
        assert!(!RemoveWallCommand::new(lot, Uuid::new_v4()).execute());
    }

    #[test]
    fn test_paint_new_and_repaint() {
        let (lot, _) = furnished();
        assert_round_trip(&lot, PaintFloorCommand::new(lot.clone(), FloorTile::new(4, 4, "tile")));
        assert_round_trip(&lot, PaintFloorCommand::new(lot.clone(), FloorTile::new(1, 0, "marble")));

        let mut same = PaintFloorCommand::new(lot, FloorTile::new(0, 0, "oak"));
        assert!(!same.execute());
    }

    #[test]
    fn test_bulldoze_restores_everything() {
        let (lot, ids) = furnished();
        let wall = lot.lock().walls()[0].id;
        assert_round_trip(
            &lot,
            BulldozeCommand::new(lot.clone(), vec![ids[2], ids[0]], vec![wall], vec![(1, 0), (0, 0)]),
        );
    }

    #[test]
    fn test_bulldoze_nothing_fails() {
        let (lot, _) = furnished();
        let mut command = BulldozeCommand::new(lot, vec![Uuid::new_v4()], vec![], vec![(9, 9)]);
        assert!(!command.execute());
    }
}
