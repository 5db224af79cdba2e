//! World facade
//!
//! Ties a shared lot to its catalog, validation pipeline, undo history and
//! event bus. Every edit enters through [`World::apply`], which validates
//! it, prices it and records it so it can be undone.

use std::collections::HashSet;
use std::sync::Arc;

use glam::Vec3;
use lot_history::{BudgetCommand, Command, CommandHistory};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::collision::{Body, Ray, RayHit, RaycastOptions, raycast_bodies};
use crate::commands::{
    AddWallCommand, BulldozeCommand, MoveObjectCommand, PaintFloorCommand, PlaceObjectCommand,
    RemoveObjectCommand, RemoveWallCommand,
};
use crate::config::EngineConfig;
use crate::constants::{GRID_EPSILON, LAYER_ALL, LAYER_OBJECTS, LAYER_WALLS};
use crate::events::{EventBus, Subscription};
use crate::geometry::{Aabb, quantize_yaw};
use crate::lot::{FloorTile, Lot, LotLedger, PlacedObject, SharedLot, WallSegment};
use crate::project::{self, ProjectError};
use crate::spatial::ObjectIndex;
use crate::tools::{ToolAction, ToolOutcome};
use crate::validation::{
    RejectReason, ValidationContext, ValidationPipeline, ValidationResult, placed_object_aabb,
};

/// Errors from world operations.
///
/// Refused placements are not errors; they come back as
/// [`ToolOutcome::Rejected`].
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("Unknown catalog item: {0}")]
    UnknownCatalogItem(String),
    #[error("Object not found: {0}")]
    ObjectNotFound(Uuid),
    #[error("Wall not found: {0}")]
    WallNotFound(Uuid),
    #[error(transparent)]
    Project(#[from] ProjectError),
}

/// Event channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorldTopic {
    Lot,
    History,
    Budget,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorldEvent {
    LotChanged { version: u64 },
    HistoryChanged { can_undo: bool, can_redo: bool },
    InsufficientFunds { cost: f64, funds: f64 },
}

/// What a pick ray landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Picked {
    Object(Uuid),
    Wall(Uuid),
}

/// An editable lot with history
pub struct World {
    lot: SharedLot,
    catalog: Catalog,
    history: CommandHistory,
    pipeline: ValidationPipeline,
    index: ObjectIndex,
    events: EventBus<WorldTopic, WorldEvent>,
    config: EngineConfig,
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("history", &self.history)
            .field("pipeline", &self.pipeline)
            .field("catalog_items", &self.catalog.len())
            .finish_non_exhaustive()
    }
}

impl World {
    pub fn new(lot: Lot, catalog: Catalog, config: EngineConfig) -> Self {
        let pipeline = if config.validation.extended_rules {
            ValidationPipeline::extended()
        } else {
            ValidationPipeline::standard()
        };
        Self {
            lot: Arc::new(Mutex::new(lot)),
            catalog,
            history: CommandHistory::new(config.history.max_size),
            pipeline,
            index: ObjectIndex::new(config.spatial.cell_size),
            events: EventBus::new(),
            config,
        }
    }

    /// Replace the rule chain used for placement checks
    pub fn with_pipeline(mut self, pipeline: ValidationPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    // ============== Accessors ==============

    /// Handle to the shared lot
    pub fn lot(&self) -> &SharedLot {
        &self.lot
    }

    /// Copy of the current lot
    pub fn snapshot(&self) -> Lot {
        self.lot.lock().clone()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn object_index(&self) -> &ObjectIndex {
        &self.index
    }

    pub fn events_mut(&mut self) -> &mut EventBus<WorldTopic, WorldEvent> {
        &mut self.events
    }

    pub fn subscribe(
        &mut self,
        topic: WorldTopic,
        callback: impl FnMut(&WorldEvent) + 'static,
    ) -> Subscription {
        self.events.subscribe(topic, callback)
    }

    // ============== Validation ==============

    /// Check a candidate placement against the current lot.
    ///
    /// Meant to be called every frame while dragging; the object index is
    /// only rebuilt after the lot or `ignore_id` changes.
    pub fn validate_placement(
        &mut self,
        catalog_id: &str,
        position: Vec3,
        rotation: f32,
        ignore_id: Option<Uuid>,
    ) -> Result<ValidationResult, WorldError> {
        let item = self
            .catalog
            .get(catalog_id)
            .ok_or_else(|| WorldError::UnknownCatalogItem(catalog_id.to_string()))?;
        let (objects, walls, bounds) = {
            let lot = self.lot.lock();
            (lot.objects().clone(), lot.walls().clone(), lot.bounds())
        };

        let catalog = &self.catalog;
        let index = self
            .index
            .refresh(&objects, ignore_id, |object| placed_object_aabb(catalog, object));
        let ctx = ValidationContext::new(item, position, rotation, &objects, &walls, bounds, catalog)
            .ignoring(ignore_id)
            .with_index(index)
            .with_tile_size(self.config.grid.tile_size)
            .with_collision(self.config.collision);
        Ok(self.pipeline.validate(&ctx))
    }

    // ============== Editing ==============

    /// Validate, price and execute a tool action
    pub fn apply(&mut self, action: ToolAction) -> Result<ToolOutcome, WorldError> {
        let tool = action.tool();
        let outcome = match action {
            ToolAction::Place {
                catalog_id,
                position,
                rotation,
            } => {
                let rotation = quantize_yaw(rotation);
                let result = self.validate_placement(&catalog_id, position, rotation, None)?;
                if let Some(reason) = result.reason {
                    return Ok(self.rejected(reason));
                }
                let cost = self
                    .catalog
                    .get(&catalog_id)
                    .map_or(0.0, |item| item.price);
                let object = PlacedObject::new(catalog_id, position, rotation);
                let command = PlaceObjectCommand::new(self.lot.clone(), object);
                self.submit(Box::new(command), cost)
            }
            ToolAction::Move {
                id,
                position,
                rotation,
            } => {
                let catalog_id = self
                    .lot
                    .lock()
                    .object(id)
                    .map(|object| object.catalog_ref_id.clone())
                    .ok_or(WorldError::ObjectNotFound(id))?;
                let rotation = quantize_yaw(rotation);
                let result = self.validate_placement(&catalog_id, position, rotation, Some(id))?;
                if let Some(reason) = result.reason {
                    return Ok(self.rejected(reason));
                }
                let command = MoveObjectCommand::new(self.lot.clone(), id, position, rotation);
                self.submit(Box::new(command), 0.0)
            }
            ToolAction::RemoveObject { id } => {
                if self.lot.lock().object(id).is_none() {
                    return Err(WorldError::ObjectNotFound(id));
                }
                let command = RemoveObjectCommand::new(self.lot.clone(), id);
                self.submit(Box::new(command), 0.0)
            }
            ToolAction::Wall { a, b } => {
                let bounds = self.lot.lock().bounds();
                if !bounds.contains_point(a) || !bounds.contains_point(b) {
                    return Ok(self.rejected(RejectReason::OutOfBounds));
                }
                let wall = WallSegment::new(a, b);
                let length = wall.length();
                if length <= GRID_EPSILON {
                    return Ok(ToolOutcome::Unchanged);
                }
                let cost = self.config.pricing.wall_cost_per_unit * f64::from(length);
                let command = AddWallCommand::new(self.lot.clone(), wall);
                self.submit(Box::new(command), cost)
            }
            ToolAction::RemoveWall { id } => {
                if self.lot.lock().wall_index(id).is_none() {
                    return Err(WorldError::WallNotFound(id));
                }
                let command = RemoveWallCommand::new(self.lot.clone(), id);
                self.submit(Box::new(command), 0.0)
            }
            ToolAction::Floor { x, z, material } => {
                let tile = FloorTile::new(x, z, material);
                let bounds = self.lot.lock().bounds();
                if !bounds.contains(&tile.bounds(self.config.grid.tile_size)) {
                    return Ok(self.rejected(RejectReason::OutOfBounds));
                }
                let cost = self.config.pricing.floor_tile_cost;
                let command = PaintFloorCommand::new(self.lot.clone(), tile);
                self.submit(Box::new(command), cost)
            }
            ToolAction::Bulldoze { area } => {
                let (objects, walls, tiles) = self.bulldoze_targets(&area);
                if objects.is_empty() && walls.is_empty() && tiles.is_empty() {
                    return Ok(ToolOutcome::Unchanged);
                }
                let command = BulldozeCommand::new(self.lot.clone(), objects, walls, tiles);
                self.submit(Box::new(command), 0.0)
            }
        };
        tracing::debug!("{} tool: {:?}", tool.name(), outcome);
        Ok(outcome)
    }

    /// Execute an arbitrary command through the history, free of charge
    pub fn execute(&mut self, command: Box<dyn Command>) -> ToolOutcome {
        self.submit(command, 0.0)
    }

    /// Revert the most recent edit
    pub fn undo(&mut self) -> bool {
        let undone = self.history.undo();
        if undone {
            self.notify_changed();
        }
        undone
    }

    /// Re-apply the most recently undone edit if the lot can still pay for it
    pub fn redo(&mut self) -> bool {
        if let Some(cost) = self.history.redo_cost() {
            let budget = self.lot.lock().budget;
            if !budget.can_afford(cost) {
                tracing::warn!("Cannot redo: costs {}, {} available", cost, budget.funds);
                self.events.publish(
                    &WorldTopic::Budget,
                    &WorldEvent::InsufficientFunds {
                        cost,
                        funds: budget.funds,
                    },
                );
                return false;
            }
        }
        let redone = self.history.redo();
        if redone {
            self.notify_changed();
        }
        redone
    }

    fn rejected(&self, reason: RejectReason) -> ToolOutcome {
        tracing::debug!("Edit rejected: {}", reason);
        ToolOutcome::Rejected(reason)
    }

    /// Charge `cost` for `command` and push it onto the history
    fn submit(&mut self, command: Box<dyn Command>, cost: f64) -> ToolOutcome {
        let budget = self.lot.lock().budget;
        if !budget.can_afford(cost) {
            tracing::warn!(
                "Cannot afford '{}': costs {}, {} available",
                command.description(),
                cost,
                budget.funds
            );
            self.events.publish(
                &WorldTopic::Budget,
                &WorldEvent::InsufficientFunds {
                    cost,
                    funds: budget.funds,
                },
            );
            return ToolOutcome::InsufficientFunds {
                cost,
                funds: budget.funds,
            };
        }

        let command = BudgetCommand::new(command, cost, LotLedger(self.lot.clone()));
        if self.history.execute(Box::new(command)) {
            self.notify_changed();
            ToolOutcome::Applied
        } else {
            ToolOutcome::Unchanged
        }
    }

    fn notify_changed(&mut self) {
        let version = self.lot.lock().version;
        self.events
            .publish(&WorldTopic::Lot, &WorldEvent::LotChanged { version });
        self.events.publish(
            &WorldTopic::History,
            &WorldEvent::HistoryChanged {
                can_undo: self.history.can_undo(),
                can_redo: self.history.can_redo(),
            },
        );
    }

    /// Objects, walls and tiles whose footprint overlaps `area` on the floor
    fn bulldoze_targets(&mut self, area: &Aabb) -> (Vec<Uuid>, Vec<Uuid>, Vec<(i32, i32)>) {
        let lot = self.snapshot();
        let catalog = &self.catalog;
        let index = self
            .index
            .refresh(lot.objects(), None, |object| placed_object_aabb(catalog, object));

        let candidates: HashSet<Uuid> = index.query(area).into_iter().collect();
        let objects = lot
            .objects()
            .iter()
            .filter(|o| candidates.contains(&o.id))
            .filter(|o| index.bounds(&o.id).is_some_and(|bbox| overlaps_floor(bbox, area)))
            .map(|o| o.id)
            .collect();
        let walls = lot
            .walls()
            .iter()
            .filter(|w| overlaps_floor(&w.bounds(lot.height), area))
            .map(|w| w.id)
            .collect();
        let tile_size = self.config.grid.tile_size;
        let tiles = lot
            .floor()
            .iter()
            .filter(|t| overlaps_floor(&t.bounds(tile_size), area))
            .map(|t| (t.x, t.z))
            .collect();
        (objects, walls, tiles)
    }

    // ============== Picking ==============

    /// Nearest object or wall under the ray
    pub fn pick(&self, ray: &Ray) -> Option<(Picked, RayHit)> {
        self.pick_layers(ray, LAYER_ALL)
    }

    /// Like [`World::pick`], restricted to the layers in `layer_mask`
    pub fn pick_layers(&self, ray: &Ray, layer_mask: u32) -> Option<(Picked, RayHit)> {
        let lot = self.lot.lock();
        let objects = lot.objects().iter().filter_map(|object| {
            placed_object_aabb(&self.catalog, object).map(|bounds| Body {
                key: Picked::Object(object.id),
                bounds,
                layers: LAYER_OBJECTS,
            })
        });
        let walls = lot.walls().iter().map(|wall| Body {
            key: Picked::Wall(wall.id),
            bounds: wall.bounds(lot.height),
            layers: LAYER_WALLS,
        });
        let bodies: Vec<Body<Picked>> = objects.chain(walls).collect();

        let options = RaycastOptions {
            layer_mask,
            ..Default::default()
        };
        raycast_bodies(ray, &bodies, &options).map(|(body, hit)| (body.key, hit))
    }

    /// Catalog id of the object under the ray
    pub fn eyedropper(&self, ray: &Ray) -> Option<String> {
        match self.pick_layers(ray, LAYER_OBJECTS)? {
            (Picked::Object(id), _) => self
                .lot
                .lock()
                .object(id)
                .map(|object| object.catalog_ref_id.clone()),
            (Picked::Wall(_), _) => None,
        }
    }

    // ============== Persistence ==============

    pub fn export_json(&self) -> Result<String, WorldError> {
        Ok(project::export_json(&self.lot.lock())?)
    }

    /// Replace the lot with an imported document. History is cleared.
    pub fn import_json(&mut self, text: &str) -> Result<(), WorldError> {
        let lot = project::import_json(text)?;
        *self.lot.lock() = lot;
        self.history.clear();
        self.index.invalidate();
        self.notify_changed();
        Ok(())
    }
}

/// Positive-area overlap on the x/z plane. Boxes that only touch do not count.
fn overlaps_floor(a: &Aabb, b: &Aabb) -> bool {
    a.min.x < b.max.x && b.min.x < a.max.x && a.min.z < b.max.z && b.min.z < a.max.z
}
