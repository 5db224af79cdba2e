//! Placement validation
//!
//! A pipeline is an ordered list of independent, side-effect-free rules.
//! Evaluation stops at the first rule that rejects; a placement passing
//! every rule is accepted. Rejections are data, never errors.

mod bounds;
mod clearance;
mod objects;
mod wall;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{Catalog, CatalogItem};
use crate::collision::CollisionConfig;
use crate::constants::DEFAULT_TILE_SIZE;
use crate::geometry::{Aabb, footprint_aabb, rotate_footprint};
use crate::lot::{LotBounds, PlacedObject, WallSegment};
use crate::spatial::SpatialIndex;

pub use bounds::BoundsValidator;
pub use clearance::ClearanceValidator;
pub use objects::ObjectsCollisionValidator;
pub use wall::WallAdjacencyValidator;

/// Why a placement was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    OutOfBounds,
    ObjectCollision,
    NeedsWall,
    Clearance,
}

impl RejectReason {
    /// Stable reason code
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::OutOfBounds => "out_of_bounds",
            RejectReason::ObjectCollision => "object_collision",
            RejectReason::NeedsWall => "needs_wall",
            RejectReason::Clearance => "clearance",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Outcome of validating one placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectReason>,
}

impl ValidationResult {
    pub fn accept() -> Self {
        Self {
            ok: true,
            reason: None,
        }
    }

    pub fn reject(reason: RejectReason) -> Self {
        Self {
            ok: false,
            reason: Some(reason),
        }
    }
}

/// Everything a rule may look at for one candidate placement
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    /// Item being placed or moved
    pub item: &'a CatalogItem,
    pub position: Vec3,
    /// Yaw in degrees
    pub rotation: f32,
    pub objects: &'a [PlacedObject],
    pub walls: &'a [WallSegment],
    pub lot: LotBounds,
    /// Resolves the footprints of existing objects
    pub catalog: &'a Catalog,
    /// Existing object to disregard, typically the one being dragged
    pub ignore_id: Option<Uuid>,
    /// Broad phase over `objects`; rules scan linearly without it
    pub index: Option<&'a SpatialIndex<Uuid>>,
    /// Floor tile edge length for tile-based rules
    pub tile_size: f32,
    /// Narrow-phase settings for overlap rules
    pub collision: CollisionConfig,
}

impl<'a> ValidationContext<'a> {
    pub fn new(
        item: &'a CatalogItem,
        position: Vec3,
        rotation: f32,
        objects: &'a [PlacedObject],
        walls: &'a [WallSegment],
        lot: LotBounds,
        catalog: &'a Catalog,
    ) -> Self {
        Self {
            item,
            position,
            rotation,
            objects,
            walls,
            lot,
            catalog,
            ignore_id: None,
            index: None,
            tile_size: DEFAULT_TILE_SIZE,
            collision: CollisionConfig::default(),
        }
    }

    pub fn ignoring(mut self, id: Option<Uuid>) -> Self {
        self.ignore_id = id;
        self
    }

    pub fn with_index(mut self, index: &'a SpatialIndex<Uuid>) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_tile_size(mut self, tile_size: f32) -> Self {
        self.tile_size = tile_size;
        self
    }

    pub fn with_collision(mut self, collision: CollisionConfig) -> Self {
        self.collision = collision;
        self
    }

    /// World bounds of the candidate after rotation
    pub fn candidate_aabb(&self) -> Aabb {
        item_aabb(self.item, self.position, self.rotation)
    }

    /// Bounds of existing objects that may intersect `probe`, excluding the
    /// ignored object. Uses the broad phase when one is available.
    pub fn nearby_objects(&self, probe: &Aabb) -> Vec<(Uuid, Aabb)> {
        match self.index {
            Some(index) => index
                .query(probe)
                .into_iter()
                .filter(|id| Some(*id) != self.ignore_id)
                .filter_map(|id| index.bounds(&id).map(|bbox| (id, *bbox)))
                .collect(),
            None => self
                .objects
                .iter()
                .filter(|object| Some(object.id) != self.ignore_id)
                .filter_map(|object| {
                    placed_object_aabb(self.catalog, object).map(|bbox| (object.id, bbox))
                })
                .collect(),
        }
    }
}

/// World bounds of a catalog item at a position and yaw.
///
/// Items without a footprint occupy the single point `position`.
pub fn item_aabb(item: &CatalogItem, position: Vec3, rotation: f32) -> Aabb {
    match &item.footprint {
        Some(footprint) => footprint_aabb(&rotate_footprint(footprint, rotation), position),
        None => Aabb::new(position, position),
    }
}

/// World bounds of a placed object, or `None` if its catalog item is unknown
pub fn placed_object_aabb(catalog: &Catalog, object: &PlacedObject) -> Option<Aabb> {
    catalog
        .get(&object.catalog_ref_id)
        .map(|item| item_aabb(item, object.position, object.rotation))
}

/// A single accept/reject rule
pub trait Validator {
    /// Short identifier for logs
    fn name(&self) -> &'static str;

    fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult;
}

/// Ordered, short-circuiting chain of validators
pub struct ValidationPipeline {
    validators: Vec<Box<dyn Validator>>,
}

impl Default for ValidationPipeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for ValidationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.validators.iter().map(|v| v.name()))
            .finish()
    }
}

impl ValidationPipeline {
    /// A pipeline with no rules; accepts everything
    pub fn empty() -> Self {
        Self {
            validators: Vec::new(),
        }
    }

    /// Bounds, then object collisions
    pub fn standard() -> Self {
        Self::empty()
            .with(BoundsValidator)
            .with(ObjectsCollisionValidator)
    }

    /// The standard rules followed by clearance and wall adjacency
    pub fn extended() -> Self {
        Self::standard()
            .with(ClearanceValidator)
            .with(WallAdjacencyValidator)
    }

    /// Append a rule
    pub fn with(mut self, validator: impl Validator + 'static) -> Self {
        self.push(validator);
        self
    }

    pub fn push(&mut self, validator: impl Validator + 'static) {
        self.validators.push(Box::new(validator));
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Rule names in evaluation order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.validators.iter().map(|v| v.name())
    }

    /// Run the rules in order, stopping at the first rejection
    pub fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult {
        for validator in &self.validators {
            let result = validator.validate(ctx);
            if !result.ok {
                tracing::trace!(
                    "Placement of '{}' rejected by {}: {:?}",
                    ctx.item.id,
                    validator.name(),
                    result.reason
                );
                return result;
            }
        }
        ValidationResult::accept()
    }
}

/// Validate a placement against the standard rules
pub fn validate_placement(
    item: &CatalogItem,
    position: Vec3,
    rotation: f32,
    objects: &[PlacedObject],
    walls: &[WallSegment],
    lot: LotBounds,
    catalog: &Catalog,
) -> ValidationResult {
    let ctx = ValidationContext::new(item, position, rotation, objects, walls, lot, catalog);
    ValidationPipeline::standard().validate(&ctx)
}
