//! Lot Editor Core
//!
//! This crate provides:
//! - Geometry kernel: bounding boxes, footprints and quarter-turn rotation
//! - Collision detection and ray picking
//! - A uniform-grid spatial index over placed objects
//! - Placement validation as an ordered chain of rules
//! - Undoable lot edits behind a single `World` facade

pub mod catalog;
pub mod collision;
pub mod commands;
pub mod config;
pub mod constants;
pub mod events;
pub mod geometry;
pub mod lot;
pub mod project;
pub mod spatial;
pub mod tools;
pub mod validation;
pub mod world;

// Re-exports for convenience
pub use catalog::{Catalog, CatalogItem, Category};
pub use collision::{
    Body, CollisionConfig, CollisionResult, Ray, RayHit, RaycastOptions, Sphere, aabb_intersects,
    check_aabb_collision, check_sphere_aabb_collision, raycast_aabb, raycast_bodies,
};
pub use commands::{
    AddWallCommand, BulldozeCommand, MoveObjectCommand, PaintFloorCommand, PlaceObjectCommand,
    RemoveObjectCommand, RemoveWallCommand,
};
pub use config::EngineConfig;
pub use events::{EventBus, Subscription};
pub use geometry::{
    Aabb, Cardinal, Footprint, GeometryError, GeometryResult, footprint_aabb, rotate_footprint,
};
pub use lot::{FloorTile, Lot, LotBounds, LotLedger, PlacedObject, SharedLot, WallSegment};
pub use project::{LotDocument, ProjectError, export_json, import_json, load_lot, save_lot};
pub use spatial::{ObjectIndex, SpatialIndex};
pub use tools::{EditorTool, ToolAction, ToolOutcome};
pub use validation::{
    RejectReason, ValidationContext, ValidationPipeline, ValidationResult, Validator,
    validate_placement,
};
pub use world::{Picked, World, WorldError, WorldEvent, WorldTopic};

pub use lot_history;
