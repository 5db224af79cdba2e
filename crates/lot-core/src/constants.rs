//! Global constants for lot-core

/// Current version of the exported lot document format
pub const FORMAT_VERSION: u32 = 1;

/// Default spatial index cell size (world units)
pub const DEFAULT_CELL_SIZE: f32 = 4.0;

/// Default floor tile edge length (world units)
pub const DEFAULT_TILE_SIZE: f32 = 1.0;

/// Tolerance used for collinearity tests on grid-aligned geometry
pub const GRID_EPSILON: f32 = 1e-4;

/// Raycast layer bit for placed objects
pub const LAYER_OBJECTS: u32 = 1 << 0;

/// Raycast layer bit for wall segments
pub const LAYER_WALLS: u32 = 1 << 1;

/// Layer mask matching every body
pub const LAYER_ALL: u32 = u32::MAX;
