//! Engine configuration
//!
//! Tunables for the spatial index, history depth, collision detail,
//! pricing and validation. Every section falls back to its defaults when
//! omitted, so partial RON files are fine.

use std::path::Path;

use lot_history::DEFAULT_MAX_HISTORY;
use serde::{Deserialize, Serialize};

use crate::collision::CollisionConfig;
use crate::constants::{DEFAULT_CELL_SIZE, DEFAULT_TILE_SIZE};
use crate::project::ProjectError;

/// Broad-phase grid settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpatialConfig {
    /// Grid cell edge length
    pub cell_size: f32,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
        }
    }
}

/// Undo history settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum undo depth
    pub max_size: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_HISTORY,
        }
    }
}

/// Floor grid settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GridConfig {
    /// Floor tile edge length
    pub tile_size: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
        }
    }
}

/// Construction prices
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PricingConfig {
    /// Wall cost per unit of length
    pub wall_cost_per_unit: f64,
    /// Cost of painting one floor tile
    pub floor_tile_cost: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            wall_cost_per_unit: 10.0,
            floor_tile_cost: 1.0,
        }
    }
}

/// Placement rule selection
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ValidationConfig {
    /// Also enforce clearance zones and wall adjacency
    pub extended_rules: bool,
}

/// Top-level engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub spatial: SpatialConfig,
    pub history: HistoryConfig,
    pub collision: CollisionConfig,
    pub grid: GridConfig,
    pub pricing: PricingConfig,
    pub validation: ValidationConfig,
}

impl EngineConfig {
    /// Parse RON text
    pub fn from_ron(text: &str) -> Result<Self, ProjectError> {
        ron::from_str(text).map_err(|e| ProjectError::Config(e.to_string()))
    }

    /// Serialize to pretty RON
    pub fn to_ron(&self) -> Result<String, ProjectError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ProjectError::Config(e.to_string()))
    }

    /// Load from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|e| ProjectError::Io(e.to_string()))?;
        Self::from_ron(&content)
    }

    /// Save to a RON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ProjectError> {
        let content = self.to_ron()?;
        std::fs::write(path.as_ref(), content).map_err(|e| ProjectError::Io(e.to_string()))
    }
}
