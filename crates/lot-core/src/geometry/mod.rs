//! Geometry kernel
//!
//! Vector helpers, axis-aligned bounds and footprint transforms. Vector
//! arithmetic (add, sub, scale, dot, cross, length) is glam's; this module
//! adds the checked and zero-safe variants the editor relies on.

mod bounds;
mod footprint;

use glam::Vec3;
use thiserror::Error;

pub use bounds::Aabb;
pub use footprint::{Footprint, footprint_aabb, rotate_footprint};

/// Geometry contract violations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("Division of vector {vector} by zero")]
    DivideByZero { vector: Vec3 },
}

/// Result type for geometry operations
pub type GeometryResult<T> = Result<T, GeometryError>;

/// Normalize `v`, mapping the zero vector to zero instead of NaN
pub fn normalize(v: Vec3) -> Vec3 {
    v.normalize_or_zero()
}

/// Divide a vector by a scalar.
///
/// A zero or non-finite divisor is a caller bug and is reported as
/// [`GeometryError::DivideByZero`].
pub fn try_div(v: Vec3, divisor: f32) -> GeometryResult<Vec3> {
    if divisor == 0.0 || !divisor.is_finite() {
        return Err(GeometryError::DivideByZero { vector: v });
    }
    Ok(v / divisor)
}

/// Yaw quantized to a quarter turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cardinal {
    /// 0 degrees; the back faces -Z
    #[default]
    North,
    /// 90 degrees; the back faces -X
    East,
    /// 180 degrees; the back faces +Z
    South,
    /// 270 degrees; the back faces +X
    West,
}

impl Cardinal {
    /// Snap an arbitrary yaw (degrees) to the nearest quarter turn
    pub fn from_yaw(yaw: f32) -> Self {
        match (yaw / 90.0).round().rem_euclid(4.0) as u8 {
            1 => Cardinal::East,
            2 => Cardinal::South,
            3 => Cardinal::West,
            _ => Cardinal::North,
        }
    }

    /// Yaw in degrees
    pub fn yaw(&self) -> f32 {
        match self {
            Cardinal::North => 0.0,
            Cardinal::East => 90.0,
            Cardinal::South => 180.0,
            Cardinal::West => 270.0,
        }
    }

    /// Direction from an item's footprint towards the wall behind it
    pub fn back(&self) -> Vec3 {
        match self {
            Cardinal::North => Vec3::NEG_Z,
            Cardinal::East => Vec3::NEG_X,
            Cardinal::South => Vec3::Z,
            Cardinal::West => Vec3::X,
        }
    }
}

/// Snap a yaw to the nearest multiple of 90 degrees in `[0, 360)`
pub fn quantize_yaw(yaw: f32) -> f32 {
    Cardinal::from_yaw(yaw).yaw()
}
