//! Tile clearance rule
//!
//! Approximates a Minkowski-sum test: the candidate's occupied tiles are
//! reduced to their bounding rectangle, grown by the required clearance,
//! and any existing object occupying a tile inside that rectangle rejects
//! the placement. Non-rectangular footprints are therefore over-approximated.

use glam::Vec3;

use crate::geometry::Aabb;

use super::{RejectReason, ValidationContext, ValidationResult, Validator};

/// Inclusive rectangle of floor tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TileRect {
    min_x: i32,
    min_z: i32,
    max_x: i32,
    max_z: i32,
}

impl TileRect {
    /// Tiles occupied by a world-space box
    fn covering(bbox: &Aabb, tile_size: f32) -> Self {
        let min_x = (bbox.min.x / tile_size).floor() as i32;
        let min_z = (bbox.min.z / tile_size).floor() as i32;
        // Exclusive upper edge: a box ending on a tile boundary does not
        // occupy the next tile
        let max_x = ((bbox.max.x / tile_size).ceil() as i32 - 1).max(min_x);
        let max_z = ((bbox.max.z / tile_size).ceil() as i32 - 1).max(min_z);
        Self {
            min_x,
            min_z,
            max_x,
            max_z,
        }
    }

    fn grow(&self, tiles: i32) -> Self {
        Self {
            min_x: self.min_x - tiles,
            min_z: self.min_z - tiles,
            max_x: self.max_x + tiles,
            max_z: self.max_z + tiles,
        }
    }

    fn overlaps(&self, other: &TileRect) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_z <= other.max_z
            && self.max_z >= other.min_z
    }

    /// World-space box spanning the rectangle, for broad-phase queries
    fn to_aabb(self, tile_size: f32) -> Aabb {
        Aabb::new(
            Vec3::new(
                self.min_x as f32 * tile_size,
                f32::MIN,
                self.min_z as f32 * tile_size,
            ),
            Vec3::new(
                (self.max_x + 1) as f32 * tile_size,
                f32::MAX,
                (self.max_z + 1) as f32 * tile_size,
            ),
        )
    }
}

/// Rejects placements with another object inside the item's clearance zone
#[derive(Debug, Clone, Copy, Default)]
pub struct ClearanceValidator;

impl Validator for ClearanceValidator {
    fn name(&self) -> &'static str {
        "clearance"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult {
        let clearance = ctx
            .item
            .footprint
            .as_ref()
            .map_or(0.0, |footprint| footprint.clearance());
        if clearance <= 0.0 || ctx.tile_size <= 0.0 {
            return ValidationResult::accept();
        }

        let candidate = ctx.candidate_aabb();
        if !candidate.is_valid() {
            return ValidationResult::accept();
        }

        let zone = TileRect::covering(&candidate, ctx.tile_size).grow(clearance.ceil() as i32);
        let probe = zone.to_aabb(ctx.tile_size);
        let blocked = ctx
            .nearby_objects(&probe)
            .iter()
            .filter(|(_, bbox)| bbox.is_valid())
            .any(|(_, bbox)| TileRect::covering(bbox, ctx.tile_size).overlaps(&zone));

        if blocked {
            ValidationResult::reject(RejectReason::Clearance)
        } else {
            ValidationResult::accept()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lot::{LotBounds, PlacedObject};
    use crate::validation::test_support::{catalog, item};

    fn check(id: &str, position: Vec3, existing: &[PlacedObject]) -> ValidationResult {
        let catalog = catalog();
        let ctx = ValidationContext::new(
            item(&catalog, id),
            position,
            0.0,
            existing,
            &[],
            LotBounds::new(20.0, 20.0),
            &catalog,
        );
        ClearanceValidator.validate(&ctx)
    }

    #[test]
    fn test_tile_rect_covering() {
        let rect = TileRect::covering(
            &Aabb::new(Vec3::new(1.0, 0.0, 1.0), Vec3::new(3.0, 1.0, 2.5)),
            1.0,
        );
        assert_eq!(
            rect,
            TileRect {
                min_x: 1,
                min_z: 1,
                max_x: 2,
                max_z: 2
            }
        );
    }

    #[test]
    fn test_neighbour_inside_clearance_rejects() {
        // stove occupies tile (5,5) and needs one free tile around it
        let existing = [PlacedObject::new("bench", Vec3::new(6.0, 0.0, 5.0), 0.0)];
        assert_eq!(
            check("stove", Vec3::new(5.0, 0.0, 5.0), &existing).reason,
            Some(RejectReason::Clearance)
        );
    }

    #[test]
    fn test_neighbour_outside_clearance_passes() {
        let existing = [PlacedObject::new("bench", Vec3::new(7.0, 0.0, 5.0), 0.0)];
        assert!(check("stove", Vec3::new(5.0, 0.0, 5.0), &existing).ok);
    }

    #[test]
    fn test_item_without_clearance_always_passes() {
        let existing = [PlacedObject::new("bench", Vec3::new(2.0, 0.0, 0.0), 0.0)];
        assert!(check("crate", Vec3::ZERO, &existing).ok);
    }
}
