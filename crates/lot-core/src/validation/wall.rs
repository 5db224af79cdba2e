//! Wall adjacency rule

use crate::constants::GRID_EPSILON;
use crate::geometry::{Aabb, Cardinal};
use crate::lot::WallSegment;

use super::{RejectReason, ValidationContext, ValidationResult, Validator};

/// Requires a wall directly behind wall-mounted items.
///
/// Applies to items tagged `needs_wall` and to every door or window. The
/// back edge of the candidate's rotated bounds is chosen from its yaw
/// snapped to a quarter turn; some wall must run along that edge and
/// overlap it.
#[derive(Debug, Clone, Copy, Default)]
pub struct WallAdjacencyValidator;

/// An axis-aligned edge on the floor plane
#[derive(Debug, Clone, Copy, PartialEq)]
struct BackEdge {
    /// Edge runs along X (true) or Z (false)
    along_x: bool,
    /// Fixed coordinate of the edge line
    line: f32,
    start: f32,
    end: f32,
}

impl BackEdge {
    fn of(bbox: &Aabb, facing: Cardinal) -> Self {
        match facing {
            Cardinal::North => Self::along_x(bbox.min.z, bbox),
            Cardinal::South => Self::along_x(bbox.max.z, bbox),
            Cardinal::East => Self::along_z(bbox.min.x, bbox),
            Cardinal::West => Self::along_z(bbox.max.x, bbox),
        }
    }

    fn along_x(z: f32, bbox: &Aabb) -> Self {
        Self {
            along_x: true,
            line: z,
            start: bbox.min.x,
            end: bbox.max.x,
        }
    }

    fn along_z(x: f32, bbox: &Aabb) -> Self {
        Self {
            along_x: false,
            line: x,
            start: bbox.min.z,
            end: bbox.max.z,
        }
    }

    /// Whether the wall lies on this edge's line and overlaps its span
    fn backed_by(&self, wall: &WallSegment) -> bool {
        let (fixed_a, fixed_b, span_a, span_b) = if self.along_x {
            (wall.a.z, wall.b.z, wall.a.x, wall.b.x)
        } else {
            (wall.a.x, wall.b.x, wall.a.z, wall.b.z)
        };

        let collinear =
            (fixed_a - self.line).abs() <= GRID_EPSILON && (fixed_b - self.line).abs() <= GRID_EPSILON;
        if !collinear {
            return false;
        }

        let overlap = self.end.min(span_a.max(span_b)) - self.start.max(span_a.min(span_b));
        overlap > GRID_EPSILON
    }
}

impl Validator for WallAdjacencyValidator {
    fn name(&self) -> &'static str {
        "wall_adjacency"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult {
        if !ctx.item.needs_wall() {
            return ValidationResult::accept();
        }

        let edge = BackEdge::of(&ctx.candidate_aabb(), Cardinal::from_yaw(ctx.rotation));
        if ctx.walls.iter().any(|wall| edge.backed_by(wall)) {
            ValidationResult::accept()
        } else {
            ValidationResult::reject(RejectReason::NeedsWall)
        }
    }
}
