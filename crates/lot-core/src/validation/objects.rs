//! Object overlap rule

use glam::Vec3;

use crate::collision::check_aabb_collision;

use super::{RejectReason, ValidationContext, ValidationResult, Validator};

/// Rejects placements whose rotated bounds intersect an existing object
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectsCollisionValidator;

impl Validator for ObjectsCollisionValidator {
    fn name(&self) -> &'static str {
        "objects_collision"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult {
        let candidate = ctx.candidate_aabb();
        let probe = candidate.inflate(Vec3::splat(ctx.collision.tolerance.max(0.0)));
        let hit = ctx
            .nearby_objects(&probe)
            .into_iter()
            .map(|(id, bbox)| (id, check_aabb_collision(&candidate, &bbox, &ctx.collision)))
            .find(|(_, result)| result.has_collision);

        match hit {
            Some((id, result)) => {
                tracing::trace!(
                    "Overlaps {} (depth {:?}, separation {:?})",
                    id,
                    result.penetration_depth,
                    result.separation
                );
                ValidationResult::reject(RejectReason::ObjectCollision)
            }
            None => ValidationResult::accept(),
        }
    }
}
