//! Lot boundary rule

use super::{RejectReason, ValidationContext, ValidationResult, Validator};

/// Rejects placements whose rotated footprint leaves the lot floor
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundsValidator;

impl Validator for BoundsValidator {
    fn name(&self) -> &'static str {
        "bounds"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult {
        if ctx.lot.contains(&ctx.candidate_aabb()) {
            ValidationResult::accept()
        } else {
            ValidationResult::reject(RejectReason::OutOfBounds)
        }
    }
}
