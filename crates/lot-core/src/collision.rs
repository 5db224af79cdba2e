//! Collision detection
//!
//! Exact pairwise tests used for the narrow phase and for picking:
//! AABB/AABB, sphere/AABB and ray/AABB. The optional outputs (overlap,
//! separation, contact) are gated by [`CollisionConfig`] so the per-frame
//! placement path pays only for the boolean answer.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::geometry::{Aabb, normalize};

/// Controls which optional collision outputs are computed
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Fill in per-axis overlap
    pub compute_overlap: bool,
    /// Fill in the minimum translation vector and penetration depth
    pub compute_separation: bool,
    /// Fill in the contact point
    pub compute_contact: bool,
    /// Gap between shapes still counted as a collision
    pub tolerance: f32,
}

impl CollisionConfig {
    /// Every optional output enabled
    pub fn detailed() -> Self {
        Self {
            compute_overlap: true,
            compute_separation: true,
            compute_contact: true,
            tolerance: 0.0,
        }
    }
}

/// Result of a pairwise collision test
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CollisionResult {
    pub has_collision: bool,
    /// Overlap extent on each axis
    pub overlap: Option<Vec3>,
    /// Translation that pushes the first shape out of the second
    pub separation: Option<Vec3>,
    /// Length of `separation`
    pub penetration_depth: Option<f32>,
    /// Representative point of contact
    pub contact_point: Option<Vec3>,
}

impl CollisionResult {
    fn miss() -> Self {
        Self::default()
    }
}

/// Separating-axis test on all three axes.
///
/// Symmetric, and touching boundaries count as intersecting.
pub fn aabb_intersects(a: &Aabb, b: &Aabb) -> bool {
    a.intersects(b)
}

/// AABB/AABB collision with optional details.
///
/// Boxes closer than `config.tolerance` also collide; their overlap is then
/// negative on the separating axis. The separation vector uses the axis of
/// least overlap (ties resolved x, then y, then z) and points from `b`'s
/// center towards `a`'s.
pub fn check_aabb_collision(a: &Aabb, b: &Aabb, config: &CollisionConfig) -> CollisionResult {
    let reach = a.inflate(Vec3::splat(config.tolerance.max(0.0)));
    if !aabb_intersects(&reach, b) {
        return CollisionResult::miss();
    }

    let mut result = CollisionResult {
        has_collision: true,
        ..CollisionResult::default()
    };

    let overlap = a.max.min(b.max) - a.min.max(b.min);

    if config.compute_overlap {
        result.overlap = Some(overlap);
    }

    if config.compute_separation {
        let axis = least_overlap_axis(overlap);
        let delta = a.center() - b.center();
        let direction = if delta[axis] < 0.0 { -1.0 } else { 1.0 };
        let mut separation = Vec3::ZERO;
        separation[axis] = overlap[axis] * direction;
        result.separation = Some(separation);
        result.penetration_depth = Some(separation.length());
    }

    if config.compute_contact {
        let min = a.min.max(b.min);
        let max = a.max.min(b.max);
        result.contact_point = Some((min + max) * 0.5);
    }

    result
}

fn least_overlap_axis(overlap: Vec3) -> usize {
    let mut axis = 0;
    for candidate in 1..3 {
        if overlap[candidate] < overlap[axis] {
            axis = candidate;
        }
    }
    axis
}

/// A sphere given by center and radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// Sphere/AABB collision.
///
/// The sphere collides when the box point nearest its center lies within
/// `radius + tolerance`.
pub fn check_sphere_aabb_collision(
    sphere: &Sphere,
    bbox: &Aabb,
    config: &CollisionConfig,
) -> CollisionResult {
    let nearest = sphere.center.clamp(bbox.min, bbox.max);
    let offset = sphere.center - nearest;
    let distance = offset.length();

    if distance > sphere.radius + config.tolerance {
        return CollisionResult::miss();
    }

    let mut result = CollisionResult {
        has_collision: true,
        ..CollisionResult::default()
    };

    if config.compute_separation {
        let separation = normalize(offset) * (sphere.radius - distance);
        result.separation = Some(separation);
        result.penetration_depth = Some(separation.length());
    }

    if config.compute_contact {
        result.contact_point = Some(nearest);
    }

    result
}

/// A half-line starting at `origin`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Direction of travel (normalized on construction)
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: normalize(direction),
        }
    }

    /// Point at distance `t` along the ray
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// A successful ray intersection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance from the ray origin
    pub distance: f32,
    pub point: Vec3,
    /// Outward normal of the face that was hit
    pub normal: Vec3,
}

/// Ray/AABB intersection using the slab method.
///
/// Misses when the box is behind the ray, when the slabs do not overlap,
/// or when the hit lies beyond `max_distance`. A ray starting inside the
/// box reports the exit point.
pub fn raycast_aabb(ray: &Ray, bbox: &Aabb, max_distance: f32) -> Option<RayHit> {
    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;

    for axis in 0..3 {
        let origin = ray.origin[axis];
        let dir = ray.direction[axis];
        let (lo, hi) = (bbox.min[axis], bbox.max[axis]);

        if dir.abs() < f32::EPSILON {
            // Parallel to this slab: inside it or never
            if origin < lo || origin > hi {
                return None;
            }
            continue;
        }

        let inv = 1.0 / dir;
        let mut t0 = (lo - origin) * inv;
        let mut t1 = (hi - origin) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_min = t_min.max(t0);
        t_max = t_max.min(t1);
    }

    if t_max < 0.0 || t_min > t_max {
        return None;
    }

    let t = if t_min >= 0.0 { t_min } else { t_max };
    if t > max_distance {
        return None;
    }

    let point = ray.at(t);
    Some(RayHit {
        distance: t,
        point,
        normal: face_normal(bbox, point),
    })
}

/// Normal of the box face nearest to `point`, chosen by the dominant
/// axis of the point's offset from the center relative to the half-extents.
fn face_normal(bbox: &Aabb, point: Vec3) -> Vec3 {
    let half = bbox.half_extents();
    let local = point - bbox.center();

    let mut axis = 0;
    let mut best = f32::NEG_INFINITY;
    for candidate in 0..3 {
        let extent = half[candidate];
        let ratio = if extent > 0.0 {
            (local[candidate] / extent).abs()
        } else {
            f32::INFINITY
        };
        if ratio > best {
            best = ratio;
            axis = candidate;
        }
    }

    let mut normal = Vec3::ZERO;
    normal[axis] = if local[axis] < 0.0 { -1.0 } else { 1.0 };
    normal
}

/// Something a ray can hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body<K> {
    pub key: K,
    pub bounds: Aabb,
    /// Layer bits; tested against a ray's mask
    pub layers: u32,
}

/// Options for [`raycast_bodies`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastOptions {
    pub max_distance: f32,
    /// Bodies with `layers & layer_mask == 0` are skipped untested
    pub layer_mask: u32,
}

impl Default for RaycastOptions {
    fn default() -> Self {
        Self {
            max_distance: f32::INFINITY,
            layer_mask: u32::MAX,
        }
    }
}

/// Nearest body hit by the ray, honouring the layer mask
pub fn raycast_bodies<'a, K>(
    ray: &Ray,
    bodies: impl IntoIterator<Item = &'a Body<K>>,
    options: &RaycastOptions,
) -> Option<(&'a Body<K>, RayHit)>
where
    K: 'a,
{
    let mut nearest: Option<(&'a Body<K>, RayHit)> = None;

    for body in bodies {
        if body.layers & options.layer_mask == 0 {
            continue;
        }
        let limit = nearest
            .as_ref()
            .map_or(options.max_distance, |(_, hit)| hit.distance);
        if let Some(hit) = raycast_aabb(ray, &body.bounds, limit) {
            if nearest.as_ref().is_none_or(|(_, best)| hit.distance < best.distance) {
                nearest = Some((body, hit));
            }
        }
    }

    nearest
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_box() -> Aabb {
        Aabb::new(Vec3::ZERO, Vec3::ONE)
    }

    #[test]
    fn test_intersects_is_symmetric() {
        let boxes = [
            unit_box(),
            Aabb::new(Vec3::splat(0.5), Vec3::splat(2.0)),
            Aabb::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0)),
            Aabb::new(Vec3::splat(3.0), Vec3::splat(4.0)),
            Aabb::empty(),
        ];
        for a in &boxes {
            for b in &boxes {
                assert_eq!(aabb_intersects(a, b), aabb_intersects(b, a));
            }
        }
    }

    #[test]
    fn test_aabb_details_are_gated() {
        let a = Aabb::new(Vec3::ZERO, Vec3::splat(2.0));
        let b = Aabb::new(Vec3::splat(1.0), Vec3::splat(3.0));

        let plain = check_aabb_collision(&a, &b, &CollisionConfig::default());
        assert!(plain.has_collision);
        assert_eq!(plain.overlap, None);
        assert_eq!(plain.separation, None);
        assert_eq!(plain.contact_point, None);
    }

    #[test]
    fn test_aabb_separation_uses_least_overlap() {
        let a = Aabb::new(Vec3::ZERO, Vec3::new(2.0, 2.0, 2.0));
        // Overlap: x = 1.5, y = 0.5, z = 2.0
        let b = Aabb::new(Vec3::new(0.5, 1.5, 0.0), Vec3::new(3.0, 4.0, 2.0));

        let result = check_aabb_collision(&a, &b, &CollisionConfig::detailed());
        assert_eq!(result.overlap, Some(Vec3::new(1.5, 0.5, 2.0)));
        // a sits below b, so it is pushed down
        assert_eq!(result.separation, Some(Vec3::new(0.0, -0.5, 0.0)));
        assert_relative_eq!(result.penetration_depth.unwrap_or_default(), 0.5);
        assert_eq!(result.contact_point, Some(Vec3::new(1.25, 1.75, 1.0)));
    }

    #[test]
    fn test_aabb_separation_tie_prefers_x() {
        let a = Aabb::new(Vec3::ZERO, Vec3::splat(2.0));
        let b = Aabb::new(Vec3::splat(1.0), Vec3::splat(3.0));
        let result = check_aabb_collision(&a, &b, &CollisionConfig::detailed());
        assert_eq!(result.separation, Some(Vec3::new(-1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_aabb_miss() {
        let a = unit_box();
        let b = Aabb::new(Vec3::splat(2.0), Vec3::splat(3.0));
        assert!(!check_aabb_collision(&a, &b, &CollisionConfig::detailed()).has_collision);
    }

    #[test]
    fn test_aabb_tolerance_catches_near_miss() {
        let a = unit_box();
        let b = Aabb::new(Vec3::new(1.25, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        let strict = CollisionConfig::default();
        let loose = CollisionConfig {
            tolerance: 0.5,
            compute_overlap: true,
            ..CollisionConfig::default()
        };

        assert!(!check_aabb_collision(&a, &b, &strict).has_collision);
        let result = check_aabb_collision(&a, &b, &loose);
        assert!(result.has_collision);
        assert_relative_eq!(result.overlap.unwrap().x, -0.25);
    }

    #[test]
    fn test_sphere_aabb() {
        let bbox = unit_box();
        let config = CollisionConfig::detailed();

        let touching = Sphere::new(Vec3::new(1.5, 0.5, 0.5), 0.75);
        let result = check_sphere_aabb_collision(&touching, &bbox, &config);
        assert!(result.has_collision);
        assert_eq!(result.contact_point, Some(Vec3::new(1.0, 0.5, 0.5)));
        let separation = result.separation.unwrap_or_default();
        assert_relative_eq!(separation.x, 0.25);
        assert_relative_eq!(separation.y, 0.0);

        let far = Sphere::new(Vec3::new(3.0, 0.5, 0.5), 0.5);
        assert!(!check_sphere_aabb_collision(&far, &bbox, &config).has_collision);

        let tolerant = CollisionConfig {
            tolerance: 1.6,
            ..CollisionConfig::default()
        };
        assert!(check_sphere_aabb_collision(&far, &bbox, &tolerant).has_collision);
    }

    #[test]
    fn test_sphere_center_inside_box_has_zero_separation() {
        let sphere = Sphere::new(Vec3::splat(0.5), 0.1);
        let result = check_sphere_aabb_collision(&sphere, &unit_box(), &CollisionConfig::detailed());
        assert!(result.has_collision);
        assert_eq!(result.separation, Some(Vec3::ZERO));
    }

    #[test]
    fn test_ray_hits_box_face() {
        let ray = Ray::new(Vec3::new(0.5, 0.5, 5.0), Vec3::NEG_Z);
        let hit = raycast_aabb(&ray, &unit_box(), f32::INFINITY);
        let hit = hit.expect("ray should hit");
        assert_relative_eq!(hit.distance, 4.0);
        assert_eq!(hit.normal, Vec3::Z);
        assert_relative_eq!(hit.point.z, 1.0);
    }

    #[test]
    fn test_ray_misses() {
        let bbox = unit_box();
        // Pointing away
        assert!(raycast_aabb(&Ray::new(Vec3::new(0.5, 0.5, 5.0), Vec3::Z), &bbox, 100.0).is_none());
        // Passing beside
        assert!(raycast_aabb(&Ray::new(Vec3::new(3.0, 0.5, 5.0), Vec3::NEG_Z), &bbox, 100.0).is_none());
        // Beyond max distance
        assert!(raycast_aabb(&Ray::new(Vec3::new(0.5, 0.5, 5.0), Vec3::NEG_Z), &bbox, 3.0).is_none());
    }

    #[test]
    fn test_ray_from_inside_reports_exit() {
        let ray = Ray::new(Vec3::splat(0.5), Vec3::X);
        let hit = raycast_aabb(&ray, &unit_box(), f32::INFINITY).expect("inside ray hits");
        assert_relative_eq!(hit.distance, 0.5);
        assert_eq!(hit.normal, Vec3::X);
    }

    #[test]
    fn test_raycast_bodies_nearest_and_mask() {
        let bodies = [
            Body {
                key: "far",
                bounds: Aabb::new(Vec3::new(0.0, 0.0, -10.0), Vec3::new(1.0, 1.0, -9.0)),
                layers: 0b01,
            },
            Body {
                key: "near",
                bounds: unit_box(),
                layers: 0b10,
            },
        ];
        let ray = Ray::new(Vec3::new(0.5, 0.5, 5.0), Vec3::NEG_Z);

        let (body, hit) = raycast_bodies(&ray, &bodies, &RaycastOptions::default()).expect("hit");
        assert_eq!(body.key, "near");
        assert_relative_eq!(hit.distance, 4.0);

        let masked = RaycastOptions {
            layer_mask: 0b01,
            ..RaycastOptions::default()
        };
        let (body, _) = raycast_bodies(&ray, &bodies, &masked).expect("hit");
        assert_eq!(body.key, "far");

        let none = RaycastOptions {
            layer_mask: 0b100,
            ..RaycastOptions::default()
        };
        assert!(raycast_bodies(&ray, &bodies, &none).is_none());
    }
}
