//! Item footprints and their world-space bounds

use std::borrow::Cow;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::Aabb;

/// The occupied shape of a catalog item, in item-local coordinates.
///
/// Placed objects reference the footprint through their catalog item and
/// never own a copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Footprint {
    /// Axis-aligned box: `width` along X, `height` along Y, `depth` along Z
    Box {
        width: f32,
        depth: f32,
        height: f32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        clearance: Option<f32>,
    },
    /// Arbitrary outline given by its vertices
    Poly {
        points: Vec<Vec3>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        clearance: Option<f32>,
    },
}

impl Footprint {
    /// Box footprint without clearance
    pub fn boxed(width: f32, depth: f32, height: f32) -> Self {
        Footprint::Box {
            width,
            depth,
            height,
            clearance: None,
        }
    }

    /// Box footprint requiring `clearance` free cells around it
    pub fn boxed_with_clearance(width: f32, depth: f32, height: f32, clearance: f32) -> Self {
        Footprint::Box {
            width,
            depth,
            height,
            clearance: Some(clearance),
        }
    }

    /// Required free space around the item, in tiles
    pub fn clearance(&self) -> f32 {
        match self {
            Footprint::Box { clearance, .. } | Footprint::Poly { clearance, .. } => {
                clearance.unwrap_or(0.0)
            }
        }
    }
}

/// Apply a yaw (degrees) to a footprint.
///
/// Only quarter turns are modelled for boxes: width and depth swap when
/// `yaw mod 180 != 0`. Polygons are returned unrotated.
pub fn rotate_footprint(footprint: &Footprint, yaw: f32) -> Cow<'_, Footprint> {
    match footprint {
        Footprint::Box {
            width,
            depth,
            height,
            clearance,
        } if yaw.round().rem_euclid(180.0) != 0.0 => Cow::Owned(Footprint::Box {
            width: *depth,
            depth: *width,
            height: *height,
            clearance: *clearance,
        }),
        _ => Cow::Borrowed(footprint),
    }
}

/// World-space bounds of a footprint placed at `position`.
///
/// Boxes span `[position, position + size]`. Polygons take the extent of
/// their offset points; a polygon with no points yields [`Aabb::empty`].
pub fn footprint_aabb(footprint: &Footprint, position: Vec3) -> Aabb {
    match footprint {
        Footprint::Box {
            width,
            depth,
            height,
            ..
        } => Aabb::new(position, position + Vec3::new(*width, *height, *depth)),
        Footprint::Poly { points, .. } => {
            Aabb::from_points(points.iter().map(|p| *p + position))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quarter_turn_swaps_width_and_depth() {
        let fp = Footprint::boxed(2.0, 1.0, 3.0);
        for yaw in [90.0, 270.0, -90.0] {
            assert_eq!(*rotate_footprint(&fp, yaw), Footprint::boxed(1.0, 2.0, 3.0));
        }
    }

    #[test]
    fn test_half_turn_keeps_dimensions() {
        let fp = Footprint::boxed(2.0, 1.0, 3.0);
        assert_eq!(*rotate_footprint(&fp, 180.0), fp);
        assert_eq!(*rotate_footprint(&fp, 0.0), fp);
        assert_eq!(*rotate_footprint(&fp, 360.0), fp);
    }

    #[test]
    fn test_polygon_is_not_rotated() {
        let fp = Footprint::Poly {
            points: vec![Vec3::ZERO, Vec3::new(3.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0)],
            clearance: None,
        };
        assert!(matches!(rotate_footprint(&fp, 90.0), Cow::Borrowed(_)));
    }

    #[test]
    fn test_box_aabb() {
        let fp = Footprint::boxed(2.0, 3.0, 1.0);
        let bbox = footprint_aabb(&fp, Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(bbox.min, Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(bbox.max, Vec3::new(3.0, 1.0, 4.0));
    }

    #[test]
    fn test_polygon_aabb() {
        let fp = Footprint::Poly {
            points: vec![Vec3::new(-1.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 3.0)],
            clearance: Some(1.0),
        };
        let bbox = footprint_aabb(&fp, Vec3::new(5.0, 0.0, 5.0));
        assert_eq!(bbox.min, Vec3::new(4.0, 0.0, 5.0));
        assert_eq!(bbox.max, Vec3::new(7.0, 0.0, 8.0));
        assert_eq!(fp.clearance(), 1.0);
    }

    #[test]
    fn test_empty_polygon_is_sentinel() {
        let fp = Footprint::Poly {
            points: Vec::new(),
            clearance: None,
        };
        assert!(!footprint_aabb(&fp, Vec3::ZERO).is_valid());
    }

    #[test]
    fn test_footprint_json_shape() {
        let fp: Footprint =
            serde_json::from_str(r#"{"type":"box","width":1,"depth":2,"height":0.5}"#).unwrap();
        assert_eq!(fp, Footprint::boxed(1.0, 2.0, 0.5));
    }
}
