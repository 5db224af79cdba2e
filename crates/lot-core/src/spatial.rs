//! Spatial index
//!
//! Uniform grid over the floor plane (X/Z) used as a broad phase:
//! - insertion and queries touch only the cells a box covers
//! - query results are candidates, a superset of the true intersections
//!
//! Callers must confirm candidates with [`aabb_intersects`] or
//! [`check_aabb_collision`](crate::collision::check_aabb_collision).

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;

use uuid::Uuid;

use crate::collision::aabb_intersects;
use crate::geometry::Aabb;
use crate::lot::PlacedObject;

type Cell = (i32, i32);

/// Grid-bucketed broad-phase index keyed by `K`
#[derive(Debug, Clone)]
pub struct SpatialIndex<K> {
    /// Grid cell edge length
    cell_size: f32,
    /// Cell -> keys whose bounds touch it
    grid: HashMap<Cell, Vec<K>>,
    /// Bounds of every inserted key
    bounds: HashMap<K, Aabb>,
    /// Smallest cell range covering every insert since the index was last
    /// empty; queries never walk outside it
    extent: Option<(Cell, Cell)>,
}

impl<K: Copy + Eq + Hash> SpatialIndex<K> {
    /// Create an empty index. Non-positive cell sizes fall back to 1.
    pub fn new(cell_size: f32) -> Self {
        let cell_size = if cell_size > 0.0 && cell_size.is_finite() {
            cell_size
        } else {
            1.0
        };
        Self {
            cell_size,
            grid: HashMap::new(),
            bounds: HashMap::new(),
            extent: None,
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// World coordinate to grid coordinate
    fn to_cell(&self, x: f32, z: f32) -> Cell {
        (
            (x / self.cell_size).floor() as i32,
            (z / self.cell_size).floor() as i32,
        )
    }

    /// Cell range covered by a box; `None` for empty or non-finite boxes
    fn cell_range(&self, bbox: &Aabb) -> Option<(Cell, Cell)> {
        let usable = bbox.is_valid() && bbox.min.is_finite() && bbox.max.is_finite();
        usable.then(|| {
            (
                self.to_cell(bbox.min.x, bbox.min.z),
                self.to_cell(bbox.max.x, bbox.max.z),
            )
        })
    }

    /// Insert (or re-insert) a key with its bounds
    pub fn insert(&mut self, key: K, bbox: Aabb) {
        self.remove(&key);

        let range = self.cell_range(&bbox);
        for cell in cells_in(range) {
            self.grid.entry(cell).or_default().push(key);
        }
        if let Some((lo, hi)) = range {
            self.extent = Some(match self.extent {
                Some((min, max)) => (
                    (min.0.min(lo.0), min.1.min(lo.1)),
                    (max.0.max(hi.0), max.1.max(hi.1)),
                ),
                None => (lo, hi),
            });
        }
        self.bounds.insert(key, bbox);
    }

    /// Remove a key. Returns `false` if it was not present.
    pub fn remove(&mut self, key: &K) -> bool {
        let Some(bbox) = self.bounds.remove(key) else {
            return false;
        };
        let cells: Vec<Cell> = cells_in(self.cell_range(&bbox)).collect();
        for cell in cells {
            if let Some(keys) = self.grid.get_mut(&cell) {
                keys.retain(|k| k != key);
                if keys.is_empty() {
                    self.grid.remove(&cell);
                }
            }
        }
        if self.bounds.is_empty() {
            self.extent = None;
        }
        true
    }

    /// Broad-phase candidates for `bbox`, each reported once.
    ///
    /// May contain keys whose bounds do not actually intersect `bbox`. The
    /// walk is clipped to the occupied cells, so huge or unbounded query
    /// boxes cost no more than the index itself.
    pub fn query(&self, bbox: &Aabb) -> Vec<K> {
        // Infinite coordinates saturate to the ends of the cell range
        let range = bbox.is_valid().then(|| {
            (
                self.to_cell(bbox.min.x, bbox.min.z),
                self.to_cell(bbox.max.x, bbox.max.z),
            )
        });
        let clipped = match (range, self.extent) {
            (Some((lo, hi)), Some((min, max))) => {
                let lo = (lo.0.max(min.0), lo.1.max(min.1));
                let hi = (hi.0.min(max.0), hi.1.min(max.1));
                Some((lo, hi))
            }
            _ => None,
        };

        let mut seen = HashSet::new();
        let mut result = Vec::new();
        for cell in cells_in(clipped) {
            if let Some(keys) = self.grid.get(&cell) {
                for key in keys {
                    if seen.insert(*key) {
                        result.push(*key);
                    }
                }
            }
        }
        result
    }

    /// Candidates confirmed against their stored bounds
    pub fn query_intersecting(&self, bbox: &Aabb) -> Vec<K> {
        self.query(bbox)
            .into_iter()
            .filter(|key| {
                self.bounds
                    .get(key)
                    .is_some_and(|bounds| aabb_intersects(bounds, bbox))
            })
            .collect()
    }

    /// Stored bounds of a key
    pub fn bounds(&self, key: &K) -> Option<&Aabb> {
        self.bounds.get(key)
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Remove every key
    pub fn clear(&mut self) {
        self.grid.clear();
        self.bounds.clear();
        self.extent = None;
    }
}

/// Every cell in an inclusive range; an inverted range yields nothing
fn cells_in(range: Option<(Cell, Cell)>) -> impl Iterator<Item = Cell> {
    let ((min_x, min_z), (max_x, max_z)) = range.unwrap_or(((0, 0), (-1, -1)));
    (min_x..=max_x).flat_map(move |x| (min_z..=max_z).map(move |z| (x, z)))
}

/// Cached spatial index over a lot's placed objects.
///
/// The index is rebuilt only when the object collection is a different
/// allocation (lot collections are replaced wholesale on change) or the
/// ignored id changes, so repeated per-frame queries cost nothing extra.
#[derive(Debug, Clone)]
pub struct ObjectIndex {
    index: SpatialIndex<Uuid>,
    /// Collection the index was built from
    source: Option<Arc<[PlacedObject]>>,
    ignore_id: Option<Uuid>,
    rebuilds: usize,
}

impl ObjectIndex {
    pub fn new(cell_size: f32) -> Self {
        Self {
            index: SpatialIndex::new(cell_size),
            source: None,
            ignore_id: None,
            rebuilds: 0,
        }
    }

    /// Bring the index up to date with `objects`.
    ///
    /// `bounds_of` resolves an object's world bounds; objects it maps to
    /// `None` are left out. The object matching `ignore_id` is never
    /// inserted.
    pub fn refresh(
        &mut self,
        objects: &Arc<[PlacedObject]>,
        ignore_id: Option<Uuid>,
        bounds_of: impl Fn(&PlacedObject) -> Option<Aabb>,
    ) -> &SpatialIndex<Uuid> {
        let fresh = self
            .source
            .as_ref()
            .is_some_and(|source| Arc::ptr_eq(source, objects))
            && self.ignore_id == ignore_id;

        if !fresh {
            self.index.clear();
            for object in objects.iter() {
                if Some(object.id) == ignore_id {
                    continue;
                }
                if let Some(bbox) = bounds_of(object) {
                    self.index.insert(object.id, bbox);
                }
            }
            self.source = Some(objects.clone());
            self.ignore_id = ignore_id;
            self.rebuilds += 1;
            tracing::trace!(
                "Rebuilt object index: {} object(s), ignoring {:?}",
                self.index.len(),
                ignore_id
            );
        }

        &self.index
    }

    /// Current index, possibly stale
    pub fn index(&self) -> &SpatialIndex<Uuid> {
        &self.index
    }

    /// Number of full rebuilds performed so far
    pub fn rebuilds(&self) -> usize {
        self.rebuilds
    }

    /// Force the next refresh to rebuild
    pub fn invalidate(&mut self) {
        self.source = None;
    }
}
