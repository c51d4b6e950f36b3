use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;

use serde::Serialize;

use super::golden_angle::GridPoint;

// ---------------------------------------------------------------------------
// EllipticalMask
// ---------------------------------------------------------------------------

/// The grid positions inside the ellipse with radii `dimy/2`, `dimz/2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipticalMask {
    pub dimy: usize,
    pub dimz: usize,
    pub ry: f64,
    pub rz: f64,
}

fn axis_range(dim: usize) -> RangeInclusive<i32> {
    let half_up = dim.div_ceil(2) as i32;
    -half_up..=half_up - 1
}

impl EllipticalMask {
    pub fn new(dimy: usize, dimz: usize) -> Self {
        Self {
            dimy,
            dimz,
            ry: dimy as f64 / 2.0,
            rz: dimz as f64 / 2.0,
        }
    }

    /// Whether `p` is a grid position inside the closed ellipse
    /// `(y/ry)² + (z/rz)² ≤ 1`. Positions off the grid (e.g. `y = dimy/2`)
    /// are never contained, even when they satisfy the ellipse equation.
    pub fn contains(&self, p: GridPoint) -> bool {
        if !self.y_range().contains(&p.y) || !self.z_range().contains(&p.z) {
            return false;
        }
        let y = p.y as f64;
        let z = p.z as f64;
        y * y / (self.ry * self.ry) + z * z / (self.rz * self.rz) <= 1.0
    }

    /// ky positions of the grid, `floor(-dimy/2) ..= ceil(dimy/2) - 1`.
    pub fn y_range(&self) -> RangeInclusive<i32> {
        axis_range(self.dimy)
    }

    pub fn z_range(&self) -> RangeInclusive<i32> {
        axis_range(self.dimz)
    }

    /// Row-major (z outer, y inner) inside/outside flags.
    pub fn grid(&self) -> Vec<bool> {
        self.z_range()
            .flat_map(|z| self.y_range().map(move |y| GridPoint::new(y, z)))
            .map(|p| self.contains(p))
            .collect()
    }

    /// Number of grid positions inside the ellipse.
    pub fn area(&self) -> usize {
        self.grid().into_iter().filter(|&inside| inside).count()
    }
}

// ---------------------------------------------------------------------------
// CoverageStats
// ---------------------------------------------------------------------------

/// How well a point cloud covers the elliptical mask.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoverageStats {
    pub total: usize,
    pub unique: usize,
    /// Distinct positions that lie inside the mask.
    pub unique_in_mask: usize,
    pub mask_area: usize,
    /// `100 · unique_in_mask / mask_area`, so always within `[0, 100]`.
    pub covered_fraction: f64,
    /// `total / unique`.
    pub avg_samples_per_point: f64,
}

impl CoverageStats {
    /// Coverage of a finished cloud.
    ///
    /// `points` must be non-empty and both dims positive; the builders'
    /// validation guarantees this, and the centre is always in the mask.
    pub fn compute(points: &[GridPoint], dimy: usize, dimz: usize) -> Self {
        debug_assert!(!points.is_empty(), "coverage of an empty cloud");
        let mask = EllipticalMask::new(dimy, dimz);
        let distinct: BTreeSet<GridPoint> = points.iter().copied().collect();
        let unique = distinct.len();
        let unique_in_mask = distinct.iter().filter(|&&p| mask.contains(p)).count();
        let mask_area = mask.area();
        debug_assert!(mask_area > 0, "empty mask for {dimy} x {dimz}");
        let total = points.len();

        let covered_fraction = 100.0 * unique_in_mask as f64 / mask_area as f64;
        let avg_samples_per_point = total as f64 / unique as f64;

        Self {
            total,
            unique,
            unique_in_mask,
            mask_area,
            covered_fraction,
            avg_samples_per_point,
        }
    }
}

/// Number of samples per visited position.
pub fn hit_counts(points: &[GridPoint]) -> BTreeMap<GridPoint, usize> {
    let mut counts = BTreeMap::new();
    for &p in points {
        *counts.entry(p).or_insert(0) += 1;
    }
    counts
}
