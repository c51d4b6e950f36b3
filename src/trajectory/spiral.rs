use std::f64::consts::PI;

use rand::Rng;

use super::golden_angle::{accumulate, CloudKind, CurveGenerator, GridPoint, PointCloudTrajectory};
use crate::config::SpiralParams;
use crate::error::Result;

// ---------------------------------------------------------------------------
// Spiral arm generator
// ---------------------------------------------------------------------------

/// One Archimedean-like arm on a normalized `base_grid²` grid, rotated by
/// the cumulative golden angle and rescaled to `dimy × dimz` for every
/// batch.
#[derive(Debug, Clone)]
pub struct SpiralGenerator {
    y0: Vec<f64>,
    z0: Vec<f64>,
    center: f64,
    base_grid: f64,
    dimy: f64,
    dimz: f64,
    pruner: Pruner,
}

impl SpiralGenerator {
    /// Precompute the base arm. The global phase offset is drawn once
    /// from `rng`; every arm shares it.
    pub fn new<R: Rng + ?Sized>(params: &SpiralParams, rng: &mut R) -> Self {
        let n = params.points_per_spiral;
        let center = (params.base_grid / 2) as f64;
        let max_radius = params.base_grid as f64 / 2.0 - 1.0;
        let theta_end = 2.0 * PI * params.revolutions;
        let phase = (rng.random::<f64>() * 360.0).to_radians();
        log::debug!("spiral phase offset {:.2} deg", phase.to_degrees());

        let last = (n - 1).max(1) as f64;
        let (y0, z0) = (0..n)
            .map(|i| {
                let s = i as f64 / last;
                let radius = s.powf(params.gamma) * max_radius;
                let theta = theta_end * s + phase;
                (theta.cos() * radius + center, theta.sin() * radius + center)
            })
            .unzip();

        Self {
            y0,
            z0,
            center,
            base_grid: params.base_grid as f64,
            dimy: params.golden.dimy as f64,
            dimz: params.golden.dimz as f64,
            pruner: Pruner::default(),
        }
    }
}

impl CurveGenerator for SpiralGenerator {
    fn batch(&mut self, angle_deg: f64) -> Vec<GridPoint> {
        let (sin, cos) = angle_deg.to_radians().sin_cos();
        let c = self.center;
        let scale_y = self.dimy / self.base_grid;
        let scale_z = self.dimz / self.base_grid;

        self.y0
            .iter()
            .zip(&self.z0)
            .map(|(&y0, &z0)| {
                let y = ((y0 - c) * cos + (z0 - c) * sin + c) * scale_y;
                let z = (-(y0 - c) * sin + (z0 - c) * cos + c) * scale_z;
                GridPoint::new(
                    (y - self.dimy / 2.0).floor() as i32,
                    (z - self.dimz / 2.0).floor() as i32,
                )
            })
            .collect()
    }

    fn extend_cloud(&mut self, cloud: &mut Vec<GridPoint>, arm: Vec<GridPoint>) {
        for p in arm {
            self.pruner.push(cloud, p);
        }
    }
}

// ---------------------------------------------------------------------------
// Pruning – streamed so each arm is cleaned once
// ---------------------------------------------------------------------------

/// Drops consecutive repeats of the raw stream, then every 1st, 3rd, 5th,
/// ... occurrence of the k-space centre (which every arm collapses onto),
/// then the repeats the thinning exposed.
#[derive(Debug, Clone, Default)]
struct Pruner {
    last_raw: Option<GridPoint>,
    centre_hits: usize,
}

impl Pruner {
    fn push(&mut self, cloud: &mut Vec<GridPoint>, p: GridPoint) {
        if self.last_raw.replace(p) == Some(p) {
            return;
        }
        if p == GridPoint::ORIGIN {
            self.centre_hits += 1;
            if self.centre_hits % 2 == 1 {
                return;
            }
        }
        if cloud.last() != Some(&p) {
            cloud.push(p);
        }
    }
}

/// Prune a whole raw cloud at once.
#[cfg(test)]
fn prune(raw: &[GridPoint]) -> Vec<GridPoint> {
    let mut pruner = Pruner::default();
    let mut cloud = Vec::with_capacity(raw.len());
    for &p in raw {
        pruner.push(&mut cloud, p);
    }
    cloud
}

/// Build a pseudo-spiral LUT of exactly `dimy · dimz · reps` points.
pub fn build<R: Rng + ?Sized>(params: &SpiralParams, rng: &mut R) -> Result<PointCloudTrajectory> {
    params.validate()?;
    let increment = params.golden.increment_deg()?;
    let mut generator = SpiralGenerator::new(params, rng);
    let acc = accumulate(
        &mut generator,
        increment,
        params.golden.order,
        params.target_count(),
        params.golden.max_steps,
    )?;
    let kind = CloudKind::Spiral {
        revolutions: params.revolutions,
        points_per_spiral: params.points_per_spiral,
    };
    Ok(PointCloudTrajectory::from_accumulation(
        kind,
        &params.golden,
        increment,
        acc,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GoldenAngleParams, Order};
    use crate::trajectory::coverage::EllipticalMask;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn p(y: i32, z: i32) -> GridPoint {
        GridPoint::new(y, z)
    }

    fn params(dimy: usize, dimz: usize, reps: usize) -> SpiralParams {
        SpiralParams {
            golden: GoldenAngleParams {
                dimy,
                dimz,
                reps,
                ..GoldenAngleParams::default()
            },
            ..SpiralParams::default()
        }
    }

    #[test]
    fn prune_removes_repeats_and_thins_centre() {
        let raw = [p(1, 1), p(1, 1), p(0, 0), p(0, 0), p(2, 2), p(0, 0), p(2, 2)];
        // dedup → [a, 0, b, 0, b]; first centre dropped → [a, b, 0, b]
        assert_eq!(prune(&raw), vec![p(1, 1), p(2, 2), p(0, 0), p(2, 2)]);
    }

    #[test]
    fn prune_merges_neighbours_of_removed_centre() {
        let raw = [p(3, 0), p(0, 0), p(3, 0), p(4, 0)];
        assert_eq!(prune(&raw), vec![p(3, 0), p(4, 0)]);
    }

    #[test]
    fn builds_exact_count_without_consecutive_repeats() {
        let mut rng = StdRng::seed_from_u64(42);
        let traj = build(&params(64, 64, 1), &mut rng).unwrap();
        assert_eq!(traj.points.len(), 64 * 64);
        assert!(traj.points.windows(2).all(|w| w[0] != w[1]));

        let mask = EllipticalMask::new(64, 64);
        assert!(traj
            .points
            .iter()
            .all(|q| mask.y_range().contains(&q.y) && mask.z_range().contains(&q.z)));

        let c = traj.coverage;
        assert!(c.covered_fraction > 0.0 && c.covered_fraction <= 100.0);
        assert!(c.avg_samples_per_point >= 1.0);
        assert!(traj.steps > 1);
    }

    #[test]
    fn reps_scale_the_target() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut prm = params(32, 48, 3);
        prm.golden.order = Order::Unidirectional;
        let traj = build(&prm, &mut rng).unwrap();
        assert_eq!(traj.points.len(), 32 * 48 * 3);
        assert!(traj.points.windows(2).all(|w| w[0] != w[1]));
    }

    #[test]
    fn same_seed_same_cloud() {
        let a = build(&params(32, 32, 1), &mut StdRng::seed_from_u64(9)).unwrap();
        let b = build(&params(32, 32, 1), &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a.points, b.points);
    }

    #[test]
    fn arm_by_arm_pruning_matches_whole_cloud() {
        let mut prm = params(16, 16, 20);
        prm.golden.order = Order::Unidirectional;
        let traj = build(&prm, &mut StdRng::seed_from_u64(5)).unwrap();

        let mut generator = SpiralGenerator::new(&prm, &mut StdRng::seed_from_u64(5));
        let mut raw = Vec::new();
        let mut angle = 0.0;
        for _ in 0..traj.steps {
            angle += traj.increment_deg;
            raw.extend(generator.batch(angle));
        }
        let whole = prune(&raw);
        assert!(whole.len() >= 16 * 16 * 20);
        assert_eq!(&whole[..traj.points.len()], traj.points.as_slice());

        // One arm fewer would not have been enough.
        let short = prune(&raw[..raw.len() - prm.points_per_spiral]);
        assert!(short.len() < traj.points.len());
    }

    #[test]
    fn small_grids_stay_on_the_grid() {
        for dim in 1..=8 {
            for (dimy, dimz) in [(dim, dim), (dim, 2 * dim + 1)] {
                let mask = EllipticalMask::new(dimy, dimz);
                let traj = build(&params(dimy, dimz, 1), &mut StdRng::seed_from_u64(3)).unwrap();
                assert_eq!(traj.points.len(), dimy * dimz);
                assert!(traj
                    .points
                    .iter()
                    .all(|q| mask.y_range().contains(&q.y) && mask.z_range().contains(&q.z)));
                let c = traj.coverage;
                assert!(
                    c.covered_fraction <= 100.0,
                    "{dimy} x {dimz}: {}%",
                    c.covered_fraction
                );
            }
        }
    }

    #[test]
    fn arm_spans_centre_to_edge() {
        let mut rng = StdRng::seed_from_u64(0);
        let prm = params(64, 64, 1);
        let mut generator = SpiralGenerator::new(&prm, &mut rng);
        let arm = generator.batch(0.0);
        assert_eq!(arm.len(), 256);
        // First point is the grid centre (floor of 32 - 32).
        assert_eq!(arm[0], p(0, 0));
        let last = arm[255];
        let r2 = (last.y as f64 + 0.5).powi(2) + (last.z as f64 + 0.5).powi(2);
        assert!(r2 > 30.0 * 30.0, "last point {last:?} not near the edge");
    }
}
