use std::collections::HashSet;

use super::coverage::EllipticalMask;
use super::golden_angle::{accumulate, CloudKind, CurveGenerator, GridPoint, PointCloudTrajectory};
use crate::config::RadialParams;
use crate::error::Result;

/// Straight spokes through the centre, `2 · max(dimy, dimz)` samples each,
/// clipped to the elliptical mask. Samples that round onto `+dim/2` fall
/// off the grid and are dropped with the rest of the outside.
#[derive(Debug, Clone)]
pub struct RadialGenerator {
    t: Vec<f64>,
    mask: EllipticalMask,
}

impl RadialGenerator {
    pub fn new(dimy: usize, dimz: usize) -> Self {
        let n = 2 * dimy.max(dimz);
        let last = (n - 1).max(1) as f64;
        let t = (0..n).map(|i| -1.0 + 2.0 * i as f64 / last).collect();
        Self {
            t,
            mask: EllipticalMask::new(dimy, dimz),
        }
    }
}

impl CurveGenerator for RadialGenerator {
    fn batch(&mut self, angle_deg: f64) -> Vec<GridPoint> {
        let (sin, cos) = angle_deg.to_radians().sin_cos();
        let (ry, rz) = (self.mask.ry, self.mask.rz);

        let mut seen = HashSet::with_capacity(self.t.len());
        self.t
            .iter()
            .map(|&t| {
                GridPoint::new(
                    (t * cos * ry).round() as i32,
                    (t * sin * rz).round() as i32,
                )
            })
            .filter(|&p| seen.insert(p))
            .filter(|&p| self.mask.contains(p))
            .collect()
    }
}

/// Build a pseudo-radial LUT of exactly `dimy · dimz` points. The last
/// spoke is cut wherever the target is reached.
pub fn build(params: &RadialParams) -> Result<PointCloudTrajectory> {
    params.validate()?;
    let increment = params.golden.increment_deg()?;
    let mut generator = RadialGenerator::new(params.golden.dimy, params.golden.dimz);
    let acc = accumulate(
        &mut generator,
        increment,
        params.golden.order,
        params.target_count(),
        params.golden.max_steps,
    )?;
    Ok(PointCloudTrajectory::from_accumulation(
        CloudKind::Radial,
        &params.golden,
        increment,
        acc,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GoldenAngleParams, Order};

    fn params(dimy: usize, dimz: usize, order: Order) -> RadialParams {
        RadialParams {
            golden: GoldenAngleParams {
                dimy,
                dimz,
                order,
                angle_index: 10,
                ..GoldenAngleParams::default()
            },
        }
    }

    #[test]
    fn horizontal_spoke_is_unique_and_ordered() {
        let mut g = RadialGenerator::new(8, 8);
        let spoke = g.batch(0.0);
        let ys: Vec<i32> = spoke.iter().map(|p| p.y).collect();
        assert_eq!(ys, vec![-4, -3, -2, -1, 0, 1, 2, 3]);
        assert!(spoke.iter().all(|p| p.z == 0));
    }

    #[test]
    fn spokes_stay_inside_the_mask() {
        let mut g = RadialGenerator::new(64, 32);
        let mask = EllipticalMask::new(64, 32);
        for angle in [12.5, 45.0, 90.0, 133.3, 271.0] {
            let spoke = g.batch(angle);
            assert!(!spoke.is_empty());
            assert!(spoke.iter().all(|&p| mask.contains(p)));
        }
    }

    #[test]
    fn small_grids_stay_on_the_grid() {
        for dimy in 1..=12 {
            for dimz in 1..=12 {
                let mask = EllipticalMask::new(dimy, dimz);
                for angle_index in 1..=10 {
                    let mut prm = params(dimy, dimz, Order::Alternating);
                    prm.golden.angle_index = angle_index;
                    let traj = build(&prm).unwrap();
                    assert_eq!(traj.points.len(), dimy * dimz);
                    assert!(
                        traj.points.iter().all(|&p| mask.y_range().contains(&p.y)
                            && mask.z_range().contains(&p.z)
                            && mask.contains(p)),
                        "{dimy} x {dimz}, angle index {angle_index}"
                    );
                    let c = traj.coverage;
                    assert_eq!(c.unique, c.unique_in_mask);
                    assert!(
                        c.covered_fraction > 0.0 && c.covered_fraction <= 100.0,
                        "{dimy} x {dimz}, angle index {angle_index}: {}%",
                        c.covered_fraction
                    );
                }
            }
        }
    }

    #[test]
    fn default_scanner_lut() {
        let traj = build(&params(64, 64, Order::Alternating)).unwrap();
        assert_eq!(traj.points.len(), 4096);
        assert!(traj.points.iter().all(|p| {
            let (y, z) = (p.y as f64 / 32.0, p.z as f64 / 32.0);
            y * y + z * z <= 1.0
        }));
        let c = traj.coverage;
        assert!(c.covered_fraction > 0.0 && c.covered_fraction <= 100.0);
        assert!(c.avg_samples_per_point >= 1.0);
    }

    #[test]
    fn alternating_only_flips_direction() {
        let alt = build(&params(32, 32, Order::Alternating)).unwrap();
        let uni = build(&params(32, 32, Order::Unidirectional)).unwrap();
        let mut g = RadialGenerator::new(32, 32);
        let first = g.batch(alt.increment_deg);
        let second = g.batch(2.0 * alt.increment_deg);

        assert_eq!(&uni.points[..first.len()], first.as_slice());
        assert_eq!(&alt.points[..first.len()], first.as_slice());

        let mut reversed = second.clone();
        reversed.reverse();
        let n = first.len();
        assert_eq!(&uni.points[n..n + second.len()], second.as_slice());
        assert_eq!(&alt.points[n..n + second.len()], reversed.as_slice());
    }

    #[test]
    fn final_spoke_is_a_prefix() {
        let traj = build(&params(16, 16, Order::Unidirectional)).unwrap();
        assert_eq!(traj.points.len(), 256);
        let mut g = RadialGenerator::new(16, 16);
        let mut full = Vec::new();
        let mut angle = 0.0;
        for _ in 0..traj.steps {
            angle += traj.increment_deg;
            full.extend(g.batch(angle));
        }
        assert!(full.len() >= 256);
        assert_eq!(&full[..256], traj.points.as_slice());
    }
}
