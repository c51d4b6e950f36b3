//! Trajectory layer: the two LUT families and their shared pieces.
//!
//! Architecture:
//! ```text
//!   CartesianParams                 SpiralParams / RadialParams
//!        │                                   │
//!        ▼                                   ▼
//!   ┌───────────┐                  ┌──────────────────┐
//!   │ cartesian │ profile → zigzag │   golden_angle    │ rotate → batch → append
//!   └───────────┘                  │ (spiral | radial) │ → prune → trim
//!        │                         └──────────────────┘
//!        ▼                                   │
//!   ┌─────────┐                              ▼
//!   │ filling │ simulated k-line fill  ┌──────────┐
//!   └─────────┘                        │ coverage │ elliptical mask stats
//!                                      └──────────┘
//! ```
pub mod cartesian;
pub mod coverage;
pub mod filling;
pub mod golden_angle;
pub mod radial;
pub mod spiral;

use rand::Rng;

use crate::config::TrajectoryConfig;
use crate::error::{Result, TrajectoryError};

pub use cartesian::CartesianTrajectory;
pub use golden_angle::{CloudKind, GridPoint, PointCloudTrajectory};

/// Run `step` until it yields a value, at most `max_iters` times.
///
/// `step` receives the 0-based iteration number.
pub fn try_converge<T>(
    what: &'static str,
    max_iters: usize,
    mut step: impl FnMut(usize) -> Option<T>,
) -> Result<T> {
    for i in 0..max_iters {
        if let Some(done) = step(i) {
            log::debug!("{what} converged after {} iterations", i + 1);
            return Ok(done);
        }
    }
    Err(TrajectoryError::ConvergenceFailure {
        what,
        iterations: max_iters,
    })
}

/// A finished LUT of either family.
#[derive(Debug, Clone)]
pub enum Trajectory {
    Cartesian(CartesianTrajectory),
    PointCloud(PointCloudTrajectory),
}

impl Trajectory {
    /// Number of acquisition steps in the LUT.
    pub fn len(&self) -> usize {
        match self {
            Trajectory::Cartesian(t) => t.order.len(),
            Trajectory::PointCloud(t) => t.points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Validate `config` and build its trajectory.
pub fn generate<R: Rng + ?Sized>(config: &TrajectoryConfig, rng: &mut R) -> Result<Trajectory> {
    config.validate()?;
    let trajectory = match config {
        TrajectoryConfig::Cartesian(p) => {
            Trajectory::Cartesian(cartesian::build_trajectory(p, rng)?)
        }
        TrajectoryConfig::Spiral(p) => Trajectory::PointCloud(spiral::build(p, rng)?),
        TrajectoryConfig::Radial(p) => Trajectory::PointCloud(radial::build(p)?),
    };
    log::info!("Generated trajectory with {} samples", trajectory.len());
    Ok(trajectory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CartesianParams, RadialParams};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn converge_reports_iteration_cap() {
        let err = try_converge("never", 5, |_| None::<()>).unwrap_err();
        assert!(matches!(
            err,
            TrajectoryError::ConvergenceFailure {
                what: "never",
                iterations: 5
            }
        ));
    }

    #[test]
    fn converge_passes_iteration_number() {
        let got = try_converge("third", 10, |i| (i == 2).then_some(i)).unwrap();
        assert_eq!(got, 2);
    }

    #[test]
    fn generate_dispatches_on_kind() {
        let mut rng = StdRng::seed_from_u64(1);
        let cart = generate(
            &TrajectoryConfig::Cartesian(CartesianParams {
                filling_samples: 1_000,
                ..CartesianParams::default()
            }),
            &mut rng,
        )
        .unwrap();
        assert!(matches!(cart, Trajectory::Cartesian(_)));
        assert_eq!(cart.len(), 256);

        let radial = generate(&TrajectoryConfig::Radial(RadialParams::default()), &mut rng).unwrap();
        assert!(matches!(radial, Trajectory::PointCloud(_)));
        assert_eq!(radial.len(), 64 * 64);
    }

    #[test]
    fn generate_validates_first() {
        let mut rng = StdRng::seed_from_u64(1);
        let bad = TrajectoryConfig::Cartesian(CartesianParams {
            target_size: 0,
            ..CartesianParams::default()
        });
        assert!(matches!(
            generate(&bad, &mut rng),
            Err(TrajectoryError::InvalidParameter { .. })
        ));
    }
}
