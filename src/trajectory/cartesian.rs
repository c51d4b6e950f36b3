use std::f64::consts::PI;
use std::fmt;

use rand::Rng;

use super::filling::{self, FillingProfile};
use super::try_converge;
use crate::config::{CartesianParams, DensityShape};
use crate::error::{Result, TrajectoryError};

// ---------------------------------------------------------------------------
// DensityProfile – how often each k-line is visited
// ---------------------------------------------------------------------------

/// Repeat count per k-line, index 0 ↔ line 1.
///
/// Every entry is at least 1 and the entries sum to the trajectory length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DensityProfile {
    repeats: Vec<usize>,
}

impl DensityProfile {
    /// Discretize the density of `params` into integer repeat counts.
    pub fn build(params: &CartesianParams) -> Result<Self> {
        params.validate()?;
        let extra = params.extra_lines();
        let weights = match params.density_shape {
            DensityShape::Gauss => gaussian_weights(params.target_size, params.sigma),
        };

        let mut extra_per_line = discretize(&weights, extra, params.max_search_steps)?;
        trim_alternating(&mut extra_per_line, extra)?;

        let repeats = extra_per_line.into_iter().map(|d| d + 1).collect();
        Ok(Self { repeats })
    }

    pub fn repeats(&self) -> &[usize] {
        &self.repeats
    }

    /// Total number of views, `sum(repeats)`.
    pub fn total(&self) -> usize {
        self.repeats.iter().sum()
    }

    /// Linearize into the zigzag visiting order: odd lines ascending, then
    /// even lines descending, each emitted as often as its repeat count and
    /// centred so line `size/2 + 1` maps to 0.
    pub fn zigzag(&self) -> Vec<i32> {
        let size = self.repeats.len();
        let shift = (size / 2 + 1) as i32;
        let mut order = Vec::with_capacity(self.total());

        let odd_up = (1..=size).step_by(2);
        let even_down = (2..=size).rev().step_by(2);
        for line in odd_up.chain(even_down) {
            let centred = line as i32 - shift;
            order.extend(std::iter::repeat(centred).take(self.repeats[line - 1]));
        }
        order
    }
}

/// Gaussian weights for lines `1..=size`, centred on line `size/2 + 1`.
fn gaussian_weights(size: usize, sigma: usize) -> Vec<f64> {
    let center = (size / 2 + 1) as f64;
    let sigma = sigma as f64;
    let norm = 1.0 / (sigma * (2.0 * PI).sqrt());
    (1..=size)
        .map(|k| {
            let dk = k as f64 - center;
            norm * (-(dk * dk) / (2.0 * sigma * sigma)).exp()
        })
        .collect()
}

/// Scale `weights` up from 0.9 in 0.001 steps until the rounded counts
/// sum to strictly more than `extra`.
fn discretize(weights: &[f64], extra: usize, max_steps: usize) -> Result<Vec<usize>> {
    let mut incr = 0.9_f64;
    try_converge("density discretization", max_steps, |_| {
        let df: Vec<usize> = weights
            .iter()
            .map(|w| (w * incr).round_ties_even() as usize)
            .collect();
        if df.iter().sum::<usize>() > extra {
            log::debug!("density scale factor {incr:.3}");
            Some(df)
        } else {
            incr += 0.001;
            None
        }
    })
}

/// Zero out entries equal to 1 until the sum is `extra`, taking the first
/// such entry, then the last, then the first again, and so on.
fn trim_alternating(df: &mut [usize], extra: usize) -> Result<()> {
    let mut sum: usize = df.iter().sum();
    let mut from_front = true;
    let mut removed = 0;
    while sum > extra {
        let pos = if from_front {
            df.iter().position(|&d| d == 1)
        } else {
            df.iter().rposition(|&d| d == 1)
        };
        let Some(pos) = pos else {
            return Err(TrajectoryError::ConvergenceFailure {
                what: "density trim (no single extra views left)",
                iterations: removed,
            });
        };
        df[pos] = 0;
        sum -= 1;
        removed += 1;
        from_front = !from_front;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Public builders
// ---------------------------------------------------------------------------

/// Build the centred zigzag order for the given sizes with default search
/// limits.
pub fn build_order(target_size: usize, trajectory_length: usize, sigma: usize) -> Result<Vec<i32>> {
    let params = CartesianParams {
        target_size,
        trajectory_length,
        sigma,
        ..CartesianParams::default()
    };
    Ok(DensityProfile::build(&params)?.zigzag())
}

/// A finished 1D Cartesian LUT with its simulated filling.
#[derive(Debug, Clone)]
pub struct CartesianTrajectory {
    pub params: CartesianParams,
    pub profile: DensityProfile,
    /// Centred k-line index per view.
    pub order: Vec<i32>,
    pub filling: FillingProfile,
}

/// Build profile, order and filling simulation for `params`.
pub fn build_trajectory<R: Rng + ?Sized>(
    params: &CartesianParams,
    rng: &mut R,
) -> Result<CartesianTrajectory> {
    let profile = DensityProfile::build(params)?;
    let order = profile.zigzag();
    let filling = filling::simulate(&order, params.target_size, params.filling_samples, rng);
    log::info!(
        "Cartesian LUT: {} lines, {} views, sigma {}",
        params.target_size,
        order.len(),
        params.sigma
    );
    Ok(CartesianTrajectory {
        params: params.clone(),
        profile,
        order,
        filling,
    })
}

impl CartesianTrajectory {
    pub fn ky_range(&self) -> Option<(i32, i32)> {
        let min = self.order.iter().copied().min()?;
        let max = self.order.iter().copied().max()?;
        Some((min, max))
    }
}

impl fmt::Display for CartesianTrajectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.filling.summary();
        writeln!(f, "--- K-space filling summary ---")?;
        writeln!(f, "Target k-space size    : {}", self.params.target_size)?;
        writeln!(f, "Trajectory length      : {}", self.params.trajectory_length)?;
        writeln!(f, "Density shape          : {}", self.params.density_shape)?;
        writeln!(f, "Sigma                  : {}", self.params.sigma)?;
        writeln!(f, "Mean filling           : {:.4}", s.mean)?;
        writeln!(f, "Min filling            : {:.4}", s.min)?;
        writeln!(f, "Max filling            : {:.4}", s.max)?;
        writeln!(f, "Std of filling         : {:.4}", s.std)?;
        match s.center_edge_ratio {
            Some(r) => writeln!(f, "Center/Edge fill ratio : {r:.2}")?,
            None => writeln!(f, "Center/Edge fill ratio : n/a")?,
        }
        if let Some((lo, hi)) = self.ky_range() {
            writeln!(f, "ky range               : {lo} to {hi}")?;
        }
        write!(f, "-------------------------------")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn params(size: usize, length: usize, sigma: usize) -> CartesianParams {
        CartesianParams {
            target_size: size,
            trajectory_length: length,
            sigma,
            filling_samples: 10_000,
            ..CartesianParams::default()
        }
    }

    #[test]
    fn default_scanner_lut() {
        let profile = DensityProfile::build(&params(192, 256, 8)).unwrap();
        assert_eq!(profile.repeats().len(), 192);
        assert_eq!(profile.total(), 256);
        assert!(profile.repeats().iter().all(|&r| r >= 1));

        let order = profile.zigzag();
        assert_eq!(order.len(), 256);
        assert_eq!(*order.iter().min().unwrap(), -96);
        assert_eq!(*order.iter().max().unwrap(), 95);
    }

    #[test]
    fn extra_views_concentrate_in_the_centre() {
        let profile = DensityProfile::build(&params(192, 256, 8)).unwrap();
        let r = profile.repeats();
        // Line 97 (index 96) is the centre.
        assert!(r[96] > 1);
        assert_eq!(r[0], 1);
        assert_eq!(r[191], 1);
    }

    #[test]
    fn sums_hold_across_sizes() {
        for (size, length, sigma) in [(64, 64, 4), (64, 96, 4), (128, 200, 10), (256, 512, 16), (2, 4, 2)] {
            let p = params(size, length, sigma);
            let profile = DensityProfile::build(&p).unwrap();
            assert_eq!(profile.total(), length, "{size}/{length}/{sigma}");
            assert!(profile.repeats().iter().all(|&r| r >= 1));
            let order = profile.zigzag();
            assert_eq!(order.len(), length);
            let half = (size / 2) as i32;
            assert!(order.iter().all(|&v| (-half..half).contains(&v)));
        }
    }

    #[test]
    fn zigzag_visits_odd_up_then_even_down() {
        let profile = DensityProfile {
            repeats: vec![1, 2, 1, 3],
        };
        // Lines 1, 3, then 4, 2, shifted by -3.
        assert_eq!(profile.zigzag(), vec![-2, 0, 1, 1, 1, -1, -1]);
    }

    #[test]
    fn trim_alternates_front_and_back() {
        let mut df = vec![1, 1, 3, 1, 1];
        trim_alternating(&mut df, 5).unwrap();
        assert_eq!(df, vec![0, 1, 3, 1, 0]);

        let mut df = vec![1, 1, 3, 1, 1];
        trim_alternating(&mut df, 4).unwrap();
        assert_eq!(df, vec![0, 0, 3, 1, 0]);
    }

    #[test]
    fn trim_without_singles_fails() {
        let mut df = vec![0, 2, 3, 2, 0];
        assert!(matches!(
            trim_alternating(&mut df, 5),
            Err(TrajectoryError::ConvergenceFailure { .. })
        ));
    }

    #[test]
    fn search_cap_is_reported() {
        let p = CartesianParams {
            max_search_steps: 3,
            ..params(192, 256, 8)
        };
        assert!(matches!(
            DensityProfile::build(&p),
            Err(TrajectoryError::ConvergenceFailure { .. })
        ));
    }

    #[test]
    fn build_order_matches_profile() {
        let order = build_order(192, 256, 8).unwrap();
        let profile = DensityProfile::build(&params(192, 256, 8)).unwrap();
        assert_eq!(order, profile.zigzag());
    }

    #[test]
    fn trajectory_summary_reports_range() {
        let mut rng = StdRng::seed_from_u64(3);
        let traj = build_trajectory(&params(192, 256, 8), &mut rng).unwrap();
        assert_eq!(traj.ky_range(), Some((-96, 95)));
        let text = traj.to_string();
        assert!(text.contains("ky range               : -96 to 95"));
    }
}
