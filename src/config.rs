use std::fmt;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrajectoryError};

// ---------------------------------------------------------------------------
// Golden-angle table
// ---------------------------------------------------------------------------

/// The "tiny golden angles" (degrees), indexed 1..=10 by the scanner
/// parameter block.
pub const GOLDEN_ANGLES: [f64; 10] = [
    111.24611, 68.75388, 49.75077, 38.97762, 32.03967, 27.19840, 23.62814, 20.88643, 18.71484,
    16.95229,
];

/// Look up a golden angle by its 1-based table index.
pub fn golden_angle(index: usize) -> Result<f64> {
    if !(1..=GOLDEN_ANGLES.len()).contains(&index) {
        return Err(TrajectoryError::invalid(
            "angle_index",
            index,
            "must be in 1..=10",
        ));
    }
    Ok(GOLDEN_ANGLES[index - 1])
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

pub(crate) fn must_be_pos_even(name: &'static str, value: usize) -> Result<()> {
    if value == 0 || value % 2 != 0 {
        return Err(TrajectoryError::invalid(
            name,
            value,
            "must be a positive, even integer",
        ));
    }
    Ok(())
}

pub(crate) fn must_be_positive(name: &'static str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(TrajectoryError::invalid(name, value, "must be positive"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Order – direction of successive arms/spokes
// ---------------------------------------------------------------------------

/// Traversal direction of consecutive spiral arms or radial spokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    /// Every arm is traversed centre → edge (scanner `order = 0`).
    Unidirectional,
    /// Every even-numbered arm is traversed backwards (scanner `order = 1`).
    #[default]
    Alternating,
}

impl Order {
    /// Map the scanner's numeric `order` value.
    pub fn from_index(index: u8) -> Result<Self> {
        match index {
            0 => Ok(Order::Unidirectional),
            1 => Ok(Order::Alternating),
            other => Err(TrajectoryError::invalid("order", other, "must be 0 or 1")),
        }
    }

    pub fn index(self) -> u8 {
        match self {
            Order::Unidirectional => 0,
            Order::Alternating => 1,
        }
    }

    /// Whether the batch produced at 1-based `step` is emitted reversed.
    pub fn reverses(self, step: usize) -> bool {
        self == Order::Alternating && step % 2 == 0
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Order::Unidirectional => write!(f, "Unidirectional"),
            Order::Alternating => write!(f, "Alternating"),
        }
    }
}

// ---------------------------------------------------------------------------
// Cartesian parameters
// ---------------------------------------------------------------------------

/// Density shapes for the 1D Cartesian profile. Only a Gaussian exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DensityShape {
    #[default]
    Gauss,
}

impl fmt::Display for DensityShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DensityShape::Gauss => write!(f, "gauss"),
        }
    }
}

/// Parameters of the 1D variable-density Cartesian LUT (`pe1_order = 3`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartesianParams {
    /// Number of k-space lines in the reconstructed image.
    pub target_size: usize,
    /// Number of views in the acquired trajectory.
    pub trajectory_length: usize,
    /// Width of the densely sampled centre, in lines.
    pub sigma: usize,
    pub density_shape: DensityShape,
    /// Cap on the `0.001` steps of the discretization search.
    pub max_search_steps: usize,
    /// Number of random draws in the filling simulation.
    pub filling_samples: usize,
    pub seed: Option<u64>,
}

impl Default for CartesianParams {
    fn default() -> Self {
        Self {
            target_size: 192,
            trajectory_length: 256,
            sigma: 8,
            density_shape: DensityShape::Gauss,
            max_search_steps: 2_000_000,
            filling_samples: 240_000,
            seed: None,
        }
    }
}

impl CartesianParams {
    pub fn validate(&self) -> Result<()> {
        must_be_pos_even("target_size", self.target_size)?;
        must_be_pos_even("trajectory_length", self.trajectory_length)?;
        must_be_pos_even("sigma", self.sigma)?;
        must_be_positive("max_search_steps", self.max_search_steps)?;
        if self.trajectory_length < self.target_size {
            return Err(TrajectoryError::ConfigurationInconsistency(format!(
                "trajectory_length ({}) is shorter than target_size ({})",
                self.trajectory_length, self.target_size
            )));
        }
        Ok(())
    }

    /// Views beyond one per line that get distributed by density.
    pub fn extra_lines(&self) -> usize {
        self.trajectory_length.saturating_sub(self.target_size)
    }
}

// ---------------------------------------------------------------------------
// Golden-angle parameters (shared by spiral and radial)
// ---------------------------------------------------------------------------

/// Parameters shared by the golden-angle spiral and radial LUTs
/// (`pe1_order = 4`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoldenAngleParams {
    pub dimy: usize,
    pub dimz: usize,
    pub order: Order,
    /// 1-based index into [`GOLDEN_ANGLES`].
    pub angle_index: usize,
    /// Explicit increment in degrees, overriding `angle_index`.
    pub angle_deg: Option<f64>,
    pub reps: usize,
    /// Cap on the number of arms/spokes generated.
    pub max_steps: usize,
}

impl Default for GoldenAngleParams {
    fn default() -> Self {
        Self {
            dimy: 64,
            dimz: 64,
            order: Order::Alternating,
            angle_index: 3,
            angle_deg: None,
            reps: 1,
            max_steps: 100_000,
        }
    }
}

impl GoldenAngleParams {
    /// The per-step rotation in degrees.
    pub fn increment_deg(&self) -> Result<f64> {
        let angle = match self.angle_deg {
            Some(a) => a,
            None => golden_angle(self.angle_index)?,
        };
        if !angle.is_finite() || angle <= 0.0 {
            return Err(TrajectoryError::invalid(
                "angle_deg",
                angle,
                "must be finite and positive",
            ));
        }
        if (angle % 360.0).abs() < 1e-9 {
            return Err(TrajectoryError::invalid(
                "angle_deg",
                angle,
                "a multiple of 360 degrees never rotates",
            ));
        }
        Ok(angle)
    }

    pub fn validate(&self) -> Result<()> {
        must_be_positive("dimy", self.dimy)?;
        must_be_positive("dimz", self.dimz)?;
        must_be_positive("reps", self.reps)?;
        must_be_positive("max_steps", self.max_steps)?;
        self.increment_deg()?;
        Ok(())
    }
}

/// Pseudo-spiral parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpiralParams {
    #[serde(flatten)]
    pub golden: GoldenAngleParams,
    pub revolutions: f64,
    pub points_per_spiral: usize,
    /// Size of the normalized grid the base spiral is drawn on.
    pub base_grid: usize,
    /// Radius growth exponent; below 1 tapers density away from the centre.
    pub gamma: f64,
    pub seed: Option<u64>,
}

impl Default for SpiralParams {
    fn default() -> Self {
        Self {
            golden: GoldenAngleParams::default(),
            revolutions: 1.0,
            points_per_spiral: 256,
            base_grid: 256,
            gamma: 0.8,
            seed: None,
        }
    }
}

impl SpiralParams {
    pub fn target_count(&self) -> usize {
        self.golden.dimy * self.golden.dimz * self.golden.reps
    }

    pub fn validate(&self) -> Result<()> {
        self.golden.validate()?;
        if self.points_per_spiral < 2 {
            return Err(TrajectoryError::invalid(
                "points_per_spiral",
                self.points_per_spiral,
                "must be at least 2",
            ));
        }
        must_be_pos_even("base_grid", self.base_grid)?;
        if !(self.gamma.is_finite() && self.gamma > 0.0) {
            return Err(TrajectoryError::invalid(
                "gamma",
                self.gamma,
                "must be finite and positive",
            ));
        }
        if !(self.revolutions.is_finite() && self.revolutions > 0.0) {
            return Err(TrajectoryError::invalid(
                "revolutions",
                self.revolutions,
                "must be finite and positive",
            ));
        }
        Ok(())
    }
}

/// Pseudo-radial parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadialParams {
    #[serde(flatten)]
    pub golden: GoldenAngleParams,
}

impl Default for RadialParams {
    fn default() -> Self {
        Self {
            golden: GoldenAngleParams {
                angle_index: 10,
                ..GoldenAngleParams::default()
            },
        }
    }
}

impl RadialParams {
    /// Radial LUTs always hold one grid's worth of points; `reps` only
    /// tags the file name.
    pub fn target_count(&self) -> usize {
        self.golden.dimy * self.golden.dimz
    }

    pub fn validate(&self) -> Result<()> {
        self.golden.validate()
    }
}

// ---------------------------------------------------------------------------
// TrajectoryConfig – one LUT job
// ---------------------------------------------------------------------------

/// A complete LUT job as read from a JSON file:
///
/// ```json
/// { "kind": "spiral", "dimy": 64, "dimz": 64, "order": "alternating",
///   "angle_index": 3, "reps": 1, "seed": 7 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TrajectoryConfig {
    Cartesian(CartesianParams),
    Spiral(SpiralParams),
    Radial(RadialParams),
}

impl TrajectoryConfig {
    pub fn validate(&self) -> Result<()> {
        match self {
            TrajectoryConfig::Cartesian(p) => p.validate(),
            TrajectoryConfig::Spiral(p) => p.validate(),
            TrajectoryConfig::Radial(p) => p.validate(),
        }
    }

    pub fn seed(&self) -> Option<u64> {
        match self {
            TrajectoryConfig::Cartesian(p) => p.seed,
            TrajectoryConfig::Spiral(p) => p.seed,
            TrajectoryConfig::Radial(_) => None,
        }
    }
}

/// Read a [`TrajectoryConfig`] from a JSON file.
pub fn load_config(path: &Path) -> anyhow::Result<TrajectoryConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: TrajectoryConfig = serde_json::from_str(&text).context("parsing config JSON")?;
    config.validate().context("validating config")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn golden_angle_table_is_one_based() {
        assert_eq!(golden_angle(1).unwrap(), 111.24611);
        assert_eq!(golden_angle(10).unwrap(), 16.95229);
        assert!(golden_angle(0).is_err());
        assert!(golden_angle(11).is_err());
    }

    #[test]
    fn odd_sigma_is_rejected() {
        let p = CartesianParams {
            sigma: 7,
            ..CartesianParams::default()
        };
        assert!(matches!(
            p.validate(),
            Err(TrajectoryError::InvalidParameter { name: "sigma", .. })
        ));
    }

    #[test]
    fn short_trajectory_is_inconsistent() {
        let p = CartesianParams {
            target_size: 256,
            trajectory_length: 192,
            ..CartesianParams::default()
        };
        assert!(matches!(
            p.validate(),
            Err(TrajectoryError::ConfigurationInconsistency(_))
        ));
    }

    #[test]
    fn degenerate_increment_is_rejected() {
        for angle in [0.0, -10.0, 360.0, 720.0, f64::NAN] {
            let p = GoldenAngleParams {
                angle_deg: Some(angle),
                ..GoldenAngleParams::default()
            };
            assert!(p.validate().is_err(), "angle {angle} accepted");
        }
    }

    #[test]
    fn order_maps_scanner_index() {
        assert_eq!(Order::from_index(0).unwrap(), Order::Unidirectional);
        assert_eq!(Order::from_index(1).unwrap(), Order::Alternating);
        assert!(Order::from_index(2).is_err());
        assert!(Order::Alternating.reverses(2));
        assert!(!Order::Alternating.reverses(3));
        assert!(!Order::Unidirectional.reverses(2));
    }

    #[test]
    fn parses_tagged_json() {
        let json = r#"{ "kind": "spiral", "dimy": 32, "dimz": 48, "order": "unidirectional",
                        "angle_index": 5, "reps": 2, "seed": 9 }"#;
        let cfg: TrajectoryConfig = serde_json::from_str(json).unwrap();
        let TrajectoryConfig::Spiral(p) = &cfg else {
            panic!("expected spiral, got {cfg:?}");
        };
        assert_eq!(p.golden.dimy, 32);
        assert_eq!(p.golden.dimz, 48);
        assert_eq!(p.golden.order, Order::Unidirectional);
        assert_eq!(p.golden.angle_index, 5);
        assert_eq!(p.points_per_spiral, 256);
        assert_eq!(p.target_count(), 32 * 48 * 2);
        assert_eq!(cfg.seed(), Some(9));

        let cfg: TrajectoryConfig = serde_json::from_str(r#"{ "kind": "cartesian" }"#).unwrap();
        assert_eq!(cfg, TrajectoryConfig::Cartesian(CartesianParams::default()));
    }
}
