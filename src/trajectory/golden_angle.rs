use std::fmt;

use serde::Serialize;

use super::coverage::CoverageStats;
use super::try_converge;
use crate::config::{GoldenAngleParams, Order};
use crate::error::Result;

// ---------------------------------------------------------------------------
// GridPoint – one (ky, kz) phase-encode position
// ---------------------------------------------------------------------------

/// Integer k-space position, centred so the grid spans `-dim/2..dim/2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPoint {
    pub y: i32,
    pub z: i32,
}

impl GridPoint {
    pub const ORIGIN: GridPoint = GridPoint { y: 0, z: 0 };

    pub fn new(y: i32, z: i32) -> Self {
        Self { y, z }
    }
}

// ---------------------------------------------------------------------------
// GoldenAngleState – cumulative rotation
// ---------------------------------------------------------------------------

/// Cumulative rotation of the arm/spoke. The angle grows without wrapping
/// at 360° so successive arms never land on a periodic pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoldenAngleState {
    angle_deg: f64,
    step: usize,
    increment_deg: f64,
}

impl GoldenAngleState {
    pub fn new(increment_deg: f64) -> Self {
        Self {
            angle_deg: 0.0,
            step: 0,
            increment_deg,
        }
    }

    /// Rotate by one increment and return the new cumulative angle.
    pub fn advance(&mut self) -> f64 {
        self.step += 1;
        self.angle_deg += self.increment_deg;
        self.angle_deg
    }

    pub fn angle_deg(&self) -> f64 {
        self.angle_deg
    }

    /// Number of increments applied so far (1-based once advanced).
    pub fn step(&self) -> usize {
        self.step
    }
}

// ---------------------------------------------------------------------------
// CurveGenerator – one arm/spoke per rotation
// ---------------------------------------------------------------------------

/// Produces the discretized points of one arm at a given cumulative
/// rotation. The accumulation loop handles direction and trimming.
pub trait CurveGenerator {
    /// Grid points of one arm rotated by `angle_deg`, in emission order.
    fn batch(&mut self, angle_deg: f64) -> Vec<GridPoint>;

    /// Append one arm to the cleaned cloud. Called once per arm, in
    /// order, so implementations may carry state between arms.
    fn extend_cloud(&mut self, cloud: &mut Vec<GridPoint>, arm: Vec<GridPoint>) {
        cloud.extend(arm);
    }
}

/// Output of [`accumulate`].
#[derive(Debug, Clone)]
pub struct Accumulation {
    /// Exactly `target` points.
    pub points: Vec<GridPoint>,
    /// Number of arms generated.
    pub steps: usize,
    pub final_angle_deg: f64,
}

/// Rotate, generate and append arms until the cleaned cloud holds at least
/// `target` points, then keep its first `target` points.
///
/// Every even-numbered arm is reversed when `order` is alternating. Fails
/// with a convergence error after `max_steps` arms.
pub fn accumulate<G: CurveGenerator + ?Sized>(
    generator: &mut G,
    increment_deg: f64,
    order: Order,
    target: usize,
    max_steps: usize,
) -> Result<Accumulation> {
    let mut state = GoldenAngleState::new(increment_deg);
    let mut cloud: Vec<GridPoint> = Vec::with_capacity(target);

    let points = try_converge("golden-angle accumulation", max_steps, |_| {
        let angle = state.advance();
        let mut arm = generator.batch(angle);
        if order.reverses(state.step()) {
            arm.reverse();
        }
        generator.extend_cloud(&mut cloud, arm);

        if cloud.len() < target {
            return None;
        }
        let mut done = std::mem::take(&mut cloud);
        done.truncate(target);
        Some(done)
    })?;

    log::debug!(
        "accumulated {} points from {} arms (angle {:.2} deg)",
        points.len(),
        state.step(),
        state.angle_deg()
    );
    Ok(Accumulation {
        points,
        steps: state.step(),
        final_angle_deg: state.angle_deg(),
    })
}

// ---------------------------------------------------------------------------
// PointCloudTrajectory – finished spiral/radial LUT
// ---------------------------------------------------------------------------

/// Which curve family produced a cloud.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CloudKind {
    Spiral {
        revolutions: f64,
        points_per_spiral: usize,
    },
    Radial,
}

impl CloudKind {
    pub fn name(&self) -> &'static str {
        match self {
            CloudKind::Spiral { .. } => "spiral",
            CloudKind::Radial => "radial",
        }
    }
}

/// A finished golden-angle LUT.
#[derive(Debug, Clone)]
pub struct PointCloudTrajectory {
    pub kind: CloudKind,
    pub params: GoldenAngleParams,
    pub increment_deg: f64,
    pub points: Vec<GridPoint>,
    pub coverage: CoverageStats,
    pub steps: usize,
    pub final_angle_deg: f64,
}

impl PointCloudTrajectory {
    pub(crate) fn from_accumulation(
        kind: CloudKind,
        params: &GoldenAngleParams,
        increment_deg: f64,
        acc: Accumulation,
    ) -> Self {
        let coverage = CoverageStats::compute(&acc.points, params.dimy, params.dimz);
        log::info!(
            "{} LUT: {} points, {} unique, {:.1}% elliptical coverage",
            kind.name(),
            coverage.total,
            coverage.unique,
            coverage.covered_fraction
        );
        Self {
            kind,
            params: params.clone(),
            increment_deg,
            points: acc.points,
            coverage,
            steps: acc.steps,
            final_angle_deg: acc.final_angle_deg,
        }
    }
}

impl fmt::Display for PointCloudTrajectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.coverage;
        writeln!(f, "--- k-space trajectory summary ---")?;
        match self.kind {
            CloudKind::Spiral { .. } => writeln!(f, "Trajectory type        : Pseudo-spiral")?,
            CloudKind::Radial => writeln!(f, "Trajectory type        : Pseudo-radial")?,
        }
        writeln!(
            f,
            "Dimensions (ky × kz)   : {} × {}",
            self.params.dimy, self.params.dimz
        )?;
        writeln!(f, "Total samples          : {}", c.total)?;
        writeln!(
            f,
            "Unique positions       : {} ({} of {} mask positions, {:.1}% elliptical coverage)",
            c.unique, c.unique_in_mask, c.mask_area, c.covered_fraction
        )?;
        writeln!(f, "Avg samples/point      : {:.2}", c.avg_samples_per_point)?;
        writeln!(f, "Direction              : {}", self.params.order)?;
        match self.params.angle_deg {
            Some(_) => writeln!(f, "Golden angle used      : {:.5}° (custom)", self.increment_deg)?,
            None => writeln!(
                f,
                "Golden angle used      : {:.5}° (index {})",
                self.increment_deg, self.params.angle_index
            )?,
        }
        match self.kind {
            CloudKind::Spiral {
                revolutions,
                points_per_spiral,
            } => {
                writeln!(f, "Effective spirals      : {}", c.total / points_per_spiral)?;
                writeln!(f, "Revolutions per spiral : {revolutions}")?;
            }
            CloudKind::Radial => {
                writeln!(f, "Effective spokes       : {}", self.steps)?;
                writeln!(f, "Revolutions approx.    : {:.2}", self.final_angle_deg / 360.0)?;
            }
        }
        write!(f, "----------------------------------")
    }
}
