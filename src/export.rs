use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;

use crate::config::{CartesianParams, GoldenAngleParams};
use crate::error::Result;
use crate::trajectory::cartesian::CartesianTrajectory;
use crate::trajectory::coverage::CoverageStats;
use crate::trajectory::filling::FillingSummary;
use crate::trajectory::{CloudKind, GridPoint, PointCloudTrajectory, Trajectory};

// ---------------------------------------------------------------------------
// File names
// ---------------------------------------------------------------------------

/// Angle as it appears in file names: rounded to two decimals, shortest
/// representation (`27.2`, `111.25`).
fn format_angle(angle_deg: f64) -> String {
    let rounded = (angle_deg * 100.0).round() / 100.0;
    format!("{rounded}")
}

pub fn cartesian_file_name(params: &CartesianParams) -> String {
    format!(
        "LUT_Cartesian_1D_{}_{}_{}.txt",
        params.target_size, params.trajectory_length, params.sigma
    )
}

pub fn cloud_file_name(traj: &PointCloudTrajectory) -> String {
    format!(
        "exLUT_{}_y{}_z{}_a{}_r{}.txt",
        traj.kind.name(),
        traj.params.dimy,
        traj.params.dimz,
        format_angle(traj.increment_deg),
        traj.params.reps
    )
}

pub fn file_name(traj: &Trajectory) -> String {
    match traj {
        Trajectory::Cartesian(t) => cartesian_file_name(&t.params),
        Trajectory::PointCloud(t) => cloud_file_name(t),
    }
}

// ---------------------------------------------------------------------------
// LUT writers
// ---------------------------------------------------------------------------

/// One centred k-line index per line, each followed by a comma.
pub fn write_cartesian_lut<W: Write>(mut out: W, order: &[i32]) -> std::io::Result<()> {
    for line in order {
        writeln!(out, "{line},")?;
    }
    out.flush()
}

/// `y` and `z` of every point on consecutive lines.
pub fn write_point_lut<W: Write>(mut out: W, points: &[GridPoint]) -> std::io::Result<()> {
    for p in points {
        writeln!(out, "{}\n{}", p.y, p.z)?;
    }
    out.flush()
}

/// Write the LUT of `traj` into `dir` (created if missing) under its
/// parameter-encoding file name.
pub fn write_lut(traj: &Trajectory, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name(traj));
    let out = BufWriter::new(File::create(&path)?);
    match traj {
        Trajectory::Cartesian(t) => write_cartesian_lut(out, &t.order)?,
        Trajectory::PointCloud(t) => write_point_lut(out, &t.points)?,
    }
    log::info!("Trajectory written to {}", path.display());
    Ok(path)
}

// ---------------------------------------------------------------------------
// Side outputs: filling CSV and JSON summary
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct FillingRow {
    ky: i32,
    repeats: usize,
    filling: f64,
}

/// Per-line repeat count and simulated filling as CSV.
pub fn write_filling_csv(path: &Path, traj: &CartesianTrajectory) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let half = (traj.params.target_size / 2) as i32;
    for (i, (&repeats, &filling)) in traj
        .profile
        .repeats()
        .iter()
        .zip(&traj.filling.density)
        .enumerate()
    {
        writer
            .serialize(FillingRow {
                ky: i as i32 - half,
                repeats,
                filling,
            })
            .context("writing filling row")?;
    }
    writer.flush().context("flushing filling CSV")?;
    Ok(())
}

#[derive(Serialize)]
struct CartesianSummary<'a> {
    params: &'a CartesianParams,
    filling: FillingSummary,
    ky_range: Option<(i32, i32)>,
}

#[derive(Serialize)]
struct CloudSummary<'a> {
    curve: CloudKind,
    params: &'a GoldenAngleParams,
    increment_deg: f64,
    coverage: CoverageStats,
    steps: usize,
    final_angle_deg: f64,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Detail<'a> {
    Cartesian(CartesianSummary<'a>),
    Cloud(CloudSummary<'a>),
}

#[derive(Serialize)]
struct JobSummary<'a> {
    samples: usize,
    lut_file: Option<&'a Path>,
    #[serde(flatten)]
    detail: Detail<'a>,
}

/// Machine-readable counterpart of the printed summary.
pub fn summary_json(traj: &Trajectory, lut_file: Option<&Path>) -> anyhow::Result<String> {
    let detail = match traj {
        Trajectory::Cartesian(t) => Detail::Cartesian(CartesianSummary {
            params: &t.params,
            filling: t.filling.summary(),
            ky_range: t.ky_range(),
        }),
        Trajectory::PointCloud(t) => Detail::Cloud(CloudSummary {
            curve: t.kind,
            params: &t.params,
            increment_deg: t.increment_deg,
            coverage: t.coverage,
            steps: t.steps,
            final_angle_deg: t.final_angle_deg,
        }),
    };
    let summary = JobSummary {
        samples: traj.len(),
        lut_file,
        detail,
    };
    serde_json::to_string_pretty(&summary).context("serializing summary")
}

pub fn write_summary_json(
    path: &Path,
    traj: &Trajectory,
    lut_file: Option<&Path>,
) -> anyhow::Result<()> {
    let json = summary_json(traj, lut_file)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}
