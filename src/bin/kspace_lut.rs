//! kspace-lut - headless generator for scanner k-space LUT files.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;

use rusty_kspace::config::{self, DensityShape};
use rusty_kspace::export;
use rusty_kspace::{
    CartesianParams, GoldenAngleParams, Order, RadialParams, SpiralParams, Trajectory,
    TrajectoryConfig,
};

#[derive(Parser)]
#[command(name = "kspace-lut")]
#[command(about = "Generate Cartesian, pseudo-spiral and pseudo-radial k-space LUTs")]
#[command(version)]
struct Cli {
    /// Directory the LUT is written to.
    #[arg(long, global = true, default_value = "./output/")]
    output: PathBuf,

    /// Seed for the spiral phase and the filling simulation.
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Also write a JSON summary to this path.
    #[arg(long, global = true)]
    summary_json: Option<PathBuf>,

    /// Write per-line repeats and simulated filling as CSV (Cartesian only).
    #[arg(long, global = true)]
    filling_csv: Option<PathBuf>,

    /// Print the summary without writing the LUT.
    #[arg(long, global = true)]
    no_export: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 1D variable-density Cartesian LUT (pe1_order = 3).
    Cartesian(CartesianArgs),

    /// Golden-angle pseudo-spiral LUT (pe1_order = 4).
    Spiral(SpiralArgs),

    /// Golden-angle pseudo-radial LUT (pe1_order = 4).
    Radial(GoldenArgs),

    /// Run a job described by a JSON file.
    Config {
        /// Path to the job JSON.
        path: PathBuf,
    },
}

#[derive(Debug, Clone, Args)]
struct CartesianArgs {
    /// Number of k-space lines.
    #[arg(long, default_value_t = 192)]
    target_size: usize,

    /// Number of views.
    #[arg(long, default_value_t = 256)]
    trajectory_length: usize,

    /// Width of the densely sampled centre.
    #[arg(long, default_value_t = 8)]
    sigma: usize,

    /// Random draws in the filling simulation.
    #[arg(long, default_value_t = 240_000)]
    filling_samples: usize,
}

#[derive(Debug, Clone, Args)]
struct GoldenArgs {
    #[arg(long, default_value_t = 64)]
    dimy: usize,

    #[arg(long, default_value_t = 64)]
    dimz: usize,

    /// 0 = unidirectional, 1 = alternating.
    #[arg(long, default_value_t = 1)]
    order: u8,

    /// Golden-angle table index, 1..=10.
    #[arg(long)]
    angle_index: Option<usize>,

    /// Explicit increment in degrees (overrides --angle-index).
    #[arg(long)]
    angle_deg: Option<f64>,

    #[arg(long, default_value_t = 1)]
    reps: usize,
}

#[derive(Debug, Clone, Args)]
struct SpiralArgs {
    #[command(flatten)]
    golden: GoldenArgs,

    #[arg(long, default_value_t = 1.0)]
    revolutions: f64,

    #[arg(long, default_value_t = 256)]
    points_per_spiral: usize,

    /// Radius growth exponent.
    #[arg(long, default_value_t = 0.8)]
    gamma: f64,
}

impl GoldenArgs {
    fn into_params(self, defaults: GoldenAngleParams) -> Result<GoldenAngleParams> {
        Ok(GoldenAngleParams {
            dimy: self.dimy,
            dimz: self.dimz,
            order: Order::from_index(self.order)?,
            angle_index: self.angle_index.unwrap_or(defaults.angle_index),
            angle_deg: self.angle_deg,
            reps: self.reps,
            ..defaults
        })
    }
}

fn job_from_command(command: Commands) -> Result<TrajectoryConfig> {
    let job = match command {
        Commands::Cartesian(a) => TrajectoryConfig::Cartesian(CartesianParams {
            target_size: a.target_size,
            trajectory_length: a.trajectory_length,
            sigma: a.sigma,
            density_shape: DensityShape::Gauss,
            filling_samples: a.filling_samples,
            ..CartesianParams::default()
        }),
        Commands::Spiral(a) => {
            let defaults = SpiralParams::default();
            TrajectoryConfig::Spiral(SpiralParams {
                golden: a.golden.into_params(defaults.golden.clone())?,
                revolutions: a.revolutions,
                points_per_spiral: a.points_per_spiral,
                gamma: a.gamma,
                ..defaults
            })
        }
        Commands::Radial(a) => TrajectoryConfig::Radial(RadialParams {
            golden: a.into_params(RadialParams::default().golden)?,
        }),
        Commands::Config { path } => config::load_config(&path)?,
    };
    Ok(job)
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let job = job_from_command(cli.command)?;
    let seed = cli.seed.or(job.seed());
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    };

    let trajectory = rusty_kspace::generate(&job, &mut rng).context("generating trajectory")?;

    let lut_file = if cli.no_export {
        None
    } else {
        Some(export::write_lut(&trajectory, &cli.output).context("writing LUT")?)
    };

    match &trajectory {
        Trajectory::Cartesian(t) => println!("\n{t}"),
        Trajectory::PointCloud(t) => println!("\n{t}"),
    }
    if let Some(path) = &lut_file {
        println!("Output file: {}", path.display());
    }

    if let Some(path) = &cli.filling_csv {
        match &trajectory {
            Trajectory::Cartesian(t) => export::write_filling_csv(path, t)?,
            Trajectory::PointCloud(_) => {
                log::warn!("--filling-csv only applies to Cartesian trajectories; skipped")
            }
        }
    }

    if let Some(path) = &cli.summary_json {
        export::write_summary_json(path, &trajectory, lut_file.as_deref())?;
    }

    Ok(())
}
