//! k-space sampling trajectories for MRI acquisition, exported as scanner
//! lookup tables (LUTs).
//!
//! Two families:
//! * 1D Cartesian variable-density ordering ([`trajectory::cartesian`])
//! * golden-angle pseudo-spiral and pseudo-radial point clouds
//!   ([`trajectory::spiral`], [`trajectory::radial`])

pub mod config;
pub mod error;
pub mod export;
pub mod geometry;
pub mod trajectory;

pub use config::{
    CartesianParams, GoldenAngleParams, Order, RadialParams, SpiralParams, TrajectoryConfig,
};
pub use error::TrajectoryError;
pub use trajectory::{generate, Trajectory};
