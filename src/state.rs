use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::SeedableRng;

use rusty_kspace::trajectory::GridPoint;
use rusty_kspace::{
    export, generate, CartesianParams, RadialParams, SpiralParams, Trajectory, TrajectoryConfig,
};

use crate::color::HeatMap;

// ---------------------------------------------------------------------------
// Trajectory family selector
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrajectoryKind {
    Cartesian,
    Spiral,
    Radial,
}

impl TrajectoryKind {
    pub const ALL: [TrajectoryKind; 3] = [
        TrajectoryKind::Cartesian,
        TrajectoryKind::Spiral,
        TrajectoryKind::Radial,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TrajectoryKind::Cartesian => "1D Cartesian",
            TrajectoryKind::Spiral => "Pseudo-spiral",
            TrajectoryKind::Radial => "Pseudo-radial",
        }
    }
}

// ---------------------------------------------------------------------------
// Playback of the k-space fill
// ---------------------------------------------------------------------------

/// Animated reveal of a point-cloud LUT, `speed` samples per frame.
#[derive(Debug, Clone)]
pub struct Playback {
    pub visible: usize,
    pub playing: bool,
    pub speed: usize,
}

impl Default for Playback {
    fn default() -> Self {
        Self {
            visible: 0,
            playing: false,
            speed: 16,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Which family the parameter panel edits.
    pub kind: TrajectoryKind,

    pub cartesian: CartesianParams,
    pub spiral: SpiralParams,
    pub radial: RadialParams,

    /// Seed for the spiral phase and the filling simulation.
    pub seed: u64,
    pub use_seed: bool,

    /// Last generated trajectory (None until the user presses Generate).
    pub trajectory: Option<Trajectory>,

    /// Colour scale for samples per position of the current cloud.
    pub heat_map: Option<HeatMap>,

    pub playback: Playback,

    /// View rotation in quarter turns, counter-clockwise.
    pub rotation_quarters: i32,

    /// Overlay the most recent part of the acquisition path.
    pub show_path: bool,
    pub trail_length: usize,

    pub output_dir: PathBuf,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            kind: TrajectoryKind::Spiral,
            cartesian: CartesianParams::default(),
            spiral: SpiralParams::default(),
            radial: RadialParams::default(),
            seed: 42,
            use_seed: true,
            trajectory: None,
            heat_map: None,
            playback: Playback::default(),
            rotation_quarters: 0,
            show_path: true,
            trail_length: 256,
            output_dir: PathBuf::from("./output/"),
            status_message: None,
        }
    }
}

impl AppState {
    /// The job described by the current panel settings.
    pub fn config(&self) -> TrajectoryConfig {
        match self.kind {
            TrajectoryKind::Cartesian => TrajectoryConfig::Cartesian(self.cartesian.clone()),
            TrajectoryKind::Spiral => TrajectoryConfig::Spiral(self.spiral.clone()),
            TrajectoryKind::Radial => TrajectoryConfig::Radial(self.radial.clone()),
        }
    }

    /// Build a trajectory from the current settings.
    pub fn regenerate(&mut self) {
        let mut rng = if self.use_seed {
            StdRng::seed_from_u64(self.seed)
        } else {
            StdRng::from_os_rng()
        };
        match generate(&self.config(), &mut rng) {
            Ok(trajectory) => self.set_trajectory(trajectory),
            Err(e) => {
                log::error!("Failed to generate trajectory: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Ingest a freshly built trajectory and restart playback.
    pub fn set_trajectory(&mut self, trajectory: Trajectory) {
        self.heat_map = match &trajectory {
            Trajectory::PointCloud(t) => Some(HeatMap::for_points(&t.points)),
            Trajectory::Cartesian(_) => None,
        };
        self.playback.visible = match &trajectory {
            Trajectory::PointCloud(_) => 0,
            Trajectory::Cartesian(t) => t.order.len(),
        };
        self.playback.playing = matches!(trajectory, Trajectory::PointCloud(_));
        self.trajectory = Some(trajectory);
        self.status_message = None;
    }

    /// Advance playback by one frame. Returns whether more frames follow.
    pub fn tick(&mut self) -> bool {
        let total = self.trajectory.as_ref().map_or(0, Trajectory::len);
        if !self.playback.playing {
            return false;
        }
        self.playback.visible = (self.playback.visible + self.playback.speed.max(1)).min(total);
        if self.playback.visible >= total {
            self.playback.playing = false;
        }
        self.playback.playing
    }

    /// Show everything at once.
    pub fn skip_to_end(&mut self) {
        self.playback.visible = self.trajectory.as_ref().map_or(0, Trajectory::len);
        self.playback.playing = false;
    }

    /// Points revealed so far (empty for Cartesian LUTs).
    pub fn visible_points(&self) -> &[GridPoint] {
        match &self.trajectory {
            Some(Trajectory::PointCloud(t)) => {
                &t.points[..self.playback.visible.min(t.points.len())]
            }
            _ => &[],
        }
    }

    pub fn rotate_view(&mut self, quarters: i32) {
        self.rotation_quarters = (self.rotation_quarters + quarters).rem_euclid(4);
    }

    /// Write the current LUT into `output_dir`.
    pub fn export(&mut self) {
        let Some(trajectory) = &self.trajectory else {
            self.status_message = Some("Nothing to export yet".to_string());
            return;
        };
        match export::write_lut(trajectory, &self.output_dir) {
            Ok(path) => {
                self.status_message = Some(format!("Wrote {}", path.display()));
            }
            Err(e) => {
                log::error!("Failed to export LUT: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_radial() -> AppState {
        let mut state = AppState {
            kind: TrajectoryKind::Radial,
            ..AppState::default()
        };
        state.radial.golden.dimy = 16;
        state.radial.golden.dimz = 16;
        state
    }

    #[test]
    fn regenerate_starts_playback() {
        let mut state = small_radial();
        state.regenerate();
        assert!(state.status_message.is_none());
        assert!(state.playback.playing);
        assert_eq!(state.visible_points().len(), 0);
        assert!(state.heat_map.is_some());
    }

    #[test]
    fn playback_stops_at_the_end() {
        let mut state = small_radial();
        state.playback.speed = 100;
        state.regenerate();
        assert!(state.tick());
        assert_eq!(state.visible_points().len(), 100);
        assert!(state.tick());
        assert!(!state.tick());
        assert_eq!(state.visible_points().len(), 256);
        assert!(!state.tick());
    }

    #[test]
    fn invalid_parameters_surface_as_status() {
        let mut state = AppState {
            kind: TrajectoryKind::Cartesian,
            ..AppState::default()
        };
        state.cartesian.sigma = 3;
        state.regenerate();
        assert!(state.trajectory.is_none());
        assert!(state.status_message.unwrap().contains("sigma"));
    }

    #[test]
    fn export_writes_into_output_dir() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut state = small_radial();
        state.output_dir = tmp.path().to_path_buf();
        state.regenerate();
        state.export();
        assert!(tmp.path().join("exLUT_radial_y16_z16_a16.95_r1.txt").exists());
    }

    #[test]
    fn view_rotation_wraps() {
        let mut state = AppState::default();
        state.rotate_view(-1);
        assert_eq!(state.rotation_quarters, 3);
        state.rotate_view(2);
        assert_eq!(state.rotation_quarters, 1);
    }
}
