use std::collections::BTreeMap;

use eframe::egui::{Color32, Ui};
use egui_plot::{Legend, Line, MarkerShape, Plot, PlotPoints, Points};

use rusty_kspace::geometry::{clip_polyline, rotate90, ClipRect};
use rusty_kspace::trajectory::coverage::{hit_counts, EllipticalMask};
use rusty_kspace::trajectory::{CartesianTrajectory, GridPoint, PointCloudTrajectory};
use rusty_kspace::Trajectory;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Trajectory plot (central panel)
// ---------------------------------------------------------------------------

/// Render the current trajectory in the central panel.
pub fn trajectory_plot(ui: &mut Ui, state: &AppState) {
    match &state.trajectory {
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Set parameters and press Generate");
            });
        }
        Some(Trajectory::Cartesian(t)) => cartesian_plots(ui, t),
        Some(Trajectory::PointCloud(t)) => cloud_plot(ui, state, t),
    }
}

// ---------------------------------------------------------------------------
// Cartesian: view order and simulated filling side by side
// ---------------------------------------------------------------------------

fn cartesian_plots(ui: &mut Ui, t: &CartesianTrajectory) {
    ui.columns(2, |cols| {
        let order: PlotPoints = t
            .order
            .iter()
            .enumerate()
            .map(|(view, &ky)| [view as f64, ky as f64])
            .collect();
        Plot::new("cartesian_order")
            .x_axis_label("View")
            .y_axis_label("ky")
            .show(&mut cols[0], |plot_ui| {
                plot_ui.line(
                    Line::new(order)
                        .name("Trajectory")
                        .color(Color32::LIGHT_BLUE)
                        .width(1.5),
                );
            });

        let half = (t.params.target_size / 2) as f64;
        let filling: PlotPoints = t
            .filling
            .density
            .iter()
            .enumerate()
            .map(|(i, &d)| [i as f64 - half, d])
            .collect();
        Plot::new("cartesian_filling")
            .x_axis_label("ky")
            .y_axis_label("Normalized filling")
            .show(&mut cols[1], |plot_ui| {
                plot_ui.line(
                    Line::new(filling)
                        .name(format!("{} draws", t.filling.samples))
                        .color(Color32::LIGHT_RED)
                        .width(1.5),
                );
            });
    });
}

// ---------------------------------------------------------------------------
// Point clouds: heat map of samples per position
// ---------------------------------------------------------------------------

/// Field of view of the rotated grid, pixel edges included.
fn view_rect(mask: &EllipticalMask, quarters: i32) -> ClipRect {
    let (y0, y1) = (*mask.y_range().start() as f64 - 0.5, *mask.y_range().end() as f64 + 0.5);
    let (z0, z1) = (*mask.z_range().start() as f64 - 0.5, *mask.z_range().end() as f64 + 0.5);
    let (ax, ay) = rotate90(y0, z0, quarters);
    let (bx, by) = rotate90(y1, z1, quarters);
    ClipRect::new(ax.min(bx), ax.max(bx), ay.min(by), ay.max(by))
}

fn rotated(p: GridPoint, quarters: i32) -> [f64; 2] {
    let (x, y) = rotate90(p.y, p.z, quarters);
    [x as f64, y as f64]
}

fn cloud_plot(ui: &mut Ui, state: &AppState, t: &PointCloudTrajectory) {
    let quarters = state.rotation_quarters;
    let visible = state.visible_points();
    let mask = EllipticalMask::new(t.params.dimy, t.params.dimz);
    let fov = view_rect(&mask, quarters);

    // Group revealed positions by heat level so each level is one legend entry.
    let mut by_level: BTreeMap<usize, Vec<[f64; 2]>> = BTreeMap::new();
    if let Some(heat) = &state.heat_map {
        for (p, count) in hit_counts(visible) {
            by_level
                .entry(heat.level_for(count))
                .or_default()
                .push(rotated(p, quarters));
        }
    }

    let outline: PlotPoints = (0..=128)
        .map(|i| {
            let phi = i as f64 / 128.0 * std::f64::consts::TAU;
            let (x, y) = rotate90(mask.ry * phi.cos(), mask.rz * phi.sin(), quarters);
            [x, y]
        })
        .collect();

    let path = if state.show_path {
        let start = visible.len().saturating_sub(state.trail_length);
        let trail: Vec<[f64; 2]> = visible[start..]
            .iter()
            .map(|&p| rotated(p, quarters))
            .collect();
        clip_polyline(&trail, &fov)
    } else {
        Vec::new()
    };

    Plot::new("cloud_plot")
        .legend(Legend::default())
        .data_aspect(1.0)
        .x_axis_label("ky")
        .y_axis_label("kz")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(outline)
                    .name("Mask")
                    .color(Color32::DARK_GRAY)
                    .width(1.0),
            );

            if let Some(heat) = &state.heat_map {
                for (level, pts) in by_level {
                    plot_ui.points(
                        Points::new(PlotPoints::new(pts))
                            .name(heat.level_label(level))
                            .color(heat.color_for_level(level))
                            .shape(MarkerShape::Square)
                            .radius(2.5),
                    );
                }
            }

            for segment in &path {
                plot_ui.line(
                    Line::new(PlotPoints::new(vec![segment.start, segment.end]))
                        .color(Color32::WHITE)
                        .width(1.0),
                );
            }

            if let Some(&last) = visible.last() {
                plot_ui.points(
                    Points::new(PlotPoints::new(vec![rotated(last, quarters)]))
                        .color(Color32::YELLOW)
                        .shape(MarkerShape::Circle)
                        .radius(4.0),
                );
            }
        });
}
