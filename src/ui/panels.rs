use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use rusty_kspace::config::{GoldenAngleParams, Order, GOLDEN_ANGLES};
use rusty_kspace::Trajectory;

use crate::state::{AppState, TrajectoryKind};

// ---------------------------------------------------------------------------
// Left side panel – parameters, playback and statistics
// ---------------------------------------------------------------------------

/// Render the left parameter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Trajectory");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            egui::ComboBox::from_id_salt("trajectory_kind")
                .selected_text(state.kind.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for kind in TrajectoryKind::ALL {
                        ui.selectable_value(&mut state.kind, kind, kind.label());
                    }
                });
            ui.add_space(4.0);

            match state.kind {
                TrajectoryKind::Cartesian => cartesian_params(ui, state),
                TrajectoryKind::Spiral => {
                    golden_params(ui, &mut state.spiral.golden, "spiral_params");
                    egui::CollapsingHeader::new("Spiral shape")
                        .default_open(false)
                        .show(ui, |ui: &mut Ui| {
                            egui::Grid::new("spiral_shape").num_columns(2).show(ui, |ui| {
                                ui.label("Revolutions");
                                ui.add(
                                    egui::DragValue::new(&mut state.spiral.revolutions)
                                        .range(0.25..=8.0)
                                        .speed(0.05),
                                );
                                ui.end_row();
                                ui.label("Points per arm");
                                ui.add(
                                    egui::DragValue::new(&mut state.spiral.points_per_spiral)
                                        .range(2..=4096),
                                );
                                ui.end_row();
                                ui.label("Gamma");
                                ui.add(
                                    egui::DragValue::new(&mut state.spiral.gamma)
                                        .range(0.1..=2.0)
                                        .speed(0.01),
                                );
                                ui.end_row();
                            });
                        });
                }
                TrajectoryKind::Radial => {
                    golden_params(ui, &mut state.radial.golden, "radial_params")
                }
            }

            ui.horizontal(|ui: &mut Ui| {
                ui.checkbox(&mut state.use_seed, "Seed");
                ui.add_enabled(state.use_seed, egui::DragValue::new(&mut state.seed));
            });

            ui.add_space(4.0);
            if ui.button(RichText::new("Generate").strong()).clicked() {
                state.regenerate();
            }
            ui.separator();

            playback_controls(ui, state);
            ui.separator();

            statistics_table(ui, state);
        });
}

fn cartesian_params(ui: &mut Ui, state: &mut AppState) {
    let p = &mut state.cartesian;
    egui::Grid::new("cartesian_params").num_columns(2).show(ui, |ui| {
        ui.label("k-space size");
        ui.add(egui::DragValue::new(&mut p.target_size).range(2..=1024).speed(2));
        ui.end_row();
        ui.label("Trajectory length");
        ui.add(egui::DragValue::new(&mut p.trajectory_length).range(2..=8192).speed(2));
        ui.end_row();
        ui.label("Sigma");
        ui.add(egui::DragValue::new(&mut p.sigma).range(2..=256).speed(2));
        ui.end_row();
        ui.label("Filling draws");
        ui.add(egui::DragValue::new(&mut p.filling_samples).range(0..=2_000_000).speed(1000));
        ui.end_row();
    });
}

fn golden_params(ui: &mut Ui, p: &mut GoldenAngleParams, id: &str) {
    egui::Grid::new(id).num_columns(2).show(ui, |ui| {
        ui.label("dim y");
        ui.add(egui::DragValue::new(&mut p.dimy).range(2..=512));
        ui.end_row();
        ui.label("dim z");
        ui.add(egui::DragValue::new(&mut p.dimz).range(2..=512));
        ui.end_row();
        ui.label("Repetitions");
        ui.add(egui::DragValue::new(&mut p.reps).range(1..=64));
        ui.end_row();

        ui.label("Golden angle");
        egui::ComboBox::from_id_salt(format!("{id}_angle"))
            .selected_text(format!("{} ({:.5}°)", p.angle_index, GOLDEN_ANGLES[p.angle_index.clamp(1, 10) - 1]))
            .show_ui(ui, |ui: &mut Ui| {
                for (i, angle) in GOLDEN_ANGLES.iter().enumerate() {
                    ui.selectable_value(&mut p.angle_index, i + 1, format!("{} ({angle:.5}°)", i + 1));
                }
            });
        ui.end_row();

        ui.label("Direction");
        ui.horizontal(|ui: &mut Ui| {
            ui.selectable_value(&mut p.order, Order::Unidirectional, "Unidirectional");
            ui.selectable_value(&mut p.order, Order::Alternating, "Alternating");
        });
        ui.end_row();
    });
}

fn playback_controls(ui: &mut Ui, state: &mut AppState) {
    ui.strong("View");
    ui.horizontal(|ui: &mut Ui| {
        let label = if state.playback.playing { "Pause" } else { "Play" };
        if ui.button(label).clicked() {
            if !state.playback.playing
                && state.playback.visible >= state.trajectory.as_ref().map_or(0, Trajectory::len)
            {
                state.playback.visible = 0;
            }
            state.playback.playing = !state.playback.playing;
        }
        if ui.button("Show all").clicked() {
            state.skip_to_end();
        }
    });
    ui.add(
        egui::Slider::new(&mut state.playback.speed, 1..=2048)
            .logarithmic(true)
            .text("samples/frame"),
    );
    ui.horizontal(|ui: &mut Ui| {
        if ui.button("⟲ 90°").clicked() {
            state.rotate_view(1);
        }
        if ui.button("⟳ 90°").clicked() {
            state.rotate_view(-1);
        }
        ui.label(format!("{}°", state.rotation_quarters * 90));
    });
    ui.horizontal(|ui: &mut Ui| {
        ui.checkbox(&mut state.show_path, "Path");
        ui.add_enabled(
            state.show_path,
            egui::DragValue::new(&mut state.trail_length)
                .range(2..=10_000)
                .suffix(" steps"),
        );
    });
}

fn statistics_table(ui: &mut Ui, state: &AppState) {
    ui.strong("Statistics");
    let Some(trajectory) = &state.trajectory else {
        ui.label("No trajectory generated.");
        return;
    };

    let rows: Vec<(&str, String)> = match trajectory {
        Trajectory::Cartesian(t) => {
            let s = t.filling.summary();
            let (lo, hi) = t.ky_range().unwrap_or((0, 0));
            vec![
                ("Views", t.order.len().to_string()),
                ("Mean filling", format!("{:.4}", s.mean)),
                ("Min filling", format!("{:.4}", s.min)),
                ("Max filling", format!("{:.4}", s.max)),
                ("Std of filling", format!("{:.4}", s.std)),
                (
                    "Center/Edge ratio",
                    s.center_edge_ratio
                        .map_or_else(|| "n/a".to_string(), |r| format!("{r:.2}")),
                ),
                ("ky range", format!("{lo} to {hi}")),
            ]
        }
        Trajectory::PointCloud(t) => {
            let c = &t.coverage;
            vec![
                ("Total samples", c.total.to_string()),
                ("Unique positions", c.unique.to_string()),
                ("Inside mask", format!("{} / {}", c.unique_in_mask, c.mask_area)),
                ("Coverage", format!("{:.1} %", c.covered_fraction)),
                ("Avg samples/point", format!("{:.2}", c.avg_samples_per_point)),
                ("Direction", t.params.order.to_string()),
                ("Golden angle", format!("{:.5}°", t.increment_deg)),
                ("Arms generated", t.steps.to_string()),
                ("Revolutions", format!("{:.2}", t.final_angle_deg / 360.0)),
            ]
        }
    };

    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .column(Column::auto())
        .column(Column::remainder())
        .body(|mut body| {
            for (name, value) in rows {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(name);
                    });
                    row.col(|ui| {
                        ui.label(value);
                    });
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Export LUT").clicked() {
                state.export();
                ui.close_menu();
            }
            if ui.button("Export LUT to…").clicked() {
                pick_output_dir(state);
                state.export();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(t) = &state.trajectory {
            ui.label(format!(
                "{} samples, {} shown",
                t.len(),
                match t {
                    Trajectory::Cartesian(_) => t.len(),
                    Trajectory::PointCloud(_) => state.playback.visible,
                }
            ));
        }

        ui.separator();
        ui.label(format!("Output: {}", state.output_dir.display()));

        if let Some(msg) = &state.status_message {
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                Color32::LIGHT_GREEN
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// Folder dialog
// ---------------------------------------------------------------------------

pub fn pick_output_dir(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Choose LUT output folder")
        .set_directory(&state.output_dir)
        .pick_folder();

    if let Some(path) = folder {
        log::info!("Output folder set to {}", path.display());
        state.output_dir = path;
    }
}
