use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use rusty_trace::data::{AxisMode, UnreadableCenter};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – channel list
// ---------------------------------------------------------------------------

/// Render the left channel panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Channels");
    ui.separator();

    let labels = match &state.recording {
        Some(rec) => rec.channel_labels.clone(),
        None => {
            ui.label("No recording loaded.");
            return;
        }
    };

    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            state.set_all_visible(true);
        }
        if ui.small_button("None").clicked() {
            state.set_all_visible(false);
        }
    });

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (channel, label) in labels.iter().enumerate() {
                let text = RichText::new(label).color(state.colors.line(channel));
                let mut checked = state.visible.get(channel).copied().unwrap_or(false);
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_channel(channel);
                }
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
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Save view settings").clicked() {
                state.save_settings();
                ui.close_menu();
            }
        });

        ui.separator();

        let rows = match &state.recording {
            Some(rec) => {
                ui.label(format!(
                    "{}: {} rows, {} channels",
                    rec.name,
                    rec.len(),
                    rec.channel_count()
                ));
                if ui.selectable_label(state.show_info, "Info").clicked() {
                    state.show_info = !state.show_info;
                }
                rec.len()
            }
            None => 0,
        };

        ui.separator();

        ui.label("Roll period");
        ui.add(
            egui::DragValue::new(&mut state.settings.roll_period)
                .range(1..=rows.max(1))
                .speed(1.0),
        );
        if ui
            .small_button("Fit")
            .on_hover_text("Average enough rows to keep each channel near the point budget")
            .clicked()
        {
            state.settings.roll_period = state.settings.suggested_roll_period(rows);
        }

        ui.separator();

        ui.label("Scale");
        let current = state.settings.axis;
        egui::ComboBox::from_id_salt("axis_mode")
            .selected_text(current.label())
            .show_ui(ui, |ui: &mut Ui| {
                for mode in [AxisMode::Linear, AxisMode::Logarithmic] {
                    if ui.selectable_label(current == mode, mode.label()).clicked() {
                        state.set_axis(mode);
                    }
                }
            });

        let keep_nan = state.settings.unreadable_center == UnreadableCenter::Degenerate;
        if ui
            .selectable_label(keep_nan, "Keep unreadable centers")
            .on_hover_text("Keep cells with an unknown center as NaN slots instead of gaps")
            .clicked()
        {
            state.settings.unreadable_center = if keep_nan {
                UnreadableCenter::Null
            } else {
                UnreadableCenter::Degenerate
            };
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File information window
// ---------------------------------------------------------------------------

/// Per-channel summary of the loaded recording.
pub fn info_window(ctx: &egui::Context, state: &mut AppState) {
    let Some(rec) = &state.recording else {
        return;
    };

    egui::Window::new("File Information")
        .open(&mut state.show_info)
        .resizable(true)
        .show(ctx, |ui: &mut Ui| {
            ui.label(format!("File: {}", rec.name));
            ui.label(format!("Rows: {}", rec.len()));
            if let Some((start, end)) = rec.matrix.time_span() {
                ui.label(format!("Time span: {start:.3} – {end:.3}"));
            }
            ui.separator();

            TableBuilder::new(ui)
                .striped(true)
                .column(Column::auto())
                .column(Column::auto())
                .column(Column::remainder())
                .header(20.0, |mut header| {
                    header.col(|ui| {
                        ui.strong("Channel");
                    });
                    header.col(|ui| {
                        ui.strong("Readings");
                    });
                    header.col(|ui| {
                        ui.strong("Range");
                    });
                })
                .body(|mut body| {
                    for (channel, label) in rec.channel_labels.iter().enumerate() {
                        let (count, range) = rec.channel_summary(channel);
                        body.row(18.0, |mut row| {
                            row.col(|ui| {
                                ui.label(label);
                            });
                            row.col(|ui| {
                                ui.label(count.to_string());
                            });
                            row.col(|ui| {
                                ui.label(match range {
                                    Some((lo, hi)) => format!("{lo:.3} … {hi:.3}"),
                                    None => "–".to_string(),
                                });
                            });
                        });
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open recording")
        .add_filter("Supported files", &["parquet", "pq", "json", "csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.open_path(&path);
    }
}
