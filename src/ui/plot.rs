use eframe::egui::{RichText, Ui};
use egui_plot::{Line, Plot, PlotPoints};

use rusty_trace::data::{AggregatedRecord, AxisMode};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Recording plot (central panel)
// ---------------------------------------------------------------------------

/// One unbroken stretch of a series: `[t, center, low, high]` per point.
type Segment = Vec<[f64; 4]>;

/// Split a series at null records so gaps stay visible.
///
/// Values are mapped through `log10` on a logarithmic axis.
fn segments(series: &[AggregatedRecord], axis: AxisMode) -> Vec<Segment> {
    let scale = |v: f64| match axis {
        AxisMode::Linear => v,
        AxisMode::Logarithmic => v.log10(),
    };

    let mut out = Vec::new();
    let mut current = Segment::new();
    for rec in series {
        match (rec.valid_center(), rec.band) {
            (Some(center), Some(band)) => current.push([
                rec.timestamp,
                scale(center),
                scale(band.low),
                scale(band.high),
            ]),
            _ => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn column(segment: &Segment, idx: usize) -> PlotPoints {
    segment.iter().map(|p| [p[0], p[idx]]).collect()
}

/// Render the recording plot in the central panel.
pub fn recording_plot(ui: &mut Ui, state: &AppState) {
    let recording = match &state.recording {
        Some(rec) => rec,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a recording to view channels  (File → Open…)");
            });
            return;
        }
    };

    let axis = state.settings.axis;
    let y_label = match axis {
        AxisMode::Linear => "Value",
        AxisMode::Logarithmic => "log10(Value)",
    };

    // Downsample up front so failures can be reported outside the plot.
    let mut plotted = Vec::new();
    for channel in state.visible_channels() {
        match state.series(channel) {
            Ok(series) => plotted.push((channel, segments(&series, axis))),
            Err(e) => {
                ui.label(RichText::new(format!("Error: {e}")).color(ui.visuals().error_fg_color));
            }
        }
    }

    Plot::new("recording_plot")
        .legend(egui_plot::Legend::default())
        .x_axis_label("Time")
        .y_axis_label(y_label)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (channel, segs) in &plotted {
                let name = &recording.channel_labels[*channel];
                let color = state.colors.line(*channel);
                let band_color = state.colors.band(*channel);

                for seg in segs {
                    plot_ui.line(Line::new(column(seg, 2)).name(name).color(band_color).width(1.0));
                    plot_ui.line(Line::new(column(seg, 3)).name(name).color(band_color).width(1.0));
                    plot_ui.line(Line::new(column(seg, 1)).name(name).color(color).width(1.5));
                }
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusty_trace::data::{Band, ExtractedRecord};

    #[test]
    fn gaps_split_segments() {
        let series = vec![
            ExtractedRecord::new(0.0, 2.0, Band::new(1.0, 3.0)),
            ExtractedRecord::new(1.0, 2.0, Band::new(1.0, 3.0)),
            ExtractedRecord::null(2.0),
            ExtractedRecord::new(3.0, f64::NAN, Band::degenerate(f64::NAN)),
            ExtractedRecord::new(4.0, 4.0, Band::new(3.0, 5.0)),
        ];
        let segs = segments(&series, AxisMode::Linear);
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0].len(), 2);
        assert_eq!(segs[1], vec![[4.0, 4.0, 3.0, 5.0]]);
    }

    #[test]
    fn log_axis_plots_decades() {
        let series = vec![ExtractedRecord::new(0.0, 10.0, Band::new(1.0, 100.0))];
        let segs = segments(&series, AxisMode::Logarithmic);
        assert_eq!(segs[0][0], [0.0, 1.0, 0.0, 2.0]);
    }
}
