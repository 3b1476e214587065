mod app;
mod settings;
mod state;
mod ui;

use std::path::PathBuf;

use app::RustyTraceApp;
use eframe::egui;
use settings::ViewSettings;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let settings = ViewSettings::load_or_default(&ViewSettings::default_path());
    let mut state = AppState::with_settings(settings);

    // Optional recording to open on start-up.
    if let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) {
        state.open_path(&path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Trace – Recording Viewer",
        options,
        Box::new(|_cc| Ok(Box::new(RustyTraceApp::new(state)))),
    )
}
