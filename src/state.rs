use std::path::Path;

use rusty_trace::color::ChannelColors;
use rusty_trace::data::loader::load_file;
use rusty_trace::data::{downsample, AggregatedRecord, AxisMode, Recording, SeriesError};

use crate::settings::ViewSettings;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded recording (None until user loads a file).
    pub recording: Option<Recording>,

    /// Per-channel visibility, same order as the recording's channels.
    pub visible: Vec<bool>,

    /// Line colours per channel.
    pub colors: ChannelColors,

    /// Roll period, axis mode and the rest of the persisted choices.
    pub settings: ViewSettings,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether the file information window is open.
    pub show_info: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_settings(ViewSettings::default())
    }
}

impl AppState {
    pub fn with_settings(settings: ViewSettings) -> Self {
        Self {
            recording: None,
            visible: Vec::new(),
            colors: ChannelColors::default(),
            settings,
            status_message: None,
            show_info: false,
        }
    }

    /// Ingest a newly loaded recording and initialise channel visibility.
    pub fn set_recording(&mut self, recording: Recording) {
        let wanted = &self.settings.visible_channels;
        self.visible = recording
            .channel_labels
            .iter()
            .map(|label| wanted.is_empty() || wanted.contains(label))
            .collect();
        self.colors = ChannelColors::new(recording.channel_count());

        if self.settings.roll_period > recording.len().max(1) {
            self.settings.roll_period = self.settings.suggested_roll_period(recording.len());
        }

        self.recording = Some(recording);
        self.status_message = None;
    }

    /// Load `path` and report failures in the status line.
    pub fn open_path(&mut self, path: &Path) {
        match load_file(path) {
            Ok(recording) => self.set_recording(recording),
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    pub fn set_all_visible(&mut self, visible: bool) {
        self.visible.iter_mut().for_each(|v| *v = visible);
        self.sync_visible_channels();
    }

    pub fn toggle_channel(&mut self, channel: usize) {
        if let Some(v) = self.visible.get_mut(channel) {
            *v = !*v;
        }
        self.sync_visible_channels();
    }

    pub fn set_axis(&mut self, axis: AxisMode) {
        self.settings.axis = axis;
    }

    /// Indices of channels currently shown.
    pub fn visible_channels(&self) -> impl Iterator<Item = usize> + '_ {
        self.visible
            .iter()
            .enumerate()
            .filter(|(_, v)| **v)
            .map(|(i, _)| i)
    }

    /// Plot-ready series for `channel` under the current settings.
    pub fn series(&self, channel: usize) -> Result<Vec<AggregatedRecord>, SeriesError> {
        let Some(recording) = &self.recording else {
            return Ok(Vec::new());
        };
        downsample(
            &recording.matrix,
            channel,
            &self.settings.extract_options(),
            self.settings.roll_period,
        )
    }

    /// Persist the settings, keeping a failure in the status line.
    pub fn save_settings(&mut self) {
        if let Err(e) = self.settings.save(&ViewSettings::default_path()) {
            log::error!("Failed to save settings: {e:#}");
            self.status_message = Some(format!("Error: {e:#}"));
        }
    }

    fn sync_visible_channels(&mut self) {
        let Some(recording) = &self.recording else {
            return;
        };
        self.settings.visible_channels = if self.visible.iter().all(|v| *v) {
            Vec::new()
        } else {
            recording
                .channel_labels
                .iter()
                .zip(&self.visible)
                .filter(|(_, v)| **v)
                .map(|(label, _)| label.clone())
                .collect()
        };
    }
}
