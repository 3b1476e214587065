//! Viewer settings persisted as JSON next to the working directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use rusty_trace::data::{AxisMode, ExtractOptions, UnreadableCenter};

pub const SETTINGS_FILE: &str = "rusty-trace.json";

/// Caller-side choices the downsampling core takes as parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    /// Trailing window length, in rows.
    pub roll_period: usize,
    pub axis: AxisMode,
    pub unreadable_center: UnreadableCenter,
    /// Target points per channel used to suggest a roll period.
    pub max_points_per_channel: usize,
    /// Channel labels to show; empty means all.
    pub visible_channels: Vec<String>,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            roll_period: 1,
            axis: AxisMode::Linear,
            unreadable_center: UnreadableCenter::Null,
            max_points_per_channel: 2000,
            visible_channels: Vec::new(),
        }
    }
}

impl ViewSettings {
    pub fn default_path() -> PathBuf {
        PathBuf::from(SETTINGS_FILE)
    }

    /// Read settings from `path`; missing or broken files fall back to defaults.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("Ignoring settings file {}: {e:#}", path.display());
                Self::default()
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).context("reading settings file")?;
        let mut settings: Self = serde_json::from_str(&text).context("parsing settings JSON")?;
        settings.roll_period = settings.roll_period.max(1);
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self).context("serializing settings")?;
        std::fs::write(path, text)
            .with_context(|| format!("writing settings to {}", path.display()))
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions::new(self.axis).with_unreadable_center(self.unreadable_center)
    }

    /// Roll period that brings `rows` down to about `max_points_per_channel`.
    pub fn suggested_roll_period(&self, rows: usize) -> usize {
        let target = self.max_points_per_channel.max(1);
        rows.div_ceil(target).max(1)
    }
}
