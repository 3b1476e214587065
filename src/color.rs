use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Channel colours
// ---------------------------------------------------------------------------

/// One line colour per channel, plus a translucent variant for its band.
#[derive(Debug, Clone, Default)]
pub struct ChannelColors {
    colors: Vec<Color32>,
}

impl ChannelColors {
    pub fn new(channel_count: usize) -> Self {
        Self {
            colors: generate_palette(channel_count),
        }
    }

    /// Line colour for `channel`; grey if the index is unknown.
    pub fn line(&self, channel: usize) -> Color32 {
        self.colors.get(channel).copied().unwrap_or(Color32::GRAY)
    }

    /// Faded colour for the band edges of `channel`.
    pub fn band(&self, channel: usize) -> Color32 {
        self.line(channel).gamma_multiply(0.35)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_distinct_colours() {
        let p = generate_palette(4);
        assert_eq!(p.len(), 4);
        assert_ne!(p[0], p[1]);
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn unknown_channel_is_grey() {
        let colors = ChannelColors::new(2);
        assert_eq!(colors.line(5), Color32::GRAY);
        assert_ne!(colors.band(0), colors.line(0));
    }
}
