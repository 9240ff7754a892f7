use serde::Deserialize;

use crate::error::{PlayerError, Result};

// Configuration for the player and its visualizations
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct VisualizerConfig {
    // Logical drawing surface
    pub canvas_width: f32,
    pub canvas_height: f32,

    // Analyser
    pub fft_size: u32,

    // Bars
    pub bar_count: usize,
    pub bar_height_ratio: f32,
    pub bar_gap: f32,
    pub bar_glow_blur: f32,

    // Wave
    pub wave_line_width: f32,
    pub wave_glow_blur: f32,

    // Particles
    pub particle_count: usize,
    pub particle_glow_blur: f32,

    // Playback defaults
    pub default_source: String,
    pub default_track_label: String,
    pub default_volume: u8,

    // Status line lifetimes in seconds
    pub validation_status_secs: f64,
    pub loaded_status_secs: f64,
    pub failure_status_secs: f64,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            canvas_width: 800.0,
            canvas_height: 400.0,

            fft_size: 256,

            bar_count: 64,
            bar_height_ratio: 0.8,
            bar_gap: 2.0,
            bar_glow_blur: 15.0,

            wave_line_width: 3.0,
            wave_glow_blur: 20.0,

            particle_count: 100,
            particle_glow_blur: 10.0,

            default_source: "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-1.mp3"
                .to_string(),
            default_track_label: "Demo Track".to_string(),
            default_volume: 70,

            validation_status_secs: 2.0,
            loaded_status_secs: 3.0,
            failure_status_secs: 6.0,
        }
    }
}

impl VisualizerConfig {
    /// Parse a (possibly partial) JSON override. Missing fields keep their
    /// defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.fft_size.is_power_of_two() || !(32..=32768).contains(&self.fft_size) {
            return Err(PlayerError::InvalidConfig(format!(
                "fft_size must be a power of two in 32..=32768, got {}",
                self.fft_size
            )));
        }
        if self.bar_count == 0 {
            return Err(PlayerError::InvalidConfig("bar_count must be non-zero".into()));
        }
        if !(self.canvas_width > 0.0 && self.canvas_height > 0.0) {
            return Err(PlayerError::InvalidConfig(format!(
                "canvas must have a positive size, got {}x{}",
                self.canvas_width, self.canvas_height
            )));
        }
        if self.default_volume > 100 {
            return Err(PlayerError::InvalidConfig(format!(
                "default_volume must be in 0..=100, got {}",
                self.default_volume
            )));
        }
        Ok(())
    }

    /// Number of magnitude bins the analyser produces per frame.
    pub fn frequency_bin_count(&self) -> usize {
        (self.fft_size / 2) as usize
    }

    /// Width over height of the drawing surface.
    pub fn aspect_ratio(&self) -> f32 {
        self.canvas_width / self.canvas_height
    }
}
