use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bands::BandScale;
use crate::error::{DulqError, Result};
use crate::interpolate::{Method, Resolution};

/// Output canvas size used when no background image is supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Default for Canvas {
    fn default() -> Self {
        Self { width: 800, height: 640 }
    }
}

/// Everything that shapes a heatmap besides the readings themselves.
/// Every field has a default, so a config file only needs the overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapConfig {
    pub resolution: Resolution,
    pub method: Method,
    pub bands: BandScale,
    /// Opacity of the band colours over the background, 0-1.
    pub overlay_alpha: f32,
    pub canvas: Canvas,
    pub grid_line_color: [u8; 3],
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            resolution: Resolution::default(),
            method: Method::Cubic,
            bands: BandScale::default(),
            overlay_alpha: 0.9,
            canvas: Canvas::default(),
            grid_line_color: [0, 0, 0],
        }
    }
}

impl HeatmapConfig {
    /// Read a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.overlay_alpha) {
            return Err(DulqError::InvalidConfig(format!(
                "overlay_alpha must be within [0, 1], got {}",
                self.overlay_alpha
            )));
        }
        if self.resolution.x < 2 || self.resolution.y < 2 {
            return Err(DulqError::InvalidConfig(format!(
                "resolution must be at least 2×2, got {}×{}",
                self.resolution.x, self.resolution.y
            )));
        }
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(DulqError::InvalidConfig("canvas must not be empty".into()));
        }
        Ok(())
    }
}
