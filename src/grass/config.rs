//! Grass blade settings (user-facing, JSON-loadable).
//!
//! Settings are fixed for one initialization cycle. Changing them requires
//! tearing the buffer set down and building it again.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::types::Result;

/// Blade shape and wind settings handed to the blade kernel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrassSettings {
    /// Blade tessellation level. Values below 1 are treated as 1.
    pub max_segments: i32,
    /// Maximum random forward bend, as a fraction of 90 degrees.
    pub max_bend_angle: f32,
    /// Exponent shaping how the bend accumulates toward the tip.
    pub blade_curvature: f32,
    pub blade_height: f32,
    pub blade_height_variance: f32,
    pub blade_width: f32,
    pub blade_width_variance: f32,
    /// Optional wind noise image. A procedural tile is used when absent.
    pub wind_noise_texture: Option<PathBuf>,
    /// World-position multiplier for wind texture lookups (`_WindTexMult`).
    pub wind_texture_scale: f32,
    /// Time multiplier for wind animation (`_WindTimeMult`).
    pub wind_period: f32,
    /// Position multiplier for the wind phase (`_WindPosMult`).
    pub wind_scale: f32,
    pub wind_amplitude: f32,
    /// Wind heading in degrees around the blade's up axis.
    pub wind_direction_angle: f32,
}

impl Default for GrassSettings {
    fn default() -> Self {
        Self {
            max_segments: 3,
            max_bend_angle: 0.0,
            blade_curvature: 1.0,
            blade_height: 1.0,
            blade_height_variance: 0.1,
            blade_width: 1.0,
            blade_width_variance: 0.1,
            wind_noise_texture: None,
            wind_texture_scale: 1.0,
            wind_period: 1.0,
            wind_scale: 1.0,
            wind_amplitude: 0.0,
            wind_direction_angle: 0.0,
        }
    }
}

impl GrassSettings {
    /// Tessellation level clamped to at least one segment
    pub fn max_blade_segments(&self) -> u32 {
        self.max_segments.max(1) as u32
    }

    /// Largest distance a blade can reach from its root, used to pad bounds
    pub fn max_blade_extent(&self) -> f32 {
        (self.blade_height + self.blade_height_variance)
            .max(self.blade_width + self.blade_width_variance)
    }

    /// Load settings from a JSON file. Missing fields take their defaults.
    pub fn load_json(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Save settings as pretty-printed JSON
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
