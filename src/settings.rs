//! Job settings, as supplied by the caller (JSON from JS, or built in Rust).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CamError, Result};
use crate::gcode::PostProcessor;
use crate::tool::Tool;

/// Smallest accepted step-over fraction.
pub const MIN_STEP_OVER: f64 = 0.1;
/// Largest accepted step-over fraction.
pub const MAX_STEP_OVER: f64 = 0.9;

/// Per-layer toolpath pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Follow the sliced contour of every layer.
    #[default]
    Parallel,
    /// Archimedean spiral growing outward layer by layer.
    Spiral,
    /// Perimeter tracing with path-length ordering. Not implemented:
    /// selecting it produces a program without layer blocks.
    Contour,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parallel => write!(f, "parallel"),
            Self::Spiral => write!(f, "spiral"),
            Self::Contour => write!(f, "contour"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CamSettings {
    /// Cutter diameter (mm).
    #[serde(default = "default_tool_diameter")]
    pub tool_diameter: f64,
    /// Lateral overlap between passes, as a fraction.
    #[serde(default = "default_step_over")]
    pub step_over: f64,
    /// Layer height (mm).
    #[serde(default = "default_step_down")]
    pub step_down: f64,
    /// Spindle speed (rpm).
    #[serde(default = "default_spindle_speed")]
    pub spindle_speed: u32,
    /// Retract height for non-cutting moves (mm).
    #[serde(default = "default_safe_height")]
    pub safe_height: f64,
    /// Cutting feed (mm/min).
    #[serde(default = "default_feed_rate")]
    pub feed_rate: f64,
    /// Plunge feed (mm/min).
    #[serde(default = "default_plunge_rate")]
    pub plunge_rate: f64,
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default)]
    pub post_processor: PostProcessor,
    /// Offset sliced contours outward by the tool radius.
    #[serde(default = "default_tool_compensation")]
    pub tool_compensation: bool,
}

fn default_tool_diameter() -> f64 {
    3.175
}
fn default_step_over() -> f64 {
    0.5
}
fn default_step_down() -> f64 {
    1.0
}
fn default_spindle_speed() -> u32 {
    10_000
}
fn default_safe_height() -> f64 {
    5.0
}
fn default_feed_rate() -> f64 {
    1000.0
}
fn default_plunge_rate() -> f64 {
    300.0
}
fn default_tool_compensation() -> bool {
    true
}

impl Default for CamSettings {
    fn default() -> Self {
        Self {
            tool_diameter: default_tool_diameter(),
            step_over: default_step_over(),
            step_down: default_step_down(),
            spindle_speed: default_spindle_speed(),
            safe_height: default_safe_height(),
            feed_rate: default_feed_rate(),
            plunge_rate: default_plunge_rate(),
            strategy: Strategy::default(),
            post_processor: PostProcessor::default(),
            tool_compensation: default_tool_compensation(),
        }
    }
}

impl CamSettings {
    /// Check every numeric parameter. Generation must not start unless
    /// this returns `Ok`.
    pub fn validate(&self) -> Result<()> {
        let floats = [
            ("tool_diameter", self.tool_diameter),
            ("step_over", self.step_over),
            ("step_down", self.step_down),
            ("safe_height", self.safe_height),
            ("feed_rate", self.feed_rate),
            ("plunge_rate", self.plunge_rate),
        ];
        if let Some((name, _)) = floats.iter().find(|(_, v)| !v.is_finite()) {
            return Err(CamError::InvalidSettings(format!(
                "{name} must be a finite number"
            )));
        }
        if self.tool_diameter <= 0.0 {
            return Err(CamError::InvalidSettings(
                "tool_diameter must be positive".into(),
            ));
        }
        if !(MIN_STEP_OVER..=MAX_STEP_OVER).contains(&self.step_over) {
            return Err(CamError::InvalidSettings(format!(
                "step_over must be between {MIN_STEP_OVER} and {MAX_STEP_OVER}"
            )));
        }
        if self.step_down <= 0.0 {
            return Err(CamError::InvalidSettings(
                "step_down must be positive".into(),
            ));
        }
        if self.feed_rate <= 0.0 || self.plunge_rate <= 0.0 {
            return Err(CamError::InvalidSettings(
                "feed_rate and plunge_rate must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn tool(&self) -> Tool {
        Tool::new(self.tool_diameter)
    }
}
