use std::fs;
use std::path::Path;

use image::Rgb;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::canvas::{DEFAULT_BACKGROUND, DEFAULT_COLOR, DEFAULT_HEIGHT, DEFAULT_THICKNESS, DEFAULT_WIDTH};
use crate::error::CanvasError;
use crate::history::DEFAULT_MAX_DEPTH;
use crate::tools::{DEFAULT_BLUR_STRENGTH, DEFAULT_ERASER_SIZE, ToolSettings};
use crate::viewport::MIN_ZOOM;

/// Errors that can occur while loading a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(#[from] CanvasError),

    #[error("Invalid config: {0}")]
    InvalidValue(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Startup parameters of the editor. Every field has a default, so a
/// partial JSON document is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub width: u32,
    pub height: u32,
    pub background: [u8; 3],
    pub color: [u8; 3],
    pub thickness: i32,
    pub opacity: f32,
    pub max_undo_depth: usize,
    pub min_zoom: f32,
    /// Multiplier used by the zoom in/out helpers
    pub zoom_step: f32,
    /// Viewport size; defaults to the canvas size
    pub view_width: Option<u32>,
    pub view_height: Option<u32>,
    /// Save an undo checkpoint at the start of every stroke
    pub checkpoint_each_stroke: bool,
    pub blur_strength: i32,
    pub eraser_size: i32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            background: DEFAULT_BACKGROUND.0,
            color: DEFAULT_COLOR.0,
            thickness: DEFAULT_THICKNESS,
            opacity: 1.0,
            max_undo_depth: DEFAULT_MAX_DEPTH,
            min_zoom: MIN_ZOOM,
            zoom_step: 1.25,
            view_width: None,
            view_height: None,
            checkpoint_each_stroke: false,
            blur_strength: DEFAULT_BLUR_STRENGTH,
            eraser_size: DEFAULT_ERASER_SIZE,
        }
    }
}

impl EditorConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CanvasError::InvalidDimensions {
                width: self.width,
                height: self.height,
            }
            .into());
        }
        if self.thickness < 1 {
            return Err(CanvasError::InvalidThickness(self.thickness).into());
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(CanvasError::InvalidOpacity(self.opacity).into());
        }
        if self.eraser_size < 1 {
            return Err(CanvasError::InvalidEraserSize(self.eraser_size).into());
        }
        if self.blur_strength < 1 {
            return Err(CanvasError::InvalidBlurStrength(self.blur_strength).into());
        }
        if self.max_undo_depth == 0 {
            return Err(ConfigError::InvalidValue("max_undo_depth must be at least 1".into()));
        }
        if !(self.min_zoom.is_finite() && self.min_zoom > 0.0) {
            return Err(ConfigError::InvalidValue(format!(
                "min_zoom must be positive, got {}",
                self.min_zoom
            )));
        }
        if !(self.zoom_step.is_finite() && self.zoom_step > 1.0) {
            return Err(ConfigError::InvalidValue(format!(
                "zoom_step must be greater than 1, got {}",
                self.zoom_step
            )));
        }
        if self.view_width == Some(0) || self.view_height == Some(0) {
            return Err(ConfigError::InvalidValue("view size must be positive".into()));
        }
        Ok(())
    }

    pub fn background_color(&self) -> Rgb<u8> {
        Rgb(self.background)
    }

    pub fn draw_color(&self) -> Rgb<u8> {
        Rgb(self.color)
    }

    /// Viewport size, falling back to the canvas size
    pub fn view_size(&self) -> (u32, u32) {
        (
            self.view_width.unwrap_or(self.width),
            self.view_height.unwrap_or(self.height),
        )
    }

    pub fn tool_settings(&self) -> ToolSettings {
        ToolSettings {
            eraser_size: self.eraser_size,
            blur_strength: self.blur_strength,
            brush_seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!((config.width, config.height), (800, 600));
        assert_eq!(config.background, [255, 255, 255]);
        assert_eq!(config.max_undo_depth, 50);
        assert_eq!(config.view_size(), (800, 600));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EditorConfig::from_json(r#"{"width": 320, "view_width": 200}"#).unwrap();
        assert_eq!(config.width, 320);
        assert_eq!(config.height, 600);
        assert_eq!(config.view_size(), (200, 600));
        assert_eq!(config.eraser_size, 10);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            EditorConfig::from_json(r#"{"thickness": 0}"#),
            Err(ConfigError::Invalid(CanvasError::InvalidThickness(0)))
        ));
        assert!(matches!(
            EditorConfig::from_json(r#"{"opacity": 1.5}"#),
            Err(ConfigError::Invalid(CanvasError::InvalidOpacity(_)))
        ));
        assert!(matches!(
            EditorConfig::from_json(r#"{"zoom_step": 0.5}"#),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(EditorConfig::from_json("{"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            EditorConfig::load("/definitely/not/here.json"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = EditorConfig::default();
        config.checkpoint_each_stroke = true;
        let json = config.to_json().unwrap();
        assert_eq!(EditorConfig::from_json(&json).unwrap(), config);
    }
}
