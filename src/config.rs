//! Configuration for the GHSOM inspection tools.

use crate::error::{InspectError, Result};
use crate::render::Colormap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Raster rendering configuration.
    #[serde(default)]
    pub render: RenderConfig,

    /// Label overlay configuration.
    #[serde(default)]
    pub overlay: OverlayConfig,

    /// Interactive session configuration.
    #[serde(default)]
    pub session: SessionConfig,
}

impl Config {
    /// Loads a configuration from a JSON file.
    ///
    /// Missing sections fall back to their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(InspectError::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.render.scale == 0 {
            return Err(InspectError::Config("render.scale must be at least 1".to_string()));
        }
        if self.overlay.marker_scale.is_nan() || self.overlay.marker_scale <= 0.0 {
            return Err(InspectError::Config(
                "overlay.marker_scale must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Raster rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Nearest-neighbour upscale factor applied to the weight image.
    /// Default: 8.
    pub scale: u32,

    /// Colormap used to turn weight values into pixels.
    /// Default: reversed bone.
    pub colormap: Colormap,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            scale: 8,
            colormap: Colormap::BoneReversed,
        }
    }
}

/// Label overlay configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Draw one marker per labelled data point.
    /// Default: true.
    pub enabled: bool,

    /// Multiplier on the grid-dependent marker size.
    /// Default: 1.0.
    pub marker_scale: f64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            marker_scale: 1.0,
        }
    }
}

/// Interactive session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Directory receiving one PNG per opened view.
    /// Default: "views".
    pub output_dir: PathBuf,

    /// Print a prompt before reading each command.
    /// Default: true.
    pub prompt: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("views"),
            prompt: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.render.scale, 8);
        assert_eq!(config.render.colormap, Colormap::BoneReversed);
        assert!(config.overlay.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"render": {{"scale": 4, "colormap": "viridis"}}}}"#).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.render.scale, 4);
        assert_eq!(config.render.colormap, Colormap::Viridis);
        assert_eq!(config.session.output_dir, PathBuf::from("views"));
    }

    #[test]
    fn test_zero_scale_rejected() {
        let mut config = Config::default();
        config.render.scale = 0;
        assert!(matches!(config.validate(), Err(InspectError::Config(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = Config::from_file("/nonexistent/ghsom-config.json");
        assert!(matches!(result, Err(InspectError::Config(_))));
    }
}
