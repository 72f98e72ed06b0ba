//! Application Configuration
//!
//! Pipeline settings stored in TOML format.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::render::HighlightOptions;
use crate::vision::lines::DEFAULT_LINE_THRESHOLD_FACTOR;

/// Application settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Line reconstruction settings
    pub text: TextConfig,
    /// Outline drawing settings
    pub highlight: HighlightConfig,
    /// Display sizing settings
    pub display: DisplayConfig,
}

impl AppConfig {
    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        let factor = self.text.line_threshold_factor;
        if !factor.is_finite() || factor < 0.0 {
            bail!(
                "text.line_threshold_factor must be finite and non-negative, got {}",
                self.text.line_threshold_factor
            );
        }
        if self.highlight.line_thickness <= 0 {
            bail!(
                "highlight.line_thickness must be positive, got {}",
                self.highlight.line_thickness
            );
        }
        if self.display.target_width == 0 {
            bail!("display.target_width must be positive");
        }
        Ok(())
    }

    /// Outline options for the annotation renderer
    pub fn highlight_options(&self) -> HighlightOptions {
        HighlightOptions {
            line_color: self.highlight.line_color,
            line_thickness: self.highlight.line_thickness,
        }
    }
}

/// Line reconstruction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Line merge threshold as a fraction of the average text height
    pub line_threshold_factor: f64,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            line_threshold_factor: DEFAULT_LINE_THRESHOLD_FACTOR,
        }
    }
}

/// Outline drawing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Outline color as [R, G, B]
    pub line_color: [u8; 3],
    /// Outline stroke width in pixels
    pub line_thickness: i32,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        let options = HighlightOptions::default();
        Self {
            line_color: options.line_color,
            line_thickness: options.line_thickness,
        }
    }
}

/// Display sizing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Width the texture is shown at; height follows the image aspect ratio
    pub target_width: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { target_width: 800 }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Load `config.toml` from the config directory, or fall back to defaults
pub fn load_or_default() -> AppConfig {
    if let Ok(config_dir) = crate::storage::get_config_dir() {
        let config_path = config_dir.join("config.toml");
        if config_path.exists() {
            match load_config(&config_path) {
                Ok(config) => {
                    info!("Loaded configuration from {:?}", config_path);
                    return config;
                }
                Err(e) => tracing::warn!("Ignoring {:?}: {}", config_path, e),
            }
        }
    }
    info!("Using default configuration");
    AppConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_app_config() {
        let config = AppConfig::default();

        assert!((config.text.line_threshold_factor - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.highlight.line_color, [0, 255, 0]);
        assert_eq!(config.highlight.line_thickness, 2);
        assert_eq!(config.display.target_width, 800);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let mut config = AppConfig::default();
        config.highlight.line_color = [255, 0, 0];
        config.display.target_width = 1024;

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: AppConfig = toml::from_str("[highlight]\nline_thickness = 4\n").unwrap();

        assert_eq!(parsed.highlight.line_thickness, 4);
        assert_eq!(parsed.highlight.line_color, [0, 255, 0]);
        assert_eq!(parsed.display.target_width, 800);
    }

    #[test]
    fn test_load_config() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[text]\nline_threshold_factor = 0.75").unwrap();

        let loaded = load_config(temp_file.path()).unwrap();
        assert!((loaded.text.line_threshold_factor - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "this is not valid toml {{{{").unwrap();

        let result = load_config(temp_file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_rejects_zero_thickness() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[highlight]\nline_thickness = 0").unwrap();

        let result = load_config(temp_file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_threshold_factor() {
        let mut config = AppConfig::default();
        config.text.line_threshold_factor = 0.0;
        assert!(config.validate().is_ok());

        config.text.line_threshold_factor = -0.5;
        assert!(config.validate().is_err());

        config.text.line_threshold_factor = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_highlight_options() {
        let mut config = AppConfig::default();
        config.highlight.line_thickness = 5;

        let options = config.highlight_options();
        assert_eq!(options.line_thickness, 5);
        assert_eq!(options.line_color, [0, 255, 0]);
    }
}
