use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::{BexError, Result, Viewport};

/// Engine tunables, loadable from a TOML file.
///
/// Every knob has a default; a config file only needs the sections it
/// overrides. CLI flags override the file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub viewport: Viewport,
    pub timeouts: Timeouts,
    pub extraction: ExtractionConfig,
    pub fetch: FetchConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    #[serde(with = "humantime_serde")]
    pub navigation: Duration,
    #[serde(with = "humantime_serde")]
    pub network_idle: Duration,
    #[serde(with = "humantime_serde")]
    pub process: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            navigation: crate::browser::DEFAULT_NAVIGATION_TIMEOUT,
            network_idle: crate::browser::DEFAULT_NETWORK_IDLE_TIMEOUT,
            process: crate::browser::DEFAULT_PROCESS_TIMEOUT,
        }
    }
}

/// Knobs for the visual and palette extraction stages.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Number of fixed-width hue bins across the 360 degree wheel.
    pub hue_bins: u32,
    /// Bins with mean saturation below this are treated as grayscale.
    pub grayscale_saturation_cutoff: f32,
    /// Bins darker than this lightness are treated as near-black.
    pub min_lightness: f32,
    /// Bins lighter than this lightness are treated as near-white.
    pub max_lightness: f32,
    /// Pixel sampling stride for screenshots and images.
    pub sample_stride: u32,
    pub max_palette: usize,
    pub max_dom_colors_per_category: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            hue_bins: 12,
            grayscale_saturation_cutoff: 0.15,
            min_lightness: 0.08,
            max_lightness: 0.97,
            sample_stride: 4,
            max_palette: 8,
            max_dom_colors_per_category: 5,
        }
    }
}

/// Limits for fetching linked images (the image-only sibling path).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    pub max_image_bytes: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_image_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Loads config from a TOML file, or returns defaults when no path is
    /// given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|e| {
            BexError::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&raw).map_err(|e| {
            BexError::Config(format!("Invalid config {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let ex = &self.extraction;
        if ex.hue_bins == 0 || ex.hue_bins > 360 {
            return Err(BexError::Config(format!(
                "hue_bins must be in 1..=360, got {}",
                ex.hue_bins
            )));
        }
        if !(0.0..=1.0).contains(&ex.grayscale_saturation_cutoff) {
            return Err(BexError::Config(
                "grayscale_saturation_cutoff must be within [0, 1]".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&ex.min_lightness)
            || !(0.0..=1.0).contains(&ex.max_lightness)
            || ex.min_lightness >= ex.max_lightness
        {
            return Err(BexError::Config(
                "lightness bounds must satisfy 0 <= min < max <= 1".to_string(),
            ));
        }
        if ex.sample_stride == 0 {
            return Err(BexError::Config("sample_stride must be positive".to_string()));
        }
        if ex.max_palette == 0 {
            return Err(BexError::Config("max_palette must be positive".to_string()));
        }
        Ok(())
    }
}
