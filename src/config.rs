use crate::error::EngineError;
use crate::metric::MatchMethod;
use anyhow::Context;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How the final success counters are filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FinalTally {
    /// Final counters repeat the initial counters; recoveries are reported separately.
    #[default]
    InitialOnly,
    /// Final counters include samples confirmed during recovery.
    PostRecovery,
}

/// Decision parameters of the classification engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Largest shape distance still accepted as a match.
    pub threshold: f64,
    /// Maximum number of recovery rounds.
    pub max_retries: usize,
    pub final_tally: FinalTally,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threshold: 0.15,
            max_retries: 5,
            final_tally: FinalTally::InitialOnly,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.threshold.is_finite() || !(0.0..=1.0).contains(&self.threshold) {
            return Err(EngineError::InvalidConfig(format!(
                "threshold must be within [0, 1], got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

/// Parameters of the image to outline extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Downscale input images by `scale` before thresholding.
    pub resize: bool,
    pub scale: f32,
    /// Adaptive threshold neighbourhood (odd, in pixels).
    pub block_size: u32,
    /// Subtracted from the local Gaussian mean.
    pub offset: f32,
    pub blur_radius: u32,
    pub stroke_thickness: u8,
    /// Intensity of the drawn outline (the "output color").
    pub stroke_intensity: u8,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            resize: true,
            scale: 0.15,
            block_size: 11,
            offset: 11.0,
            blur_radius: 1,
            stroke_thickness: 8,
            stroke_intensity: 255,
        }
    }
}

impl ExtractorConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.block_size < 3 || self.block_size % 2 == 0 {
            return Err(EngineError::InvalidConfig(format!(
                "block_size must be odd and at least 3, got {}",
                self.block_size
            )));
        }
        if !(self.scale > 0.0 && self.scale <= 1.0) {
            return Err(EngineError::InvalidConfig(format!(
                "scale must be within (0, 1], got {}",
                self.scale
            )));
        }
        if self.stroke_intensity == 0 {
            return Err(EngineError::InvalidConfig(
                "stroke_intensity must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Everything a run needs: where the images are and how to treat them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_dir: PathBuf,
    pub gestures_dir: PathBuf,
    pub engine: EngineConfig,
    pub extractor: ExtractorConfig,
    /// Hu-moment matching method of the shape distance
    pub metric: MatchMethod,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_dir: "images/base".into(),
            gestures_dir: "images/gestures".into(),
            engine: EngineConfig::default(),
            extractor: ExtractorConfig::default(),
            metric: MatchMethod::default(),
        }
    }
}

impl AppConfig {
    /// Load a JSON configuration file; missing fields keep their defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: AppConfig = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        self.engine.validate()?;
        self.extractor.validate()
    }
}
