use image::DynamicImage;
use std::sync::Arc;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use anyhow::Result;
use log::debug;

/// Data that flows through the pipeline
/// Each PipelineData is one stage of a single image on its way to an outline
#[derive(Clone)]
pub struct PipelineData {
    /// The image data (color at the start, grayscale after the first step)
    pub image: DynamicImage,

    /// Metadata for tracking properties (e.g., "contour_area", "contour_count")
    pub metadata: HashMap<String, MetadataValue>,
}

/// Metadata value types
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Float(f32),
    Int(i32),
}

impl PipelineData {
    /// Create PipelineData for a full image
    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            image,
            metadata: HashMap::new(),
        }
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: MetadataValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Get metadata as float
    pub fn get_float(&self, key: &str) -> Option<f32> {
        match self.metadata.get(key) {
            Some(MetadataValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    /// Get metadata as int
    pub fn get_int(&self, key: &str) -> Option<i32> {
        match self.metadata.get(key) {
            Some(MetadataValue::Int(v)) => Some(*v),
            _ => None,
        }
    }
}

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
}

/// Trait that all pipeline steps must implement
pub trait PipelineStep: Send + Sync {
    /// Process data and return transformed data
    /// Steps can transform (one → one) or filter (one → none)
    fn process(&self, data: Vec<PipelineData>) -> Result<Vec<PipelineData>>;

    /// Human-readable name for this step (used in logs and debug folders)
    fn name(&self) -> &str;
}

/// Composable pipeline builder
#[derive(Clone)]
pub struct Pipeline {
    steps: Vec<Arc<dyn PipelineStep>>,
    debug: Option<DebugConfig>,
}

impl Pipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            debug: None,
        }
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(anyhow::anyhow!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                ));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        self.debug = Some(DebugConfig { output_dir });

        Ok(self)
    }

    /// Add a processing step to the pipeline
    pub fn add_step(mut self, step: Arc<dyn PipelineStep>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run the pipeline sequentially on an input image
    ///
    /// `tag` names the debug sub-directory for this run (usually the sample identifier).
    pub fn run(&self, input: DynamicImage, tag: &str) -> Result<Vec<PipelineData>> {
        let debug_dir = self.debug.as_ref().map(|d| d.output_dir.join(tag));

        if let Some(dir) = &debug_dir {
            save_debug_images(dir, "00_input", &[PipelineData::from_image(input.clone())])?;
        }

        let mut data = vec![PipelineData::from_image(input)];

        for (step_idx, step) in self.steps.iter().enumerate() {
            debug!("{}: running step {} ({} items)", tag, step.name(), data.len());

            data = step.process(data)?;

            if let Some(dir) = &debug_dir {
                let step_dir_name = format!("{:02}_{}", step_idx + 1,
                    step.name().to_lowercase().replace(' ', "_"));
                save_debug_images(dir, &step_dir_name, &data)?;
            }

            if data.is_empty() {
                debug!("{}: step {} left nothing to process", tag, step.name());
                break;
            }
        }

        Ok(data)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

fn save_debug_images(dir: &Path, stem: &str, data: &[PipelineData]) -> Result<()> {
    std::fs::create_dir_all(dir)?;

    for (idx, item) in data.iter().enumerate() {
        let filename = if data.len() == 1 {
            format!("{}.png", stem)
        } else {
            format!("{}-{:02}.png", stem, idx + 1)
        };
        let output_path = dir.join(&filename);
        item.image.save(&output_path)
            .map_err(|e| anyhow::anyhow!("Failed to save debug image: {}", e))?;
        debug!("Debug: saved {}", output_path.display());
    }

    Ok(())
}
