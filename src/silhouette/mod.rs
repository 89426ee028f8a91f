pub mod preprocessing;
pub mod contours;
pub mod steps;

use crate::config::ExtractorConfig;
use crate::error::ExtractError;
use crate::metric::HuMoments;
use crate::pipeline::Pipeline;
use image::{DynamicImage, GrayImage, ImageReader};
use log::debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A gesture outline: the largest contour of a silhouette, drawn on black.
///
/// Immutable once built. Cloning shares the drawing.
#[derive(Debug, Clone)]
pub struct Outline {
    drawing: Arc<GrayImage>,
    hu: HuMoments,
}

impl Outline {
    pub fn from_drawing(drawing: GrayImage) -> Self {
        let hu = HuMoments::from_image(&drawing);
        Self {
            drawing: Arc::new(drawing),
            hu,
        }
    }

    pub fn drawing(&self) -> &GrayImage {
        &self.drawing
    }

    pub fn hu(&self) -> &HuMoments {
        &self.hu
    }
}

/// What to extract and how
#[derive(Debug, Clone, Copy)]
pub struct ExtractRequest<'a> {
    /// Name used in logs and debug output
    pub identifier: &'a str,
    pub path: &'a Path,
    /// Whether the image needs scale normalisation first
    pub resize: bool,
}

/// Turns a raw image into an outline
pub trait SilhouetteExtractor: Sync {
    type Outline: Clone + Send + Sync;

    fn extract(&self, request: &ExtractRequest<'_>) -> Result<Self::Outline, ExtractError>;
}

/// Build the extraction pipeline: threshold, invert, blur, then keep the largest contour
pub fn build_extraction_pipeline(config: &ExtractorConfig, resize: bool) -> Pipeline {
    use self::steps::*;

    let mut pipeline = Pipeline::new();
    if resize {
        pipeline = pipeline.add_step(Arc::new(ResizeStep { scale: config.scale }));
    }

    pipeline
        .add_step(Arc::new(GrayscaleStep))
        .add_step(Arc::new(AdaptiveThresholdStep {
            block_size: config.block_size,
            offset: config.offset,
        }))
        .add_step(Arc::new(InvertStep))
        .add_step(Arc::new(BlurStep { radius: config.blur_radius }))
        .add_step(Arc::new(LargestContourStep {
            thickness: config.stroke_thickness,
            intensity: config.stroke_intensity,
        }))
}

/// Image-file extractor backed by the step pipeline
pub struct ImageSilhouetteExtractor {
    resized: Pipeline,
    unscaled: Pipeline,
}

impl ImageSilhouetteExtractor {
    pub fn new(config: &ExtractorConfig) -> Self {
        Self {
            resized: build_extraction_pipeline(config, true),
            unscaled: build_extraction_pipeline(config, false),
        }
    }

    /// Save every intermediate image under `output_dir/<identifier>/`
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> anyhow::Result<Self> {
        self.resized = self.resized.with_debug(output_dir.clone())?;
        self.unscaled = self.unscaled.with_debug(output_dir)?;
        Ok(self)
    }

    /// Extract from an already decoded image
    pub fn extract_image(
        &self,
        image: DynamicImage,
        identifier: &str,
        resize: bool,
    ) -> Result<Outline, ExtractError> {
        let pipeline = if resize { &self.resized } else { &self.unscaled };
        let mut results = pipeline.run(image, identifier)?;

        let item = results.pop().ok_or(ExtractError::NoSilhouette)?;
        debug!(
            "{}: silhouette area {:.1} from {} contours",
            identifier,
            item.get_float("contour_area").unwrap_or(0.0),
            item.get_int("contour_count").unwrap_or(0)
        );

        Ok(Outline::from_drawing(item.image.to_luma8()))
    }
}

impl SilhouetteExtractor for ImageSilhouetteExtractor {
    type Outline = Outline;

    fn extract(&self, request: &ExtractRequest<'_>) -> Result<Outline, ExtractError> {
        let image = ImageReader::open(request.path)
            .map_err(image::ImageError::IoError)?
            .with_guessed_format()
            .map_err(image::ImageError::IoError)?
            .decode()?;

        self.extract_image(image, request.identifier, request.resize)
    }
}
