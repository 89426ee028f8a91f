use crate::pipeline::{MetadataValue, PipelineData, PipelineStep};
use crate::silhouette::{contours, preprocessing};
use anyhow::Result;
use image::DynamicImage;

/// Downscale the input image
pub struct ResizeStep {
    pub scale: f32,
}

impl PipelineStep for ResizeStep {
    fn process(&self, data: Vec<PipelineData>) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for item in data {
            let resized = preprocessing::resize(&item.image, self.scale);
            let new_item = PipelineData {
                image: resized,
                metadata: item.metadata,
            };
            result.push(new_item);
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Resize"
    }
}

/// Convert image to grayscale
pub struct GrayscaleStep;

impl PipelineStep for GrayscaleStep {
    fn process(&self, data: Vec<PipelineData>) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for item in data {
            let gray = preprocessing::to_grayscale(&item.image);
            let new_item = PipelineData {
                image: DynamicImage::ImageLuma8(gray),
                metadata: item.metadata,
            };
            result.push(new_item);
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Grayscale Conversion"
    }
}

/// Binarise against the local Gaussian mean
pub struct AdaptiveThresholdStep {
    pub block_size: u32,
    pub offset: f32,
}

impl PipelineStep for AdaptiveThresholdStep {
    fn process(&self, data: Vec<PipelineData>) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for item in data {
            let gray = item.image.to_luma8();
            let binary = preprocessing::adaptive_threshold(&gray, self.block_size, self.offset);
            let new_item = PipelineData {
                image: DynamicImage::ImageLuma8(binary),
                metadata: item.metadata,
            };
            result.push(new_item);
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Adaptive Threshold"
    }
}

/// Make edges the foreground
pub struct InvertStep;

impl PipelineStep for InvertStep {
    fn process(&self, data: Vec<PipelineData>) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for item in data {
            let gray = item.image.to_luma8();
            let new_item = PipelineData {
                image: DynamicImage::ImageLuma8(preprocessing::invert(&gray)),
                metadata: item.metadata,
            };
            result.push(new_item);
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Invert"
    }
}

/// Box blur to close small gaps in the edge mask
pub struct BlurStep {
    pub radius: u32,
}

impl PipelineStep for BlurStep {
    fn process(&self, data: Vec<PipelineData>) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for item in data {
            let gray = item.image.to_luma8();
            let blurred = preprocessing::apply_blur(&gray, self.radius);
            let new_item = PipelineData {
                image: DynamicImage::ImageLuma8(blurred),
                metadata: item.metadata,
            };
            result.push(new_item);
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Box Blur"
    }
}

/// Keep only the largest contour, redrawn as a thick stroke on black
/// Images without any contour are dropped
pub struct LargestContourStep {
    pub thickness: u8,
    pub intensity: u8,
}

impl PipelineStep for LargestContourStep {
    fn process(&self, data: Vec<PipelineData>) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();

        for item in data {
            let gray = item.image.to_luma8();
            let Some(silhouette) = contours::find_largest_contour(&gray) else {
                continue;
            };

            let drawing = contours::draw_contour(
                gray.width(),
                gray.height(),
                &silhouette.points,
                self.thickness,
                self.intensity,
            );

            let new_item = PipelineData {
                image: DynamicImage::ImageLuma8(drawing),
                metadata: item.metadata,
            }
            .with_metadata("contour_area", MetadataValue::Float(silhouette.area as f32))
            .with_metadata("contour_count", MetadataValue::Int(silhouette.contour_count as i32));

            result.push(new_item);
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        "Largest Contour"
    }
}
