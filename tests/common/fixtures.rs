use handshape::{BaseExemplars, Batch, Engine, EngineConfig, RunOutcome, Sample, ShapeDistance};
use image::{GrayImage, Luma};
use std::collections::HashMap;
use std::path::Path;

/// Distance looked up from a table keyed by outline names.
/// Identical names are 0 apart; pairs missing from the table are 1 apart.
#[derive(Default)]
pub struct TableMetric {
    distances: HashMap<(String, String), f64>,
}

impl TableMetric {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a symmetric distance
    pub fn with(mut self, a: &str, b: &str, distance: f64) -> Self {
        self.distances.insert((a.to_string(), b.to_string()), distance);
        self.distances.insert((b.to_string(), a.to_string()), distance);
        self
    }
}

impl ShapeDistance<String> for TableMetric {
    fn distance(&self, a: &String, b: &String) -> f64 {
        if a == b {
            return 0.0;
        }
        self.distances
            .get(&(a.clone(), b.clone()))
            .copied()
            .unwrap_or(1.0)
    }
}

/// Base exemplars whose outlines are named "paper", "rock" and "scissors"
pub fn named_base() -> BaseExemplars<String> {
    BaseExemplars {
        paper: "paper".to_string(),
        rock: "rock".to_string(),
        scissors: "scissors".to_string(),
    }
}

/// A sample whose outline is named after its identifier
pub fn named_sample(identifier: &str) -> Sample<String> {
    Sample::new(identifier, identifier.to_string())
}

pub fn named_batch(identifiers: &[&str]) -> Batch<String> {
    Batch::new(identifiers.iter().map(|id| named_sample(id)).collect())
}

pub fn run_table(
    config: EngineConfig,
    metric: TableMetric,
    batch: Batch<String>,
) -> RunOutcome<String> {
    Engine::new(config, metric, named_base())
        .expect("valid engine config")
        .run(batch)
        .expect("engine run succeeds")
}

/// Dark shape on a bright background, drawn where `inside` holds
pub fn shape_image(size: u32, inside: impl Fn(f32, f32) -> bool) -> GrayImage {
    GrayImage::from_fn(size, size, |x, y| {
        if inside(x as f32, y as f32) {
            Luma([25u8])
        } else {
            Luma([225u8])
        }
    })
}

pub fn disc(size: u32) -> GrayImage {
    let c = size as f32 / 2.0;
    let r = size as f32 * 0.3;
    shape_image(size, |x, y| (x - c).powi(2) + (y - c).powi(2) < r * r)
}

pub fn square(size: u32) -> GrayImage {
    let lo = size as f32 * 0.2;
    let hi = size as f32 * 0.8;
    shape_image(size, |x, y| x >= lo && x < hi && y >= lo && y < hi)
}

pub fn wedge(size: u32) -> GrayImage {
    let s = size as f32;
    shape_image(size, |x, y| {
        let left = (x - (0.3 * s + 0.25 * (y - 0.15 * s))).abs() < 0.08 * s;
        let right = (x - (0.7 * s - 0.25 * (y - 0.15 * s))).abs() < 0.08 * s;
        y > 0.15 * s && y < 0.85 * s && (left || right)
    })
}

pub fn save_png(image: &GrayImage, path: &Path) {
    image
        .save_with_format(path, image::ImageFormat::Png)
        .expect("Failed to save test image");
}
