//! Shape distance between outlines.
//!
//! The engine only sees the [`ShapeDistance`] trait. The concrete metric compares the
//! seven Hu moment invariants of two outline drawings, which makes it insensitive to
//! translation, scale and rotation.

use crate::silhouette::Outline;
use clap::ValueEnum;
use image::GrayImage;
use serde::{Deserialize, Serialize};

/// Moment magnitudes at or below this are ignored when matching.
const MOMENT_EPS: f64 = 1e-5;

/// Weight of a foreground pixel in the raw moments
const FOREGROUND: f64 = 255.0;

/// Scalar dissimilarity between two outlines; 0 means identical, 1 is the ceiling.
pub trait ShapeDistance<O>: Sync {
    fn distance(&self, a: &O, b: &O) -> f64;
}

/// The seven Hu invariants of an image
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HuMoments(pub [f64; 7]);

impl HuMoments {
    /// Compute the invariants of the image's non-zero mask.
    ///
    /// Every foreground pixel weighs 255 regardless of its intensity, so the
    /// stroke colour of an outline drawing never reaches the moments.
    pub fn from_image(img: &GrayImage) -> Self {
        let mut m00 = 0.0;
        let mut m10 = 0.0;
        let mut m01 = 0.0;
        for (x, y, pixel) in img.enumerate_pixels() {
            if pixel[0] == 0 {
                continue;
            }
            let v = FOREGROUND;
            m00 += v;
            m10 += x as f64 * v;
            m01 += y as f64 * v;
        }

        if m00 == 0.0 {
            return Self::default();
        }

        let xc = m10 / m00;
        let yc = m01 / m00;

        let (mut mu20, mut mu11, mut mu02) = (0.0, 0.0, 0.0);
        let (mut mu30, mut mu21, mut mu12, mut mu03) = (0.0, 0.0, 0.0, 0.0);
        for (x, y, pixel) in img.enumerate_pixels() {
            if pixel[0] == 0 {
                continue;
            }
            let v = FOREGROUND;
            let dx = x as f64 - xc;
            let dy = y as f64 - yc;
            mu20 += dx * dx * v;
            mu11 += dx * dy * v;
            mu02 += dy * dy * v;
            mu30 += dx * dx * dx * v;
            mu21 += dx * dx * dy * v;
            mu12 += dx * dy * dy * v;
            mu03 += dy * dy * dy * v;
        }

        let s2 = m00.powi(2);
        let s3 = m00.powf(2.5);
        let (n20, n11, n02) = (mu20 / s2, mu11 / s2, mu02 / s2);
        let (n30, n21, n12, n03) = (mu30 / s3, mu21 / s3, mu12 / s3, mu03 / s3);

        let t0 = n30 + n12;
        let t1 = n21 + n03;
        let q0 = n30 - 3.0 * n12;
        let q1 = 3.0 * n21 - n03;

        let h0 = n20 + n02;
        let h1 = (n20 - n02).powi(2) + 4.0 * n11 * n11;
        let h2 = q0 * q0 + q1 * q1;
        let h3 = t0 * t0 + t1 * t1;
        let h4 = q0 * t0 * (t0 * t0 - 3.0 * t1 * t1) + q1 * t1 * (3.0 * t0 * t0 - t1 * t1);
        let h5 = (n20 - n02) * (t0 * t0 - t1 * t1) + 4.0 * n11 * t0 * t1;
        let h6 = q1 * t0 * (t0 * t0 - 3.0 * t1 * t1) - q0 * t1 * (3.0 * t0 * t0 - t1 * t1);

        HuMoments([h0, h1, h2, h3, h4, h5, h6])
    }
}

/// How per-invariant differences are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MatchMethod {
    /// Sum of differences of reciprocal log-moments
    I1,
    /// Sum of differences of log-moments
    #[default]
    I2,
    /// Largest relative difference of log-moments
    I3,
}

/// Hu-moment shape matcher
#[derive(Debug, Clone, Copy, Default)]
pub struct HuMomentMetric {
    pub method: MatchMethod,
}

impl HuMomentMetric {
    pub fn new(method: MatchMethod) -> Self {
        Self { method }
    }

    /// Compare two sets of invariants. The result saturates at 1.0.
    pub fn compare(&self, a: &HuMoments, b: &HuMoments) -> f64 {
        let mut result: f64 = 0.0;

        for (&ha, &hb) in a.0.iter().zip(b.0.iter()) {
            let (ama, amb) = (ha.abs(), hb.abs());
            if ama <= MOMENT_EPS || amb <= MOMENT_EPS {
                continue;
            }
            let la = ha.signum() * ama.log10();
            let lb = hb.signum() * amb.log10();

            match self.method {
                MatchMethod::I1 => result += (1.0 / la - 1.0 / lb).abs(),
                MatchMethod::I2 => result += (la - lb).abs(),
                MatchMethod::I3 => result = result.max(((la - lb) / la).abs()),
            }
        }

        result.clamp(0.0, 1.0)
    }
}

impl ShapeDistance<Outline> for HuMomentMetric {
    fn distance(&self, a: &Outline, b: &Outline) -> f64 {
        self.compare(a.hu(), b.hu())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn ring(size: u32, cx: f32, cy: f32, r: f32) -> GrayImage {
        GrayImage::from_fn(size, size, |x, y| {
            let d = ((x as f32 - cx).powi(2) + (y as f32 - cy).powi(2)).sqrt();
            if (d - r).abs() < 3.0 { Luma([255]) } else { Luma([0]) }
        })
    }

    fn frame(size: u32, x0: u32, x1: u32) -> GrayImage {
        GrayImage::from_fn(size, size, |x, y| {
            let inside = (x0..x1).contains(&x) && (x0..x1).contains(&y);
            let border = x < x0 + 4 || x + 4 >= x1 || y < x0 + 4 || y + 4 >= x1;
            if inside && border { Luma([255]) } else { Luma([0]) }
        })
    }

    #[test]
    fn test_identical_images_have_zero_distance() {
        let metric = HuMomentMetric::default();
        let hu = HuMoments::from_image(&ring(100, 50.0, 50.0, 30.0));
        assert_eq!(metric.compare(&hu, &hu), 0.0);
    }

    #[test]
    fn test_translation_invariance() {
        let metric = HuMomentMetric::default();
        let a = HuMoments::from_image(&ring(120, 40.0, 40.0, 25.0));
        let b = HuMoments::from_image(&ring(120, 75.0, 70.0, 25.0));
        assert!(metric.compare(&a, &b) < 0.01);
    }

    #[test]
    fn test_different_shapes_are_apart() {
        let metric = HuMomentMetric::default();
        let circle = HuMoments::from_image(&ring(100, 50.0, 50.0, 30.0));
        let square = HuMoments::from_image(&frame(100, 20, 80));
        assert!(metric.compare(&circle, &square) > 0.0);
    }

    #[test]
    fn test_foreground_intensity_is_ignored() {
        let bright = ring(100, 50.0, 50.0, 30.0);
        let mut dim = bright.clone();
        for pixel in dim.pixels_mut() {
            if pixel[0] > 0 {
                pixel[0] = 40;
            }
        }
        assert_eq!(HuMoments::from_image(&bright), HuMoments::from_image(&dim));
    }

    #[test]
    fn test_blank_image_has_no_moments() {
        assert_eq!(HuMoments::from_image(&GrayImage::new(8, 8)), HuMoments::default());
    }

    #[test]
    fn test_distance_saturates() {
        let metric = HuMomentMetric::new(MatchMethod::I2);
        let a = HuMoments([1e-1, 1e-2, 1e-3, 1e-3, 1e-4, 1e-4, 1e-4]);
        let b = HuMoments([1e-4, 1e-1, 1e-1, 1e-1, 1e-1, 1e-1, 1e-1]);
        assert_eq!(metric.compare(&a, &b), 1.0);
    }
}
