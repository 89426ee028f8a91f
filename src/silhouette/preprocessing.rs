use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, Luma};
use imageproc::filter::{box_filter, gaussian_blur_f32};

/// Convert image to grayscale
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Scale an image by `scale` on both axes (bilinear)
pub fn resize(img: &DynamicImage, scale: f32) -> DynamicImage {
    let width = ((img.width() as f32 * scale).round() as u32).max(1);
    let height = ((img.height() as f32 * scale).round() as u32).max(1);
    img.resize_exact(width, height, FilterType::Triangle)
}

/// Sigma of the Gaussian window used for a given block size
pub fn gaussian_sigma(block_size: u32) -> f32 {
    0.3 * ((block_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Binary adaptive threshold against a Gaussian-weighted local mean
///
/// A pixel becomes white when it is brighter than `local_mean - offset`.
pub fn adaptive_threshold(img: &GrayImage, block_size: u32, offset: f32) -> GrayImage {
    let local_mean = gaussian_blur_f32(img, gaussian_sigma(block_size));

    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        let value = img.get_pixel(x, y)[0] as f32;
        let mean = local_mean.get_pixel(x, y)[0] as f32;
        if value > mean - offset {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Invert intensities
pub fn invert(img: &GrayImage) -> GrayImage {
    let mut inverted = img.clone();
    image::imageops::invert(&mut inverted);
    inverted
}

/// Smooth with a square box kernel of the given radius
pub fn apply_blur(img: &GrayImage, radius: u32) -> GrayImage {
    if radius == 0 {
        return img.clone();
    }
    box_filter(img, radius, radius)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gaussian_sigma_for_default_block() {
        assert!((gaussian_sigma(11) - 2.0).abs() < 1e-6);
        assert!((gaussian_sigma(3) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_adaptive_threshold_uniform_is_white() {
        let img = GrayImage::from_pixel(20, 20, Luma([90]));
        let binary = adaptive_threshold(&img, 11, 11.0);
        assert!(binary.pixels().all(|p| p[0] == 255));
    }

    #[test]
    fn test_adaptive_threshold_marks_dark_edge() {
        // Dark square on a bright background.
        let img = GrayImage::from_fn(40, 40, |x, y| {
            if (10..30).contains(&x) && (10..30).contains(&y) {
                Luma([20])
            } else {
                Luma([230])
            }
        });
        let binary = adaptive_threshold(&img, 11, 11.0);
        // Just inside the border the local mean is pulled up by the background.
        assert_eq!(binary.get_pixel(10, 20)[0], 0);
        // Far from any edge the image is uniform.
        assert_eq!(binary.get_pixel(0, 0)[0], 255);
        assert_eq!(binary.get_pixel(20, 20)[0], 255);
    }

    #[test]
    fn test_resize_scales_dimensions() {
        let img = DynamicImage::ImageLuma8(GrayImage::new(200, 100));
        let small = resize(&img, 0.15);
        assert_eq!((small.width(), small.height()), (30, 15));
    }

    #[test]
    fn test_invert() {
        let img = GrayImage::from_pixel(2, 2, Luma([0]));
        assert!(invert(&img).pixels().all(|p| p[0] == 255));
    }
}
