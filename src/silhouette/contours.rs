use image::{GrayImage, Luma};
use imageproc::contours::find_contours;
use imageproc::distance_transform::Norm;
use imageproc::drawing::draw_line_segment_mut;
use imageproc::morphology::dilate_mut;
use imageproc::point::Point;

/// The dominant contour of a binary image
#[derive(Debug, Clone)]
pub struct Silhouette {
    pub points: Vec<Point<i32>>,
    pub area: f64,
    /// Number of contours the image contained
    pub contour_count: usize,
}

/// Polygon area enclosed by a closed contour (shoelace formula)
pub fn contour_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let twice_area: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
        .sum();

    (twice_area as f64 / 2.0).abs()
}

/// Find every border in the image (non-zero pixels are foreground) and keep the largest
///
/// The first contour wins ties, so an image whose contours are all degenerate
/// still yields its first one. Returns `None` when the image has no foreground.
pub fn find_largest_contour(binary: &GrayImage) -> Option<Silhouette> {
    let contours = find_contours::<i32>(binary);
    let contour_count = contours.len();

    let mut largest: Option<(usize, f64)> = None;
    for (idx, contour) in contours.iter().enumerate() {
        let area = contour_area(&contour.points);
        match largest {
            Some((_, best)) if area <= best => {}
            _ => largest = Some((idx, area)),
        }
    }

    let (idx, area) = largest?;
    let points = contours.into_iter().nth(idx)?.points;

    Some(Silhouette {
        points,
        area,
        contour_count,
    })
}

/// Draw a closed contour with the given stroke onto a black canvas
pub fn draw_contour(
    width: u32,
    height: u32,
    points: &[Point<i32>],
    thickness: u8,
    intensity: u8,
) -> GrayImage {
    let mut canvas = GrayImage::new(width, height);
    let color = Luma([255u8]);

    match points {
        [] => return canvas,
        [only] => {
            if only.x >= 0 && only.y >= 0 && (only.x as u32) < width && (only.y as u32) < height {
                canvas.put_pixel(only.x as u32, only.y as u32, color);
            }
        }
        _ => {
            for (a, b) in points.iter().zip(points.iter().cycle().skip(1)) {
                draw_line_segment_mut(
                    &mut canvas,
                    (a.x as f32, a.y as f32),
                    (b.x as f32, b.y as f32),
                    color,
                );
            }
        }
    }

    let radius = thickness / 2;
    if radius > 0 {
        dilate_mut(&mut canvas, Norm::LInf, radius);
    }

    if intensity != 255 {
        for pixel in canvas.pixels_mut() {
            if pixel[0] > 0 {
                pixel[0] = intensity;
            }
        }
    }

    canvas
}
