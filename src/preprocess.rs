use image::imageops::{self, FilterType};
use image::{GrayImage, RgbImage};

/// Resize so the longer side does not exceed `max_dimension`, preserving
/// the aspect ratio to within integer rounding.
///
/// Images already within the bound are returned unchanged, which makes the
/// operation idempotent: resizing twice with the same bound equals resizing
/// once. Downscaling uses the triangle filter, whose footprint scales with
/// the reduction ratio and averages the source area under each output pixel.
pub fn resize_bounded(image: &RgbImage, max_dimension: u32) -> RgbImage {
    let (width, height) = image.dimensions();

    if width.max(height) <= max_dimension {
        return image.clone();
    }

    let (new_width, new_height) = if width > height {
        let h = (f64::from(height) * (f64::from(max_dimension) / f64::from(width))) as u32;
        (max_dimension, h.max(1))
    } else {
        let w = (f64::from(width) * (f64::from(max_dimension) / f64::from(height))) as u32;
        (w.max(1), max_dimension)
    };

    imageops::resize(image, new_width, new_height, FilterType::Triangle)
}

/// Standard luma conversion from color to a single intensity channel.
pub fn to_intensity(image: &RgbImage) -> GrayImage {
    imageops::grayscale(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                128,
            ])
        })
    }

    #[test]
    fn small_image_is_untouched() {
        let img = gradient(100, 80);
        let out = resize_bounded(&img, 1024);
        assert_eq!(out.dimensions(), (100, 80));
        assert_eq!(out.as_raw(), img.as_raw());
    }

    #[test]
    fn landscape_constrained_by_width() {
        let img = gradient(2000, 1000);
        let out = resize_bounded(&img, 1024);
        assert_eq!(out.dimensions(), (1024, 512));
    }

    #[test]
    fn portrait_constrained_by_height() {
        let img = gradient(600, 1200);
        let out = resize_bounded(&img, 300);
        assert_eq!(out.dimensions(), (150, 300));
    }

    #[test]
    fn resize_is_idempotent() {
        let img = gradient(1333, 777);
        let once = resize_bounded(&img, 500);
        let twice = resize_bounded(&once, 500);
        assert_eq!(once.dimensions(), twice.dimensions());
        assert_eq!(once.as_raw(), twice.as_raw());
    }

    #[test]
    fn aspect_ratio_preserved_within_rounding() {
        let img = gradient(1920, 1080);
        let out = resize_bounded(&img, 640);
        let (w, h) = out.dimensions();
        let source_aspect = 1920.0 / 1080.0;
        let out_aspect = f64::from(w) / f64::from(h);
        assert!((source_aspect - out_aspect).abs() < 0.01);
    }

    #[test]
    fn extreme_aspect_never_hits_zero() {
        let img = gradient(4000, 2);
        let out = resize_bounded(&img, 100);
        assert_eq!(out.width(), 100);
        assert!(out.height() >= 1);
    }

    #[test]
    fn intensity_has_single_channel_dimensions() {
        let img = gradient(64, 48);
        let gray = to_intensity(&img);
        assert_eq!(gray.dimensions(), (64, 48));
    }
}
