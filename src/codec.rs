use image::codecs::png::PngEncoder;
use image::{DynamicImage, GrayImage, ImageEncoder, ImageFormat};

use crate::error::SketchError;

/// Decode input bytes into a `DynamicImage`.
pub(crate) fn decode_image(input: &[u8]) -> Result<DynamicImage, SketchError> {
    image::load_from_memory(input).map_err(|e| SketchError::DecodeError(e.to_string()))
}

/// Detect the input image format from the raw bytes.
pub(crate) fn detect_format(input: &[u8]) -> Result<ImageFormat, SketchError> {
    image::guess_format(input).map_err(|_| SketchError::UnsupportedFormat)
}

/// Encode the binary canvas as a lossless 8-bit grayscale PNG.
///
/// PNG is lossless, so decoding the returned bytes yields a pixel-exact
/// copy of the canvas — the two canonical values survive the round trip.
pub fn encode_png(canvas: &GrayImage) -> Result<Vec<u8>, SketchError> {
    let mut buffer = Vec::new();
    let encoder = PngEncoder::new(&mut buffer);
    encoder
        .write_image(
            canvas.as_raw(),
            canvas.width(),
            canvas.height(),
            image::ExtendedColorType::L8,
        )
        .map_err(|e| SketchError::EncodeError(e.to_string()))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn encode_png_round_trips_exactly() {
        let mut canvas = GrayImage::from_pixel(20, 30, Luma([255u8]));
        canvas.put_pixel(3, 4, Luma([0u8]));
        canvas.put_pixel(19, 29, Luma([0u8]));

        let png = encode_png(&canvas).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_luma8();

        assert_eq!(decoded.dimensions(), canvas.dimensions());
        assert_eq!(decoded.as_raw(), canvas.as_raw());
    }

    #[test]
    fn png_magic_bytes() {
        let canvas = GrayImage::from_pixel(4, 4, Luma([255u8]));
        let png = encode_png(&canvas).unwrap();
        assert_eq!(&png[0..4], &[0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn detect_format_rejects_garbage() {
        assert!(detect_format(b"not an image").is_err());
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode_image(b"not an image").is_err());
    }
}
