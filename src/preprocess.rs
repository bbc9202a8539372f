use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::imageops::FilterType;
use ndarray::Array4;
use thiserror::Error;

pub const INPUT_SIZE: u32 = 224;
pub const CHANNELS: usize = 3;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Invalid base64 image data: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Invalid image file: {0}")]
    Image(#[from] image::ImageError),
}

/// Decodes the `image` field of a request. Line breaks and other ASCII whitespace
/// are ignored, and a leading `data:<mime>;base64,` prefix is stripped.
pub fn decode_base64(encoded: &str) -> Result<Vec<u8>, PreprocessError> {
    let payload = match encoded.trim_start().strip_prefix("data:") {
        Some(uri) => uri.split_once(',').map_or(uri, |(_, data)| data),
        None => encoded,
    };
    let compact: Vec<u8> = payload
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    Ok(STANDARD.decode(compact)?)
}

/// Turns raw image bytes into a `(1, 224, 224, 3)` tensor with values in `[0, 1]`.
pub fn prepare(bytes: &[u8]) -> Result<Array4<f32>, PreprocessError> {
    let rgb = image::load_from_memory(bytes)?.to_rgb8();
    // Bicubic, matching the resampler the network was trained with.
    let resized = image::imageops::resize(&rgb, INPUT_SIZE, INPUT_SIZE, FilterType::CatmullRom);

    let side = INPUT_SIZE as usize;
    let tensor = Array4::from_shape_fn((1, side, side, CHANNELS), |(_, y, x, c)| {
        resized.get_pixel(x as u32, y as u32)[c] as f32 / 255.0
    });
    Ok(tensor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encode(img: DynamicImage, format: ImageOutputFormat) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    #[test]
    fn tensor_has_batch_shape_and_unit_range() {
        let img = RgbImage::from_fn(640, 480, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 255])
        });
        let bytes = encode(DynamicImage::ImageRgb8(img), ImageOutputFormat::Png);

        let tensor = prepare(&bytes).unwrap();
        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
        assert!(tensor.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn solid_colour_scales_linearly() {
        let img = RgbImage::from_pixel(50, 30, Rgb([255, 0, 51]));
        let bytes = encode(DynamicImage::ImageRgb8(img), ImageOutputFormat::Png);

        let tensor = prepare(&bytes).unwrap();
        assert!((tensor[[0, 100, 100, 0]] - 1.0).abs() < 1e-6);
        assert!(tensor[[0, 100, 100, 1]].abs() < 1e-6);
        assert!((tensor[[0, 100, 100, 2]] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn alpha_and_grayscale_become_three_channels() {
        let rgba = RgbaImage::from_pixel(16, 16, Rgba([10, 20, 30, 0]));
        let bytes = encode(DynamicImage::ImageRgba8(rgba), ImageOutputFormat::Png);
        let tensor = prepare(&bytes).unwrap();
        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);

        let gray = DynamicImage::new_luma8(8, 8);
        let tensor = prepare(&encode(gray, ImageOutputFormat::Jpeg(90))).unwrap();
        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
    }

    #[test]
    fn garbage_bytes_are_an_image_error() {
        assert!(matches!(
            prepare(b"definitely not an image"),
            Err(PreprocessError::Image(_))
        ));
    }

    #[test]
    fn base64_tolerates_line_breaks_and_data_uri() {
        assert_eq!(decode_base64("aGVs\nbG8=\r\n").unwrap(), b"hello");
        assert_eq!(
            decode_base64("data:image/jpeg;base64,aGVsbG8=").unwrap(),
            b"hello"
        );
        assert!(matches!(
            decode_base64("@@not base64@@"),
            Err(PreprocessError::Base64(_))
        ));
    }
}
