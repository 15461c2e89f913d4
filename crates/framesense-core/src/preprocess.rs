//! Frame preprocessing: orientation normalization and tensor conversion.
//!
//! This module provides:
//! - [`normalize_orientation`]: undo the capture rotation so the engine always
//!   sees an upright image
//! - [`to_input_tensor`]: resize to the engine's input resolution and convert
//!   to an NCHW f32 tensor scaled to `[0, 1]`
//!
//! Orientation convention: a frame tagged with rotation `r` is compensated by
//! rotating the pixel data by `-r`, i.e. `r` degrees clockwise, producing a
//! canonical upright image regardless of device orientation.

use crate::error::{ClassifyError, ClassifyResult};
use crate::frame::{Frame, Rotation};
use image::{imageops, RgbaImage};
use ndarray::{Array4, ArrayD};

/// Rotates a frame's pixel data into the upright orientation.
///
/// # Errors
///
/// Returns [`ClassifyError::InvalidFrame`] if the buffer length does not match
/// the declared `width * height * 4`.
pub fn normalize_orientation(frame: &Frame) -> ClassifyResult<RgbaImage> {
    let expected = frame.width as usize * frame.height as usize * 4;
    if frame.pixels.len() != expected {
        return Err(ClassifyError::invalid_frame(format!(
            "expected {} bytes for {}x{} RGBA, got {}",
            expected,
            frame.width,
            frame.height,
            frame.pixels.len()
        )));
    }

    let upright = RgbaImage::from_raw(frame.width, frame.height, frame.pixels.clone())
        .ok_or_else(|| ClassifyError::invalid_frame("pixel buffer rejected by image decoder"))?;

    Ok(match frame.rotation {
        Rotation::Deg0 => upright,
        Rotation::Deg90 => imageops::rotate90(&upright),
        Rotation::Deg180 => imageops::rotate180(&upright),
        Rotation::Deg270 => imageops::rotate270(&upright),
    })
}

/// Converts an upright RGBA image into an NCHW f32 tensor for the engine.
///
/// The image is resized to `(width, height)` with bilinear filtering when the
/// dimensions differ; the alpha channel is discarded and channel values are
/// scaled to `[0, 1]`.
pub fn to_input_tensor(image: &RgbaImage, width: u32, height: u32) -> ArrayD<f32> {
    let resized;
    let source = if image.width() == width && image.height() == height {
        image
    } else {
        resized = imageops::resize(image, width, height, imageops::FilterType::Triangle);
        &resized
    };

    let mut tensor = Array4::<f32>::zeros((1, 3, height as usize, width as usize));
    for (x, y, pixel) in source.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        tensor[[0, 0, y, x]] = pixel[0] as f32 / 255.0;
        tensor[[0, 1, y, x]] = pixel[1] as f32 / 255.0;
        tensor[[0, 2, y, x]] = pixel[2] as f32 / 255.0;
    }

    tensor.into_dyn()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2x3 frame with a single red marker pixel at (0, 0).
    fn marker_frame(rotation: Rotation) -> Frame {
        let (width, height) = (2u32, 3u32);
        let mut pixels = vec![0u8; (width * height * 4) as usize];
        pixels[0] = 255; // R of pixel (0, 0)
        pixels[3] = 255; // A of pixel (0, 0)
        Frame::new(pixels, width, height, rotation)
    }

    fn red_position(image: &RgbaImage) -> (u32, u32) {
        for (x, y, pixel) in image.enumerate_pixels() {
            if pixel[0] == 255 {
                return (x, y);
            }
        }
        panic!("marker pixel not found");
    }

    #[test]
    fn test_deg0_keeps_pixels_in_place() {
        let upright = normalize_orientation(&marker_frame(Rotation::Deg0)).unwrap();
        assert_eq!((upright.width(), upright.height()), (2, 3));
        assert_eq!(red_position(&upright), (0, 0));
    }

    #[test]
    fn test_deg90_rotates_one_clockwise_quarter_turn() {
        // (x, y) in a w*h image lands at (h - 1 - y, x) after one clockwise turn
        let upright = normalize_orientation(&marker_frame(Rotation::Deg90)).unwrap();
        assert_eq!((upright.width(), upright.height()), (3, 2));
        assert_eq!(red_position(&upright), (2, 0));
    }

    #[test]
    fn test_deg180_moves_marker_to_opposite_corner() {
        let upright = normalize_orientation(&marker_frame(Rotation::Deg180)).unwrap();
        assert_eq!((upright.width(), upright.height()), (2, 3));
        assert_eq!(red_position(&upright), (1, 2));
    }

    #[test]
    fn test_deg270_rotates_three_clockwise_quarter_turns() {
        let upright = normalize_orientation(&marker_frame(Rotation::Deg270)).unwrap();
        assert_eq!((upright.width(), upright.height()), (3, 2));
        assert_eq!(red_position(&upright), (0, 1));
    }

    #[test]
    fn test_buffer_length_mismatch_is_rejected() {
        let frame = Frame::new(vec![0u8; 5], 2, 3, Rotation::Deg0);
        let result = normalize_orientation(&frame);
        assert!(matches!(result, Err(ClassifyError::InvalidFrame(_))));
    }

    #[test]
    fn test_tensor_layout_and_scaling() {
        let mut pixels = vec![0u8; 2 * 2 * 4];
        // pixel (1, 0): R=255, G=127, B=0
        pixels[4] = 255;
        pixels[5] = 127;
        let image = RgbaImage::from_raw(2, 2, pixels).unwrap();

        let tensor = to_input_tensor(&image, 2, 2);
        assert_eq!(tensor.shape(), &[1, 3, 2, 2]);
        assert_eq!(tensor[[0, 0, 0, 1]], 1.0);
        assert!((tensor[[0, 1, 0, 1]] - 127.0 / 255.0).abs() < 1e-6);
        assert_eq!(tensor[[0, 2, 0, 1]], 0.0);
        assert_eq!(tensor[[0, 0, 0, 0]], 0.0);
    }

    #[test]
    fn test_tensor_resize_to_engine_resolution() {
        let image = RgbaImage::from_raw(4, 4, vec![255u8; 4 * 4 * 4]).unwrap();
        let tensor = to_input_tensor(&image, 8, 8);
        assert_eq!(tensor.shape(), &[1, 3, 8, 8]);
        // uniform white stays white through bilinear resampling
        assert_eq!(tensor[[0, 0, 4, 4]], 1.0);
    }
}
