//! Image normalization
//!
//! Converts arbitrary uploaded images into the fixed-shape, fixed-range
//! tensor consumed by the image classifiers: shape (1, 224, 224, 3),
//! pixel values scaled to [0.0, 1.0].

use image::imageops::FilterType;
use image::GenericImageView;

use crate::error::{AppError, AppResult};

/// Edge length of the model input, in pixels
pub const TENSOR_EDGE: u32 = 224;

/// Number of color channels (RGB)
pub const TENSOR_CHANNELS: usize = 3;

/// Tensor shape including the leading batch dimension
pub const TENSOR_SHAPE: (usize, usize, usize, usize) = (1, 224, 224, 3);

/// Reject absurdly large uploads before resizing
const MAX_DIMENSION: u32 = 4096;

/// Normalized image tensor: row-major HWC layout with an implicit
/// batch dimension of 1, values in [0.0, 1.0]
#[derive(Debug, Clone)]
pub struct ImageTensor {
    data: Vec<f32>,
}

impl ImageTensor {
    /// Decode uploaded bytes and normalize them into a model input tensor.
    ///
    /// Accepts any format the `image` crate can decode (jpg/jpeg/png in
    /// practice), resizes to exactly 224x224 with a Triangle filter, and
    /// scales pixel values by 1/255.
    pub fn from_bytes(bytes: &[u8]) -> AppResult<Self> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| AppError::DecodeError(format!("Invalid or unsupported image: {}", e)))?;

        let (width, height) = img.dimensions();
        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(AppError::ValidationError(format!(
                "Image dimensions {}x{} exceed {}x{}",
                width, height, MAX_DIMENSION, MAX_DIMENSION
            )));
        }

        let resized = img
            .resize_exact(TENSOR_EDGE, TENSOR_EDGE, FilterType::Triangle)
            .to_rgb8();

        let data: Vec<f32> = resized
            .pixels()
            .flat_map(|p| {
                let [r, g, b] = p.0;
                [
                    f32::from(r) / 255.0,
                    f32::from(g) / 255.0,
                    f32::from(b) / 255.0,
                ]
            })
            .collect();

        Ok(Self { data })
    }

    /// Tensor shape, batch dimension included
    pub fn shape(&self) -> (usize, usize, usize, usize) {
        TENSOR_SHAPE
    }

    /// Single normalized channel value at (x, y, channel)
    pub fn pixel(&self, x: usize, y: usize, channel: usize) -> f32 {
        let edge = TENSOR_EDGE as usize;
        self.data[(y * edge + x) * TENSOR_CHANNELS + channel]
    }

    /// Mean of one color channel across the whole image
    pub fn channel_mean(&self, channel: usize) -> f32 {
        let pixels = (TENSOR_EDGE * TENSOR_EDGE) as f32;
        self.data
            .iter()
            .skip(channel)
            .step_by(TENSOR_CHANNELS)
            .sum::<f32>()
            / pixels
    }

    /// Mean over all channel values
    pub fn mean(&self) -> f32 {
        self.data.iter().sum::<f32>() / self.data.len() as f32
    }

    /// Raw tensor data, row-major HWC
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageOutputFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb(color));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_normalize_shape_and_range() {
        let bytes = png_bytes(31, 17, [200, 100, 50]);
        let tensor = ImageTensor::from_bytes(&bytes).unwrap();

        assert_eq!(tensor.shape(), (1, 224, 224, 3));
        assert_eq!(tensor.as_slice().len(), 224 * 224 * 3);
        assert!(tensor.as_slice().iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_normalize_scales_by_255() {
        let bytes = png_bytes(8, 8, [255, 0, 128]);
        let tensor = ImageTensor::from_bytes(&bytes).unwrap();

        assert!((tensor.channel_mean(0) - 1.0).abs() < 1e-3);
        assert!(tensor.channel_mean(1).abs() < 1e-3);
        assert!((tensor.channel_mean(2) - 128.0 / 255.0).abs() < 1e-2);
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        let result = ImageTensor::from_bytes(b"definitely not an image");
        assert!(matches!(result, Err(AppError::DecodeError(_))));
    }

    #[test]
    fn test_pixel_accessor() {
        let bytes = png_bytes(4, 4, [0, 255, 0]);
        let tensor = ImageTensor::from_bytes(&bytes).unwrap();

        assert!(tensor.pixel(0, 0, 0).abs() < 1e-3);
        assert!((tensor.pixel(100, 100, 1) - 1.0).abs() < 1e-3);
    }
}
