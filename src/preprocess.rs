use crate::error::DecodeError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::imageops::FilterType;
use ndarray::{Array, Ix4};

pub const INPUT_SIZE: u32 = 32;

const CHANNEL_MEAN: [f32; 3] = [0.4914, 0.4822, 0.4465];
const CHANNEL_STD: [f32; 3] = [0.2023, 0.1994, 0.2010];

/// Decodes a base64 image payload into the model input tensor:
/// 32x32 RGB, scaled to [0,1], per-channel normalized, with a leading
/// batch dimension of 1.
pub fn tensor_from_base64(image_b64: &str) -> Result<Array<f32, Ix4>, DecodeError> {
    let image_data = STANDARD.decode(image_b64)?;
    tensor_from_bytes(&image_data)
}

pub fn tensor_from_bytes(image_data: &[u8]) -> Result<Array<f32, Ix4>, DecodeError> {
    let image_reader = image::ImageReader::new(std::io::Cursor::new(image_data))
        .with_guessed_format()
        .map_err(image::ImageError::IoError)?;

    let original_img = image_reader.decode()?;
    let img = original_img.resize_exact(INPUT_SIZE, INPUT_SIZE, FilterType::Triangle);

    let mut input = Array::zeros((1, 3, INPUT_SIZE as usize, INPUT_SIZE as usize));
    for pixel in img.to_rgb8().enumerate_pixels() {
        let x = pixel.0 as usize;
        let y = pixel.1 as usize;
        let [r, g, b] = pixel.2 .0;
        input[[0, 0, y, x]] = ((r as f32) / 255. - CHANNEL_MEAN[0]) / CHANNEL_STD[0];
        input[[0, 1, y, x]] = ((g as f32) / 255. - CHANNEL_MEAN[1]) / CHANNEL_STD[1];
        input[[0, 2, y, x]] = ((b as f32) / 255. - CHANNEL_MEAN[2]) / CHANNEL_STD[2];
    }

    Ok(input)
}
