use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use stickerlab_contracts::data_uri::DataUri;

use crate::error::{StickerError, StickerResult};

/// Longest edge kept for library and reference uploads.
pub const STORAGE_MAX_DIMENSION: u32 = 450;
pub const STORAGE_JPEG_QUALITY: u8 = 60;

/// Downscales an uploaded image so it fits the storage budget and returns it
/// as a JPEG data URI. Smaller images keep their size.
pub fn compress_for_storage(bytes: &[u8]) -> StickerResult<String> {
    let image = image::load_from_memory(bytes)
        .map_err(|err| StickerError::InvalidImage(err.to_string()))?;
    let (width, height) = image.dimensions();
    let image = if width.max(height) > STORAGE_MAX_DIMENSION {
        image.resize(
            STORAGE_MAX_DIMENSION,
            STORAGE_MAX_DIMENSION,
            FilterType::Triangle,
        )
    } else {
        image
    };
    let jpeg = encode_jpeg(&flatten_on_white(&image), STORAGE_JPEG_QUALITY)?;
    Ok(DataUri::from_bytes("image/jpeg", &jpeg).to_string())
}

/// Decodes the image behind a stored `data:` URI.
pub fn decode_data_uri(raw: &str) -> StickerResult<DynamicImage> {
    let uri = DataUri::parse(raw)
        .ok_or_else(|| StickerError::InvalidImage("not a base64 data URI".to_string()))?;
    let bytes = uri
        .decode()
        .map_err(|err| StickerError::InvalidImage(format!("{err:#}")))?;
    image::load_from_memory(&bytes).map_err(|err| StickerError::InvalidImage(err.to_string()))
}

/// Composites any transparency over white; JPEG and PDF pages have no alpha.
pub fn flatten_on_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    let mut flattened = RgbImage::new(rgba.width(), rgba.height());
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let alpha = u16::from(pixel[3]);
        let blend = |channel: u8| -> u8 {
            (((u16::from(channel) * alpha) + (255 * (255 - alpha))) / 255) as u8
        };
        flattened.put_pixel(x, y, Rgb([blend(pixel[0]), blend(pixel[1]), blend(pixel[2])]));
    }
    flattened
}

pub fn encode_jpeg(image: &RgbImage, quality: u8) -> StickerResult<Vec<u8>> {
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality)
        .encode_image(image)
        .map_err(|err| StickerError::InvalidImage(err.to_string()))?;
    Ok(bytes)
}
