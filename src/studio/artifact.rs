use crate::error::GenerationError;
use image::ImageFormat;
use std::io::Cursor;

pub const LATEST_FILENAME: &str = "generated_image.png";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Decode whatever raster the backend returned and re-encode it as PNG.
pub fn encode_png(raster: &[u8]) -> Result<PngImage, GenerationError> {
    let decoded = image::load_from_memory(raster).map_err(|e| {
        GenerationError::Unclassified(format!("response was not a decodable image: {}", e))
    })?;

    let mut bytes = Vec::new();
    decoded
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| GenerationError::Unclassified(format!("PNG encoding failed: {}", e)))?;

    Ok(PngImage {
        bytes,
        width: decoded.width(),
        height: decoded.height(),
    })
}

/// Download name for a history entry; `index` is zero-based.
pub fn history_filename(index: usize) -> String {
    format!("generated_{}.png", index + 1)
}
