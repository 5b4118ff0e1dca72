//! QR code rendering.

use image::{DynamicImage, ImageFormat, Luma};
use pokerbook_core::{LedgerError, Result};
use qrcode::{EcLevel, QrCode};
use std::io::Cursor;

/// Pixels per module.
const MODULE_PIXELS: u32 = 10;

/// Renders `content` as a black-on-white PNG QR code.
///
/// Error correction level L, 10 px modules, and the standard 4-module quiet
/// zone.
pub fn render_png(content: &str) -> Result<Vec<u8>> {
    if content.is_empty() {
        return Err(LedgerError::validation("cannot encode an empty QR code"));
    }

    let code = QrCode::with_error_correction_level(content.as_bytes(), EcLevel::L)
        .map_err(|e| LedgerError::external("QR", e.to_string()))?;
    let image = code
        .render::<Luma<u8>>()
        .module_dimensions(MODULE_PIXELS, MODULE_PIXELS)
        .quiet_zone(true)
        .build();

    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(image)
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| LedgerError::external("QR", e.to_string()))?;
    Ok(buffer.into_inner())
}
