//! Renders invitation payloads as scannable QR images.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{codecs::png::PngEncoder, ColorType, GrayImage, ImageEncoder, Luma};
use qrcodegen::{QrCode, QrCodeEcc};
use thiserror::Error;

/// Light modules kept around the symbol so readers can find it.
const QUIET_ZONE: u32 = 4;

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

#[derive(Error, Debug)]
pub enum QrError {
    #[error("Payload exceeds QR code capacity: {0}")]
    PayloadTooLarge(String),

    #[error("Failed to encode image: {0}")]
    Image(#[from] image::ImageError),
}

fn encode(payload: &str) -> Result<QrCode, QrError> {
    QrCode::encode_text(payload, QrCodeEcc::High).map_err(|e| QrError::PayloadTooLarge(e.to_string()))
}

/// Pixels per module for a symbol of `modules` (quiet zone included) on a
/// `size_px` canvas. Never below one, so dense payloads grow the image.
fn module_scale(modules: u32, size_px: u32) -> u32 {
    (size_px / modules).max(1)
}

/// Rasterizes the payload onto a `size_px` square, dark on light.
pub fn render_image(payload: &str, size_px: u32) -> Result<GrayImage, QrError> {
    let qr = encode(payload)?;
    let modules = qr.size() as u32 + QUIET_ZONE * 2;
    let scale = module_scale(modules, size_px);
    let symbol_px = modules * scale;
    let canvas = symbol_px.max(size_px);
    let offset = (canvas - symbol_px) / 2;

    let mut img = GrayImage::from_pixel(canvas, canvas, LIGHT);
    for y in 0..qr.size() {
        for x in 0..qr.size() {
            if !qr.get_module(x, y) {
                continue;
            }
            let left = offset + (x as u32 + QUIET_ZONE) * scale;
            let top = offset + (y as u32 + QUIET_ZONE) * scale;
            for py in top..top + scale {
                for px in left..left + scale {
                    img.put_pixel(px, py, DARK);
                }
            }
        }
    }

    Ok(img)
}

pub fn render_png(payload: &str, size_px: u32) -> Result<Vec<u8>, QrError> {
    let img = render_image(payload, size_px)?;
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(img.as_raw(), img.width(), img.height(), ColorType::L8)?;
    Ok(bytes)
}

pub fn render_svg(payload: &str, size_px: u32) -> Result<String, QrError> {
    let qr = encode(payload)?;
    let modules = qr.size() + QUIET_ZONE as i32 * 2;

    let mut path = String::new();
    for y in 0..qr.size() {
        for x in 0..qr.size() {
            if qr.get_module(x, y) {
                let q = QUIET_ZONE as i32;
                path.push_str(&format!("M{},{}h1v1h-1z", x + q, y + q));
            }
        }
    }

    Ok(format!(
        concat!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" ",
            "width=\"{size}\" height=\"{size}\" viewBox=\"0 0 {m} {m}\" stroke=\"none\">",
            "<rect width=\"100%\" height=\"100%\" fill=\"#FFFFFF\"/>",
            "<path d=\"{path}\" fill=\"#000000\"/>",
            "</svg>"
        ),
        size = size_px,
        m = modules,
        path = path
    ))
}

pub fn png_data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}
