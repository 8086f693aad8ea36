//! Probe image normalization: accept a JPEG or PNG upload, re-encode as JPEG.

use crate::types::{ImagePayload, MIME_JPEG};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use thiserror::Error;

const JPEG_QUALITY: u8 = 90;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("uploaded file is empty")]
    Empty,
    #[error("unsupported image format {0}; upload a JPEG or PNG")]
    Unsupported(String),
    #[error("cannot decode uploaded image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("cannot encode probe as JPEG: {0}")]
    Encode(#[source] image::ImageError),
}

/// Sniff the upload and accept only JPEG or PNG.
///
/// Bytes that match no known format are passed through so the decoder can
/// report them; recognised formats other than JPEG/PNG are rejected.
pub fn check_format(bytes: &[u8]) -> Result<(), ProbeError> {
    if bytes.is_empty() {
        return Err(ProbeError::Empty);
    }
    match image::guess_format(bytes) {
        Ok(ImageFormat::Jpeg | ImageFormat::Png) | Err(_) => Ok(()),
        Ok(other) => Err(ProbeError::Unsupported(format!("{other:?}"))),
    }
}

/// A decoded upload, kept for the duration of one scan.
pub struct Probe {
    pub width: u32,
    pub height: u32,
    pub payload: ImagePayload,
}

impl Probe {
    /// Decode a JPEG or PNG upload and re-encode it as JPEG.
    pub fn from_upload(bytes: &[u8]) -> Result<Self, ProbeError> {
        check_format(bytes)?;
        let img = image::load_from_memory(bytes).map_err(ProbeError::Decode)?;
        let (width, height) = (img.width(), img.height());
        let data = encode_jpeg(img)?;
        tracing::debug!(width, height, bytes = data.len(), "probe normalized to JPEG");
        Ok(Self {
            width,
            height,
            payload: ImagePayload::new(data, MIME_JPEG),
        })
    }
}

fn encode_jpeg(img: DynamicImage) -> Result<Vec<u8>, ProbeError> {
    // JPEG has no alpha channel.
    let rgb = DynamicImage::ImageRgb8(img.into_rgb8());
    let mut buf = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
    rgb.write_with_encoder(encoder).map_err(ProbeError::Encode)?;
    Ok(buf.into_inner())
}
