//! Shrinks a selected photo below a byte and dimension ceiling before upload.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{
    DynamicImage, ExtendedColorType, GenericImageView, ImageDecoder, ImageError, ImageFormat,
    ImageReader,
};
use log::{debug, info, warn};

use crate::error::CompressionError;

const START_QUALITY: u8 = 90;
const MIN_QUALITY: u8 = 50;
const QUALITY_STEP: u8 = 10;
const SHRINK_FACTOR: f32 = 0.9;
const MAX_ATTEMPTS: usize = 10;

/// A file as the registrant picked it.
#[derive(Debug, Clone)]
pub struct RawImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// The artifact that gets uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl CompressedImage {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CompressionOptions {
    pub max_size_bytes: usize,
    /// Ceiling for the longer side, in pixels.
    pub max_dimension: u32,
}

impl CompressionOptions {
    pub fn new(max_size_mb: f64, max_dimension: u32) -> Self {
        Self {
            max_size_bytes: (max_size_mb * 1024.0 * 1024.0) as usize,
            max_dimension,
        }
    }
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self::new(1.0, 800)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCompressor {
    options: CompressionOptions,
}

impl ImageCompressor {
    pub fn new(options: CompressionOptions) -> Self {
        Self { options }
    }

    /// Compresses on a blocking worker and waits for it.
    pub async fn compress(&self, raw: RawImage) -> Result<CompressedImage, CompressionError> {
        let options = self.options;
        tokio::task::spawn_blocking(move || compress_blocking(&raw, options)).await?
    }
}

/// Decodes, downscales and re-encodes `raw` as JPEG until it fits.
///
/// Quality drops first; once it bottoms out the dimensions shrink. If the
/// ceiling is still not met after the last attempt the smallest encoding
/// is returned.
pub fn compress_blocking(
    raw: &RawImage,
    options: CompressionOptions,
) -> Result<CompressedImage, CompressionError> {
    let source_format = image::guess_format(&raw.bytes).ok();
    let (decoded, orientation) = decode_upright(&raw.bytes).map_err(CompressionError::Decode)?;
    let (width, height) = decoded.dimensions();

    // A rotated original would still need its EXIF tag to display upright.
    let within_limits = raw.bytes.len() <= options.max_size_bytes
        && width.max(height) <= options.max_dimension
        && orientation == Orientation::NoTransforms;

    let mut current = if width.max(height) > options.max_dimension {
        decoded.resize(
            options.max_dimension,
            options.max_dimension,
            FilterType::Triangle,
        )
    } else {
        decoded
    };

    let mut quality = START_QUALITY;
    let mut encoded = encode_jpeg(&current, quality)?;
    for attempt in 1..MAX_ATTEMPTS {
        if encoded.len() <= options.max_size_bytes {
            break;
        }
        debug!(
            "Attempt {} produced {} bytes at quality {}",
            attempt,
            encoded.len(),
            quality
        );
        if quality > MIN_QUALITY {
            quality -= QUALITY_STEP;
        } else {
            let (w, h) = current.dimensions();
            let w = ((w as f32 * SHRINK_FACTOR) as u32).max(1);
            let h = ((h as f32 * SHRINK_FACTOR) as u32).max(1);
            current = current.resize_exact(w, h, FilterType::Triangle);
        }
        encoded = encode_jpeg(&current, quality)?;
    }

    if encoded.len() > options.max_size_bytes {
        warn!(
            "Could not bring {} under {} bytes, keeping {} bytes",
            raw.file_name,
            options.max_size_bytes,
            encoded.len()
        );
    }

    if within_limits && raw.bytes.len() <= encoded.len() {
        info!(
            "Keeping original {} ({} bytes), already within limits",
            raw.file_name,
            raw.bytes.len()
        );
        return Ok(CompressedImage {
            file_name: raw.file_name.clone(),
            content_type: mime_for(source_format).to_string(),
            bytes: raw.bytes.clone(),
            width,
            height,
        });
    }

    let (out_width, out_height) = current.dimensions();
    info!(
        "Compressed {} from {} to {} bytes ({}x{})",
        raw.file_name,
        raw.bytes.len(),
        encoded.len(),
        out_width,
        out_height
    );
    Ok(CompressedImage {
        file_name: jpeg_file_name(&raw.file_name),
        content_type: "image/jpeg".to_string(),
        bytes: encoded,
        width: out_width,
        height: out_height,
    })
}

/// Decodes `bytes` and applies its EXIF orientation, so pixels are upright.
fn decode_upright(bytes: &[u8]) -> Result<(DynamicImage, Orientation), ImageError> {
    let mut decoder = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_decoder()?;
    let orientation = decoder.orientation()?;
    let mut image = DynamicImage::from_decoder(decoder)?;
    if orientation != Orientation::NoTransforms {
        debug!("Applying EXIF orientation {:?}", orientation);
        image.apply_orientation(orientation);
    }
    Ok((image, orientation))
}

fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, CompressionError> {
    let rgb = image.to_rgb8();
    let mut buffer = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .encode(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .map_err(CompressionError::Encode)?;
    Ok(buffer.into_inner())
}

fn mime_for(format: Option<ImageFormat>) -> &'static str {
    match format {
        Some(ImageFormat::Jpeg) => "image/jpeg",
        Some(ImageFormat::Png) => "image/png",
        Some(ImageFormat::Gif) => "image/gif",
        Some(ImageFormat::WebP) => "image/webp",
        Some(ImageFormat::Bmp) => "image/bmp",
        Some(ImageFormat::Tiff) => "image/tiff",
        _ => "application/octet-stream",
    }
}

fn jpeg_file_name(original: &str) -> String {
    let stem = match original.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => original,
    };
    if stem.is_empty() {
        "photo.jpg".to_string()
    } else {
        format!("{}.jpg", stem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    /// Noisy PNG so the encoder cannot collapse it to nothing.
    fn sample_png(width: u32, height: u32) -> Vec<u8> {
        let buffer = ImageBuffer::from_fn(width, height, |x, y| {
            let v = (x.wrapping_mul(7919) ^ y.wrapping_mul(104_729)) as u8;
            Rgb([v, v.wrapping_add(x as u8), v.wrapping_add(y as u8)])
        });
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(buffer)
            .write_to(&mut bytes, ImageFormat::Png)
            .unwrap();
        bytes.into_inner()
    }

    #[test]
    fn large_photo_is_scaled_to_max_dimension() {
        let raw = RawImage {
            file_name: "selfie.png".into(),
            bytes: sample_png(1600, 1200),
        };
        let out = compress_blocking(&raw, CompressionOptions::default()).unwrap();
        assert_eq!((out.width, out.height), (800, 600));
        assert!(out.size() <= CompressionOptions::default().max_size_bytes);
        assert_eq!(out.content_type, "image/jpeg");
        assert_eq!(out.file_name, "selfie.jpg");
    }

    #[test]
    fn tight_byte_ceiling_forces_further_shrinking() {
        let raw = RawImage {
            file_name: "selfie.png".into(),
            bytes: sample_png(800, 800),
        };
        let options = CompressionOptions {
            max_size_bytes: 20 * 1024,
            max_dimension: 800,
        };
        let out = compress_blocking(&raw, options).unwrap();
        assert!(out.width < 800);
        assert!(out.size() < raw.bytes.len());
    }

    /// JPEG carrying an EXIF APP1 segment with the given orientation tag.
    fn jpeg_with_orientation(width: u32, height: u32, orientation: u8) -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(ImageBuffer::from_fn(width, height, |x, _| {
            Rgb([x as u8, 0, 0])
        }));
        let jpeg = encode_jpeg(&image, 90).unwrap();

        let mut exif = b"Exif\0\0MM\0\x2a\0\0\0\x08\0\x01".to_vec();
        // Orientation tag (0x0112), SHORT, one value, no further IFD.
        exif.extend_from_slice(&[0x01, 0x12, 0, 3, 0, 0, 0, 1, 0, orientation, 0, 0]);
        exif.extend_from_slice(&[0, 0, 0, 0]);

        let mut out = jpeg[..2].to_vec();
        out.extend_from_slice(&[0xFF, 0xE1]);
        out.extend_from_slice(&((exif.len() + 2) as u16).to_be_bytes());
        out.extend_from_slice(&exif);
        out.extend_from_slice(&jpeg[2..]);
        out
    }

    #[test]
    fn exif_rotation_is_applied_before_encoding() {
        let raw = RawImage {
            file_name: "selfie.jpg".into(),
            bytes: jpeg_with_orientation(40, 20, 6),
        };
        let out = compress_blocking(&raw, CompressionOptions::default()).unwrap();
        assert_eq!((out.width, out.height), (20, 40));
        assert_ne!(out.bytes, raw.bytes);

        let reread = image::load_from_memory(&out.bytes).unwrap();
        assert_eq!(reread.dimensions(), (20, 40));
    }

    #[test]
    fn upright_jpeg_keeps_its_dimensions() {
        let raw = RawImage {
            file_name: "selfie.jpg".into(),
            bytes: jpeg_with_orientation(40, 20, 1),
        };
        let out = compress_blocking(&raw, CompressionOptions::default()).unwrap();
        assert_eq!((out.width, out.height), (40, 20));
        assert_eq!(out.content_type, "image/jpeg");
    }

    #[test]
    fn garbage_is_rejected() {
        let raw = RawImage {
            file_name: "notes.txt".into(),
            bytes: b"definitely not an image".to_vec(),
        };
        let err = compress_blocking(&raw, CompressionOptions::default()).unwrap_err();
        assert!(matches!(err, CompressionError::Decode(_)));
        assert_eq!(err.user_message(), "❌ Error al comprimir la imagen.");
    }

    #[test]
    fn jpeg_names() {
        assert_eq!(jpeg_file_name("a.b.png"), "a.b.jpg");
        assert_eq!(jpeg_file_name("photo"), "photo.jpg");
        assert_eq!(jpeg_file_name(""), "photo.jpg");
    }

    #[tokio::test]
    async fn compress_runs_on_worker() {
        let raw = RawImage {
            file_name: "tiny.png".into(),
            bytes: sample_png(32, 32),
        };
        let out = ImageCompressor::default().compress(raw).await.unwrap();
        assert_eq!((out.width, out.height), (32, 32));
    }
}
