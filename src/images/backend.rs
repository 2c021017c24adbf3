//! Image processing backend trait and the `image`-crate implementation.
//!
//! The pipeline only needs three operations: read dimensions, write a
//! resized rendition, and sample a placeholder colour. Keeping them behind
//! [`ImageBackend`] lets the pipeline be tested without decoding pixels.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Image not found: {0:?}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path:?}: {message}")]
    Decode { path: PathBuf, message: String },
    #[error("Failed to encode {path:?}: {message}")]
    Encode { path: PathBuf, message: String },
}

/// Pixel dimensions of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// One resize job
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub quality: u8,
}

pub trait ImageBackend: Sync {
    /// Get image dimensions without a full decode where possible.
    fn identify(&self, path: &Path) -> Result<Dimensions, ImageError>;

    /// Write a resized copy of `params.source` to `params.output`.
    fn resize(&self, params: &ResizeParams) -> Result<(), ImageError>;

    /// Average colour of the image, used as the loading placeholder.
    fn dominant_color(&self, path: &Path) -> Result<[u8; 3], ImageError>;
}

/// Pure-Rust backend built on the `image` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

fn load_image(path: &Path) -> Result<DynamicImage, ImageError> {
    image::open(path).map_err(|e| ImageError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn save_image(img: &DynamicImage, path: &Path, quality: u8) -> Result<(), ImageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let encode_err = |e: image::ImageError| ImageError::Encode {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let is_jpeg = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"))
        .unwrap_or(false);

    if is_jpeg {
        let mut writer = BufWriter::new(File::create(path)?);
        let encoder = JpegEncoder::new_with_quality(&mut writer, quality);
        // JPEG has no alpha channel
        DynamicImage::ImageRgb8(img.to_rgb8())
            .write_with_encoder(encoder)
            .map_err(encode_err)
    } else {
        img.save(path).map_err(encode_err)
    }
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, ImageError> {
        if !path.exists() {
            return Err(ImageError::NotFound(path.to_path_buf()));
        }
        let (width, height) = image::image_dimensions(path).map_err(|e| ImageError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Dimensions { width, height })
    }

    fn resize(&self, params: &ResizeParams) -> Result<(), ImageError> {
        let img = load_image(&params.source)?;
        let resized = img.resize_exact(params.width, params.height, FilterType::Lanczos3);
        save_image(&resized, &params.output, params.quality)
    }

    fn dominant_color(&self, path: &Path) -> Result<[u8; 3], ImageError> {
        let img = load_image(path)?;
        let pixel = img.resize_exact(1, 1, FilterType::Triangle).to_rgb8();
        Ok(pixel.get_pixel(0, 0).0)
    }
}
