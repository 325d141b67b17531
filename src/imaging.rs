//! Crop, resize and save operations on captured frames

use crate::{CaptureError, Dimensions, Offset};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::path::Path;
use tracing::debug;

/// Filter used for every resize
pub const RESIZE_FILTER: FilterType = FilterType::Lanczos3;

/// A rectangle inside a rendered frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    /// Everything right of and below `offset` in a frame of size `viewport`.
    pub fn from_viewport(viewport: Dimensions, offset: Offset) -> Self {
        Self {
            x: offset.x,
            y: offset.y,
            width: viewport.width.saturating_sub(offset.x),
            height: viewport.height.saturating_sub(offset.y),
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }
}

/// Copy `region` out of `frame`; the region is clamped to the frame bounds.
pub fn crop(frame: &RgbaImage, region: CropRegion) -> RgbaImage {
    imageops::crop_imm(frame, region.x, region.y, region.width, region.height).to_image()
}

/// How the cropped image is brought to the target size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeMode {
    /// Largest size fitting inside the box, aspect ratio kept
    Fit(Dimensions),
    /// Exact width, proportional height
    Width(u32),
    /// Exact height, proportional width
    Height(u32),
    Keep,
}

impl From<Dimensions> for ResizeMode {
    fn from(target: Dimensions) -> Self {
        match (target.width, target.height) {
            (0, 0) => ResizeMode::Keep,
            (width, 0) => ResizeMode::Width(width),
            (0, height) => ResizeMode::Height(height),
            _ => ResizeMode::Fit(target),
        }
    }
}

impl ResizeMode {
    /// Output size for a source of size `source`, or `None` when nothing changes.
    pub fn scaled_dimensions(&self, source: Dimensions) -> Option<Dimensions> {
        if source.is_empty() {
            return None;
        }

        let (sw, sh) = (source.width as u64, source.height as u64);
        let scaled = match *self {
            ResizeMode::Keep => return None,
            ResizeMode::Width(width) => {
                let width = width as u64;
                (width, rounded_div(sh * width, sw))
            }
            ResizeMode::Height(height) => {
                let height = height as u64;
                (rounded_div(sw * height, sh), height)
            }
            ResizeMode::Fit(target) => {
                let (tw, th) = (target.width as u64, target.height as u64);
                let width_for_height = th * sw / sh;
                if width_for_height <= tw {
                    (width_for_height, th)
                } else {
                    (tw, tw * sh / sw)
                }
            }
        };

        let width = scaled.0.clamp(1, u32::MAX as u64) as u32;
        let height = scaled.1.clamp(1, u32::MAX as u64) as u32;
        Some(Dimensions::new(width, height))
    }
}

fn rounded_div(numerator: u64, denominator: u64) -> u64 {
    (numerator + denominator / 2) / denominator
}

pub fn resize(image: RgbaImage, mode: ResizeMode) -> RgbaImage {
    let source = Dimensions::new(image.width(), image.height());
    match mode.scaled_dimensions(source) {
        Some(target) if target != source => {
            debug!("Resizing {} to {}", source, target);
            imageops::resize(&image, target.width, target.height, RESIZE_FILTER)
        }
        _ => image,
    }
}

/// Image format selected by the extension of `path`
pub fn output_format(path: &Path) -> Result<ImageFormat, CaptureError> {
    ImageFormat::from_path(path).map_err(|_| {
        CaptureError::UnsupportedFormat(format!(
            "cannot infer an image format from \"{}\"",
            path.display()
        ))
    })
}

/// Encode `image` to `path`, creating the parent directory if needed
pub fn save_image(image: RgbaImage, path: &Path) -> Result<(), CaptureError> {
    let format = output_format(path)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let image = DynamicImage::ImageRgba8(image);
    let image = match format {
        // No alpha channel in these encoders
        ImageFormat::Jpeg | ImageFormat::Pnm => DynamicImage::ImageRgb8(image.to_rgb8()),
        _ => image,
    };

    image.save_with_format(path, format)?;
    debug!("Encoded {:?} to {}", format, path.display());
    Ok(())
}
