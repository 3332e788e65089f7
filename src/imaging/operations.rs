//! High-level image operations.
//!
//! Each function is one pipeline stage: it combines the pure
//! [`calculations`](super::calculations) with pixel work from the `image`
//! crate, and takes the current image by reference so the caller decides what
//! to keep.

use super::backend::BackgroundRemover;
use super::background::{BackgroundSpec, resolve_background};
use super::calculations::{autocrop_box, centered_offset, content_size, fit_within};
use super::compose::{composite_over, flatten, resize_premultiplied};
use super::params::{Dimensions, ResizeSpec};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OperationError {
    #[error("Background removal failed ({remover}): {reason}")]
    BackgroundRemovalFailed { remover: String, reason: String },
    #[error("Padding of {padding}px leaves no room for content in {target}")]
    InvalidPaddingGeometry { target: Dimensions, padding: u32 },
    #[error("Encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, OperationError>;

/// Fill of the padded canvas: white, fully transparent.
const CANVAS_FILL: Rgba<u8> = Rgba([255, 255, 255, 0]);

/// Encode as PNG, the lossless format every output is written in.
pub fn encode_png(image: &DynamicImage) -> std::result::Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    image.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}

/// Run `remover` over `image` and return the cut-out as RGBA.
///
/// Collaborator errors and undecodable responses both surface as
/// [`OperationError::BackgroundRemovalFailed`].
pub fn remove_background(
    remover: &dyn BackgroundRemover,
    image: &DynamicImage,
) -> Result<DynamicImage> {
    let failed = |reason: String| OperationError::BackgroundRemovalFailed {
        remover: remover.name().to_string(),
        reason,
    };

    let png = encode_png(image)?;
    let bytes = remover.remove(&png).map_err(|e| failed(e.to_string()))?;
    let decoded = image::load_from_memory(&bytes)
        .map_err(|e| failed(format!("undecodable response: {e}")))?;
    Ok(DynamicImage::ImageRgba8(decoded.to_rgba8()))
}

/// Trim to the bounding box of visible content.
///
/// Fully transparent images come back unchanged.
pub fn autocrop(image: &DynamicImage) -> DynamicImage {
    match autocrop_box(image) {
        Some(b) => image.crop_imm(b.x0, b.y0, b.width(), b.height()),
        None => image.clone(),
    }
}

/// Fit `image` inside the padded target and center it on a transparent canvas.
///
/// The output is always exactly `spec.target` in size.
pub fn resize_and_pad(image: &DynamicImage, spec: ResizeSpec) -> Result<DynamicImage> {
    let content =
        content_size(spec.target, spec.padding).ok_or(OperationError::InvalidPaddingGeometry {
            target: spec.target,
            padding: spec.padding,
        })?;
    let fitted = fit_within(Dimensions::of(image), content);
    let resized = resize_premultiplied(
        &image.to_rgba8(),
        fitted.width,
        fitted.height,
        FilterType::Lanczos3,
    );

    let mut canvas = RgbaImage::from_pixel(spec.target.width, spec.target.height, CANVAS_FILL);
    let (dx, dy) = centered_offset(spec.target, fitted);
    // Straight copy, not a masked blend: the canvas is fully transparent, so
    // semi-transparent edge pixels must keep their own color and alpha.
    image::imageops::replace(&mut canvas, &resized, i64::from(dx), i64::from(dy));
    Ok(DynamicImage::ImageRgba8(canvas))
}

/// Composite `image` over the resolved background and flatten to RGB.
///
/// Returns the warning produced when the spec fell back to `fallback`.
pub fn add_background(
    image: &DynamicImage,
    spec: &BackgroundSpec,
    fallback: Rgba<u8>,
) -> (DynamicImage, Option<String>) {
    let resolved = resolve_background(spec, Dimensions::of(image), fallback);
    let composited = composite_over(&image.to_rgba8(), &resolved.layer);
    (DynamicImage::ImageRgb8(flatten(&composited)), resolved.warning)
}
