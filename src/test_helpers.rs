//! Shared test utilities for the imager test suite.
//!
//! Small in-memory images with known pixels, plus helpers that put encoded
//! files on disk for pipeline and batch tests.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_intake(&["a.jpg", "b.png"]);
//! let cutout = opaque_rect_on_transparent(100, 100, (10, 10, 20, 30));
//! write_png(&tmp.path().join("input/cutout.png"), &cutout);
//! ```

use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use std::path::Path;
use tempfile::TempDir;

/// Color of the rectangle drawn by [`opaque_rect_on_transparent`].
pub const RECT_COLOR: Rgba<u8> = Rgba([220, 30, 30, 255]);

// =========================================================================
// In-memory images
// =========================================================================

/// Opaque RGB image of a single color.
pub fn solid_rgb(width: u32, height: u32, rgb: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(rgb)))
}

/// Fully transparent RGBA canvas with an opaque [`RECT_COLOR`] rectangle.
///
/// `rect` is `(x, y, width, height)`.
pub fn opaque_rect_on_transparent(
    width: u32,
    height: u32,
    rect: (u32, u32, u32, u32),
) -> DynamicImage {
    let (rx, ry, rw, rh) = rect;
    let img = RgbaImage::from_fn(width, height, |x, y| {
        if x >= rx && x < rx + rw && y >= ry && y < ry + rh {
            RECT_COLOR
        } else {
            Rgba([0, 0, 0, 0])
        }
    });
    DynamicImage::ImageRgba8(img)
}

// =========================================================================
// Files on disk
// =========================================================================

/// Encode `image` as PNG at `path`.
pub fn write_png(path: &Path, image: &DynamicImage) {
    image
        .save_with_format(path, image::ImageFormat::Png)
        .unwrap();
}

/// Write a gradient JPEG of the given size at `path`.
pub fn write_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    img.save_with_format(path, image::ImageFormat::Jpeg)
        .unwrap();
}

/// Temp dir with an `input/` directory holding one small image per name.
///
/// `.png` names get a PNG with a transparent margin, anything else a JPEG.
pub fn setup_intake(names: &[&str]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("input");
    std::fs::create_dir(&input).unwrap();
    for name in names {
        let path = input.join(name);
        if name.ends_with(".png") {
            write_png(&path, &opaque_rect_on_transparent(40, 30, (5, 5, 20, 10)));
        } else {
            write_jpeg(&path, 40, 30);
        }
    }
    tmp
}
