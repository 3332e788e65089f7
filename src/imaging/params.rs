//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. The pure
//! [`calculations`](super::calculations) produce and consume them, and the
//! [`operations`](super::operations) turn them into pixels.
//!
//! ## Types
//!
//! - [`Dimensions`]: a width/height pair; formats as `WxH`.
//! - [`BoundingBox`]: an end-exclusive `(x0, y0, x1, y1)` rectangle.
//! - [`ResizeSpec`]: target canvas dimensions plus uniform padding.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn of(image: &image::DynamicImage) -> Self {
        Self::new(image.width(), image.height())
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Rectangle with inclusive top-left and exclusive bottom-right corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl BoundingBox {
    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    /// Box covering a whole image of the given size.
    pub fn full(dims: Dimensions) -> Self {
        Self {
            x0: 0,
            y0: 0,
            x1: dims.width,
            y1: dims.height,
        }
    }
}

/// Target canvas plus the padding kept free on every side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeSpec {
    pub target: Dimensions,
    pub padding: u32,
}
