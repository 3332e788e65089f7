//! Pure geometry for autocrop and padded, aspect-preserving resize.
//!
//! Nothing here performs I/O or resampling. The functions only decide *where*
//! content is and *how big* it should become, so they can be tested with
//! tiny synthetic buffers and plain numbers.

use super::params::{BoundingBox, Dimensions};
use image::{DynamicImage, RgbaImage};

/// Tight bounding box around every pixel whose alpha is non-zero.
///
/// Images without an alpha channel are treated as content-filled and return
/// the full frame, which makes autocrop a no-op for them. Returns `None` when
/// the image is fully transparent.
///
/// # Examples
/// ```
/// # use imager::imaging::autocrop_box;
/// let img = image::DynamicImage::new_rgb8(30, 20);
/// let b = autocrop_box(&img).unwrap();
/// assert_eq!((b.width(), b.height()), (30, 20));
/// ```
pub fn autocrop_box(image: &DynamicImage) -> Option<BoundingBox> {
    if !image.color().has_alpha() {
        return Some(BoundingBox::full(Dimensions::of(image)));
    }
    match image.as_rgba8() {
        Some(rgba) => alpha_bounds(rgba),
        None => alpha_bounds(&image.to_rgba8()),
    }
}

fn alpha_bounds(rgba: &RgbaImage) -> Option<BoundingBox> {
    let mut bounds: Option<BoundingBox> = None;
    for (x, y, pixel) in rgba.enumerate_pixels() {
        if pixel[3] == 0 {
            continue;
        }
        bounds = Some(match bounds {
            None => BoundingBox {
                x0: x,
                y0: y,
                x1: x + 1,
                y1: y + 1,
            },
            Some(b) => BoundingBox {
                x0: b.x0.min(x),
                y0: b.y0.min(y),
                x1: b.x1.max(x + 1),
                y1: b.y1.max(y + 1),
            },
        });
    }
    bounds
}

/// Area left for content once `padding` is removed from every side.
///
/// Returns `None` when either axis would collapse to zero or below.
pub fn content_size(target: Dimensions, padding: u32) -> Option<Dimensions> {
    let margin = padding.checked_mul(2)?;
    let width = target.width.checked_sub(margin).filter(|w| *w > 0)?;
    let height = target.height.checked_sub(margin).filter(|h| *h > 0)?;
    Some(Dimensions::new(width, height))
}

/// Largest size with the source's aspect ratio that fits inside `content`.
///
/// When the content box is relatively wider than the source, height is the
/// limiting dimension; otherwise (ties included) width is. The free dimension
/// is truncated toward zero, then raised to at least one pixel.
///
/// # Examples
/// ```
/// # use imager::imaging::{Dimensions, fit_within};
/// // 2:1 landscape into a square box → width-bound
/// let fit = fit_within(Dimensions::new(400, 200), Dimensions::new(180, 180));
/// assert_eq!(fit, Dimensions::new(180, 90));
/// ```
pub fn fit_within(source: Dimensions, content: Dimensions) -> Dimensions {
    let source_ratio = source.width as f64 / source.height as f64;
    let target_ratio = content.width as f64 / content.height as f64;

    let (width, height) = if target_ratio > source_ratio {
        let h = content.height;
        ((h as f64 * source_ratio) as u32, h)
    } else {
        let w = content.width;
        (w, (w as f64 / source_ratio) as u32)
    };

    Dimensions::new(width.max(1), height.max(1))
}

/// Offset that centers `inner` inside `outer`, floor-divided.
///
/// Odd leftovers put the extra pixel on the right/bottom side.
pub fn centered_offset(outer: Dimensions, inner: Dimensions) -> (u32, u32) {
    (
        outer.width.saturating_sub(inner.width) / 2,
        outer.height.saturating_sub(inner.height) / 2,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba};

    fn transparent_with_block(w: u32, h: u32, block: (u32, u32, u32, u32)) -> DynamicImage {
        let (bx, by, bw, bh) = block;
        DynamicImage::ImageRgba8(RgbaImage::from_fn(w, h, |x, y| {
            if x >= bx && x < bx + bw && y >= by && y < by + bh {
                Rgba([200, 10, 10, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        }))
    }

    // =========================================================================
    // autocrop_box tests
    // =========================================================================

    #[test]
    fn autocrop_finds_opaque_block() {
        let img = transparent_with_block(50, 40, (10, 5, 20, 15));
        let b = autocrop_box(&img).unwrap();
        assert_eq!(
            b,
            BoundingBox {
                x0: 10,
                y0: 5,
                x1: 30,
                y1: 20
            }
        );
    }

    #[test]
    fn autocrop_counts_partially_transparent_pixels() {
        let mut rgba = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 0]));
        rgba.put_pixel(7, 2, Rgba([0, 0, 0, 1]));
        let b = autocrop_box(&DynamicImage::ImageRgba8(rgba)).unwrap();
        assert_eq!((b.x0, b.y0, b.width(), b.height()), (7, 2, 1, 1));
    }

    #[test]
    fn autocrop_fully_transparent_is_none() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 0])));
        assert_eq!(autocrop_box(&img), None);
    }

    #[test]
    fn autocrop_without_alpha_is_full_frame() {
        // Black pixels are still content when there is no alpha channel
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(12, 9, Rgb([0, 0, 0])));
        assert_eq!(
            autocrop_box(&img),
            Some(BoundingBox::full(Dimensions::new(12, 9)))
        );
    }

    #[test]
    fn autocrop_is_idempotent() {
        let img = transparent_with_block(64, 48, (3, 30, 17, 9));
        let b = autocrop_box(&img).unwrap();
        let cropped = img.crop_imm(b.x0, b.y0, b.width(), b.height());

        let again = autocrop_box(&cropped).unwrap();
        assert_eq!(again, BoundingBox::full(Dimensions::of(&cropped)));
    }

    // =========================================================================
    // content_size tests
    // =========================================================================

    #[test]
    fn content_size_subtracts_both_sides() {
        assert_eq!(
            content_size(Dimensions::new(200, 200), 10),
            Some(Dimensions::new(180, 180))
        );
    }

    #[test]
    fn content_size_rejects_collapsed_axis() {
        assert_eq!(content_size(Dimensions::new(200, 20), 10), None);
        assert_eq!(content_size(Dimensions::new(20, 200), 15), None);
    }

    #[test]
    fn content_size_zero_padding_is_target() {
        assert_eq!(
            content_size(Dimensions::new(31, 7), 0),
            Some(Dimensions::new(31, 7))
        );
    }

    #[test]
    fn content_size_huge_padding_does_not_overflow() {
        assert_eq!(content_size(Dimensions::new(100, 100), u32::MAX), None);
    }

    // =========================================================================
    // fit_within tests
    // =========================================================================

    #[test]
    fn fit_landscape_into_square_is_width_bound() {
        assert_eq!(
            fit_within(Dimensions::new(400, 200), Dimensions::new(180, 180)),
            Dimensions::new(180, 90)
        );
    }

    #[test]
    fn fit_portrait_into_square_is_height_bound() {
        assert_eq!(
            fit_within(Dimensions::new(200, 400), Dimensions::new(180, 180)),
            Dimensions::new(90, 180)
        );
    }

    #[test]
    fn fit_equal_ratio_fills_box() {
        assert_eq!(
            fit_within(Dimensions::new(100, 100), Dimensions::new(50, 50)),
            Dimensions::new(50, 50)
        );
    }

    #[test]
    fn fit_truncates_free_dimension() {
        // 100 / 1.5 = 66.67 → 66
        assert_eq!(
            fit_within(Dimensions::new(300, 200), Dimensions::new(100, 100)),
            Dimensions::new(100, 66)
        );
        // 100 * 0.667 = 66.67 → 66
        assert_eq!(
            fit_within(Dimensions::new(200, 300), Dimensions::new(100, 100)),
            Dimensions::new(66, 100)
        );
    }

    #[test]
    fn fit_upscales_small_sources() {
        assert_eq!(
            fit_within(Dimensions::new(10, 20), Dimensions::new(100, 100)),
            Dimensions::new(50, 100)
        );
    }

    #[test]
    fn fit_extreme_ratio_keeps_one_pixel() {
        let fit = fit_within(Dimensions::new(1000, 1), Dimensions::new(10, 10));
        assert_eq!(fit, Dimensions::new(10, 1));
    }

    #[test]
    fn fit_preserves_aspect_within_a_pixel() {
        let sources = [(640, 480), (123, 457), (1920, 1080), (77, 77), (5, 300)];
        let boxes = [(180, 180), (300, 120), (64, 500)];
        for &(sw, sh) in &sources {
            for &(cw, ch) in &boxes {
                let fit = fit_within(Dimensions::new(sw, sh), Dimensions::new(cw, ch));
                assert!(fit.width <= cw && fit.height <= ch, "{fit} exceeds {cw}x{ch}");

                let ratio = sw as f64 / sh as f64;
                let err_h = (fit.height as f64 - fit.width as f64 / ratio).abs();
                let err_w = (fit.width as f64 - fit.height as f64 * ratio).abs();
                assert!(
                    err_h < 1.0 || err_w < 1.0,
                    "{sw}x{sh} into {cw}x{ch} gave {fit}"
                );
            }
        }
    }

    // =========================================================================
    // centered_offset tests
    // =========================================================================

    #[test]
    fn centered_offset_even_gap() {
        assert_eq!(
            centered_offset(Dimensions::new(200, 200), Dimensions::new(180, 90)),
            (10, 55)
        );
    }

    #[test]
    fn centered_offset_odd_gap_biases_top_left() {
        let outer = Dimensions::new(11, 8);
        let inner = Dimensions::new(4, 5);
        let (dx, dy) = centered_offset(outer, inner);
        assert_eq!((dx, dy), (3, 1));

        let right_gap = outer.width - inner.width - dx;
        let bottom_gap = outer.height - inner.height - dy;
        assert_eq!(dx + right_gap, outer.width - inner.width);
        assert_eq!((right_gap, bottom_gap), (4, 2));
    }
}
