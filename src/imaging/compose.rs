//! Alpha compositing.
//!
//! Straight (non-premultiplied) Porter-Duff "over". Over an opaque background
//! this reduces to `fg * a + bg * (1 - a)` per channel.
//!
//! Resampling is the exception: [`resize_premultiplied`] filters in
//! premultiplied space so the color of fully transparent pixels never bleeds
//! into visible edges.

use image::imageops::FilterType;
use image::{Rgba, Rgba32FImage, RgbaImage, RgbImage};

/// Resize an RGBA image with color channels premultiplied by alpha.
///
/// Cut-outs keep arbitrary (often black) color under zero alpha; filtering
/// straight RGBA mixes that color into the subject's edge.
pub fn resize_premultiplied(
    image: &RgbaImage,
    width: u32,
    height: u32,
    filter: FilterType,
) -> RgbaImage {
    let premultiplied = Rgba32FImage::from_fn(image.width(), image.height(), |x, y| {
        let p = image.get_pixel(x, y);
        let a = f32::from(p[3]) / 255.0;
        Rgba([
            f32::from(p[0]) / 255.0 * a,
            f32::from(p[1]) / 255.0 * a,
            f32::from(p[2]) / 255.0 * a,
            a,
        ])
    });
    let resized = image::imageops::resize(&premultiplied, width, height, filter);

    RgbaImage::from_fn(width, height, |x, y| {
        let p = resized.get_pixel(x, y);
        let a = p[3].clamp(0.0, 1.0);
        let alpha = to_u8(a);
        if alpha == 0 {
            return Rgba([0, 0, 0, 0]);
        }
        Rgba([to_u8(p[0] / a), to_u8(p[1] / a), to_u8(p[2] / a), alpha])
    })
}

fn to_u8(unit: f32) -> u8 {
    (unit.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Composite `foreground` over `background`.
///
/// A background of a different size is stretched to the foreground's size
/// first (no aspect preservation). The result keeps its alpha channel; call
/// [`flatten`] once nothing else will be layered on top.
pub fn composite_over(foreground: &RgbaImage, background: &RgbaImage) -> RgbaImage {
    let (w, h) = foreground.dimensions();
    let stretched;
    let background = if background.dimensions() == (w, h) {
        background
    } else {
        stretched = resize_premultiplied(background, w, h, FilterType::CatmullRom);
        &stretched
    };

    RgbaImage::from_fn(w, h, |x, y| {
        over(*foreground.get_pixel(x, y), *background.get_pixel(x, y))
    })
}

fn over(fg: Rgba<u8>, bg: Rgba<u8>) -> Rgba<u8> {
    let fa = fg[3] as f32 / 255.0;
    let ba = bg[3] as f32 / 255.0;
    let out_a = fa + ba * (1.0 - fa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let mut out = [0u8; 4];
    for c in 0..3 {
        let value = (fg[c] as f32 * fa + bg[c] as f32 * ba * (1.0 - fa)) / out_a;
        out[c] = value.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgba(out)
}

/// Drop the alpha channel, producing an opaque RGB image.
pub fn flatten(image: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let p = image.get_pixel(x, y);
        image::Rgb([p[0], p[1], p[2]])
    })
}
