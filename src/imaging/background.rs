//! Background layers: solid colors or stretched images.
//!
//! A raw background string is classified once ([`BackgroundSpec::parse`]) and
//! resolved at use time against the size of the image it goes behind. An
//! unusable spec never fails the image: the resolver logs a warning and
//! substitutes the fallback color.
//!
//! ## Color grammar
//!
//! | Form | Example |
//! |---|---|
//! | `#RGB`, `#RGBA` | `#fa0`, `#fa08` |
//! | `#RRGGBB`, `#RRGGBBAA` | `#2A373D`, `#2A373D80` |
//! | CSS/SVG name (any case) | `whitesmoke`, `Blue` |

use super::compose::resize_premultiplied;
use super::params::Dimensions;
use image::imageops::FilterType;
use image::{Rgba, RgbaImage};
use palette::Srgb;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Color used when nothing better is available.
pub const DEFAULT_FALLBACK: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// A background to composite behind the processed image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundSpec {
    /// Hex code or color name, validated at use time.
    Color(String),
    /// Image file stretched to the foreground's size.
    Image(PathBuf),
}

impl BackgroundSpec {
    /// Classify a raw user string.
    ///
    /// Strings starting with `#` or made only of letters are colors;
    /// everything else is treated as an image path.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let alphabetic = !raw.is_empty() && raw.chars().all(char::is_alphabetic);
        if raw.starts_with('#') || alphabetic {
            BackgroundSpec::Color(raw.to_string())
        } else {
            BackgroundSpec::Image(PathBuf::from(raw))
        }
    }
}

impl fmt::Display for BackgroundSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackgroundSpec::Color(c) => write!(f, "{c}"),
            BackgroundSpec::Image(p) => write!(f, "{}", p.display()),
        }
    }
}

/// Parse a hex code or color name into RGBA.
///
/// ```
/// # use imager::imaging::parse_color;
/// assert_eq!(parse_color("#2A373D").map(|c| c.0), Some([42, 55, 61, 255]));
/// assert_eq!(parse_color("WhiteSmoke").map(|c| c.0), Some([245, 245, 245, 255]));
/// assert_eq!(parse_color("notacolor"), None);
/// ```
pub fn parse_color(text: &str) -> Option<Rgba<u8>> {
    let text = text.trim();
    if let Some(hex) = text.strip_prefix('#') {
        return parse_hex(hex);
    }
    let named = palette::named::from_str(&text.to_ascii_lowercase())?;
    Some(Rgba([named.red, named.green, named.blue, 255]))
}

fn parse_hex(hex: &str) -> Option<Rgba<u8>> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let (rgb, alpha) = match hex.len() {
        3 | 6 => (hex, None),
        4 => hex.split_at_checked(3).map(|(c, a)| (c, Some(a.repeat(2))))?,
        8 => hex.split_at_checked(6).map(|(c, a)| (c, Some(a.to_string())))?,
        _ => return None,
    };
    let color = Srgb::<u8>::from_str(rgb).ok()?;
    let alpha = match alpha {
        Some(a) => u8::from_str_radix(&a, 16).ok()?,
        None => 255,
    };
    Some(Rgba([color.red, color.green, color.blue, alpha]))
}

/// A background layer ready for compositing.
#[derive(Debug, Clone)]
pub struct ResolvedBackground {
    pub layer: RgbaImage,
    /// Set when the spec could not be used and the fallback color was taken.
    pub warning: Option<String>,
}

/// Build an RGBA layer of `size` from `spec`, falling back to `fallback`.
pub fn resolve_background(
    spec: &BackgroundSpec,
    size: Dimensions,
    fallback: Rgba<u8>,
) -> ResolvedBackground {
    let solid = |color| RgbaImage::from_pixel(size.width, size.height, color);

    match spec {
        BackgroundSpec::Color(raw) => match parse_color(raw) {
            Some(color) => ResolvedBackground {
                layer: solid(color),
                warning: None,
            },
            None => {
                let warning = format!("invalid color '{raw}', using fallback color");
                tracing::warn!(color = %raw, "invalid background color, using fallback");
                ResolvedBackground {
                    layer: solid(fallback),
                    warning: Some(warning),
                }
            }
        },
        BackgroundSpec::Image(path) => match image::open(path) {
            Ok(img) => ResolvedBackground {
                layer: resize_premultiplied(
                    &img.to_rgba8(),
                    size.width,
                    size.height,
                    FilterType::CatmullRom,
                ),
                warning: None,
            },
            Err(e) => {
                let warning = format!(
                    "background '{}' could not be loaded ({e}), using fallback color",
                    path.display()
                );
                tracing::warn!(path = %path.display(), error = %e, "background image unusable, using fallback");
                ResolvedBackground {
                    layer: solid(fallback),
                    warning: Some(warning),
                }
            }
        },
    }
}
