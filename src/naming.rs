//! Output filename derivation.
//!
//! The output name records which stages touched an image, so a glance at the
//! output directory tells how every file was produced:
//!
//! | Stage | Token |
//! |---|---|
//! | background removed | `_b` |
//! | autocropped | `_c` |
//! | resized | `_{W}x{H}` (target canvas) |
//! | background added | `_bg` |
//!
//! Tokens always appear in that order, then `.png`:
//! - `photo.jpg` + crop + resize 200x200 → `photo_c_200x200.png`
//! - `batman.png` + everything at 320x280 → `batman_b_c_320x280_bg.png`
//! - `raw.tif` + nothing → `raw.tif` (pass-through keeps its name)

use crate::imaging::Dimensions;
use serde::Serialize;
use std::path::Path;

/// Stages that ran for one image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AppliedStages {
    pub background_removed: bool,
    pub cropped: bool,
    /// Target canvas when the image was resized and padded.
    pub resized: Option<Dimensions>,
    pub background_added: bool,
}

impl AppliedStages {
    /// True when at least one stage ran.
    pub fn any(&self) -> bool {
        self.background_removed || self.cropped || self.resized.is_some() || self.background_added
    }

    /// Suffix tokens in canonical order, e.g. `_b_c_200x200_bg`.
    pub fn suffix(&self) -> String {
        let mut suffix = String::new();
        if self.background_removed {
            suffix.push_str("_b");
        }
        if self.cropped {
            suffix.push_str("_c");
        }
        if let Some(dims) = self.resized {
            suffix.push_str(&format!("_{dims}"));
        }
        if self.background_added {
            suffix.push_str("_bg");
        }
        suffix
    }
}

/// Name of the output file for `input_name` after `applied` stages.
///
/// `input_name` may be a bare filename or a path; only the final component
/// is used.
pub fn derive_output_name(input_name: &str, applied: &AppliedStages) -> String {
    let path = Path::new(input_name);
    let file_name = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| input_name.to_string());

    if !applied.any() {
        return file_name;
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or(file_name);
    format!("{}{}.png", stem, applied.suffix())
}
