//! Processing requests and the options they are built from.
//!
//! Every front end (command line, presets, single-file mode) ends up in the
//! same place: a validated [`ProcessingOptions`] that the batch runner turns
//! into one [`ProcessingRequest`] per input file. Validation happens here,
//! before any file is touched, so a malformed size string aborts the whole
//! invocation instead of failing file by file.

use crate::imaging::{BackgroundSpec, Dimensions, ResizeSpec};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Invalid resize format '{0}': expected WIDTHxHEIGHT, e.g. 200x200")]
    InvalidResizeFormat(String),
    #[error("Unknown preset '{name}'. Available: {available}")]
    UnknownPreset { name: String, available: String },
}

/// Parse a `WIDTHxHEIGHT` string such as `480x320`.
///
/// Both parts must be positive integers; surrounding whitespace is allowed.
pub fn parse_resize(text: &str) -> Result<Dimensions, RequestError> {
    let invalid = || RequestError::InvalidResizeFormat(text.to_string());

    let (w, h) = text.trim().split_once('x').ok_or_else(invalid)?;
    let width: u32 = w.trim().parse().map_err(|_| invalid())?;
    let height: u32 = h.trim().parse().map_err(|_| invalid())?;
    if width == 0 || height == 0 {
        return Err(invalid());
    }
    Ok(Dimensions::new(width, height))
}

/// Which stages to run and with what settings. Shared by every file of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingOptions {
    pub crop: bool,
    pub remove_background: bool,
    pub resize: Option<Dimensions>,
    /// Pixels kept free on each side; only used together with `resize`.
    pub padding: u32,
    pub background: Option<BackgroundSpec>,
}

impl ProcessingOptions {
    /// Build options from raw user input.
    ///
    /// Empty strings count as "not given", matching blank form fields.
    pub fn from_raw(
        crop: bool,
        remove_background: bool,
        resize: Option<&str>,
        padding: u32,
        background: Option<&str>,
    ) -> Result<Self, RequestError> {
        let resize = resize
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(parse_resize)
            .transpose()?;
        let background = background
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(BackgroundSpec::parse);

        if resize.is_none() && padding > 0 {
            tracing::debug!(padding, "padding ignored without a resize target");
        }

        Ok(Self {
            crop,
            remove_background,
            resize,
            padding,
            background,
        })
    }

    /// Resize target with padding, when a resize was requested.
    pub fn resize_spec(&self) -> Option<ResizeSpec> {
        self.resize.map(|target| ResizeSpec {
            target,
            padding: self.padding,
        })
    }

    /// True when no stage is requested and inputs pass through untouched.
    pub fn is_pass_through(&self) -> bool {
        !self.crop && !self.remove_background && self.resize.is_none() && self.background.is_none()
    }

    /// Request for one input file.
    pub fn for_file(&self, source: &Path, output_dir: &Path) -> ProcessingRequest {
        ProcessingRequest {
            source: source.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            options: self.clone(),
        }
    }
}

/// Everything the pipeline needs to process one image.
///
/// The final filename is derived from the stages that ran, so the request
/// carries the output directory rather than a full destination path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingRequest {
    pub source: PathBuf,
    pub output_dir: PathBuf,
    pub options: ProcessingOptions,
}

/// A named bundle of options, stored as plain data in the config file.
///
/// Fields map one-to-one onto [`ProcessingOptions`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Preset {
    pub crop: bool,
    pub remove_background: bool,
    /// `WIDTHxHEIGHT`, validated when the preset is applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resize: Option<String>,
    pub padding: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

impl Preset {
    pub fn to_options(&self) -> Result<ProcessingOptions, RequestError> {
        ProcessingOptions::from_raw(
            self.crop,
            self.remove_background,
            self.resize.as_deref(),
            self.padding,
            self.background.as_deref(),
        )
    }
}
