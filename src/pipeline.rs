//! The per-image transformation pipeline.
//!
//! Stages run in a fixed order, each only when requested, each consuming the
//! previous stage's image:
//!
//! ```text
//! Raw ─▶ remove background? ─▶ autocrop? ─▶ resize + pad? ─▶ add background? ─▶ Final
//! ```
//!
//! | Stage | Mode after the stage |
//! |---|---|
//! | remove background | RGBA |
//! | autocrop | unchanged |
//! | resize + pad | RGBA (transparent margins) |
//! | add background | RGB (flattened) |
//!
//! `Final` is encoded as PNG and handed to the [`ImageStore`] as a staged
//! write: temp file beside the destination, then rename. A failing stage
//! returns before anything is written, so the destination is either the
//! complete new image or untouched.
//!
//! When no stage is requested the source bytes are copied verbatim under the
//! original filename; nothing is decoded or re-encoded.

use crate::imaging::{
    BackgroundRemover, Dimensions, OperationError, add_background, autocrop,
    encode_png, remove_background, resize_and_pad,
};
use crate::naming::{AppliedStages, derive_output_name};
use crate::request::{ProcessingOptions, ProcessingRequest};
use crate::store::{ImageStore, StoreError};
use image::{DynamicImage, Rgba};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Operation(#[from] OperationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// In-memory result of running the stages over one image.
#[derive(Debug, Clone)]
pub struct StageOutcome {
    pub image: DynamicImage,
    pub applied: AppliedStages,
    /// Non-fatal problems, e.g. an unusable background spec.
    pub warnings: Vec<String>,
}

/// Result of processing one file end to end.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    pub source: PathBuf,
    pub output: PathBuf,
    pub applied: AppliedStages,
    /// Output pixel size; `None` for pass-through copies.
    pub dimensions: Option<Dimensions>,
    pub warnings: Vec<String>,
}

/// Runs the stages for one image at a time.
pub struct Pipeline<'a> {
    remover: &'a dyn BackgroundRemover,
    store: &'a dyn ImageStore,
    fallback: Rgba<u8>,
}

impl<'a> Pipeline<'a> {
    /// `fallback` is the color used when a background spec cannot be resolved.
    pub fn new(
        remover: &'a dyn BackgroundRemover,
        store: &'a dyn ImageStore,
        fallback: Rgba<u8>,
    ) -> Self {
        Self {
            remover,
            store,
            fallback,
        }
    }

    pub fn store(&self) -> &'a dyn ImageStore {
        self.store
    }

    /// Apply the requested stages to an already decoded image.
    ///
    /// No I/O besides the remover and background-image loading; single-image
    /// callers use this directly.
    pub fn transform(
        &self,
        options: &ProcessingOptions,
        image: DynamicImage,
    ) -> Result<StageOutcome, PipelineError> {
        let mut image = image;
        let mut applied = AppliedStages::default();
        let mut warnings = Vec::new();

        if options.remove_background {
            tracing::debug!(remover = self.remover.name(), "removing background");
            image = remove_background(self.remover, &image)?;
            applied.background_removed = true;
        }

        if options.crop {
            tracing::debug!("autocropping");
            image = autocrop(&image);
            applied.cropped = true;
        }

        if let Some(spec) = options.resize_spec() {
            tracing::debug!(target = %spec.target, padding = spec.padding, "resizing");
            image = resize_and_pad(&image, spec)?;
            applied.resized = Some(spec.target);
        }

        if let Some(background) = &options.background {
            tracing::debug!(background = %background, "adding background");
            let (composited, warning) = add_background(&image, background, self.fallback);
            image = composited;
            warnings.extend(warning);
            applied.background_added = true;
        }

        Ok(StageOutcome {
            image,
            applied,
            warnings,
        })
    }

    /// Read, transform and write one file.
    pub fn run(&self, request: &ProcessingRequest) -> Result<PipelineOutcome, PipelineError> {
        let source = &request.source;
        let bytes = self.store.read(source)?;
        let input_name = source
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();

        if request.options.is_pass_through() {
            let output = request.output_dir.join(&input_name);
            self.store.write_atomic(&output, &bytes)?;
            tracing::info!(source = %source.display(), output = %output.display(), "copied unchanged");
            return Ok(PipelineOutcome {
                source: source.clone(),
                output,
                applied: AppliedStages::default(),
                dimensions: None,
                warnings: Vec::new(),
            });
        }

        let image = image::load_from_memory(&bytes).map_err(|e| PipelineError::Decode {
            path: source.clone(),
            source: e,
        })?;
        let outcome = self.transform(&request.options, image)?;

        let output = request
            .output_dir
            .join(derive_output_name(&input_name, &outcome.applied));
        let png = encode_png(&outcome.image).map_err(|e| PipelineError::Encode {
            path: output.clone(),
            source: e,
        })?;
        self.store.write_atomic(&output, &png)?;
        tracing::info!(source = %source.display(), output = %output.display(), "processed");

        Ok(PipelineOutcome {
            source: source.clone(),
            output,
            applied: outcome.applied,
            dimensions: Some(Dimensions::of(&outcome.image)),
            warnings: outcome.warnings,
        })
    }
}

/// Output path `request` would produce, without running anything.
pub fn planned_output(request: &ProcessingRequest) -> PathBuf {
    let options = &request.options;
    let applied = AppliedStages {
        background_removed: options.remove_background,
        cropped: options.crop,
        resized: options.resize,
        background_added: options.background.is_some(),
    };
    let name = request
        .source
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    request
        .output_dir
        .join(derive_output_name(&name, &applied))
}
