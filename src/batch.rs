//! Batch runner: process every file in an intake directory.
//!
//! ```text
//! input/                    output/
//! ├── a.jpg   ──process──▶  ├── a_c_200x200.png
//! ├── b.png   ──process──▶  └── b_c_200x200.png
//! └── processed/
//!     ├── a.jpg   (moved after its output was written)
//!     └── b.png
//! ```
//!
//! Files are handled one at a time in listing order. A file that fails stays
//! in the intake directory and is recorded in the [`BatchReport`]; the loop
//! moves on. Only run-level I/O (creating or listing directories) aborts the
//! batch.
//!
//! Progress is reported through an optional `mpsc` channel so a front end can
//! print while processing continues.

use crate::pipeline::{Pipeline, PipelineOutcome};
use crate::request::ProcessingOptions;
use crate::store::StoreError;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Archive directory name used when none is configured.
pub const DEFAULT_ARCHIVE_DIR: &str = "processed";

#[derive(Error, Debug)]
pub enum BatchError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Directories a batch reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Name of the archive directory created inside `input_dir`.
    pub archive_dir_name: String,
}

impl BatchConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            archive_dir_name: DEFAULT_ARCHIVE_DIR.to_string(),
        }
    }

    pub fn with_archive_dir(mut self, name: impl Into<String>) -> Self {
        self.archive_dir_name = name.into();
        self
    }

    /// Where successfully processed inputs are moved.
    pub fn archive_dir(&self) -> PathBuf {
        self.input_dir.join(&self.archive_dir_name)
    }
}

/// Progress notifications. Indices are 1-based.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    Started {
        total: usize,
    },
    NothingToDo,
    ImageStarted {
        index: usize,
        total: usize,
        name: String,
    },
    ImageDone {
        index: usize,
        total: usize,
        output: PathBuf,
        warnings: Vec<String>,
    },
    ImageFailed {
        index: usize,
        total: usize,
        name: String,
        error: String,
    },
}

/// A file that could not be processed; it stays in the intake directory.
#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    pub source: PathBuf,
    pub error: String,
}

/// Summary of one batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub total: usize,
    pub processed: usize,
    /// True when the intake directory held no files.
    pub nothing_to_do: bool,
    pub outputs: Vec<PipelineOutcome>,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn warnings(&self) -> usize {
        self.outputs.iter().map(|o| o.warnings.len()).sum()
    }
}

fn emit(events: &Option<Sender<BatchEvent>>, event: BatchEvent) {
    if let Some(tx) = events {
        // A dropped receiver only means nobody is listening
        tx.send(event).ok();
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Run `template` over every file in `config.input_dir`.
pub fn run_batch(
    config: &BatchConfig,
    template: &ProcessingOptions,
    pipeline: &Pipeline,
    events: Option<Sender<BatchEvent>>,
) -> Result<BatchReport, BatchError> {
    let store = pipeline.store();
    let archive = config.archive_dir();
    store.ensure_dir(&config.output_dir)?;
    store.ensure_dir(&archive)?;

    let files = store.list_files(&config.input_dir)?;
    let total = files.len();
    let mut report = BatchReport {
        total,
        ..Default::default()
    };

    if files.is_empty() {
        tracing::info!(input = %config.input_dir.display(), "no images to process");
        report.nothing_to_do = true;
        emit(&events, BatchEvent::NothingToDo);
        return Ok(report);
    }

    emit(&events, BatchEvent::Started { total });

    for (i, source) in files.iter().enumerate() {
        let index = i + 1;
        let name = display_name(source);
        emit(
            &events,
            BatchEvent::ImageStarted {
                index,
                total,
                name: name.clone(),
            },
        );

        let request = template.for_file(source, &config.output_dir);
        let result = pipeline
            .run(&request)
            .map_err(|e| e.to_string())
            .and_then(|outcome| {
                store
                    .move_into(source, &archive)
                    .map(|_| outcome)
                    .map_err(|e| format!("output written but archiving failed: {e}"))
            });

        match result {
            Ok(outcome) => {
                report.processed += 1;
                emit(
                    &events,
                    BatchEvent::ImageDone {
                        index,
                        total,
                        output: outcome.output.clone(),
                        warnings: outcome.warnings.clone(),
                    },
                );
                report.outputs.push(outcome);
            }
            Err(error) => {
                tracing::warn!(source = %source.display(), %error, "image failed");
                emit(
                    &events,
                    BatchEvent::ImageFailed {
                        index,
                        total,
                        name,
                        error: error.clone(),
                    },
                );
                report.failures.push(BatchFailure {
                    source: source.clone(),
                    error,
                });
            }
        }
    }

    tracing::info!(
        processed = report.processed,
        failed = report.failed(),
        "batch finished"
    );
    Ok(report)
}
