//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Batch progress
//!
//! ```text
//! Processing image 1/3... cat.jpg
//!     → output/cat_b_c_480x480_bg.png
//! Processing image 2/3... dog.png
//!     → output/dog_b_c_480x480_bg.png
//!     warning: background 'sunset.jpg' unusable, using fallback
//! Processing image 3/3... notes.txt
//!     failed: Failed to decode input/notes.txt: ...
//!
//! Processed 2 of 3 images (1 failed, 1 warning)
//! ```
//!
//! ## Presets
//!
//! ```text
//! L dark    crop, remove background, 960x960 padding 128, background #2A373D
//! S light   crop, remove background, 240x240 padding 48, background whitesmoke
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! do no I/O.

use crate::batch::{BatchEvent, BatchReport};
use crate::pipeline::PipelineOutcome;
use crate::request::Preset;
use std::collections::BTreeMap;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Batch progress
// ============================================================================

/// Format one progress event.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Started { .. } => Vec::new(),
        BatchEvent::NothingToDo => vec!["No images to process.".to_string()],
        BatchEvent::ImageStarted { index, total, name } => {
            vec![format!("Processing image {index}/{total}... {name}")]
        }
        BatchEvent::ImageDone {
            output, warnings, ..
        } => {
            let mut lines = vec![format!("{}\u{2192} {}", indent(1), output.display())];
            for warning in warnings {
                lines.push(format!("{}warning: {}", indent(1), warning));
            }
            lines
        }
        BatchEvent::ImageFailed { error, .. } => {
            vec![format!("{}failed: {}", indent(1), error)]
        }
    }
}

/// Format the closing summary of a batch run.
pub fn format_batch_summary(report: &BatchReport) -> Vec<String> {
    if report.nothing_to_do {
        return Vec::new();
    }

    let mut details = Vec::new();
    if report.failed() > 0 {
        details.push(format!("{} failed", report.failed()));
    }
    if report.warnings() > 0 {
        details.push(plural(report.warnings(), "warning"));
    }

    let mut line = format!(
        "Processed {} of {}",
        report.processed,
        plural(report.total, "image")
    );
    if !details.is_empty() {
        line.push_str(&format!(" ({})", details.join(", ")));
    }
    vec![String::new(), line]
}

pub fn print_batch_summary(report: &BatchReport) {
    for line in format_batch_summary(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Single file
// ============================================================================

/// Format the result of processing a single file.
pub fn format_file_outcome(outcome: &PipelineOutcome) -> Vec<String> {
    let mut lines = vec![format!(
        "{} \u{2192} {}",
        outcome.source.display(),
        outcome.output.display()
    )];
    match outcome.dimensions {
        Some(dims) => lines.push(format!("{}{}", indent(1), dims)),
        None => lines.push(format!("{}copied unchanged", indent(1))),
    }
    for warning in &outcome.warnings {
        lines.push(format!("{}warning: {}", indent(1), warning));
    }
    lines
}

pub fn print_file_outcome(outcome: &PipelineOutcome) {
    for line in format_file_outcome(outcome) {
        println!("{}", line);
    }
}

// ============================================================================
// Presets
// ============================================================================

/// One-line description of what a preset does.
fn describe_preset(preset: &Preset) -> String {
    let mut parts = Vec::new();
    if preset.crop {
        parts.push("crop".to_string());
    }
    if preset.remove_background {
        parts.push("remove background".to_string());
    }
    if let Some(resize) = &preset.resize {
        if preset.padding > 0 {
            parts.push(format!("{resize} padding {}", preset.padding));
        } else {
            parts.push(resize.clone());
        }
    }
    if let Some(background) = &preset.background {
        parts.push(format!("background {background}"));
    }
    if parts.is_empty() {
        "pass-through".to_string()
    } else {
        parts.join(", ")
    }
}

/// Format the preset table, names aligned.
pub fn format_presets(presets: &BTreeMap<String, Preset>) -> Vec<String> {
    let width = presets.keys().map(|k| k.chars().count()).max().unwrap_or(0);
    presets
        .iter()
        .map(|(name, preset)| format!("{name:<width$}  {}", describe_preset(preset)))
        .collect()
}

pub fn print_presets(presets: &BTreeMap<String, Preset>) {
    for line in format_presets(presets) {
        println!("{}", line);
    }
}
