//! # Imager
//!
//! A batch image processor for product and profile shots: remove the
//! background, trim to the subject, fit it onto a fixed-size padded canvas and
//! composite a new background. A flat intake directory goes in; PNG files
//! named after the stages that produced them come out.
//!
//! # Architecture: One Pipeline, Thin Callers
//!
//! ```text
//! input/a.jpg ─▶ ProcessingRequest ─▶ Pipeline ─▶ staged write ─▶ output/a_b_c_480x480_bg.png
//!                      ▲                 │
//!        CLI flags / preset / file      remover, autocrop, resize+pad, background
//! ```
//!
//! The batch runner, the single-file command and any other front end differ
//! only in how they build a [`request::ProcessingRequest`] and how they present
//! the outcome. Pixel work, naming and the write protocol live in one place.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Geometry, compositing, background resolution, removers, per-stage operations |
//! | [`request`] | Option parsing and validation (`WIDTHxHEIGHT`, presets), processing requests |
//! | [`pipeline`] | Runs the stages for one image and writes the result atomically |
//! | [`naming`] | Output filename derivation from the applied stages |
//! | [`store`] | Filesystem seam: listing, reading, staged writes, archiving |
//! | [`batch`] | Intake-directory loop with progress events and a run report |
//! | [`config`] | `imager.toml` loading, merging over stock defaults, presets |
//! | [`logging`] | `tracing` subscriber setup for the binary |
//! | [`output`] | CLI output formatting for progress, summaries and the preset table |
//!
//! # Design Decisions
//!
//! ## No Partial Outputs
//!
//! Every output is written to a temp file in the destination directory and
//! renamed into place. A failure at any stage, including the write itself,
//! leaves the destination exactly as it was. Inputs are archived only after
//! their output exists, so a crashed run can simply be repeated.
//!
//! ## Background Removal Is a Collaborator
//!
//! Segmentation models are large and change often. The pipeline talks to a
//! [`imaging::BackgroundRemover`] that takes PNG bytes and returns PNG bytes.
//! The default runs an external program (`rembg`); a built-in key-color
//! remover covers flat studio backdrops and tests.
//!
//! ## Bad Backgrounds Degrade, Bad Sizes Abort
//!
//! A background spec that names no known color and no readable image falls
//! back to a configured color with a warning; the image is still produced. A
//! malformed `WIDTHxHEIGHT` is rejected before any file is touched, because it
//! would fail identically for every image.
//!
//! ## Sequential Processing
//!
//! Images are processed one after another. Removers are often GPU or memory
//! bound, and sequential runs keep the archive order and progress output
//! deterministic.

pub mod batch;
pub mod config;
pub mod imaging;
pub mod logging;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod request;
pub mod store;

#[cfg(test)]
pub(crate) mod test_helpers;
