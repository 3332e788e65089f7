//! Concrete background removers.
//!
//! | Remover | How |
//! |---|---|
//! | [`CommandRemover`] | pipes PNG bytes through an external program (default `rembg i - -`) |
//! | [`KeyColorRemover`] | keys out pixels close to the top-left corner color, in-process |
//!
//! The external program is the production path: segmentation models live
//! outside this crate. The key-color remover handles studio shots on a flat
//! backdrop without any extra tooling.

use super::backend::{BackgroundRemover, RemoverError};
use super::operations::encode_png;
use image::{DynamicImage, Rgba};
use std::io::Write;
use std::process::{Command, Stdio};

/// Runs an external program with the image on stdin and reads the result
/// from stdout.
#[derive(Debug, Clone)]
pub struct CommandRemover {
    program: String,
    args: Vec<String>,
}

impl CommandRemover {
    /// Build from a full command line: program first, then its arguments.
    pub fn new(command: &[String]) -> Result<Self, RemoverError> {
        let (program, args) = command.split_first().ok_or(RemoverError::EmptyCommand)?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl BackgroundRemover for CommandRemover {
    fn name(&self) -> &str {
        &self.program
    }

    fn remove(&self, png: &[u8]) -> Result<Vec<u8>, RemoverError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| RemoverError::ProcessingFailed("child stdin unavailable".into()))?;

        // Feed stdin from a second thread so a chatty child cannot fill its
        // stdout pipe while we are still writing.
        let (written, output) = std::thread::scope(|s| {
            let writer = s.spawn(move || stdin.write_all(png));
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked")));
            (written, output)
        });

        let output = output?;
        if !output.status.success() {
            return Err(RemoverError::CommandFailed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        written?;
        if output.stdout.is_empty() {
            return Err(RemoverError::ProcessingFailed(format!(
                "'{}' produced no output",
                self.program
            )));
        }
        Ok(output.stdout)
    }
}

/// Makes every pixel within `tolerance` of the top-left corner transparent.
#[derive(Debug, Clone, Copy)]
pub struct KeyColorRemover {
    /// Maximum per-channel difference still counted as background.
    pub tolerance: u8,
}

impl KeyColorRemover {
    pub fn new(tolerance: u8) -> Self {
        Self { tolerance }
    }
}

impl Default for KeyColorRemover {
    fn default() -> Self {
        Self::new(30)
    }
}

impl BackgroundRemover for KeyColorRemover {
    fn name(&self) -> &str {
        "key-color"
    }

    fn remove(&self, png: &[u8]) -> Result<Vec<u8>, RemoverError> {
        let mut rgba = image::load_from_memory(png)
            .map_err(|e| RemoverError::ProcessingFailed(format!("decode failed: {e}")))?
            .to_rgba8();
        let Some(&key) = rgba.get_pixel_checked(0, 0) else {
            return Err(RemoverError::ProcessingFailed("image is empty".into()));
        };

        for pixel in rgba.pixels_mut() {
            let close = (0..3).all(|c| pixel[c].abs_diff(key[c]) <= self.tolerance);
            if close {
                *pixel = Rgba([0, 0, 0, 0]);
            }
        }

        encode_png(&DynamicImage::ImageRgba8(rgba))
            .map_err(|e| RemoverError::ProcessingFailed(format!("encode failed: {e}")))
    }
}
