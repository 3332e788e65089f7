//! Background removal backend trait and shared types.
//!
//! Removal itself is an external capability: encoded image bytes go in, an
//! encoded image with an alpha channel comes out. The [`BackgroundRemover`]
//! trait is that contract and nothing more, so the pipeline stays agnostic of
//! whether pixels are segmented by a model behind a subprocess
//! ([`CommandRemover`](super::remover::CommandRemover)) or by simple color
//! keying ([`KeyColorRemover`](super::remover::KeyColorRemover)).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemoverError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("remover command is empty")]
    EmptyCommand,
    #[error("'{program}' exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("Removal failed: {0}")]
    ProcessingFailed(String),
}

/// Removes the background from an encoded image.
///
/// Implementations receive PNG bytes and must return bytes of any format the
/// `image` crate can decode, carrying an alpha channel.
pub trait BackgroundRemover {
    /// Short label used in logs.
    fn name(&self) -> &str;

    fn remove(&self, png: &[u8]) -> Result<Vec<u8>, RemoverError>;
}
