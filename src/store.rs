//! Filesystem primitives used by the pipeline and batch runner.
//!
//! Final outputs are only ever created by renaming a fully written temp file
//! that sits next to the destination, so a reader can never observe a
//! half-written image at a final path. The temp file is removed when the
//! write or the rename fails.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to finalize {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn io_at(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Read/write/list/move operations over image files.
pub trait ImageStore {
    /// Regular files directly inside `dir`, in listing order. No recursion.
    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>, StoreError>;

    fn read(&self, path: &Path) -> Result<Vec<u8>, StoreError>;

    /// Write `bytes` to a temp file beside `dest`, then rename it into place.
    fn write_atomic(&self, dest: &Path, bytes: &[u8]) -> Result<(), StoreError>;

    /// Move `from` into `to_dir`, keeping its filename. Returns the new path.
    fn move_into(&self, from: &Path, to_dir: &Path) -> Result<PathBuf, StoreError>;

    fn ensure_dir(&self, dir: &Path) -> Result<(), StoreError>;
}

/// [`ImageStore`] over the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl FsStore {
    pub fn new() -> Self {
        Self
    }
}

impl ImageStore for FsStore {
    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
        let mut files = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
        {
            let entry = entry.map_err(|e| StoreError::Io {
                path: e.path().unwrap_or(dir).to_path_buf(),
                source: e.into(),
            })?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>, StoreError> {
        fs::read(path).map_err(io_at(path))
    }

    fn write_atomic(&self, dest: &Path, bytes: &[u8]) -> Result<(), StoreError> {
        let dir = match dest.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut staged = tempfile::Builder::new()
            .prefix(".imager-")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(io_at(dir))?;
        staged.write_all(bytes).map_err(io_at(staged.path()))?;
        staged.as_file().sync_all().map_err(io_at(staged.path()))?;

        staged.persist(dest).map_err(|e| StoreError::Persist {
            path: dest.to_path_buf(),
            source: e.error,
        })?;
        Ok(())
    }

    fn move_into(&self, from: &Path, to_dir: &Path) -> Result<PathBuf, StoreError> {
        let name = from.file_name().ok_or_else(|| StoreError::Io {
            path: from.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
        })?;
        let to = to_dir.join(name);
        fs::rename(from, &to).map_err(io_at(from))?;
        Ok(to)
    }

    fn ensure_dir(&self, dir: &Path) -> Result<(), StoreError> {
        fs::create_dir_all(dir).map_err(io_at(dir))
    }
}
