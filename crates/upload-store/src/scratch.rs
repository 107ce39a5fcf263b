use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::errors::StoreError;

/// An upload sitting in the scratch directory.
///
/// Dropping it deletes the file unless [`UploadStore::commit`] took it, so
/// every early return and panic path cleans up.
///
/// [`UploadStore::commit`]: crate::UploadStore::commit
#[derive(Debug)]
pub struct ScratchUpload {
    path: PathBuf,
    size_bytes: u64,
    armed: bool,
}

impl ScratchUpload {
    pub(crate) fn new(path: PathBuf, size_bytes: u64) -> Self {
        Self {
            path,
            size_bytes,
            armed: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Read the staged bytes back.
    pub fn read(&self) -> Result<Vec<u8>, StoreError> {
        fs::read(&self.path).map_err(StoreError::io(&self.path))
    }

    /// Delete the scratch file now, reporting failure instead of logging it.
    pub fn discard(mut self) -> Result<(), StoreError> {
        self.armed = false;
        remove_if_present(&self.path).map_err(StoreError::io(&self.path))?;
        debug!(path = %self.path.display(), "discarded scratch upload");
        Ok(())
    }

    /// Hand the path over to the caller; the guard no longer owns the file.
    pub(crate) fn disarm(mut self) -> PathBuf {
        self.armed = false;
        std::mem::take(&mut self.path)
    }
}

impl Drop for ScratchUpload {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match remove_if_present(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "removed scratch upload"),
            Err(e) => warn!(path = %self.path.display(), error = %e, "failed to remove scratch upload"),
        }
    }
}

pub(crate) fn remove_if_present(path: &Path) -> std::io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
