use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::errors::StoreError;
use crate::id::StoredFileId;
use crate::scratch::{remove_if_present, ScratchUpload};

/// Extension given to every persisted upload.
pub const STORED_EXTENSION: &str = "stl";

const SCRATCH_DIR: &str = "scratch";
const FILES_DIR: &str = "files";
const SCRATCH_EXTENSION: &str = "part";
const MAX_NAME_ATTEMPTS: u32 = 4;

/// A committed upload. Never modified after creation.
#[derive(Debug, Clone, Serialize)]
pub struct StoredFile {
    pub id: StoredFileId,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub stored_at: DateTime<Utc>,
}

impl StoredFile {
    /// `<id>.stl`, the name under which the file is served.
    pub fn file_name(&self) -> String {
        file_name_for(&self.id)
    }

    /// Download link under `base`, e.g. `https://host/uploads/<id>.stl`.
    pub fn public_url(&self, base: &str) -> String {
        format!("{}/{}", base.trim_end_matches('/'), self.file_name())
    }
}

/// Upload root with a scratch area and a published area on one filesystem,
/// so publishing is a single rename.
#[derive(Debug, Clone)]
pub struct UploadStore {
    scratch_dir: PathBuf,
    files_dir: PathBuf,
}

impl UploadStore {
    /// Open (creating if needed) the store rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref();
        let scratch_dir = root.join(SCRATCH_DIR);
        let files_dir = root.join(FILES_DIR);
        fs::create_dir_all(&scratch_dir).map_err(StoreError::io(&scratch_dir))?;
        fs::create_dir_all(&files_dir).map_err(StoreError::io(&files_dir))?;
        Ok(Self {
            scratch_dir,
            files_dir,
        })
    }

    /// Directory holding published files.
    pub fn files_dir(&self) -> &Path {
        &self.files_dir
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Phase one: write `bytes` to a new scratch file and sync it.
    #[instrument(skip(self, bytes), fields(len = bytes.len()))]
    pub fn stage(&self, bytes: &[u8]) -> Result<ScratchUpload, StoreError> {
        let path = self
            .scratch_dir
            .join(format!("{}.{}", Uuid::new_v4(), SCRATCH_EXTENSION));

        // The guard exists before the first write so a failed write still
        // removes whatever was created.
        let scratch = ScratchUpload::new(path.clone(), bytes.len() as u64);
        let mut file = File::create(&path).map_err(StoreError::io(&path))?;
        file.write_all(bytes).map_err(StoreError::io(&path))?;
        file.sync_all().map_err(StoreError::io(&path))?;

        debug!(path = %path.display(), "staged upload");
        Ok(scratch)
    }

    /// Phase two: publish a scratch upload under a fresh random id.
    ///
    /// On failure the scratch file is removed and nothing is published.
    #[instrument(skip_all, fields(scratch = %scratch.path().display()))]
    pub fn commit(&self, scratch: ScratchUpload) -> Result<StoredFile, StoreError> {
        let (id, final_path) = self.unused_name()?;
        let size_bytes = scratch.size_bytes();

        fs::rename(scratch.path(), &final_path).map_err(StoreError::io(&final_path))?;
        scratch.disarm();

        let stored = StoredFile {
            id,
            path: final_path,
            size_bytes,
            stored_at: Utc::now(),
        };
        info!(id = %stored.id, size_bytes, "stored upload");
        Ok(stored)
    }

    /// Path of a published file, if it exists.
    pub fn locate(&self, id: &StoredFileId) -> Option<PathBuf> {
        let path = self.files_dir.join(file_name_for(id));
        path.is_file().then_some(path)
    }

    /// Remove scratch files left behind by an earlier process. Returns how
    /// many were deleted.
    #[instrument(skip(self))]
    pub fn purge_scratch(&self) -> Result<usize, StoreError> {
        let entries = fs::read_dir(&self.scratch_dir).map_err(StoreError::io(&self.scratch_dir))?;
        let mut removed = 0;
        for entry in entries {
            let path = entry.map_err(StoreError::io(&self.scratch_dir))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SCRATCH_EXTENSION) {
                continue;
            }
            match remove_if_present(&path) {
                Ok(()) => removed += 1,
                Err(e) => warn!(path = %path.display(), error = %e, "could not purge scratch file"),
            }
        }
        if removed > 0 {
            info!(removed, "purged stale scratch uploads");
        }
        Ok(removed)
    }

    fn unused_name(&self) -> Result<(StoredFileId, PathBuf), StoreError> {
        for _ in 0..MAX_NAME_ATTEMPTS {
            let id = StoredFileId::generate()?;
            let path = self.files_dir.join(file_name_for(&id));
            if !path.exists() {
                return Ok((id, path));
            }
            warn!(%id, "stored file id collision, drawing again");
        }
        Err(StoreError::NameCollision {
            attempts: MAX_NAME_ATTEMPTS,
        })
    }
}

fn file_name_for(id: &StoredFileId) -> String {
    format!("{}.{}", id, STORED_EXTENSION)
}
