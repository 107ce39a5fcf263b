use std::path::PathBuf;

/// Errors from the upload store. None of these are the uploader's fault.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("random source unavailable: {0}")]
    Random(String),

    #[error("invalid stored file id: {0:?}")]
    InvalidId(String),

    #[error("no unused file name after {attempts} attempts")]
    NameCollision { attempts: u32 },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| StoreError::Io { path, source }
    }
}
