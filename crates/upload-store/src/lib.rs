//! Flat file store for uploads with a two-phase publish.
//!
//! Uploads are first written to `scratch/` under a throwaway name. Only a
//! priced upload is committed: it is renamed into `files/` under a fresh
//! random [`StoredFileId`]. A file in `files/` is therefore always complete.

pub mod errors;
pub mod id;
pub mod scratch;
pub mod store;

pub use errors::StoreError;
pub use id::StoredFileId;
pub use scratch::ScratchUpload;
pub use store::{StoredFile, UploadStore, STORED_EXTENSION};
