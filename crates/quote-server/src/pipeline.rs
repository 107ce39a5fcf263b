//! Blocking core of a `/price` request: parse, quote, then publish or
//! discard the staged upload.

use mesh_parser::{parse_stl, ParseError};
use pricing_engine::{PricingEngine, QuoteError};
use print_types::Quote;
use tracing::instrument;
use upload_store::{ScratchUpload, StoreError, StoredFile, UploadStore};

#[derive(Debug, thiserror::Error)]
pub enum PriceRequestError {
    #[error("invalid STL: {0}")]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Quote(#[from] QuoteError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A priced upload and, when persistence is on, where it was stored.
#[derive(Debug, Clone)]
pub struct PricedUpload {
    pub quote: Quote,
    pub stored: Option<StoredFile>,
}

/// Price a staged upload.
///
/// Every error path drops `scratch`, which deletes it, so a rejected or
/// failed upload never reaches the published directory.
#[instrument(skip_all, fields(size_bytes = scratch.size_bytes(), persist = persist))]
pub fn price_upload(
    engine: &PricingEngine,
    store: &UploadStore,
    scratch: ScratchUpload,
    persist: bool,
) -> Result<PricedUpload, PriceRequestError> {
    let bytes = scratch.read()?;
    let quote = {
        let mesh = parse_stl(&bytes)?;
        engine.quote(&mesh)?
    };
    drop(bytes);

    let stored = if persist {
        Some(store.commit(scratch)?)
    } else {
        scratch.discard()?;
        None
    };
    Ok(PricedUpload { quote, stored })
}
