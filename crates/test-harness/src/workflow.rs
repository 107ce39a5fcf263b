//! QuoteWorkflow: fluent API for scripting pricing runs in tests.
//!
//! With a store attached the run goes through `quote_server::price_upload`,
//! the same blocking path the HTTP handler uses.

use std::path::Path;

use mesh_parser::{encode_ascii_stl, encode_binary_stl, parse_stl, StlEncoding};
use pricing_engine::{PricingConfig, PricingEngine};
use print_types::{MeshGeometry, Quote};
use quote_server::price_upload;
use upload_store::{StoredFile, UploadStore};

use crate::helpers::HarnessError;
use crate::oracle::{self, OracleVerdict};

/// A fluent builder that prices one mesh end to end.
pub struct QuoteWorkflow {
    config: PricingConfig,
    mesh: Option<MeshGeometry>,
    encoding: StlEncoding,
    store: Option<UploadStore>,
}

/// Everything a workflow run produced.
#[derive(Debug)]
pub struct WorkflowOutcome {
    /// Bytes that were uploaded.
    pub stl: Vec<u8>,
    /// Mesh as the parser read it back.
    pub parsed: MeshGeometry,
    pub quote: Quote,
    pub stored: Option<StoredFile>,
    pub verdicts: Vec<OracleVerdict>,
}

impl QuoteWorkflow {
    pub fn new(config: PricingConfig) -> Self {
        Self {
            config,
            mesh: None,
            encoding: StlEncoding::Binary,
            store: None,
        }
    }

    pub fn mesh(mut self, mesh: MeshGeometry) -> Self {
        self.mesh = Some(mesh);
        self
    }

    /// Upload as ASCII STL instead of binary.
    pub fn ascii(mut self) -> Self {
        self.encoding = StlEncoding::Ascii;
        self
    }

    /// Persist successful uploads in a store rooted at `root`.
    pub fn store_in(mut self, root: impl AsRef<Path>) -> Result<Self, HarnessError> {
        self.store = Some(UploadStore::open(root)?);
        Ok(self)
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    pub fn upload_store(&self) -> Option<&UploadStore> {
        self.store.as_ref()
    }

    /// Encode, parse, price and (with a store) publish the mesh, then run the
    /// quote oracles over the result.
    pub fn run(&self) -> Result<WorkflowOutcome, HarnessError> {
        let mesh = self.mesh.as_ref().ok_or(HarnessError::MissingMesh)?;
        let engine = PricingEngine::new(self.config)?;

        let stl = match self.encoding {
            StlEncoding::Binary => encode_binary_stl(mesh, "workflow"),
            StlEncoding::Ascii => encode_ascii_stl(mesh, "workflow").into_bytes(),
        };
        let parsed = parse_stl(&stl)?;

        let (quote, stored) = match &self.store {
            Some(store) => {
                let scratch = store.stage(&stl)?;
                let priced = price_upload(&engine, store, scratch, true)?;
                (priced.quote, priced.stored)
            }
            None => (engine.quote(&parsed)?, None),
        };

        let verdicts = oracle::run_all_quote_checks(&parsed, &quote, &self.config);
        Ok(WorkflowOutcome {
            stl,
            parsed,
            quote,
            stored,
            verdicts,
        })
    }
}

impl WorkflowOutcome {
    /// First failed verdict as an error.
    pub fn assert_all_passed(&self) -> Result<(), HarnessError> {
        match self.verdicts.iter().find(|v| !v.passed) {
            Some(v) => Err(HarnessError::OracleFailure {
                oracle: v.oracle_name.clone(),
                detail: v.detail.clone(),
            }),
            None => Ok(()),
        }
    }
}
