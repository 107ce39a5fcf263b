//! Helper functions: error type and mesh math.

use std::collections::HashMap;

use mesh_parser::ParseError;
use pricing_engine::{ConfigError, QuoteError};
use print_types::MeshGeometry;
use quote_server::PriceRequestError;
use upload_store::StoreError;

// ── Error Type ──────────────────────────────────────────────────────────────

/// Unified error type for the test harness.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("no mesh given to the workflow")]
    MissingMesh,

    #[error("oracle failure ({oracle}): {detail}")]
    OracleFailure { oracle: String, detail: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Quote(#[from] QuoteError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Request(#[from] PriceRequestError),
}

impl HarnessError {
    /// The pricing error behind this failure, whichever stage raised it.
    pub fn quote_error(&self) -> Option<&QuoteError> {
        match self {
            Self::Quote(e) | Self::Request(PriceRequestError::Quote(e)) => Some(e),
            _ => None,
        }
    }

    /// The parse error behind this failure, whichever stage raised it.
    pub fn parse_error(&self) -> Option<&ParseError> {
        match self {
            Self::Parse(e) | Self::Request(PriceRequestError::Parse(e)) => Some(e),
            _ => None,
        }
    }
}

// ── Mesh Math Utilities ─────────────────────────────────────────────────────

type VertKey = (i64, i64, i64);

/// Quantize a vertex so positions that differ by float noise compare equal.
fn vert_key(v: [f32; 3]) -> VertKey {
    let q = |c: f32| (c as f64 * 10000.0).round() as i64;
    (q(v[0]), q(v[1]), q(v[2]))
}

/// How many triangles use each undirected edge, keyed by quantized position.
pub fn edge_use_counts(mesh: &MeshGeometry) -> HashMap<(VertKey, VertKey), usize> {
    let mut counts = HashMap::new();
    for tri in mesh.positions().chunks_exact(9) {
        let keys = [
            vert_key([tri[0], tri[1], tri[2]]),
            vert_key([tri[3], tri[4], tri[5]]),
            vert_key([tri[6], tri[7], tri[8]]),
        ];
        for i in 0..3 {
            let (a, b) = (keys[i], keys[(i + 1) % 3]);
            let edge = if a <= b { (a, b) } else { (b, a) };
            *counts.entry(edge).or_insert(0) += 1;
        }
    }
    counts
}

/// Axis-aligned extents (dx, dy, dz) of a mesh.
pub fn mesh_extents(mesh: &MeshGeometry) -> [f64; 3] {
    let (min, max) = mesh.bounds();
    [
        (max[0] - min[0]) as f64,
        (max[1] - min[1]) as f64,
        (max[2] - min[2]) as f64,
    ]
}
