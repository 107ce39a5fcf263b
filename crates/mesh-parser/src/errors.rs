use print_types::GeometryError;

/// Errors while decoding an uploaded STL buffer.
///
/// Every variant is client-correctable: the upload itself is bad.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("file is {len} bytes, too short for an STL header")]
    MalformedHeader { len: usize },

    #[error("header declares {declared} triangles but only {available} are present")]
    Truncated { declared: u32, available: usize },

    #[error("STL contains no triangles")]
    Empty,

    #[error("failed to decode STL: {0}")]
    Decode(String),

    #[error("triangle {triangle} has a non-finite coordinate")]
    NonFiniteCoordinate { triangle: usize },

    #[error("invalid geometry: {0}")]
    Geometry(#[from] GeometryError),
}
