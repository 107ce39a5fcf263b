//! STL decoding into [`MeshGeometry`](print_types::MeshGeometry), plus
//! binary and ASCII encoders for fixtures.

pub mod decode;
pub mod encode;
pub mod errors;

pub use decode::{detect_encoding, parse_stl, StlEncoding};
pub use encode::{encode_ascii_stl, encode_binary_stl};
pub use errors::ParseError;
