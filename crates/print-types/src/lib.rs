pub mod mesh;
pub mod primitives;
pub mod quote;

pub use mesh::*;
pub use quote::*;
