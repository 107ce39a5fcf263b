//! Mesh volume integration and the quote policy built on it.
//!
//! - [`volume`] - signed-tetrahedron volume of a triangle soup
//! - [`config`] - material and pricing knobs
//! - [`engine`] - mass estimate, size limit, price floor

pub mod config;
pub mod engine;
pub mod volume;

pub use config::{ConfigError, PricingConfig};
pub use engine::{PricingEngine, QuoteError};
pub use volume::{enclosed_volume_mm3, signed_tetrahedron_volume, signed_volume_mm3};
