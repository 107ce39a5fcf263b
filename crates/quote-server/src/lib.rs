//! HTTP front end: multipart upload in, quote JSON out.

pub mod config;
pub mod error;
pub mod messages;
pub mod pipeline;
pub mod routes;
pub mod state;

pub use config::{ServerConfig, ServerConfigError};
pub use error::ApiError;
pub use pipeline::{price_upload, PriceRequestError, PricedUpload};
pub use routes::app;
pub use state::{AppState, StartupError};
