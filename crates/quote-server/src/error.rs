use axum::extract::multipart::MultipartError;
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use pricing_engine::QuoteError;
use tracing::{error, warn};

use crate::messages::ErrorResponse;
use crate::pipeline::PriceRequestError;

pub const NO_FILE_MESSAGE: &str = "No file uploaded.";
pub const INTERNAL_MESSAGE: &str = "Failed to process STL.";

/// Error half of every handler: a status and a client-facing message.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: INTERNAL_MESSAGE.to_string(),
        }
    }
}

impl From<PriceRequestError> for ApiError {
    fn from(err: PriceRequestError) -> Self {
        match err {
            PriceRequestError::Parse(e) => {
                warn!(error = %e, "rejected unreadable upload");
                Self::bad_request(format!("Invalid STL file: {}", e))
            }
            PriceRequestError::Quote(e @ QuoteError::ModelTooLarge { .. }) => {
                warn!(error = %e, "rejected oversize model");
                Self {
                    status: StatusCode::UNPROCESSABLE_ENTITY,
                    message: e.to_string(),
                }
            }
            PriceRequestError::Quote(e) => {
                error!(error = %e, "quote failed");
                Self::internal()
            }
            PriceRequestError::Store(e) => {
                error!(error = %e, "upload store failed");
                Self::internal()
            }
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        warn!(error = %err, "bad multipart body");
        Self {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}
