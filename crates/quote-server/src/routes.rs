use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::error::{ApiError, NO_FILE_MESSAGE};
use crate::messages::PriceResponse;
use crate::pipeline::{price_upload, PriceRequestError, PricedUpload};
use crate::state::AppState;

/// Multipart field carrying the mesh.
pub const FILE_FIELD: &str = "file";
pub const BANNER: &str = "STL pricing server is running.";

pub fn app(state: AppState) -> Router {
    let uploads = ServeDir::new(state.store.files_dir());
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(banner))
        .route("/price", post(price))
        .nest_service("/uploads", uploads)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

async fn banner() -> &'static str {
    BANNER
}

async fn price(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<PriceResponse>, ApiError> {
    let bytes = read_file_field(multipart).await?;

    let worker_state = state.clone();
    let priced = tokio::task::spawn_blocking(move || stage_and_price(&worker_state, &bytes))
        .await
        .map_err(|e| {
            error!(error = %e, "pricing task did not finish");
            ApiError::internal()
        })??;

    let file_url = priced.stored.as_ref().map(|f| state.config.file_url(f));
    info!(
        mass_grams = priced.quote.mass_grams,
        price_dollars = priced.quote.price_dollars,
        file_url = file_url.as_deref().unwrap_or("-"),
        "priced upload"
    );
    Ok(Json(PriceResponse::new(&priced.quote, file_url)))
}

/// Stage the upload, then price it. Runs on the blocking pool: file I/O and
/// volume integration are synchronous.
fn stage_and_price(state: &AppState, bytes: &[u8]) -> Result<PricedUpload, PriceRequestError> {
    let scratch = state.store.stage(bytes)?;
    price_upload(
        &state.engine,
        &state.store,
        scratch,
        state.config.persist_uploads,
    )
}

/// Bytes of the first `file` field. Other fields are skipped.
async fn read_file_field(mut multipart: Multipart) -> Result<Vec<u8>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(FILE_FIELD) {
            return Ok(field.bytes().await?.to_vec());
        }
    }
    Err(ApiError::bad_request(NO_FILE_MESSAGE))
}
