use std::collections::HashMap;
use std::fs;
use std::path::Path;

use axum::body::Body;
use axum::response::Response;
use axum::Router;
use http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE, ORIGIN};
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use mesh_parser::{encode_ascii_stl, encode_binary_stl};
use print_types::primitives::{axis_box, cube};
use quote_server::messages::{ErrorResponse, PriceResponse};
use quote_server::{app, AppState, ServerConfig};
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "quote-server-test-boundary";

struct TestServer {
    router: Router,
    state: AppState,
    _root: TempDir,
}

impl TestServer {
    fn new(vars: &[(&str, &str)]) -> Self {
        let root = tempfile::tempdir().expect("tempdir");
        let mut map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        map.insert(
            "UPLOAD_DIR".to_string(),
            root.path().join("uploads").display().to_string(),
        );
        map.entry("PUBLIC_HOST".to_string())
            .or_insert_with(|| "prints.example.com".to_string());

        let config = ServerConfig::from_lookup(|key| map.get(key).cloned()).expect("config");
        let state = AppState::new(config).expect("state");
        Self {
            router: app(state.clone()),
            state,
            _root: root,
        }
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("request should complete")
    }

    async fn upload(&self, field: &str, bytes: &[u8]) -> Response {
        self.send(multipart_request(field, bytes)).await
    }

    fn stored_files(&self) -> usize {
        count_entries(self.state.store.files_dir())
    }

    fn scratch_files(&self) -> usize {
        count_entries(self.state.store.scratch_dir())
    }
}

fn count_entries(dir: &Path) -> usize {
    fs::read_dir(dir).expect("read_dir").count()
}

fn multipart_request(field: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"model.stl\"\r\n",
            field
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/price")
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .expect("request should build")
}

async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes()
        .to_vec()
}

async fn json<T: serde::de::DeserializeOwned>(response: Response) -> T {
    serde_json::from_slice(&body_bytes(response).await).expect("valid JSON body")
}

#[tokio::test]
async fn banner_on_root() {
    let server = TestServer::new(&[]);
    let response = server
        .send(Request::get("/").body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let text = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(text.contains("running"));
}

#[tokio::test]
async fn small_cube_hits_minimum_price_and_is_stored() {
    let server = TestServer::new(&[("PRICE_PER_GRAM", "0.30")]);
    let stl = encode_binary_stl(&cube(10.0), "cube");

    let response = server.upload("file", &stl).await;
    assert_eq!(response.status(), StatusCode::OK);
    let quote: PriceResponse = json(response).await;

    assert_eq!(quote.mass_grams, "0.52");
    assert_eq!(quote.price_dollars, "2.00");
    let url = quote.file_url.expect("file url when persisting");
    let name = url
        .strip_prefix("https://prints.example.com/uploads/")
        .expect("url under public host");
    assert!(name.ends_with(".stl"));
    assert_eq!(name.len(), 24 + ".stl".len());

    assert_eq!(server.stored_files(), 1);
    assert_eq!(server.scratch_files(), 0);
    let on_disk = fs::read(server.state.store.files_dir().join(name)).unwrap();
    assert_eq!(on_disk, stl);

    let download = server
        .send(
            Request::get(format!("/uploads/{}", name))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(download.status(), StatusCode::OK);
    assert_eq!(body_bytes(download).await, stl);
}

#[tokio::test]
async fn solid_ascii_cube_prices_linearly() {
    let server = TestServer::new(&[
        ("PRICE_INFILL_FRACTION", "1"),
        ("PRICE_PER_GRAM", "0.30"),
        ("PRICE_MIN", "0.10"),
    ]);
    let stl = encode_ascii_stl(&cube(20.0), "cube");

    let response = server.upload("file", stl.as_bytes()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let quote: PriceResponse = json(response).await;

    // 8 cm3 * 1.24 g/cm3 = 9.92 g, 9.92 * 0.30 = 2.976
    assert_eq!(quote.mass_grams, "9.92");
    assert_eq!(quote.price_dollars, "2.98");
}

#[tokio::test]
async fn missing_file_field_is_bad_request() {
    let server = TestServer::new(&[]);
    let response = server.upload("notes", b"hello").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err: ErrorResponse = json(response).await;
    assert_eq!(err.error, "No file uploaded.");
    assert_eq!(server.stored_files(), 0);
}

#[tokio::test]
async fn unreadable_upload_is_rejected_without_residue() {
    let server = TestServer::new(&[]);
    let response = server
        .upload("file", b"definitely not a triangle mesh")
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err: ErrorResponse = json(response).await;
    assert!(err.error.starts_with("Invalid STL file"));
    assert_eq!(server.stored_files(), 0);
    assert_eq!(server.scratch_files(), 0);
}

#[tokio::test]
async fn oversize_model_is_refused_without_residue() {
    let server = TestServer::new(&[("PRICE_INFILL_FRACTION", "1")]);
    // 250 cm3 solid at 1.24 g/cm3 is 310 g, over the 200 g limit.
    let slab = axis_box([0.0; 3], [100.0, 50.0, 50.0]);

    let response = server
        .upload("file", &encode_binary_stl(&slab, "slab"))
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let err: ErrorResponse = json(response).await;
    assert_eq!(err.error, "Model exceeds 200g auto limit.");
    assert_eq!(server.stored_files(), 0);
    assert_eq!(server.scratch_files(), 0);
}

#[tokio::test]
async fn persistence_disabled_omits_file_url() {
    let server = TestServer::new(&[("PERSIST_UPLOADS", "false")]);
    let response = server
        .upload("file", &encode_binary_stl(&cube(10.0), "cube"))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = json(response).await;
    assert!(body.get("fileUrl").is_none());
    assert_eq!(body["massGrams"], "0.52");
    assert_eq!(server.stored_files(), 0);
    assert_eq!(server.scratch_files(), 0);
}

#[tokio::test]
async fn body_over_limit_is_refused() {
    let server = TestServer::new(&[("MAX_UPLOAD_BYTES", "1024")]);
    let stl = encode_binary_stl(&cube(10.0), "cube");
    let padded: Vec<u8> = stl.iter().copied().chain(std::iter::repeat(0).take(4096)).collect();

    let response = server.upload("file", &padded).await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(server.stored_files(), 0);
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let server = TestServer::new(&[]);
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/price")
        .header(ORIGIN, "https://shop.example.com")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();

    let response = server.send(request).await;
    assert_eq!(
        response
            .headers()
            .get(ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}
