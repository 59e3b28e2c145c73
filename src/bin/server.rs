//! HTTP conversion service.
//!
//! Exposes the converter over two JSON endpoints:
//! - `POST /api/convert`  { "image": "<base64>", "mime_type"?: "image/png" } -> { "latex": "..." }
//! - `POST /api/combine`  { "latex_codes": ["...", ...] } -> { "combined_latex": "..." }
//!
//! Listens on `PORT` (default 3001).

use std::env;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::{Json, Router, extract::State, routing::post};
use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use latexify::logging::{LogLevel, init_logging};
use latexify::{GrokClient, ImageFile, LatexConverter, LatexifyError};

#[derive(Clone)]
struct AppState {
    converter: Arc<LatexConverter<GrokClient>>,
}

#[derive(Deserialize)]
struct ConvertRequest {
    image: String,
    mime_type: Option<String>,
}

#[derive(Serialize)]
struct ConvertResponse {
    latex: String,
}

#[derive(Deserialize)]
struct CombineRequest {
    latex_codes: Vec<String>,
}

#[derive(Serialize)]
struct CombineResponse {
    combined_latex: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: String) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: message }))
}

fn into_api_error(err: LatexifyError) -> ApiError {
    let status = match &err {
        LatexifyError::ConfigError(_) => StatusCode::BAD_REQUEST,
        LatexifyError::ApiError(_) | LatexifyError::UnexpectedResponse(_) => StatusCode::BAD_GATEWAY,
        LatexifyError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error!(error = %err, "Request failed");
    (status, Json(ErrorResponse { error: err.to_string() }))
}

#[axum::debug_handler]
async fn convert(
    State(state): State<AppState>,
    Json(payload): Json<ConvertRequest>,
) -> Result<Json<ConvertResponse>, ApiError> {
    let bytes = general_purpose::STANDARD
        .decode(&payload.image)
        .map_err(|e| bad_request(format!("invalid base64 image: {e}")))?;
    if bytes.is_empty() {
        return Err(bad_request("no image data provided".to_string()));
    }

    let image = match payload.mime_type {
        Some(mime_type) => ImageFile::from_bytes(&bytes, mime_type),
        None => ImageFile::sniff(&bytes),
    };

    let latex = state
        .converter
        .convert(&image)
        .await
        .map_err(into_api_error)?;
    Ok(Json(ConvertResponse { latex }))
}

#[axum::debug_handler]
async fn combine(
    State(state): State<AppState>,
    Json(payload): Json<CombineRequest>,
) -> Result<Json<CombineResponse>, ApiError> {
    let combined_latex = state
        .converter
        .combine(&payload.latex_codes)
        .await
        .map_err(into_api_error)?;
    Ok(Json(CombineResponse { combined_latex }))
}

#[tokio::main]
async fn main() -> latexify::Result<()> {
    init_logging(LogLevel::Info);

    let client = GrokClient::from_env()?;
    let state = AppState {
        converter: Arc::new(LatexConverter::new(client)),
    };

    let app = Router::new()
        .route("/api/convert", post(convert))
        .route("/api/combine", post(combine))
        .with_state(state);

    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(3001);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "latexify server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
