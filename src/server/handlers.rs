use super::types::{ErrorResponse, HealthResponse, InfoResponse, PredictionResponse};
use crate::{
    Error,
    artifacts::ArtifactSummary,
    inference::{ListingRequest, PricePredictor, is_blank},
};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    response::Json,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<PricePredictor>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(err: &Error) -> ApiError {
    let (status, message) = match err {
        Error::Validation { .. } | Error::InvalidBody => (StatusCode::BAD_REQUEST, err.to_string()),
        Error::Normalization(_) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "Invalid total_sqft format".to_string(),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Prediction error: {}", err),
        ),
    };
    (status, Json(ErrorResponse { error: message }))
}

/// `application/json` or an `application/*+json` type, parameters ignored.
fn is_json_content(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

/// Reads the listing from the body. Bodies that are not JSON, or are blank JSON, count as an
/// empty listing.
fn parse_listing(body: &[u8]) -> Result<ListingRequest, Error> {
    let value: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(_) => return Ok(ListingRequest::default()),
    };

    match value {
        Value::Object(_) => Ok(serde_json::from_value(value)?),
        _ if is_blank(&value) => Ok(ListingRequest::default()),
        _ => Err(Error::InvalidBody),
    }
}

pub async fn root() -> Json<InfoResponse> {
    Json(InfoResponse {
        message: "House Price API OK".to_string(),
        ui: "/ui".to_string(),
    })
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn artifacts(State(state): State<AppState>) -> Json<ArtifactSummary> {
    Json(state.predictor.artifacts().summary())
}

pub async fn predict(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<PredictionResponse>, ApiError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("predict", %request_id);
    let _guard = span.enter();

    let listing = if is_json_content(&headers) {
        parse_listing(&body)
    } else {
        debug!("Body is not declared as JSON, treating it as empty");
        Ok(ListingRequest::default())
    };
    let result = listing.and_then(|listing| state.predictor.predict(&listing));
    match result {
        Ok(predicted_price) => {
            info!("Predicted price: {}", predicted_price);
            Ok(Json(PredictionResponse { predicted_price }))
        }
        Err(e) if e.is_client_error() => {
            warn!("Rejected prediction request: {}", e);
            Err(error_response(&e))
        }
        Err(e) => {
            error!("Failed to predict price: {}", e);
            Err(error_response(&e))
        }
    }
}
