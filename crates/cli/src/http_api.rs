use axum::{
    body::{Body, Bytes},
    http::{header::CONTENT_TYPE, Response as HttpResponse, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use wordscan_analyzer::{validate_request, AnalysisError, Analyzer, ErrorKind, PoolSnapshot};
use wordscan_protocol::{
    serialize_json, AnalysisRequest, ErrorEnvelope, FieldErrors, API_HEALTH_PATH, API_MATCH_PATH,
};

pub(crate) struct HttpState {
    pub(crate) analyzer: Analyzer,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    pool: PoolSnapshot,
}

pub(crate) fn router(state: Arc<HttpState>) -> Router {
    Router::new()
        .route(
            API_MATCH_PATH,
            post({
                let state = state.clone();
                move |body| http_match(body, state.clone())
            }),
        )
        .route(
            API_HEALTH_PATH,
            get({
                let state = state.clone();
                move || http_health(state.clone())
            }),
        )
}

async fn http_match(body: Bytes, state: Arc<HttpState>) -> Response {
    let request: AnalysisRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(err) => {
            return build_response(
                StatusCode::BAD_REQUEST,
                &error_response("invalid_request", format!("Invalid JSON body: {err}")),
            );
        }
    };

    let (url, words) = match validate_request(&request) {
        Ok(valid) => valid,
        Err(field_errors) => {
            log::warn!("Rejected analysis request: {field_errors:?}");
            return build_response(StatusCode::BAD_REQUEST, &validation_error(field_errors));
        }
    };

    log::info!(
        "Received text analysis request for URL: {url} with {} words",
        words.len()
    );
    match state.analyzer.analyze_url(url.as_str(), &words).await {
        Ok(response) => build_response(StatusCode::OK, &response),
        Err(err) => {
            let (status, envelope) = analysis_error(&err);
            build_response(status, &envelope)
        }
    }
}

async fn http_health(state: Arc<HttpState>) -> Response {
    build_response(
        StatusCode::OK,
        &HealthResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
            pool: state.analyzer.pool_snapshot(),
        },
    )
}

pub(crate) fn error_response(code: &str, message: String) -> ErrorEnvelope {
    let hint = match code {
        "invalid_request" => {
            "Send a JSON object: {\"textUrl\": \"https://...\", \"words\": [\"...\"]}."
        }
        "VALIDATION_ERROR" => "Fix the fields listed in fieldErrors and retry.",
        "INVALID_URL" => "Check that the URL is reachable and returns 200 OK.",
        "FILE_SIZE_EXCEEDED" => "Raise max_file_size or analyze a smaller document.",
        "READ_FAILURE" => "The document could not be read in time; retry or raise request_timeout.",
        _ => "Check the server logs for details.",
    };
    ErrorEnvelope::new(code, message).with_hint(hint)
}

pub(crate) fn validation_error(field_errors: FieldErrors) -> ErrorEnvelope {
    error_response("VALIDATION_ERROR", "Validation failed".to_string())
        .with_field_errors(field_errors)
}

/// Map an analysis failure to its HTTP status and error body.
///
/// Internal failures are logged in full and reported with a generic message.
pub(crate) fn analysis_error(err: &AnalysisError) -> (StatusCode, ErrorEnvelope) {
    let status = match err.kind() {
        ErrorKind::InvalidSource | ErrorKind::SizeExceeded => StatusCode::BAD_REQUEST,
        ErrorKind::ReadFailure => StatusCode::BAD_GATEWAY,
        ErrorKind::InternalFailure => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if err.kind() == ErrorKind::InternalFailure {
        log::error!("Unexpected failure: {err}");
        return (
            status,
            error_response(err.code(), "An unexpected error occurred".to_string()),
        );
    }

    let mut envelope = error_response(err.code(), err.to_string());
    if let Some(details) = err.details() {
        envelope = envelope.with_details(details);
    }
    (status, envelope)
}

pub(crate) fn build_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    let Ok(json) = serialize_json(body) else {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    HttpResponse::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(json.into_bytes()))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
