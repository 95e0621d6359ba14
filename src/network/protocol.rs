//! HTTP Protocol
//!
//! Response framing shared by the request handler: CORS headers, compact
//! JSON bodies with exact `Content-Length`, and the mapping from request
//! errors to status codes.

use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ALLOW, CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE,
};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::core::state::Move;
use crate::engine::resolver::ResolveError;

/// Methods this service answers.
pub const ALLOWED_METHODS: &str = "OPTIONS, POST";

/// Errors handling a single request.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Body is not a JSON game state.
    #[error("malformed game state: {0}")]
    MalformedJson(#[from] serde_json::Error),

    /// Resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The response body could not be produced.
    #[error("failed to serialize response: {0}")]
    Serialize(serde_json::Error),
}

impl RequestError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            RequestError::MalformedJson(_) => StatusCode::BAD_REQUEST,
            RequestError::Resolve(ResolveError::InvalidState(_)) => StatusCode::BAD_REQUEST,
            RequestError::Resolve(ResolveError::ProtocolViolation(_)) => StatusCode::BAD_GATEWAY,
            RequestError::Resolve(ResolveError::Engine(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            RequestError::Serialize(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON body of an error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    /// Human-readable message.
    pub error: String,
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let body = ErrorBody { error: self.to_string() };
        // Serializing a single string field cannot fail.
        let bytes = serde_json::to_vec(&body).unwrap_or_default();
        json_response(self.status(), bytes)
    }
}

/// Serialize a resolved move as the client expects: `[from,to,pieceId]` or `null`.
pub fn move_json(mv: Option<Move>) -> Result<String, serde_json::Error> {
    serde_json::to_string(&mv)
}

/// A JSON response with CORS, no-cache and exact length headers.
pub fn json_response(status: StatusCode, body: Vec<u8>) -> Response {
    let len = body.len();
    let mut response = (status, body).into_response();

    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_LENGTH, HeaderValue::from(len));

    response
}

/// Answer to a CORS preflight.
pub fn preflight_response() -> Response {
    let mut response = StatusCode::NO_CONTENT.into_response();

    let headers = response.headers_mut();
    headers.insert(ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOWED_METHODS));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("Content-Type"));

    response
}

/// Refusal for any method other than OPTIONS and POST.
pub fn method_not_allowed_response() -> Response {
    let mut response = StatusCode::METHOD_NOT_ALLOWED.into_response();

    let headers = response.headers_mut();
    headers.insert(ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));

    response
}
