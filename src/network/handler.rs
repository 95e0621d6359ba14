//! HTTP Request Handler
//!
//! Every path is served by the same handler:
//!
//! - `OPTIONS` answers the CORS preflight
//! - `POST` reads a JSON game state and answers with the engine's move
//! - anything else is refused with 405

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::core::state::GameState;
use crate::engine::resolver::MoveResolver;
use crate::network::protocol::{
    json_response, method_not_allowed_response, move_json, preflight_response, RequestError,
};

/// State shared by all request handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Move resolver.
    pub resolver: MoveResolver,
    /// Requests seen so far, for log correlation.
    requests: Arc<AtomicU64>,
}

impl AppState {
    /// Create handler state around a resolver.
    pub fn new(resolver: MoveResolver) -> Self {
        Self {
            resolver,
            requests: Arc::new(AtomicU64::new(0)),
        }
    }

    fn next_request_id(&self) -> u64 {
        self.requests.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// Build the router. The path is never inspected and bodies are not size-capped.
pub fn router(state: AppState) -> Router {
    Router::new()
        .fallback(handle_request)
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

async fn handle_request(State(state): State<AppState>, method: Method, body: Bytes) -> Response {
    let id = state.next_request_id();
    let span = info_span!("request", id, method = %method);

    async move {
        match method {
            Method::OPTIONS => preflight_response(),
            Method::POST => match handle_post(&state, &body).await {
                Ok(response) => response,
                Err(e) => {
                    warn!("Request failed ({}): {}", e.status(), e);
                    e.into_response()
                }
            },
            _ => {
                debug!("Unsupported method");
                method_not_allowed_response()
            }
        }
    }
    .instrument(span)
    .await
}

async fn handle_post(state: &AppState, body: &[u8]) -> Result<Response, RequestError> {
    let game_state = GameState::from_json(body)?;
    let mv = state.resolver.resolve(&game_state).await?;

    let json = move_json(mv).map_err(RequestError::Serialize)?;
    info!("player move {}", json);

    Ok(json_response(StatusCode::OK, json.into_bytes()))
}
