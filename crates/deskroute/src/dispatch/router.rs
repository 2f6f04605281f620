use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::domain::IncomingRequest;
use super::repository::{Notifier, OutcomeStore};
use super::service::{DispatchError, DispatchService, DispatchStatus};

const DEFAULT_HISTORY_LIMIT: usize = 20;
const MAX_HISTORY_LIMIT: usize = 100;

/// Router builder exposing intake, history, and classification preview endpoints.
pub fn dispatch_router<S, N>(service: Arc<DispatchService<S, N>>) -> Router
where
    S: OutcomeStore + 'static,
    N: Notifier + 'static,
{
    Router::new()
        .route("/api/v1/requests", post(submit_handler::<S, N>))
        .route(
            "/api/v1/requests/:requester_id",
            get(history_handler::<S, N>),
        )
        .route("/api/v1/classify", post(classify_handler::<S, N>))
        .with_state(service)
}

pub(crate) async fn submit_handler<S, N>(
    State(service): State<Arc<DispatchService<S, N>>>,
    Json(request): Json<IncomingRequest>,
) -> Response
where
    S: OutcomeStore + 'static,
    N: Notifier + 'static,
{
    // notification may block on network I/O for up to the configured timeout
    let outcome = tokio::task::spawn_blocking(move || service.dispatch(request)).await;
    let result = match outcome {
        Ok(result) => result,
        Err(join_error) => {
            error!(error = %join_error, "dispatch task aborted");
            let status = DispatchStatus::FatalNotRecorded;
            let payload = json!({
                "status": status,
                "message": status.message(),
                "error": "dispatch task aborted",
            });
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response();
        }
    };

    match result {
        Ok(receipt) => {
            let code = match receipt.status() {
                DispatchStatus::DeliveredAndRecorded => StatusCode::CREATED,
                _ => StatusCode::ACCEPTED,
            };
            (code, Json(receipt.view())).into_response()
        }
        Err(err) => {
            let status = err.status();
            let code = match err {
                DispatchError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                DispatchError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            let payload = json!({
                "status": status,
                "message": status.message(),
                "error": err.to_string(),
            });
            (code, Json(payload)).into_response()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct HistoryQuery {
    pub(crate) limit: Option<usize>,
}

pub(crate) async fn history_handler<S, N>(
    State(service): State<Arc<DispatchService<S, N>>>,
    Path(requester_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Response
where
    S: OutcomeStore + 'static,
    N: Notifier + 'static,
{
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);

    let lookup_id = requester_id.clone();
    let outcome =
        tokio::task::spawn_blocking(move || service.history(&lookup_id, limit)).await;
    let result = match outcome {
        Ok(result) => result,
        Err(join_error) => {
            error!(error = %join_error, "history task aborted");
            let payload = json!({
                "requester_id": requester_id,
                "error": "history task aborted",
            });
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response();
        }
    };

    match result {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(err) => {
            let payload = json!({
                "requester_id": requester_id,
                "error": err.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClassifyRequest {
    pub(crate) text: String,
}

pub(crate) async fn classify_handler<S, N>(
    State(service): State<Arc<DispatchService<S, N>>>,
    Json(payload): Json<ClassifyRequest>,
) -> Response
where
    S: OutcomeStore + 'static,
    N: Notifier + 'static,
{
    (StatusCode::OK, Json(service.classify(&payload.text))).into_response()
}
