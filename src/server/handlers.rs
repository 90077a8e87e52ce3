//! HTTP handlers for procurement requests

use super::extract::{JsonBody, QueryParams, RequestId, Submission};
use super::host::ServerHost;
use crate::core::error::Result;
use crate::core::query::ListParams;
use crate::core::timestamp;
use crate::entities::{ProcurementRequest, RequestPatch};
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::{Value, json};
use std::sync::Arc;

/// Shared state of every handler
pub type AppState = Arc<ServerHost>;

/// `POST /api/requests`
///
/// The submission is validated before the image is stored. If the record
/// cannot be created afterwards the stored image is discarded.
pub async fn create_request(
    State(host): State<AppState>,
    Submission { mut request, image }: Submission,
) -> Result<(StatusCode, Json<ProcurementRequest>)> {
    request.validate()?;

    let stored_image = match image {
        Some(upload) => {
            let location = host.images.store(upload).await?;
            request.image_path = location.clone();
            Some(location)
        }
        None => None,
    };

    let created = match host.store.create(request).await {
        Ok(created) => created,
        Err(e) => {
            if let Some(location) = stored_image {
                host.discard_image(location);
            }
            return Err(e);
        }
    };

    tracing::info!(
        id = %created.id,
        item = %created.item_name_en,
        requestor = %created.requestor_name,
        has_image = created.has_image(),
        "created procurement request"
    );
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/requests?status=&priority=&category=&search=`
pub async fn list_requests(
    State(host): State<AppState>,
    QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Vec<ProcurementRequest>>> {
    let filter = params.into_filter()?;
    let requests = host.store.list(&filter).await?;
    Ok(Json(requests))
}

/// `GET /api/requests/{id}`
pub async fn get_request(
    State(host): State<AppState>,
    RequestId(id): RequestId,
) -> Result<Json<ProcurementRequest>> {
    Ok(Json(host.store.get(&id).await?))
}

/// `PATCH /api/requests/{id}`
pub async fn update_request(
    State(host): State<AppState>,
    RequestId(id): RequestId,
    JsonBody(patch): JsonBody<RequestPatch>,
) -> Result<Json<ProcurementRequest>> {
    let updated = host.store.update(&id, patch).await?;
    tracing::info!(id = %id, status = %updated.status, "updated procurement request");
    Ok(Json(updated))
}

/// `DELETE /api/requests/{id}`
///
/// The record is gone once this returns; its image is removed in the
/// background and a failure there only shows up in the logs.
pub async fn delete_request(
    State(host): State<AppState>,
    RequestId(id): RequestId,
) -> Result<Json<Value>> {
    let removed = host.store.delete(&id).await?;
    if removed.has_image() {
        host.discard_image(removed.image_path);
    }

    tracing::info!(id = %id, "deleted procurement request");
    Ok(Json(json!({ "ok": true })))
}

/// `GET /api/health`
pub async fn health_check(State(host): State<AppState>) -> Json<Value> {
    let db = if host.store.ping().await {
        "Connected"
    } else {
        "Disconnected"
    };

    Json(json!({
        "status": "OK",
        "timestamp": timestamp::format(&timestamp::now()),
        "db": db,
    }))
}
