// HTTP request handlers
use crate::application::error::WidgetError;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize)]
pub struct HistoricalBatchResponse {
    pub tags_cached: usize,
}

impl IntoResponse for WidgetError {
    fn into_response(self) -> Response {
        let status = match &self {
            WidgetError::UnknownFeed(_) => StatusCode::NOT_FOUND,
            WidgetError::FeedNotSubscribed(_) | WidgetError::HistoricalFeedDisabled => {
                StatusCode::CONFLICT
            }
            WidgetError::Detached => StatusCode::SERVICE_UNAVAILABLE,
        };
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Live subscription push from the historian or OPC UA feed
pub async fn push_live_batch(
    Path(feed): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(rows): Json<Vec<Value>>,
) -> Result<impl IntoResponse, WidgetError> {
    tracing::debug!("Live data received from {}: {} rows", feed, rows.len());
    let view = state.widget_service.push_live(&feed, &rows).await?;
    Ok(Json(view))
}

/// Historical subscription push; replaces the whole cache
pub async fn push_historical_batch(
    State(state): State<Arc<AppState>>,
    Json(rows): Json<Vec<Value>>,
) -> Result<impl IntoResponse, WidgetError> {
    tracing::debug!("Historical data received: {} rows", rows.len());
    let tags_cached = state.widget_service.push_historical(&rows).await?;
    Ok(Json(HistoricalBatchResponse { tags_cached }))
}

pub async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.widget_service.status().await)
}

pub async fn list_tags(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.widget_service.tags().await)
}

/// Click on a tag row. No current value means no panel: 204 with an empty body.
pub async fn select_tag(
    Path(tag): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state.widget_service.select_tag(&tag).await {
        Some(panel) => Json(panel).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

pub async fn get_history(
    Path(tag): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state.widget_service.panel(&tag).await {
        Some(panel) => Json(panel).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub async fn close_history(
    Path(tag): Path<String>,
    State(state): State<Arc<AppState>>,
) -> StatusCode {
    if state.widget_service.close_panel(&tag).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}
