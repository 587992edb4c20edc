//! JSON endpoints. Responses are raw arrays; failures are `{"error": ...}`.

use axum::extract::{Query, State};
use axum::response::Json;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::models::{ApiLog, BookingRequest, LogStream};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DateParams {
    pub date: Option<String>,
}

impl DateParams {
    fn date(&self) -> &str {
        self.date.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingParams {
    pub booking_request_id: Option<String>,
}

pub async fn logs(
    State(state): State<AppState>,
    Query(params): Query<DateParams>,
) -> ApiResult<Json<Vec<ApiLog>>> {
    let logs = state
        .gateway
        .fetch_logs_by_date(LogStream::General, params.date())?;
    Ok(Json(logs))
}

pub async fn search_logs(
    State(state): State<AppState>,
    Query(params): Query<DateParams>,
) -> ApiResult<Json<Vec<ApiLog>>> {
    let logs = state
        .gateway
        .fetch_logs_by_date(LogStream::Search, params.date())?;
    Ok(Json(logs))
}

pub async fn booking_requests(
    State(state): State<AppState>,
    Query(params): Query<DateParams>,
) -> ApiResult<Json<Vec<BookingRequest>>> {
    let requests = state
        .gateway
        .fetch_booking_requests_by_date(params.date())?;
    Ok(Json(requests))
}

pub async fn logs_by_booking(
    State(state): State<AppState>,
    Query(params): Query<BookingParams>,
) -> ApiResult<Json<Vec<ApiLog>>> {
    let key = params.booking_request_id.as_deref().unwrap_or("");
    let logs = state.gateway.fetch_logs_by_booking(key)?;
    Ok(Json(logs))
}
