use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse};
use chrono::Utc;

use super::{
    export_href, sort_fields, xlsx_response, BrowseParams, BrowseTemplate, DayNav, DetailField,
    DetailTemplate, PayloadBlock, RelatedPanel,
};
use crate::browser::export::{bulk_file_name, Sheet};
use crate::browser::{decode_payload, pretty_payload, table_view, TableLinks, TableView};
use crate::date_utils::{DayFilterable, RecordDate};
use crate::display::{format_timestamp, or_na};
use crate::error::{AppResult, RenderHtml};
use crate::models::{ApiLog, LogStream};
use crate::state::AppState;
use crate::VERSION;

pub const LOG_PAGE_SIZE: usize = 15;

fn nav_key(stream: LogStream) -> &'static str {
    match stream {
        LogStream::General => "logs",
        LogStream::Search => "search-logs",
    }
}

fn index(state: &AppState, stream: LogStream, params: BrowseParams) -> AppResult<Html<String>> {
    let day = params.resolve_day()?;
    let logs = state.gateway.fetch_logs_on(stream, day)?;
    let browser = params.browser::<ApiLog>(LOG_PAGE_SIZE).with_records(logs);

    let links = TableLinks::new(format!("{}?date={}", stream.base_path(), day));
    let table = table_view(&browser, &links, |log| stream.detail_path(log.log_id));
    let (sort_key, sort_dir) = sort_fields(&browser);

    let template = BrowseTemplate {
        title: stream.title().into(),
        version: VERSION,
        nav: nav_key(stream),
        auth_enabled: state.config.auth_enabled(),
        description: stream.description(),
        base_path: stream.base_path(),
        day: DayNav::new(stream.base_path(), day, browser.filter()),
        search: browser.filter().to_string(),
        sort_key,
        sort_dir,
        export_href: export_href(stream.base_path(), &browser, day),
        empty_message: if table.loaded == 0 {
            "No logs found for this date."
        } else {
            "No logs match your search."
        },
        table,
    };

    template.render_html()
}

/// Bulk export of the filtered, sorted view for one day (every page).
fn export(
    state: &AppState,
    stream: LogStream,
    params: BrowseParams,
) -> AppResult<impl IntoResponse> {
    let day = params.resolve_day()?;
    let logs = state.gateway.fetch_logs_on(stream, day)?;
    let browser = params.browser::<ApiLog>(LOG_PAGE_SIZE).with_records(logs);

    let view = browser.view();
    let sheet = Sheet::build(stream.title(), &ApiLog::export_columns(), view);
    xlsx_response(bulk_file_name(stream.export_prefix(), Utc::now()), &[sheet])
}

fn detail_fields(log: &ApiLog) -> Vec<DetailField> {
    // Only numeric keys can name a booking request
    let booking = match log.booking_request_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => match id.parse::<i64>() {
            Ok(key) => DetailField::new("Booking Request", id)
                .link(format!("/booking-requests/{}", key)),
            Err(_) => DetailField::new("Booking Request", id).class("mono"),
        },
        _ => DetailField::new("Booking Request", "N/A"),
    };

    vec![
        DetailField::new("Log ID", log.log_id.to_string()).class("mono"),
        DetailField::new("Timestamp", format_timestamp(&log.timestamp)),
        DetailField::new("Status", log.status_label()).class(log.status_class()),
        DetailField::new("Endpoint", log.endpoint_url.clone()).class("mono break"),
        DetailField::new("Vendor", or_na(log.vendor_id)),
        DetailField::new("Account", or_na(log.account_id)),
        DetailField::new("Source", or_na(log.source.as_deref())),
        DetailField::new("IP Address", or_na(log.source_ip.as_deref())).class("mono"),
        DetailField::new("PNR", or_na(log.pnr_number.as_deref())).class("mono"),
        booking,
    ]
}

fn payload_blocks(log: &ApiLog) -> Vec<PayloadBlock> {
    vec![
        PayloadBlock {
            label: "Request Body",
            body: pretty_payload(&decode_payload(log.request_body.as_deref())),
        },
        PayloadBlock {
            label: "Response Body",
            body: pretty_payload(&decode_payload(log.response_body.as_deref())),
        },
    ]
}

fn detail(state: &AppState, stream: LogStream, id: i64) -> AppResult<Html<String>> {
    let log = state.gateway.log_by_id(stream, id)?;
    let day = RecordDate::from_naive(log.timestamp.date());

    let template = DetailTemplate {
        title: format!("Log #{}", log.log_id),
        version: VERSION,
        nav: nav_key(stream),
        auth_enabled: state.config.auth_enabled(),
        subtitle: stream.title().to_string(),
        back_href: format!("{}?date={}", stream.base_path(), day),
        export_href: format!("{}/export", stream.detail_path(log.log_id)),
        fields: detail_fields(&log),
        payloads: payload_blocks(&log),
        has_related: false,
        related: RelatedPanel::default(),
        table: TableView::default(),
        empty_message: "",
    };

    template.render_html()
}

fn detail_export(state: &AppState, stream: LogStream, id: i64) -> AppResult<impl IntoResponse> {
    let log = state.gateway.log_by_id(stream, id)?;
    let sheet = Sheet::build("Log Details", &ApiLog::export_columns(), [&log]);
    xlsx_response(format!("ApiLog_{}_Export.xlsx", log.log_id), &[sheet])
}

pub async fn general_index(
    State(state): State<AppState>,
    Query(params): Query<BrowseParams>,
) -> AppResult<Html<String>> {
    index(&state, LogStream::General, params)
}

pub async fn search_index(
    State(state): State<AppState>,
    Query(params): Query<BrowseParams>,
) -> AppResult<Html<String>> {
    index(&state, LogStream::Search, params)
}

pub async fn general_export(
    State(state): State<AppState>,
    Query(params): Query<BrowseParams>,
) -> AppResult<impl IntoResponse> {
    export(&state, LogStream::General, params)
}

pub async fn search_export(
    State(state): State<AppState>,
    Query(params): Query<BrowseParams>,
) -> AppResult<impl IntoResponse> {
    export(&state, LogStream::Search, params)
}

pub async fn general_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Html<String>> {
    detail(&state, LogStream::General, id)
}

pub async fn search_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Html<String>> {
    detail(&state, LogStream::Search, id)
}

pub async fn general_detail_export(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    detail_export(&state, LogStream::General, id)
}

pub async fn search_detail_export(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    detail_export(&state, LogStream::Search, id)
}
