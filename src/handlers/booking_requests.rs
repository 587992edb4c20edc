use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse};
use chrono::Utc;
use serde::Deserialize;

use super::{
    export_href, sort_fields, xlsx_response, BrowseParams, BrowseTemplate, DayNav, DetailField,
    DetailTemplate, PayloadBlock, RelatedPanel,
};
use crate::browser::export::{bulk_file_name, Sheet};
use crate::browser::{
    decode_payload, pretty_payload, table_view, Record, RecordBrowser, TableLinks,
};
use crate::date_utils::{DayFilterable, RecordDate};
use crate::display::{format_timestamp, or_na};
use crate::error::{AppResult, RenderHtml};
use crate::models::{ApiLog, BookingRequest, LogStream};
use crate::sort_utils::Sortable;
use crate::state::AppState;
use crate::VERSION;

pub const BOOKING_PAGE_SIZE: usize = 12;
pub const RELATED_LOG_PAGE_SIZE: usize = 5;

const BASE_PATH: &str = "/booking-requests";

/// State of the related-logs panel, namespaced with `logs_` so it does not
/// clash with anything else on the detail page.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RelatedLogParams {
    pub logs_search: Option<String>,
    pub logs_sort: Option<String>,
    pub logs_dir: Option<String>,
    #[serde(
        default,
        deserialize_with = "crate::form_utils::deserialize_optional_usize"
    )]
    pub logs_page: Option<usize>,
}

impl Sortable for RelatedLogParams {
    fn sort_by(&self) -> Option<&String> {
        self.logs_sort.as_ref()
    }

    fn sort_dir(&self) -> Option<&String> {
        self.logs_dir.as_ref()
    }
}

impl RelatedLogParams {
    pub fn browser(&self) -> RecordBrowser<ApiLog> {
        let sort = self.resolve_sort(&ApiLog::sortable_keys(), ApiLog::default_sort());
        RecordBrowser::new(RELATED_LOG_PAGE_SIZE)
            .with_sort(sort)
            .with_filter(self.logs_search.as_deref().map(str::trim).unwrap_or(""))
            .with_page(self.logs_page.unwrap_or(1).saturating_sub(1))
    }
}

fn load_day(
    state: &AppState,
    params: &BrowseParams,
) -> AppResult<(RecordDate, RecordBrowser<BookingRequest>)> {
    let day = params.resolve_day()?;
    let requests = state.gateway.fetch_booking_requests_on(day)?;
    let browser = params
        .browser::<BookingRequest>(BOOKING_PAGE_SIZE)
        .with_records(requests);

    Ok((day, browser))
}

pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<BrowseParams>,
) -> AppResult<Html<String>> {
    let (day, browser) = load_day(&state, &params)?;

    let links = TableLinks::new(format!("{}?date={}", BASE_PATH, day));
    let table = table_view(&browser, &links, |booking| booking.detail_path());
    let (sort_key, sort_dir) = sort_fields(&browser);

    let template = BrowseTemplate {
        title: "Booking Requests".into(),
        version: VERSION,
        nav: "booking-requests",
        auth_enabled: state.config.auth_enabled(),
        description: "Review booking requests and trace their vendor API calls.",
        base_path: BASE_PATH,
        day: DayNav::new(BASE_PATH, day, browser.filter()),
        search: browser.filter().to_string(),
        sort_key,
        sort_dir,
        export_href: export_href(BASE_PATH, &browser, day),
        empty_message: if table.loaded == 0 {
            "No booking requests found for this date."
        } else {
            "No booking requests match your search."
        },
        table,
    };

    template.render_html()
}

pub async fn export(
    State(state): State<AppState>,
    Query(params): Query<BrowseParams>,
) -> AppResult<impl IntoResponse> {
    let (_, browser) = load_day(&state, &params)?;

    let sheet = Sheet::build(
        "Booking Requests",
        &BookingRequest::export_columns(),
        browser.view(),
    );
    xlsx_response(bulk_file_name("BookingRequests", Utc::now()), &[sheet])
}

fn detail_fields(booking: &BookingRequest) -> Vec<DetailField> {
    vec![
        DetailField::new("Booking ID", booking.id.to_string()).class("mono"),
        DetailField::new("Entry Date", format_timestamp(&booking.entry_date)),
        DetailField::new("Account ID", booking.account_id.clone()).class("mono"),
        DetailField::new("Description", or_na(booking.short_description.as_deref())),
        DetailField::new("Passengers", booking.total_passengers.to_string()),
        DetailField::new("D Value", or_na(booking.d_value.as_deref())).class("mono"),
    ]
}

pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<RelatedLogParams>,
) -> AppResult<Html<String>> {
    let booking = state.gateway.booking_request_by_id(id)?;
    let day = RecordDate::from_naive(booking.entry_date.date());

    // Related logs are only resolved here, on demand
    let related = state.gateway.fetch_logs_by_booking(&booking.link_key())?;
    let logs = params.browser().with_records(related);

    let links = TableLinks::nested(booking.detail_path(), "logs_");
    let table = table_view(&logs, &links, |log| LogStream::General.detail_path(log.log_id));
    let (sort_key, sort_dir) = sort_fields(&logs);

    let template = DetailTemplate {
        title: format!("Booking #{}", booking.id),
        version: VERSION,
        nav: "booking-requests",
        auth_enabled: state.config.auth_enabled(),
        subtitle: format!("Account {}", booking.account_id),
        back_href: format!("{}?date={}", BASE_PATH, day),
        export_href: format!("{}/export", booking.detail_path()),
        fields: detail_fields(&booking),
        payloads: vec![PayloadBlock {
            label: "Request Payload",
            body: pretty_payload(&decode_payload(booking.request_payload.as_deref())),
        }],
        has_related: true,
        related: RelatedPanel {
            action: booking.detail_path(),
            search: logs.filter().to_string(),
            sort_key,
            sort_dir,
            count: table.matched,
        },
        empty_message: if table.loaded == 0 {
            "No API logs reference this booking request."
        } else {
            "No related logs match your search."
        },
        table,
    };

    template.render_html()
}

/// The booking plus every related log as a two-sheet workbook. The log
/// sheet is left out when there are no related logs.
pub async fn detail_export(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let booking = state.gateway.booking_request_by_id(id)?;
    let related = state.gateway.fetch_logs_by_booking(&booking.link_key())?;

    let mut sheets = vec![Sheet::build(
        "Booking Details",
        &BookingRequest::export_columns(),
        [&booking],
    )];
    if !related.is_empty() {
        sheets.push(Sheet::build(
            "Related API Logs",
            &ApiLog::related_export_columns(),
            &related,
        ));
    }

    xlsx_response(format!("Booking_{}_Case_Export.xlsx", booking.id), &sheets)
}
