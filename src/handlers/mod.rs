pub mod api;
pub mod booking_requests;
pub mod logs;

use askama::Template;
use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

use crate::browser::export::{self, Sheet, XLSX_CONTENT_TYPE};
use crate::browser::{Record, RecordBrowser, TableLinks, TableView};
use crate::date_utils::{DayFilterable, RecordDate};
use crate::error::{AppResult, RenderHtml};
use crate::sort_utils::Sortable;
use crate::state::AppState;
use crate::VERSION;

pub fn routes() -> Router<AppState> {
    Router::new()
        // Pages
        .route("/", get(dashboard))
        .route("/logs", get(logs::general_index))
        .route("/logs/export", get(logs::general_export))
        .route("/logs/:id", get(logs::general_detail))
        .route("/logs/:id/export", get(logs::general_detail_export))
        .route("/search-logs", get(logs::search_index))
        .route("/search-logs/export", get(logs::search_export))
        .route("/search-logs/:id", get(logs::search_detail))
        .route("/search-logs/:id/export", get(logs::search_detail_export))
        .route("/booking-requests", get(booking_requests::index))
        .route("/booking-requests/export", get(booking_requests::export))
        .route("/booking-requests/:id", get(booking_requests::detail))
        .route(
            "/booking-requests/:id/export",
            get(booking_requests::detail_export),
        )
        // API (JSON, raw arrays)
        .route("/api/logs", get(api::logs))
        .route("/api/logs/requests", get(api::logs_by_booking))
        .route("/api/search-logs", get(api::search_logs))
        .route("/api/booking-requests", get(api::booking_requests))
        // Health check
        .route("/health", get(health))
}

async fn health() -> &'static str {
    "OK"
}

/// One entry point on the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardCard {
    pub href: &'static str,
    pub kicker: &'static str,
    pub title: &'static str,
    pub hint: &'static str,
    pub accent: &'static str,
}

const DASHBOARD_CARDS: [DashboardCard; 3] = [
    DashboardCard {
        href: "/logs",
        kicker: "General API Logs",
        title: "System Logs",
        hint: "View all traffic",
        accent: "blue",
    },
    DashboardCard {
        href: "/search-logs",
        kicker: "Search Traffic",
        title: "Search Logs",
        hint: "Analyze queries",
        accent: "purple",
    },
    DashboardCard {
        href: "/booking-requests",
        kicker: "Bookings",
        title: "Booking Requests",
        hint: "Trace orders",
        accent: "green",
    },
];

#[derive(Template)]
#[template(path = "pages/dashboard.html")]
pub struct DashboardTemplate {
    pub title: String,
    pub version: &'static str,
    pub nav: &'static str,
    pub auth_enabled: bool,
    pub cards: &'static [DashboardCard],
}

async fn dashboard(State(state): State<AppState>) -> AppResult<Html<String>> {
    DashboardTemplate {
        title: "Dashboard".into(),
        version: VERSION,
        nav: "",
        auth_enabled: state.config.auth_enabled(),
        cards: &DASHBOARD_CARDS,
    }
    .render_html()
}

/// Query parameters shared by every day-scoped listing and its export.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct BrowseParams {
    pub date: Option<String>,
    pub nav: Option<String>, // "prev" or "next"
    pub search: Option<String>,
    pub sort: Option<String>,
    pub dir: Option<String>,
    #[serde(
        default,
        deserialize_with = "crate::form_utils::deserialize_optional_usize"
    )]
    pub page: Option<usize>,
}

impl DayFilterable for BrowseParams {
    fn date(&self) -> Option<&String> {
        self.date.as_ref()
    }

    fn nav(&self) -> Option<&String> {
        self.nav.as_ref()
    }
}

impl Sortable for BrowseParams {
    fn sort_by(&self) -> Option<&String> {
        self.sort.as_ref()
    }

    fn sort_dir(&self) -> Option<&String> {
        self.dir.as_ref()
    }
}

impl BrowseParams {
    pub fn search_text(&self) -> &str {
        self.search.as_deref().map(str::trim).unwrap_or("")
    }

    /// Zero-based page index from the one-based `page` parameter.
    pub fn page_index(&self) -> usize {
        self.page.unwrap_or(1).saturating_sub(1)
    }

    /// A browser of `page_size` with this request's sort, filter and page
    /// applied. Records still need to be fetched into it.
    pub fn browser<R: Record>(&self, page_size: usize) -> RecordBrowser<R> {
        let sort = self.resolve_sort(&R::sortable_keys(), R::default_sort());
        RecordBrowser::new(page_size)
            .with_sort(sort)
            .with_filter(self.search_text())
            .with_page(self.page_index())
    }
}

/// Link to the bulk export of what `browser` currently shows: same day,
/// filter and sort, every page.
pub fn export_href<R: Record>(
    base_path: &str,
    browser: &RecordBrowser<R>,
    day: RecordDate,
) -> String {
    let links = TableLinks::new(format!("{}/export?date={}", base_path, day));
    let mut params = vec![("search", browser.filter().to_string())];
    if let Some(spec) = browser.sort() {
        params.push(("sort", spec.key.to_string()));
        params.push(("dir", spec.direction.as_str().to_string()));
    }
    links.href(&params)
}

/// The date bar above every listing: the resolved day plus prev/next links.
#[derive(Debug, Clone)]
pub struct DayNav {
    pub date: String,
    pub label: String,
    pub prev_href: String,
    pub next_href: String,
    pub refresh_href: String,
}

impl DayNav {
    pub fn new(base_path: &str, day: RecordDate, search: &str) -> Self {
        let link = |d: RecordDate| {
            TableLinks::new(format!("{}?date={}", base_path, d))
                .href(&[("search", search.to_string())])
        };
        Self {
            date: day.to_string(),
            label: day.display_label(),
            prev_href: link(day.prev()),
            next_href: link(day.next()),
            refresh_href: link(day),
        }
    }
}

/// A day-scoped listing: date bar, search box, table and export link.
#[derive(Template)]
#[template(path = "pages/browse.html")]
pub struct BrowseTemplate {
    pub title: String,
    pub version: &'static str,
    pub nav: &'static str,
    pub auth_enabled: bool,
    pub description: &'static str,
    pub base_path: &'static str,
    pub day: DayNav,
    pub search: String,
    pub sort_key: &'static str,
    pub sort_dir: &'static str,
    pub export_href: String,
    pub table: TableView,
    pub empty_message: &'static str,
}

#[derive(Debug, Clone)]
pub struct DetailField {
    pub label: &'static str,
    pub value: String,
    pub class: &'static str,
    pub href: String,
}

impl DetailField {
    pub fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
            class: "",
            href: String::new(),
        }
    }

    pub fn class(mut self, class: &'static str) -> Self {
        self.class = class;
        self
    }

    pub fn link(mut self, href: impl Into<String>) -> Self {
        self.href = href.into();
        self
    }
}

/// A decoded JSON body shown in a `<pre>` block.
#[derive(Debug, Clone)]
pub struct PayloadBlock {
    pub label: &'static str,
    pub body: String,
}

/// The related-logs panel of a booking detail page.
#[derive(Debug, Clone, Default)]
pub struct RelatedPanel {
    pub action: String,
    pub search: String,
    pub sort_key: &'static str,
    pub sort_dir: &'static str,
    pub count: usize,
}

/// Full view of one record, optionally with its related logs.
#[derive(Template)]
#[template(path = "pages/detail.html")]
pub struct DetailTemplate {
    pub title: String,
    pub version: &'static str,
    pub nav: &'static str,
    pub auth_enabled: bool,
    pub subtitle: String,
    pub back_href: String,
    pub export_href: String,
    pub fields: Vec<DetailField>,
    pub payloads: Vec<PayloadBlock>,
    pub has_related: bool,
    pub related: RelatedPanel,
    /// Related logs; empty unless `has_related`.
    pub table: TableView,
    pub empty_message: &'static str,
}

/// Current sort as plain strings for hidden form inputs.
pub fn sort_fields<R: Record>(browser: &RecordBrowser<R>) -> (&'static str, &'static str) {
    match browser.sort() {
        Some(spec) => (spec.key, spec.direction.as_str()),
        None => ("", ""),
    }
}

/// Serialize `sheets` and wrap them in a download response.
pub fn xlsx_response(file_name: String, sheets: &[Sheet]) -> AppResult<impl IntoResponse> {
    let bytes = export::write_workbook(sheets)?;
    tracing::info!(file_name = %file_name, size = bytes.len(), "Generated spreadsheet export");

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookingRequest;
    use crate::sort_utils::SortSpec;

    #[test]
    fn test_browser_from_params() {
        let params = BrowseParams {
            search: Some("  acc-7 ".into()),
            sort: Some("pax".into()),
            dir: Some("desc".into()),
            page: Some(3),
            ..Default::default()
        };
        let browser: RecordBrowser<BookingRequest> = params.browser(12);
        assert_eq!(browser.filter(), "acc-7");
        assert_eq!(browser.sort(), Some(&SortSpec::desc("pax")));
        assert_eq!(params.page_index(), 2);
    }

    #[test]
    fn test_unknown_sort_key_uses_default() {
        let params = BrowseParams {
            sort: Some("request_payload".into()),
            ..Default::default()
        };
        let browser: RecordBrowser<BookingRequest> = params.browser(12);
        assert_eq!(browser.sort(), Some(&SortSpec::desc("entry_date")));
    }

    #[test]
    fn test_day_nav_links() {
        let day = RecordDate::parse("2024-03-01").unwrap();
        let nav = DayNav::new("/logs", day, "pnr");
        assert_eq!(nav.prev_href, "/logs?date=2024-02-29&search=pnr");
        assert_eq!(nav.next_href, "/logs?date=2024-03-02&search=pnr");
        assert_eq!(nav.date, "2024-03-01");
    }

    #[test]
    fn test_export_href_keeps_view_state() {
        let day = RecordDate::parse("2024-03-01").unwrap();
        let browser: RecordBrowser<BookingRequest> = BrowseParams {
            search: Some("BOM DXB".into()),
            ..Default::default()
        }
        .browser(12);
        assert_eq!(
            export_href("/booking-requests", &browser, day),
            "/booking-requests/export?date=2024-03-01&search=BOM%20DXB&sort=entry_date&dir=desc"
        );
    }

    #[test]
    fn test_page_zero_is_first_page() {
        let params = BrowseParams {
            page: Some(0),
            ..Default::default()
        };
        assert_eq!(params.page_index(), 0);
    }
}
