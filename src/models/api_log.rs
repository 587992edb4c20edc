use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::browser::payload;
use crate::browser::{CellValue, Column, ExportColumn, Record};
use crate::display::{format_timestamp, or_dash, status_class};

/// A single vendor API call as recorded by the booking platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLog {
    pub log_id: i64,
    pub endpoint_url: String,
    pub request_body: Option<String>,
    pub response_body: Option<String>,
    pub vendor_id: Option<i64>,
    pub timestamp: NaiveDateTime,
    pub status_text: Option<String>,
    pub status_code: Option<i64>,
    pub source_ip: Option<String>,
    pub account_id: Option<i64>,
    pub source: Option<String>,
    pub pnr_number: Option<String>,
    pub booking_request_id: Option<String>,
}

impl ApiLog {
    /// "200 OK" style label combining code and text.
    pub fn status_label(&self) -> String {
        match (self.status_code, self.status_text.as_deref()) {
            (Some(code), Some(text)) if !text.is_empty() => format!("{} {}", code, text),
            (Some(code), _) => code.to_string(),
            (None, Some(text)) => text.to_string(),
            (None, None) => "-".to_string(),
        }
    }

    pub fn status_class(&self) -> &'static str {
        status_class(self.status_code)
    }

    /// Columns for the "Related API Logs" sheet of a booking case export.
    pub fn related_export_columns() -> Vec<ExportColumn<Self>> {
        vec![
            ExportColumn::new("Log ID", |l: &ApiLog| CellValue::int(l.log_id)),
            ExportColumn::new("Time", |l: &ApiLog| {
                CellValue::text(format_timestamp(&l.timestamp))
            }),
            ExportColumn::new("Status", |l: &ApiLog| CellValue::text(l.status_label())),
            ExportColumn::new("Endpoint", |l: &ApiLog| CellValue::text(&l.endpoint_url)),
            ExportColumn::new("Vendor", |l: &ApiLog| CellValue::opt_int(l.vendor_id)),
            ExportColumn::new("Source", |l: &ApiLog| CellValue::opt_text(l.source.as_deref())),
            ExportColumn::new("PNR", |l: &ApiLog| {
                CellValue::opt_text(l.pnr_number.as_deref())
            }),
            ExportColumn::new("Request Body", |l: &ApiLog| {
                CellValue::text(payload::pretty_raw(l.request_body.as_deref()))
            }),
            ExportColumn::new("Response Body", |l: &ApiLog| {
                CellValue::text(payload::pretty_raw(l.response_body.as_deref()))
            }),
        ]
    }

    /// Columns for a bulk or single-record log export.
    pub fn export_columns() -> Vec<ExportColumn<Self>> {
        vec![
            ExportColumn::new("ID", |l: &ApiLog| CellValue::int(l.log_id)),
            ExportColumn::new("Timestamp", |l: &ApiLog| {
                CellValue::text(format_timestamp(&l.timestamp))
            }),
            ExportColumn::new("Status", |l: &ApiLog| CellValue::text(l.status_label())),
            ExportColumn::new("Endpoint", |l: &ApiLog| CellValue::text(&l.endpoint_url)),
            ExportColumn::new("Vendor", |l: &ApiLog| CellValue::opt_int(l.vendor_id)),
            ExportColumn::new("Account", |l: &ApiLog| CellValue::opt_int(l.account_id)),
            ExportColumn::new("Source", |l: &ApiLog| CellValue::opt_text(l.source.as_deref())),
            ExportColumn::new("PNR", |l: &ApiLog| {
                CellValue::opt_text(l.pnr_number.as_deref())
            }),
            ExportColumn::new("BookingReqID", |l: &ApiLog| {
                CellValue::opt_text(l.booking_request_id.as_deref())
            }),
            ExportColumn::new("IP Address", |l: &ApiLog| {
                CellValue::opt_text(l.source_ip.as_deref())
            }),
            ExportColumn::new("Request", |l: &ApiLog| {
                CellValue::text(payload::pretty_raw(l.request_body.as_deref()))
            }),
            ExportColumn::new("Response", |l: &ApiLog| {
                CellValue::text(payload::pretty_raw(l.response_body.as_deref()))
            }),
        ]
    }
}

impl Record for ApiLog {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("id", "ID", |l: &ApiLog| l.log_id.to_string())
                .sortable(|a: &ApiLog, b: &ApiLog| a.log_id.cmp(&b.log_id))
                .styled(|_: &ApiLog| "mono muted"),
            Column::new("timestamp", "Timestamp", |l: &ApiLog| {
                format_timestamp(&l.timestamp)
            })
            .sortable(|a: &ApiLog, b: &ApiLog| a.timestamp.cmp(&b.timestamp)),
            Column::new("status", "Status", |l: &ApiLog| l.status_label())
                .styled(|l: &ApiLog| l.status_class()),
            Column::new("endpoint", "Endpoint", |l: &ApiLog| l.endpoint_url.clone())
                .styled(|_: &ApiLog| "truncate"),
            Column::new("vendor", "Vendor", |l: &ApiLog| or_dash(l.vendor_id))
                .sortable(|a: &ApiLog, b: &ApiLog| a.vendor_id.cmp(&b.vendor_id)),
            Column::new("account", "Account", |l: &ApiLog| or_dash(l.account_id))
                .sortable(|a: &ApiLog, b: &ApiLog| a.account_id.cmp(&b.account_id)),
            Column::new("source", "Sources", |l: &ApiLog| or_dash(l.source.as_deref()))
                .sortable(|a: &ApiLog, b: &ApiLog| a.source.cmp(&b.source)),
            Column::new("pnr", "PNR", |l: &ApiLog| or_dash(l.pnr_number.as_deref()))
                .sortable(|a: &ApiLog, b: &ApiLog| a.pnr_number.cmp(&b.pnr_number)),
            Column::new("booking", "BookingID", |l: &ApiLog| {
                or_dash(l.booking_request_id.as_deref())
            })
            .sortable(|a: &ApiLog, b: &ApiLog| a.booking_request_id.cmp(&b.booking_request_id)),
        ]
    }

    fn search_fields(&self) -> Vec<String> {
        let mut fields = vec![self.log_id.to_string(), self.endpoint_url.clone()];
        fields.extend(self.status_code.map(|code| code.to_string()));
        fields.extend(self.account_id.map(|id| id.to_string()));
        fields.extend(self.pnr_number.clone());
        fields.extend(self.source.clone());
        fields.extend(payload::search_texts(self.request_body.as_deref()));
        fields.extend(payload::search_texts(self.response_body.as_deref()));
        fields
    }
}

/// Which of the two log tables a log page reads from. Both share the
/// [`ApiLog`] shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStream {
    General,
    Search,
}

impl LogStream {
    pub fn table(&self) -> &'static str {
        match self {
            Self::General => "api_logs",
            Self::Search => "search_logs",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Search => "search",
        }
    }

    /// Path of the HTML listing for this stream.
    pub fn base_path(&self) -> &'static str {
        match self {
            Self::General => "/logs",
            Self::Search => "/search-logs",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::General => "General API Logs",
            Self::Search => "Search Logs",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::General => "Monitor API traffic, latency, and status codes.",
            Self::Search => "Detailed logs of flight search queries.",
        }
    }

    /// File name prefix for bulk exports.
    pub fn export_prefix(&self) -> &'static str {
        match self {
            Self::General => "Logs",
            Self::Search => "SearchLogs",
        }
    }

    pub fn detail_path(&self, log_id: i64) -> String {
        format!("{}/{}", self.base_path(), log_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::apply;
    use chrono::NaiveDate;

    fn log(id: i64, response: Option<&str>) -> ApiLog {
        ApiLog {
            log_id: id,
            endpoint_url: "https://vendor.example/api/search".into(),
            request_body: Some(r#"{"from":"BOM","to":"DXB"}"#.into()),
            response_body: response.map(String::from),
            vendor_id: Some(3),
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(10, 0, id as u32 % 60)
                .unwrap(),
            status_text: Some("OK".into()),
            status_code: Some(200),
            source_ip: None,
            account_id: None,
            source: Some("web".into()),
            pnr_number: None,
            booking_request_id: None,
        }
    }

    #[test]
    fn test_status_label() {
        let mut entry = log(1, None);
        assert_eq!(entry.status_label(), "200 OK");
        entry.status_text = None;
        assert_eq!(entry.status_label(), "200");
        entry.status_code = None;
        assert_eq!(entry.status_label(), "-");
    }

    #[test]
    fn test_search_covers_response_body() {
        let records = vec![
            log(1, Some(r#"{"fares":[{"code":"Y-SAVER"}]}"#)),
            log(2, Some("timeout")),
        ];
        let view = apply(&records, &ApiLog::columns(), None, "y-saver");
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].log_id, 1);

        let view = apply(&records, &ApiLog::columns(), None, "DXB");
        assert_eq!(view.len(), 2);
    }

    #[test]
    fn test_camel_case_json() {
        let json = serde_json::to_value(log(9, None)).unwrap();
        assert_eq!(json["logId"], 9);
        assert_eq!(json["endpointUrl"], "https://vendor.example/api/search");
        assert!(json["bookingRequestId"].is_null());
    }

    #[test]
    fn test_export_columns_pretty_print_payloads() {
        let entry = log(4, Some(r#"{"ok":true}"#));
        let columns = ApiLog::export_columns();
        let response = columns.iter().find(|c| c.label == "Response").unwrap();
        assert_eq!(
            (response.value)(&entry),
            CellValue::Text("{\n  \"ok\": true\n}".into())
        );
    }
}
