use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::browser::payload;
use crate::browser::{CellValue, Column, ExportColumn, Record};
use crate::display::{format_timestamp, or_dash};
use crate::sort_utils::SortSpec;

/// A booking request as submitted by an agent account. API logs point back
/// at it through their `booking_request_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub id: i64,
    pub request_payload: Option<String>,
    pub account_id: String,
    pub entry_date: NaiveDateTime,
    pub d_value: Option<String>,
    pub short_description: Option<String>,
    pub total_passengers: i64,
}

impl BookingRequest {
    pub fn detail_path(&self) -> String {
        format!("/booking-requests/{}", self.id)
    }

    /// Key API logs use to refer to this request.
    pub fn link_key(&self) -> String {
        self.id.to_string()
    }

    pub fn export_columns() -> Vec<ExportColumn<Self>> {
        vec![
            ExportColumn::new("Booking ID", |b: &BookingRequest| CellValue::int(b.id)),
            ExportColumn::new("Entry Date", |b: &BookingRequest| {
                CellValue::text(format_timestamp(&b.entry_date))
            }),
            ExportColumn::new("Account ID", |b: &BookingRequest| {
                CellValue::text(&b.account_id)
            }),
            ExportColumn::new("Description", |b: &BookingRequest| {
                CellValue::opt_text(b.short_description.as_deref())
            }),
            ExportColumn::new("Pax", |b: &BookingRequest| {
                CellValue::int(b.total_passengers)
            }),
            ExportColumn::new("D Value", |b: &BookingRequest| {
                CellValue::opt_text(b.d_value.as_deref())
            }),
            ExportColumn::new("Full Request JSON", |b: &BookingRequest| {
                CellValue::text(payload::pretty_raw(b.request_payload.as_deref()))
            }),
        ]
    }
}

impl Record for BookingRequest {
    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("id", "Booking ID", |b: &BookingRequest| b.id.to_string())
                .sortable(|a: &BookingRequest, b: &BookingRequest| a.id.cmp(&b.id))
                .styled(|_: &BookingRequest| "mono"),
            Column::new("entry_date", "Entry Date", |b: &BookingRequest| {
                format_timestamp(&b.entry_date)
            })
            .sortable(|a: &BookingRequest, b: &BookingRequest| a.entry_date.cmp(&b.entry_date)),
            Column::new("account", "Account", |b: &BookingRequest| b.account_id.clone())
                .sortable(|a: &BookingRequest, b: &BookingRequest| a.account_id.cmp(&b.account_id)),
            Column::new("description", "Description", |b: &BookingRequest| {
                or_dash(b.short_description.as_deref())
            })
            .styled(|_: &BookingRequest| "truncate"),
            Column::new("pax", "Pax", |b: &BookingRequest| b.total_passengers.to_string())
                .sortable(|a: &BookingRequest, b: &BookingRequest| {
                    a.total_passengers.cmp(&b.total_passengers)
                }),
            Column::new("d_value", "D Value", |b: &BookingRequest| {
                or_dash(b.d_value.as_deref())
            }),
        ]
    }

    fn search_fields(&self) -> Vec<String> {
        let mut fields = vec![self.id.to_string(), self.account_id.clone()];
        fields.extend(self.short_description.clone());
        fields.extend(self.d_value.clone());
        fields.extend(payload::search_texts(self.request_payload.as_deref()));
        fields
    }

    fn default_sort() -> Option<SortSpec> {
        Some(SortSpec::desc("entry_date"))
    }
}
