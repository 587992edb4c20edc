//! The record browser: a parameterised table over one in-memory record set.
//!
//! Every page in the dashboard (general logs, search logs, booking requests
//! and the related-logs panel inside a booking) is the same pipeline:
//! fetch a full record set, filter and sort it, cut one page out of the
//! result, and optionally export the filtered view as a spreadsheet.

pub mod column;
pub mod engine;
pub mod export;
pub mod page;
pub mod payload;
pub mod table;
pub mod view;

pub use column::{Column, Record};
pub use engine::apply;
pub use export::{CellValue, ExportColumn, Sheet};
pub use page::{paginate, Page};
pub use payload::{decode_payload, pretty_payload};
pub use table::{table_view, TableLinks, TableView};
pub use view::RecordBrowser;
