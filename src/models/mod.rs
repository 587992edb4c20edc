pub mod api_log;
pub mod booking_request;

pub use api_log::{ApiLog, LogStream};
pub use booking_request::BookingRequest;
