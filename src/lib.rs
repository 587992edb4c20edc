pub mod auth;
pub mod browser;
pub mod config;
pub mod date_utils;
pub mod db;
pub mod display;
pub mod error;
pub mod error_pages;
pub mod form_utils;
pub mod gateway;
pub mod handlers;
pub mod models;
pub mod server;
pub mod sort_utils;
pub mod state;

/// Application version from Cargo.toml (single source of truth)
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
