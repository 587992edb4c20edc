use std::fmt;
use std::sync::OnceLock;

use chrono::{Duration, Local, NaiveDate};
use regex::Regex;

use crate::error::{AppError, AppResult};

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("date pattern is a valid regex")
    })
}

/// A calendar day used to scope a fetch. Only constructible from a strict
/// `YYYY-MM-DD` string that names a real date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RecordDate(NaiveDate);

impl RecordDate {
    pub fn parse(input: &str) -> AppResult<Self> {
        if !date_pattern().is_match(input) {
            return Err(AppError::InvalidArgument("Invalid date format".into()));
        }
        NaiveDate::parse_from_str(input, "%Y-%m-%d")
            .map(Self)
            .map_err(|_| AppError::InvalidArgument("Invalid date format".into()))
    }

    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    pub fn from_naive(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn prev(&self) -> Self {
        Self(self.0 - Duration::days(1))
    }

    pub fn next(&self) -> Self {
        Self(self.0 + Duration::days(1))
    }

    /// Start of this day as a store timestamp prefix (inclusive bound).
    pub fn start_bound(&self) -> String {
        self.to_string()
    }

    /// Start of the following day (exclusive bound).
    pub fn end_bound(&self) -> String {
        self.next().to_string()
    }

    /// Human-readable label, e.g. "Mon, 1 Jan 2024".
    pub fn display_label(&self) -> String {
        self.0.format("%a, %-d %b %Y").to_string()
    }
}

impl fmt::Display for RecordDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Trait for query params scoped to a single day, with prev/next navigation.
pub trait DayFilterable {
    fn date(&self) -> Option<&String>;

    /// Override to support prev/next navigation. Defaults to None.
    fn nav(&self) -> Option<&String> {
        None
    }

    /// The requested day: today when absent, otherwise the strictly parsed
    /// date shifted by `nav`. A malformed date is an error, not a fallback.
    fn resolve_day(&self) -> AppResult<RecordDate> {
        let day = match self.date().filter(|d| !d.is_empty()) {
            Some(raw) => RecordDate::parse(raw)?,
            None => RecordDate::today(),
        };

        Ok(match self.nav().map(|s| s.as_str()) {
            Some("prev") => day.prev(),
            Some("next") => day.next(),
            _ => day,
        })
    }
}
