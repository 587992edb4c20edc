//! Serde helpers for query string deserialization.
//!
//! GET forms send every input, so an untouched number field arrives as an
//! empty string, which `serde_urlencoded` cannot parse as an integer.
//! These helpers treat empty strings as `None`.
use serde::{Deserialize, Deserializer};

pub fn deserialize_optional_usize<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v.parse::<usize>().map(Some).map_err(serde::de::Error::custom),
    }
}
