// Clock abstraction and the timestamp-based naming scheme for relocated files and thumbnails

use chrono::{DateTime, Utc};
use std::path::Path;

/// Source of "now" for every generated file name
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// UTC timestamp with minute precision, formatted `YYYY-MM-DDTHH-MM`.
///
/// This is the ISO-8601 instant with `:` replaced by `-`, cut after the minutes,
/// so `2024-05-01T09:07:55.123Z` becomes `2024-05-01T09-07`.
pub fn timestamp(clock: &dyn Clock) -> String {
    clock.now().format("%Y-%m-%dT%H-%M").to_string()
}

/// Extension of `name` including the leading dot, or an empty string
pub fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default()
}

/// `<timestamp>_thumbnail<ext>`; falls back to `.jpg` when the source has no extension
pub fn thumbnail_file_name(clock: &dyn Clock, original_name: &str) -> String {
    let ext = match extension_of(original_name) {
        ext if ext.is_empty() => ".jpg".to_string(),
        ext => ext,
    };
    format!("{}_thumbnail{}", timestamp(clock), ext)
}

/// `<timestamp>_long<ext>` or `<timestamp>_short<ext>`
pub fn finished_file_name(clock: &dyn Clock, original_name: &str, is_long: bool) -> String {
    let kind = if is_long { "long" } else { "short" };
    format!("{}_{}{}", timestamp(clock), kind, extension_of(original_name))
}
