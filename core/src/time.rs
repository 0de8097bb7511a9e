//! Time related utils.

use chrono::Utc;

/// DateTime is the alias for chrono::DateTime<Utc>.
pub type DateTime = chrono::DateTime<Utc>;

/// Create a new DateTime with current time.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format time into HTTP date: "Sun, 06 Nov 1994 08:49:37 GMT"
///
/// This is the value CloudAPI expects in the `Date` header and the exact string
/// covered by the HTTP signature.
pub fn format_http_date(t: DateTime) -> String {
    t.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Milliseconds elapsed from `earlier` to `later`, clamped at zero when the
/// clock moved backwards.
pub fn millis_between(earlier: DateTime, later: DateTime) -> u64 {
    u64::try_from((later - earlier).num_milliseconds()).unwrap_or(0)
}
