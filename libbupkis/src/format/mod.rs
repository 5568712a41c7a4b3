//! Human-readable formatting helpers.

use chrono::{DateTime, Utc};
use chrono_humanize::Humanize;


/// Formats a timestamp as a relative age.
///
/// # Examples
///
/// ```
/// use libbupkis::format::format_timestamp;
/// use chrono::{Duration, Utc};
///
/// let one_day_ago = Utc::now() - Duration::days(1);
/// assert_eq!(format_timestamp(&one_day_ago), "a day ago");
/// ```
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.humanize()
}

/// Formats a timestamp as RFC 3339 with second precision.
///
/// # Examples
///
/// ```
/// use libbupkis::format::format_rfc3339;
/// use chrono::{TimeZone, Utc};
///
/// let ts = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
/// assert_eq!(format_rfc3339(&ts), "2020-01-01T00:00:00Z");
/// ```
pub fn format_rfc3339(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

/// Seconds from the Unix epoch to `0001-01-01T00:00:00Z`, the zero time
/// Docker writes into `created` when an image has none.
const ZERO_CREATED_SECS: i64 = -62_135_596_800;

/// Returns true for the zero `created` value (`0001-01-01T00:00:00Z`).
///
/// The Unix epoch is a real timestamp: reproducible builds stamp it on
/// purpose.
///
/// # Examples
///
/// ```
/// use libbupkis::format::is_unset_timestamp;
/// use chrono::{TimeZone, Utc};
///
/// assert!(is_unset_timestamp(&Utc.with_ymd_and_hms(1, 1, 1, 0, 0, 0).unwrap()));
/// assert!(!is_unset_timestamp(&Utc.timestamp_opt(0, 0).unwrap()));
/// ```
pub fn is_unset_timestamp(timestamp: &DateTime<Utc>) -> bool {
    timestamp.timestamp() == ZERO_CREATED_SECS && timestamp.timestamp_subsec_nanos() == 0
}
