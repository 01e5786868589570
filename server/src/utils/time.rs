//! Time utility functions

use chrono::{DateTime, TimeDelta, Utc};

/// Point timestamp for a record received now, shifted back by `offset_secs`.
///
/// Devices in some deployments report on a clock that lags the collector;
/// the offset lets every point line up with device time.
pub fn timestamp_with_offset(offset_secs: i64) -> i64 {
    let shifted = TimeDelta::try_seconds(offset_secs)
        .and_then(|delta| Utc::now().checked_sub_signed(delta))
        .unwrap_or_else(|| {
            tracing::warn!(offset_secs, "Timestamp offset out of range, ignoring");
            Utc::now()
        });
    datetime_to_nanos(shifted)
}

/// Nanoseconds since Unix epoch, saturating outside the representable range
/// (roughly 1677..2262)
fn datetime_to_nanos(dt: DateTime<Utc>) -> i64 {
    dt.timestamp_nanos_opt().unwrap_or_else(|| {
        if dt.timestamp() < 0 {
            i64::MIN
        } else {
            i64::MAX
        }
    })
}
