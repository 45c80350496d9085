//! Valid-time filtering for probe calls.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Mask bit requiring `valid >= start`.
pub const TIME_MASK_START: u8 = 0x1;
/// Mask bit requiring `valid <= end`.
pub const TIME_MASK_END: u8 = 0x2;

/// A valid-time window selected by a 2-bit mask.
///
/// Bit 0 requires the valid time to be at or after `start`, bit 1 requires
/// it to be at or before `end`. Either bound may be active independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    require_start: bool,
    require_end: bool,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn from_mask(mask: u8, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            require_start: mask & TIME_MASK_START != 0,
            require_end: mask & TIME_MASK_END != 0,
            start,
            end,
        }
    }

    /// A window that accepts every valid time.
    pub fn unbounded() -> Self {
        Self::from_mask(0, Utc.timestamp_opt(0, 0).unwrap(), Utc.timestamp_opt(0, 0).unwrap())
    }

    /// Accept valid times at or after `start`.
    pub fn starting(start: DateTime<Utc>) -> Self {
        Self::from_mask(TIME_MASK_START, start, start)
    }

    /// Accept valid times at or before `end`.
    pub fn ending(end: DateTime<Utc>) -> Self {
        Self::from_mask(TIME_MASK_END, end, end)
    }

    pub fn contains(&self, valid: DateTime<Utc>) -> bool {
        if self.require_start && valid < self.start {
            return false;
        }
        if self.require_end && valid > self.end {
            return false;
        }
        true
    }
}

/// Convert the epoch-second doubles stored in cube indexes to UTC.
///
/// Sub-second fractions are truncated; the cube writers only ever emit whole
/// seconds. Returns `None` for values outside the representable range.
pub fn from_epoch_seconds(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    Utc.timestamp_opt(secs as i64, 0).single()
}

/// Compute a valid time from a reference time plus a projection in seconds,
/// as the legacy local edition encodes it.
pub fn reference_plus_projection(reference: DateTime<Utc>, projection_secs: i64) -> DateTime<Utc> {
    reference + Duration::seconds(projection_secs)
}
