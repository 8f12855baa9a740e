// Copyright 2025 OpenObserve Inc.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::Lazy;

// BASE_TIME is used to decide whether an incoming integer timestamp is in
// seconds, milliseconds, microseconds, or nanoseconds.
pub static BASE_TIME: Lazy<DateTime<Utc>> =
    Lazy::new(|| Utc.with_ymd_and_hms(1971, 1, 1, 0, 0, 0).unwrap());

pub const MICROS_PER_SEC: i64 = 1_000_000;
pub const MICROS_PER_MINUTE: i64 = 60 * MICROS_PER_SEC;
pub const MINUTES_PER_DAY: i64 = 24 * 60;

#[inline(always)]
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

#[inline(always)]
pub fn now_micros() -> i64 {
    Utc::now().timestamp_micros()
}

#[inline(always)]
pub fn seconds_to_micros(secs: i64) -> i64 {
    secs * MICROS_PER_SEC
}

/// Normalize an integer timestamp of unknown precision to microseconds.
#[inline(always)]
pub fn parse_i64_to_timestamp_micros(v: i64) -> i64 {
    if v == 0 {
        return now_micros();
    }
    let mut duration = v;
    if duration > BASE_TIME.timestamp_nanos_opt().unwrap_or_default() {
        // nanoseconds
        duration /= 1000;
    } else if duration > BASE_TIME.timestamp_micros() {
        // microseconds
        // noop
    } else if duration > BASE_TIME.timestamp_millis() {
        // milliseconds
        duration *= 1000;
    } else {
        // seconds
        duration *= 1_000_000;
    }
    duration
}

/// Parse an RFC3339 string to microseconds.
#[inline(always)]
pub fn parse_rfc3339_to_micros(s: &str) -> Result<i64, anyhow::Error> {
    let t = DateTime::parse_from_rfc3339(s)
        .map_err(|e| anyhow::anyhow!("invalid time format [{s}]: {e}"))?;
    Ok(t.with_timezone(&Utc).timestamp_micros())
}

/// UTC minute-of-day for an instant in microseconds.
#[inline(always)]
pub fn minute_of_day(micros: i64) -> i64 {
    (micros.div_euclid(MICROS_PER_MINUTE)).rem_euclid(MINUTES_PER_DAY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_i64_to_timestamp_micros() {
        let secs = 1_700_000_000_i64;
        let micros = secs * 1_000_000;
        assert_eq!(parse_i64_to_timestamp_micros(secs), micros);
        assert_eq!(parse_i64_to_timestamp_micros(secs * 1000), micros);
        assert_eq!(parse_i64_to_timestamp_micros(micros), micros);
        assert_eq!(parse_i64_to_timestamp_micros(micros * 1000), micros);
    }

    #[test]
    fn test_parse_rfc3339_to_micros() {
        let ts = parse_rfc3339_to_micros("2024-05-01T12:30:00Z").unwrap();
        assert_eq!(ts, 1_714_566_600_000_000);
        assert!(parse_rfc3339_to_micros("not-a-time").is_err());
    }

    #[test]
    fn test_minute_of_day() {
        // 1970-01-01T00:30:00Z
        assert_eq!(minute_of_day(30 * MICROS_PER_MINUTE), 30);
        // 23:59 the previous day
        assert_eq!(minute_of_day(-MICROS_PER_MINUTE), 1439);
    }
}
