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

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::utils::time::{MINUTES_PER_DAY, minute_of_day};

/// A named on-call calendar owned by a group. Layers are ordered by
/// increasing priority: when two layers both cover an instant, the one
/// with the higher index wins.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Schedule {
    pub id: String,
    pub org_id: String,
    pub group_id: String,
    pub name: String,
    pub enabled: bool,
    pub layers: Vec<RotationLayer>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RotationLayer {
    /// Ordered participant user ids; the rotation walks this list.
    pub participants: Vec<String>,
    /// Shift length in seconds.
    pub rotation_secs: i64,
    /// Instant (microseconds) at which participants[0] starts the first
    /// shift of this layer.
    pub anchor: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restriction: Option<TimeRestriction>,
}

/// Half-open time-of-day window in UTC minutes. A window whose end is not
/// after its start wraps past midnight (e.g. 22:00 → 06:00).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TimeRestriction {
    pub start_minute: u32,
    pub end_minute: u32,
}

impl TimeRestriction {
    pub fn contains(&self, at_micros: i64) -> bool {
        let m = minute_of_day(at_micros);
        let start = (self.start_minute as i64).rem_euclid(MINUTES_PER_DAY);
        let end = (self.end_minute as i64).rem_euclid(MINUTES_PER_DAY);
        if start < end {
            m >= start && m < end
        } else if start > end {
            m >= start || m < end
        } else {
            // degenerate window covers the whole day
            true
        }
    }
}

/// Supersedes the schedule-computed on-call for its interval.
/// `start_at <= t < end_at` covers; among covering overrides the most
/// recently created wins.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScheduleOverride {
    pub id: String,
    pub org_id: String,
    pub group_id: String,
    pub user_id: String,
    pub start_at: i64,
    pub end_at: i64,
    #[serde(default)]
    pub reason: String,
    pub created_at: i64,
}

/// One contiguous segment of on-call duty, as materialized by
/// `effective_shifts` and schedule previews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Shift {
    pub user_id: String,
    pub start: i64,
    pub end: i64,
    /// Index of the winning layer; None for override segments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer: Option<usize>,
    #[serde(default)]
    pub is_override: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::time::MICROS_PER_MINUTE;

    #[test]
    fn test_restriction_plain_window() {
        let r = TimeRestriction {
            start_minute: 9 * 60,
            end_minute: 17 * 60,
        };
        assert!(r.contains(9 * 60 * MICROS_PER_MINUTE));
        assert!(r.contains(12 * 60 * MICROS_PER_MINUTE));
        // half-open: 17:00 itself is outside
        assert!(!r.contains(17 * 60 * MICROS_PER_MINUTE));
        assert!(!r.contains(8 * 60 * MICROS_PER_MINUTE));
    }

    #[test]
    fn test_restriction_wraps_midnight() {
        let r = TimeRestriction {
            start_minute: 22 * 60,
            end_minute: 6 * 60,
        };
        assert!(r.contains(23 * 60 * MICROS_PER_MINUTE));
        assert!(r.contains(2 * 60 * MICROS_PER_MINUTE));
        assert!(!r.contains(12 * 60 * MICROS_PER_MINUTE));
        assert!(!r.contains(6 * 60 * MICROS_PER_MINUTE));
        assert!(r.contains(22 * 60 * MICROS_PER_MINUTE));
    }

    #[test]
    fn test_restriction_degenerate_covers_all() {
        let r = TimeRestriction {
            start_minute: 300,
            end_minute: 300,
        };
        assert!(r.contains(0));
        assert!(r.contains(12 * 60 * MICROS_PER_MINUTE));
    }
}
