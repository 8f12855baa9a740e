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

//! Pure on-call resolution.
//!
//! Everything here is a function of `(layers, overrides, instant)` — no
//! clock, no database — so the resolution rules are unit-tested against
//! synthetic schedules. The data-access glue lives in the parent module.

use config::{
    meta::schedule::{RotationLayer, ScheduleOverride, Shift},
    utils::time::{MICROS_PER_MINUTE, MINUTES_PER_DAY},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOnCall {
    pub user_id: String,
    /// Index of the winning layer; None when an override decided.
    pub layer: Option<usize>,
    pub is_override: bool,
}

/// Who is on call at `at`, given committed schedule and override state.
///
/// Overrides win over the schedule; among overrides covering `at`
/// (half-open `start <= at < end`) the most recently created wins.
/// Otherwise layers are consulted from the highest index down, and the
/// first applicable one decides.
pub fn resolve_at(
    layers: &[RotationLayer],
    overrides: &[ScheduleOverride],
    at: i64,
) -> Option<ResolvedOnCall> {
    if let Some(ov) = covering_override(overrides, at) {
        return Some(ResolvedOnCall {
            user_id: ov.user_id.clone(),
            layer: None,
            is_override: true,
        });
    }

    for (idx, layer) in layers.iter().enumerate().rev() {
        if let Some(user_id) = layer_on_call(layer, at) {
            return Some(ResolvedOnCall {
                user_id,
                layer: Some(idx),
                is_override: false,
            });
        }
    }
    None
}

fn covering_override<'a>(
    overrides: &'a [ScheduleOverride],
    at: i64,
) -> Option<&'a ScheduleOverride> {
    overrides
        .iter()
        .filter(|ov| ov.start_at <= at && at < ov.end_at)
        .max_by_key(|ov| (ov.created_at, ov.id.clone()))
}

/// The participant a single layer puts on call at `at`, if the layer
/// applies: its restriction must contain `at` and it must have
/// participants. Euclidean arithmetic keeps instants before the anchor
/// deterministic (they rotate backwards through the participant list).
fn layer_on_call(layer: &RotationLayer, at: i64) -> Option<String> {
    if layer.participants.is_empty() || layer.rotation_secs <= 0 {
        return None;
    }
    if let Some(restriction) = &layer.restriction
        && !restriction.contains(at)
    {
        return None;
    }
    let rotation_micros = layer.rotation_secs * 1_000_000;
    let shift_index = (at - layer.anchor).div_euclid(rotation_micros);
    let participant = shift_index.rem_euclid(layer.participants.len() as i64);
    Some(layer.participants[participant as usize].clone())
}

/// Materialize the resolution into contiguous shifts over `[from, to)`.
///
/// Segment boundaries are: rotation handoffs of every layer, restriction
/// window edges, and override starts/ends. Each segment is resolved at
/// its start and adjacent segments with the same outcome are merged.
pub fn effective_shifts(
    layers: &[RotationLayer],
    overrides: &[ScheduleOverride],
    from: i64,
    to: i64,
) -> Vec<Shift> {
    if from >= to {
        return vec![];
    }

    let mut boundaries = vec![from, to];

    for layer in layers {
        if layer.participants.is_empty() || layer.rotation_secs <= 0 {
            continue;
        }
        let rotation_micros = layer.rotation_secs * 1_000_000;
        // first handoff at or after `from`
        let k = (from - layer.anchor).div_euclid(rotation_micros);
        let mut t = layer.anchor + k * rotation_micros;
        while t < to {
            if t > from {
                boundaries.push(t);
            }
            t += rotation_micros;
        }
        if let Some(r) = &layer.restriction {
            // restriction edges repeat daily
            let day_micros = MINUTES_PER_DAY * MICROS_PER_MINUTE;
            let mut day = from.div_euclid(day_micros) * day_micros - day_micros;
            while day < to {
                for minute in [r.start_minute as i64, r.end_minute as i64] {
                    let t = day + minute * MICROS_PER_MINUTE;
                    if t > from && t < to {
                        boundaries.push(t);
                    }
                }
                day += day_micros;
            }
        }
    }

    for ov in overrides {
        for t in [ov.start_at, ov.end_at] {
            if t > from && t < to {
                boundaries.push(t);
            }
        }
    }

    boundaries.sort_unstable();
    boundaries.dedup();

    let mut shifts: Vec<Shift> = vec![];
    for window in boundaries.windows(2) {
        let (start, end) = (window[0], window[1]);
        let Some(resolved) = resolve_at(layers, overrides, start) else {
            continue;
        };
        match shifts.last_mut() {
            Some(last)
                if last.end == start
                    && last.user_id == resolved.user_id
                    && last.layer == resolved.layer
                    && last.is_override == resolved.is_override =>
            {
                last.end = end;
            }
            _ => shifts.push(Shift {
                user_id: resolved.user_id,
                start,
                end,
                layer: resolved.layer,
                is_override: resolved.is_override,
            }),
        }
    }
    shifts
}

#[cfg(test)]
mod tests {
    use config::meta::schedule::TimeRestriction;

    use super::*;

    const HOUR: i64 = 3600 * 1_000_000;
    const DAY: i64 = 24 * HOUR;

    fn layer(participants: &[&str], rotation_secs: i64, anchor: i64) -> RotationLayer {
        RotationLayer {
            participants: participants.iter().map(|s| s.to_string()).collect(),
            rotation_secs,
            anchor,
            restriction: None,
        }
    }

    fn override_for(
        id: &str,
        user: &str,
        start: i64,
        end: i64,
        created_at: i64,
    ) -> ScheduleOverride {
        ScheduleOverride {
            id: id.to_string(),
            org_id: "org1".to_string(),
            group_id: "grp1".to_string(),
            user_id: user.to_string(),
            start_at: start,
            end_at: end,
            reason: "".to_string(),
            created_at,
        }
    }

    fn on_call(layers: &[RotationLayer], overrides: &[ScheduleOverride], at: i64) -> Option<String> {
        resolve_at(layers, overrides, at).map(|r| r.user_id)
    }

    #[test]
    fn test_basic_rotation() {
        let layers = vec![layer(&["alice", "bob", "carol"], 86400, 0)];
        assert_eq!(on_call(&layers, &[], 0).as_deref(), Some("alice"));
        assert_eq!(on_call(&layers, &[], DAY - 1).as_deref(), Some("alice"));
        // boundary instant belongs to the starting shift
        assert_eq!(on_call(&layers, &[], DAY).as_deref(), Some("bob"));
        assert_eq!(on_call(&layers, &[], 2 * DAY).as_deref(), Some("carol"));
        assert_eq!(on_call(&layers, &[], 3 * DAY).as_deref(), Some("alice"));
    }

    #[test]
    fn test_rotation_before_anchor() {
        let layers = vec![layer(&["alice", "bob", "carol"], 86400, 0)];
        // one shift before the anchor: rotation walks backwards
        assert_eq!(on_call(&layers, &[], -1).as_deref(), Some("carol"));
        assert_eq!(on_call(&layers, &[], -DAY).as_deref(), Some("carol"));
        assert_eq!(on_call(&layers, &[], -DAY - 1).as_deref(), Some("bob"));
    }

    #[test]
    fn test_empty_participants_yields_none() {
        let layers = vec![layer(&[], 86400, 0)];
        assert_eq!(on_call(&layers, &[], 0), None);
        assert_eq!(on_call(&[], &[], 0), None);
    }

    #[test]
    fn test_override_supersedes_schedule() {
        // scenario: schedule places X on call at T; override puts Y on
        // from T-1h to T+1h; after the override ends X is back
        let layers = vec![layer(&["x"], 86400, 0)];
        let t = 12 * HOUR;
        let overrides = vec![override_for("ov1", "y", t - HOUR, t + HOUR, 100)];
        assert_eq!(on_call(&layers, &overrides, t).as_deref(), Some("y"));
        assert_eq!(
            on_call(&layers, &overrides, t + HOUR).as_deref(),
            Some("x"),
            "override end is exclusive"
        );
        assert_eq!(on_call(&layers, &overrides, t - HOUR).as_deref(), Some("y"));
        assert_eq!(
            on_call(&layers, &overrides, t - HOUR - 1).as_deref(),
            Some("x")
        );
    }

    #[test]
    fn test_latest_created_override_wins() {
        let layers = vec![layer(&["x"], 86400, 0)];
        let overrides = vec![
            override_for("ov1", "y", 0, DAY, 100),
            override_for("ov2", "z", 0, DAY, 200),
        ];
        assert_eq!(on_call(&layers, &overrides, HOUR).as_deref(), Some("z"));
    }

    #[test]
    fn test_higher_layer_wins() {
        let base = layer(&["alice"], 86400, 0);
        let top = layer(&["bob"], 86400, 0);
        assert_eq!(
            on_call(&[base.clone(), top], &[], HOUR).as_deref(),
            Some("bob")
        );
        assert_eq!(on_call(&[base], &[], HOUR).as_deref(), Some("alice"));
    }

    #[test]
    fn test_restricted_layer_falls_through() {
        // business-hours layer on top of a 24x7 base layer
        let mut business = layer(&["day-person"], 86400, 0);
        business.restriction = Some(TimeRestriction {
            start_minute: 9 * 60,
            end_minute: 17 * 60,
        });
        let layers = vec![layer(&["night-person"], 86400, 0), business];

        assert_eq!(
            on_call(&layers, &[], 10 * HOUR).as_deref(),
            Some("day-person")
        );
        assert_eq!(
            on_call(&layers, &[], 3 * HOUR).as_deref(),
            Some("night-person")
        );
        // 17:00 is outside the half-open window
        assert_eq!(
            on_call(&layers, &[], 17 * HOUR).as_deref(),
            Some("night-person")
        );
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let layers = vec![layer(&["a", "b"], 43200, 7 * HOUR)];
        let overrides = vec![override_for("ov1", "c", 30 * HOUR, 31 * HOUR, 5)];
        for at in [0, 7 * HOUR, 19 * HOUR, 30 * HOUR + 1, 31 * HOUR] {
            assert_eq!(
                on_call(&layers, &overrides, at),
                on_call(&layers, &overrides, at)
            );
        }
    }

    #[test]
    fn test_effective_shifts_rotation_handoffs() {
        let layers = vec![layer(&["alice", "bob"], 86400, 0)];
        let shifts = effective_shifts(&layers, &[], 0, 3 * DAY);
        assert_eq!(shifts.len(), 3);
        assert_eq!(shifts[0].user_id, "alice");
        assert_eq!(shifts[0].start, 0);
        assert_eq!(shifts[0].end, DAY);
        assert_eq!(shifts[1].user_id, "bob");
        assert_eq!(shifts[2].user_id, "alice");
        assert_eq!(shifts[2].end, 3 * DAY);
    }

    #[test]
    fn test_effective_shifts_with_override_splits_segments() {
        let layers = vec![layer(&["alice"], 86400, 0)];
        let overrides = vec![override_for("ov1", "bob", 6 * HOUR, 8 * HOUR, 10)];
        let shifts = effective_shifts(&layers, &overrides, 0, DAY);
        assert_eq!(shifts.len(), 3);
        assert_eq!(shifts[0].user_id, "alice");
        assert_eq!(shifts[0].end, 6 * HOUR);
        assert_eq!(shifts[1].user_id, "bob");
        assert!(shifts[1].is_override);
        assert_eq!(shifts[1].start, 6 * HOUR);
        assert_eq!(shifts[1].end, 8 * HOUR);
        assert_eq!(shifts[2].user_id, "alice");
        assert_eq!(shifts[2].start, 8 * HOUR);
        assert_eq!(shifts[2].end, DAY);
    }

    #[test]
    fn test_effective_shifts_gap_when_nothing_applies() {
        let mut business = layer(&["day-person"], 86400, 0);
        business.restriction = Some(TimeRestriction {
            start_minute: 9 * 60,
            end_minute: 17 * 60,
        });
        let shifts = effective_shifts(&[business], &[], 0, DAY);
        assert_eq!(shifts.len(), 1);
        assert_eq!(shifts[0].user_id, "day-person");
        assert_eq!(shifts[0].start, 9 * HOUR);
        assert_eq!(shifts[0].end, 17 * HOUR);
    }

    #[test]
    fn test_effective_shifts_empty_window() {
        let layers = vec![layer(&["alice"], 86400, 0)];
        assert!(effective_shifts(&layers, &[], DAY, DAY).is_empty());
        assert!(effective_shifts(&layers, &[], DAY, 0).is_empty());
    }
}
