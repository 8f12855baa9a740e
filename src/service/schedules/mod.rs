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

//! On-call schedules: resolution entry points and configuration glue.
//!
//! The resolution rules themselves are pure functions in [`resolver`];
//! this module only fetches committed schedule/override state and hands
//! it over.

use config::{
    meta::schedule::{RotationLayer, Schedule, ScheduleOverride, Shift},
    utils::time::now_micros,
};
use infra::{
    errors::{Error, Result},
    table::{schedule_overrides, schedules},
};

pub mod resolver;

/// The effective on-call user for a group at `at`. Pure function of
/// committed state: schedule edits affect the next call immediately.
pub async fn who_is_on_call(group_id: &str, at: i64) -> Result<Option<String>> {
    let overrides = schedule_overrides::list_covering(group_id, at).await?;
    let layers = match schedules::get_active_for_group(group_id).await? {
        Some(schedule) => schedule.layers,
        None => vec![],
    };
    Ok(resolver::resolve_at(&layers, &overrides, at).map(|r| r.user_id))
}

/// Materialized shifts for a group over `[from, to)`, overrides applied.
pub async fn effective_shifts(group_id: &str, from: i64, to: i64) -> Result<Vec<Shift>> {
    if from >= to {
        return Err(Error::BadRequest(
            "shift window must satisfy from < to".to_string(),
        ));
    }
    let overrides = schedule_overrides::list_in_window(group_id, from, to).await?;
    let layers = match schedules::get_active_for_group(group_id).await? {
        Some(schedule) => schedule.layers,
        None => vec![],
    };
    Ok(resolver::effective_shifts(&layers, &overrides, from, to))
}

/// Shift preview for an unsaved schedule definition. No overrides: the
/// caller is editing layers, not the override calendar.
pub fn preview(layers: &[RotationLayer], from: i64, to: i64) -> Result<Vec<Shift>> {
    if from >= to {
        return Err(Error::BadRequest(
            "preview window must satisfy from < to".to_string(),
        ));
    }
    validate_layers(layers)?;
    Ok(resolver::effective_shifts(layers, &[], from, to))
}

pub fn validate_layers(layers: &[RotationLayer]) -> Result<()> {
    for (i, layer) in layers.iter().enumerate() {
        if layer.rotation_secs <= 0 {
            return Err(Error::BadRequest(format!(
                "layer {i}: rotation_secs must be positive"
            )));
        }
        if let Some(r) = &layer.restriction
            && (r.start_minute >= 1440 || r.end_minute >= 1440)
        {
            return Err(Error::BadRequest(format!(
                "layer {i}: restriction minutes must be below 1440"
            )));
        }
    }
    Ok(())
}

pub async fn create_schedule(
    org_id: &str,
    group_id: &str,
    name: &str,
    enabled: bool,
    layers: &[RotationLayer],
) -> Result<Schedule> {
    validate_layers(layers)?;
    schedules::create(org_id, group_id, name, enabled, layers).await
}

pub async fn update_schedule(
    org_id: &str,
    id: &str,
    name: &str,
    enabled: bool,
    layers: &[RotationLayer],
) -> Result<Schedule> {
    validate_layers(layers)?;
    schedules::update(org_id, id, name, enabled, layers).await
}

/// Create an override. The interval must be non-empty and may not lie
/// fully in the past; an override that started already but still has
/// time ahead is accepted.
pub async fn create_override(
    org_id: &str,
    group_id: &str,
    user_id: &str,
    start_at: i64,
    end_at: i64,
    reason: &str,
) -> Result<ScheduleOverride> {
    if end_at <= start_at {
        return Err(Error::BadRequest(
            "override end must be after its start".to_string(),
        ));
    }
    if end_at <= now_micros() {
        return Err(Error::BadRequest(
            "override may not end in the past".to_string(),
        ));
    }
    schedule_overrides::create(org_id, group_id, user_id, start_at, end_at, reason).await
}

#[cfg(test)]
mod tests {
    use config::meta::schedule::TimeRestriction;

    use super::*;

    #[test]
    fn test_validate_layers() {
        let good = RotationLayer {
            participants: vec!["u1".to_string()],
            rotation_secs: 3600,
            anchor: 0,
            restriction: None,
        };
        assert!(validate_layers(&[good.clone()]).is_ok());

        let mut zero_rotation = good.clone();
        zero_rotation.rotation_secs = 0;
        assert!(validate_layers(&[zero_rotation]).is_err());

        let mut bad_restriction = good;
        bad_restriction.restriction = Some(TimeRestriction {
            start_minute: 1500,
            end_minute: 60,
        });
        assert!(validate_layers(&[bad_restriction]).is_err());
    }

    #[test]
    fn test_preview_window_validation() {
        assert!(preview(&[], 100, 100).is_err());
        assert!(preview(&[], 200, 100).is_err());
        assert!(preview(&[], 0, 100).unwrap().is_empty());
    }
}
