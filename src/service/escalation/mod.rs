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

//! The escalation engine.
//!
//! Each tick claims a batch of due incidents (leased, skip-locked) and
//! advances every claimed incident one policy level. Step planning is a
//! pure function of `(incident, policy, now)` so the eligibility rules
//! are unit-tested without a store; the claim is only a lease and the
//! plan is recomputed from fresh state before anything is written.

use config::{
    get_config,
    meta::{
        escalation::{EscalationPolicy, EscalationTarget},
        incident::{EscalationStatus, Incident, IncidentStatus},
        notification::IntentKind,
    },
    utils::{json, time::now_micros},
};
use futures::StreamExt;
use infra::{
    errors::Result,
    escalator::{self, ClaimedIncident},
    table::{escalation_policies, incidents},
};

use crate::service::{notifications, schedules};

/// What the engine should do with one claimed incident.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The incident no longer satisfies the eligibility predicate
    /// (acknowledged/resolved since the claim, or simply not due).
    NotEligible(&'static str),
    /// No next level exists; the policy is exhausted.
    Exhausted,
    /// Fire level `next_level`.
    Advance { next_level: u32 },
}

/// The eligibility predicate plus next-step computation.
///
/// An incident advances iff it is triggered, carries a policy that is
/// not completed, and either has never fired and its first level's
/// timeout has elapsed since creation, or sits at level L whose timeout
/// has elapsed since the last escalation and a level L+1 exists.
pub fn plan_step(incident: &Incident, policy: &EscalationPolicy, now: i64) -> StepOutcome {
    if incident.status != IncidentStatus::Triggered {
        return StepOutcome::NotEligible("not triggered");
    }
    if incident.escalation_policy_id.is_none() {
        return StepOutcome::NotEligible("no policy");
    }
    if incident.escalation_status == EscalationStatus::Completed {
        return StepOutcome::NotEligible("escalation completed");
    }

    match incident.last_escalated_at {
        None => {
            let Some(first) = policy.level(1) else {
                return StepOutcome::Exhausted;
            };
            if now - incident.created_at >= first.timeout_secs * 1_000_000 {
                StepOutcome::Advance { next_level: 1 }
            } else {
                StepOutcome::NotEligible("first level not due")
            }
        }
        Some(last_escalated_at) => {
            let current = incident.current_escalation_level;
            if current < 1 {
                return StepOutcome::NotEligible("inconsistent escalation state");
            }
            let Some(current_level) = policy.level(current as u32) else {
                // the policy shrank underneath the incident
                return StepOutcome::Exhausted;
            };
            if policy.level(current as u32 + 1).is_none() {
                return StepOutcome::Exhausted;
            }
            if now - last_escalated_at >= current_level.timeout_secs * 1_000_000 {
                StepOutcome::Advance {
                    next_level: current as u32 + 1,
                }
            } else {
                StepOutcome::NotEligible("current level not due")
            }
        }
    }
}

enum TargetResolution {
    User(String),
    External,
    Unresolved,
}

/// Resolve who a level pages. Group-backed targets go through the
/// schedule resolver at fire time.
async fn resolve_target(incident: &Incident, policy: &EscalationPolicy, next_level: u32) -> Result<TargetResolution> {
    let level = policy
        .level(next_level)
        .expect("planned level exists in policy");
    let now = now_micros();

    match level.target_type {
        EscalationTarget::User => match level.target_id.as_deref() {
            Some(user_id) if !user_id.is_empty() => Ok(TargetResolution::User(user_id.to_string())),
            _ => Ok(TargetResolution::Unresolved),
        },
        EscalationTarget::Group => match level.target_id.as_deref() {
            Some(group_id) if !group_id.is_empty() => {
                Ok(match schedules::who_is_on_call(group_id, now).await? {
                    Some(user_id) => TargetResolution::User(user_id),
                    None => TargetResolution::Unresolved,
                })
            }
            _ => Ok(TargetResolution::Unresolved),
        },
        EscalationTarget::CurrentSchedule => match incident.group_id.as_deref() {
            Some(group_id) => Ok(match schedules::who_is_on_call(group_id, now).await? {
                Some(user_id) => TargetResolution::User(user_id),
                None => TargetResolution::Unresolved,
            }),
            None => Ok(TargetResolution::Unresolved),
        },
        EscalationTarget::External => Ok(TargetResolution::External),
    }
}

/// One engine tick: claim and advance.
pub async fn run_tick() -> Result<()> {
    let cfg = get_config();
    let claimed = escalator::claim(cfg.escalation.batch_size, cfg.escalation.claim_lease).await?;
    if claimed.is_empty() {
        return Ok(());
    }
    log::debug!("[ESCALATION] claimed {} incidents", claimed.len());

    let step_deadline = std::time::Duration::from_secs(cfg.escalation.step_deadline);
    futures::stream::iter(claimed)
        .for_each_concurrent(cfg.escalation.concurrency, |claim| async move {
            match tokio::time::timeout(step_deadline, advance(&claim)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    log::error!("[ESCALATION] advance failed for incident {}: {e}", claim.id);
                }
                Err(_) => {
                    // transaction dropped with the future; the lease
                    // expiry re-queues the incident
                    log::warn!(
                        "[ESCALATION] advance deadline exceeded for incident {}",
                        claim.id
                    );
                }
            }
        })
        .await;
    Ok(())
}

/// Advance one claimed incident a single policy level.
async fn advance(claim: &ClaimedIncident) -> Result<()> {
    let Some(incident) = incidents::get(&claim.org_id, &claim.id).await? else {
        log::warn!("[ESCALATION] claimed incident {} vanished", claim.id);
        return Ok(());
    };

    let Some(policy_id) = incident.escalation_policy_id.as_deref() else {
        return Ok(());
    };
    let Some(policy) = escalation_policies::get(&incident.org_id, policy_id).await? else {
        // the policy was deleted; close out escalation instead of
        // retrying forever
        log::warn!(
            "[ESCALATION] incident {} references deleted policy {policy_id}",
            incident.id
        );
        incidents::complete_escalation(
            &incident.org_id,
            &incident.id,
            json::json!({ "level": incident.current_escalation_level, "reason": "policy deleted" }),
        )
        .await?;
        return Ok(());
    };

    let now = now_micros();
    match plan_step(&incident, &policy, now) {
        StepOutcome::NotEligible(reason) => {
            log::debug!("[ESCALATION] incident {} not eligible: {reason}", incident.id);
            Ok(())
        }
        StepOutcome::Exhausted => {
            incidents::complete_escalation(
                &incident.org_id,
                &incident.id,
                json::json!({ "level": incident.current_escalation_level }),
            )
            .await?;
            Ok(())
        }
        StepOutcome::Advance { next_level } => {
            fire_level(&incident, &policy, next_level, now).await
        }
    }
}

async fn fire_level(
    incident: &Incident,
    policy: &EscalationPolicy,
    next_level: u32,
    now: i64,
) -> Result<()> {
    let level = policy
        .level(next_level)
        .expect("planned level exists in policy");

    let resolution = resolve_target(incident, policy, next_level).await?;
    let assigned_to = match resolution {
        TargetResolution::User(user_id) => Some(user_id),
        TargetResolution::External => None,
        TargetResolution::Unresolved => {
            // do not advance, do not touch last_escalated_at; the next
            // tick retries the same level until reconfigured
            log::warn!(
                "[ESCALATION] incident {} level {next_level}: target {:?}/{:?} resolves to nobody",
                incident.id,
                level.target_type,
                level.target_id
            );
            incidents::record_notify_failure(
                &incident.org_id,
                &incident.id,
                now,
                json::json!({
                    "level": next_level,
                    "target_type": level.target_type,
                    "target_id": level.target_id,
                }),
            )
            .await?;
            return Ok(());
        }
    };

    let completed = policy.level(next_level + 1).is_none();
    let due_at = if completed {
        None
    } else {
        Some(now + level.timeout_secs * 1_000_000)
    };

    let step = incidents::EscalationStep {
        org_id: incident.org_id.clone(),
        incident_id: incident.id.clone(),
        next_level: next_level as i32,
        assigned_to: assigned_to.clone(),
        completed,
        now,
        due_at,
        event_data: json::json!({
            "level": next_level,
            "target_type": level.target_type,
            "target_id": level.target_id,
            "assigned_to": assigned_to,
        }),
    };

    let updated = match incidents::apply_escalation_step(&step).await {
        Ok(updated) => updated,
        Err(e) if matches!(e, infra::errors::Error::ResourceConflict(_)) => {
            // acknowledged or resolved between claim and write; their
            // transaction wins
            log::debug!(
                "[ESCALATION] incident {} step dropped: {e}",
                incident.id
            );
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    // exactly one intent per escalation step; failures are logged by the
    // dispatcher and never undo the step
    match assigned_to {
        Some(user_id) => {
            notifications::emit(IntentKind::IncidentEscalated, &updated, Some(user_id));
        }
        None => {
            notifications::emit(IntentKind::ExternalDispatch, &updated, None);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use config::meta::{
        escalation::EscalationLevel,
        incident::{Severity, Urgency},
    };

    use super::*;

    const MINUTE: i64 = 60 * 1_000_000;

    fn policy(n_levels: u32) -> EscalationPolicy {
        EscalationPolicy {
            id: "pol1".to_string(),
            org_id: "org1".to_string(),
            name: "default".to_string(),
            description: "".to_string(),
            levels: (1..=n_levels)
                .map(|level| EscalationLevel {
                    level,
                    target_type: EscalationTarget::User,
                    target_id: Some(format!("user{level}")),
                    timeout_secs: 60,
                })
                .collect(),
            created_at: 0,
            updated_at: 0,
        }
    }

    fn incident(created_at: i64) -> Incident {
        Incident {
            id: "inc1".to_string(),
            org_id: "org1".to_string(),
            project_id: None,
            group_id: None,
            title: "api down".to_string(),
            description: "".to_string(),
            severity: Severity::Critical,
            urgency: Urgency::High,
            status: IncidentStatus::Triggered,
            source: "datadog".to_string(),
            incident_key: Some("k".to_string()),
            external_id: None,
            alert_count: 1,
            escalation_policy_id: Some("pol1".to_string()),
            current_escalation_level: 0,
            escalation_status: EscalationStatus::None,
            last_escalated_at: None,
            escalation_due_at: Some(created_at + MINUTE),
            assigned_to: None,
            resolution: None,
            created_at,
            updated_at: created_at,
            acknowledged_at: None,
            resolved_at: None,
        }
    }

    #[test]
    fn test_first_fire_waits_for_first_timeout() {
        let p = policy(3);
        let inc = incident(0);
        assert_eq!(
            plan_step(&inc, &p, MINUTE - 1),
            StepOutcome::NotEligible("first level not due")
        );
        assert_eq!(plan_step(&inc, &p, MINUTE), StepOutcome::Advance { next_level: 1 });
        assert_eq!(
            plan_step(&inc, &p, 10 * MINUTE),
            StepOutcome::Advance { next_level: 1 }
        );
    }

    #[test]
    fn test_advance_from_level_waits_current_timeout() {
        let p = policy(3);
        let mut inc = incident(0);
        inc.current_escalation_level = 1;
        inc.escalation_status = EscalationStatus::Pending;
        inc.last_escalated_at = Some(MINUTE);
        assert_eq!(
            plan_step(&inc, &p, 2 * MINUTE - 1),
            StepOutcome::NotEligible("current level not due")
        );
        assert_eq!(
            plan_step(&inc, &p, 2 * MINUTE),
            StepOutcome::Advance { next_level: 2 }
        );
    }

    #[test]
    fn test_acknowledged_and_resolved_disqualify() {
        let p = policy(3);
        let mut inc = incident(0);
        inc.status = IncidentStatus::Acknowledged;
        assert_eq!(
            plan_step(&inc, &p, 10 * MINUTE),
            StepOutcome::NotEligible("not triggered")
        );
        inc.status = IncidentStatus::Resolved;
        assert_eq!(
            plan_step(&inc, &p, 10 * MINUTE),
            StepOutcome::NotEligible("not triggered")
        );
    }

    #[test]
    fn test_completed_is_terminal() {
        let p = policy(3);
        let mut inc = incident(0);
        inc.current_escalation_level = 3;
        inc.escalation_status = EscalationStatus::Completed;
        inc.last_escalated_at = Some(3 * MINUTE);
        assert_eq!(
            plan_step(&inc, &p, 100 * MINUTE),
            StepOutcome::NotEligible("escalation completed")
        );
    }

    #[test]
    fn test_no_next_level_is_exhausted() {
        // a policy edited down to fewer levels than the incident sits at
        let p = policy(1);
        let mut inc = incident(0);
        inc.current_escalation_level = 1;
        inc.escalation_status = EscalationStatus::Pending;
        inc.last_escalated_at = Some(MINUTE);
        assert_eq!(plan_step(&inc, &p, 10 * MINUTE), StepOutcome::Exhausted);

        let mut shrunk = incident(0);
        shrunk.current_escalation_level = 5;
        shrunk.escalation_status = EscalationStatus::Pending;
        shrunk.last_escalated_at = Some(MINUTE);
        assert_eq!(plan_step(&shrunk, &p, 10 * MINUTE), StepOutcome::Exhausted);
    }

    #[test]
    fn test_empty_policy_is_exhausted_on_first_fire() {
        let mut p = policy(1);
        p.levels.clear();
        let inc = incident(0);
        assert_eq!(plan_step(&inc, &p, 10 * MINUTE), StepOutcome::Exhausted);
    }

    #[test]
    fn test_level_never_exceeds_policy_length() {
        // walking a 3-level policy step by step never plans past level 3
        let p = policy(3);
        let mut inc = incident(0);
        let mut now = 0;
        let mut fired = vec![];
        for _ in 0..10 {
            now += MINUTE;
            match plan_step(&inc, &p, now) {
                StepOutcome::Advance { next_level } => {
                    fired.push(next_level);
                    inc.current_escalation_level = next_level as i32;
                    inc.last_escalated_at = Some(now);
                    inc.escalation_status = if p.level(next_level + 1).is_none() {
                        EscalationStatus::Completed
                    } else {
                        EscalationStatus::Pending
                    };
                }
                _ => {}
            }
        }
        assert_eq!(fired, vec![1, 2, 3]);
        assert!(inc.current_escalation_level as usize <= p.levels.len());
        assert_eq!(inc.escalation_status, EscalationStatus::Completed);
    }
}
