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

/// Who a policy level pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EscalationTarget {
    /// A fixed user.
    User,
    /// Whoever is on-call for the configured group at fire time.
    Group,
    /// Whoever is on-call for the incident's own group at fire time.
    CurrentSchedule,
    /// Hand off to an external dispatcher; no assignment is recorded.
    External,
}

impl std::fmt::Display for EscalationTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Group => write!(f, "group"),
            Self::CurrentSchedule => write!(f, "current_schedule"),
            Self::External => write!(f, "external"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EscalationLevel {
    /// 1-based, dense.
    pub level: u32,
    pub target_type: EscalationTarget,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    /// Seconds before the engine advances past this level.
    pub timeout_secs: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EscalationPolicy {
    pub id: String,
    pub org_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub levels: Vec<EscalationLevel>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl EscalationPolicy {
    /// Level numbers are 1-based.
    pub fn level(&self, n: u32) -> Option<&EscalationLevel> {
        if n == 0 {
            return None;
        }
        let l = self.levels.get((n - 1) as usize)?;
        // defense against a policy edited to a sparse numbering
        (l.level == n).then_some(l)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.levels.is_empty() {
            return Err("policy must have at least one level".to_string());
        }
        for (i, level) in self.levels.iter().enumerate() {
            let expected = (i + 1) as u32;
            if level.level != expected {
                return Err(format!(
                    "levels must be dense starting at 1, got {} at position {}",
                    level.level, expected
                ));
            }
            if level.timeout_secs <= 0 {
                return Err(format!("level {} timeout must be positive", level.level));
            }
            match level.target_type {
                EscalationTarget::User | EscalationTarget::Group => {
                    if level.target_id.as_deref().unwrap_or("").is_empty() {
                        return Err(format!(
                            "level {} requires a target_id for {} targets",
                            level.level, level.target_type
                        ));
                    }
                }
                EscalationTarget::CurrentSchedule | EscalationTarget::External => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(levels: Vec<EscalationLevel>) -> EscalationPolicy {
        EscalationPolicy {
            id: "pol1".to_string(),
            org_id: "org1".to_string(),
            name: "default".to_string(),
            description: "".to_string(),
            levels,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn user_level(n: u32) -> EscalationLevel {
        EscalationLevel {
            level: n,
            target_type: EscalationTarget::User,
            target_id: Some(format!("user{n}")),
            timeout_secs: 60,
        }
    }

    #[test]
    fn test_level_lookup() {
        let p = policy(vec![user_level(1), user_level(2)]);
        assert_eq!(p.level(1).unwrap().target_id.as_deref(), Some("user1"));
        assert_eq!(p.level(2).unwrap().target_id.as_deref(), Some("user2"));
        assert!(p.level(0).is_none());
        assert!(p.level(3).is_none());
    }

    #[test]
    fn test_validate_dense_levels() {
        let p = policy(vec![user_level(1), user_level(3)]);
        assert!(p.validate().is_err());
        let p = policy(vec![user_level(1), user_level(2)]);
        assert!(p.validate().is_ok());
        let p = policy(vec![]);
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_validate_targets_and_timeouts() {
        let mut bad = user_level(1);
        bad.target_id = None;
        assert!(policy(vec![bad]).validate().is_err());

        let mut bad = user_level(1);
        bad.timeout_secs = 0;
        assert!(policy(vec![bad]).validate().is_err());

        let external = EscalationLevel {
            level: 1,
            target_type: EscalationTarget::External,
            target_id: None,
            timeout_secs: 60,
        };
        assert!(policy(vec![external]).validate().is_ok());
    }
}
