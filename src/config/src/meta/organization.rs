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

/// Top-level tenant. Everything except users is transitively owned by
/// exactly one organization.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Organization {
    pub id: String,
    /// Unique, URL-safe slug.
    pub identifier: String,
    pub name: String,
    /// Shared secret embedded in inbound webhook URLs for this org.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingest_token: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Project {
    pub id: String,
    pub org_id: String,
    /// Unique within the organization.
    pub identifier: String,
    pub name: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GroupVisibility {
    Public,
    #[default]
    Organization,
    Private,
}

impl std::fmt::Display for GroupVisibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Organization => write!(f, "organization"),
            Self::Private => write!(f, "private"),
        }
    }
}

impl std::str::FromStr for GroupVisibility {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "public" => Ok(Self::Public),
            "organization" => Ok(Self::Organization),
            "private" => Ok(Self::Private),
            _ => Err("invalid group visibility"),
        }
    }
}

/// An on-call team: the unit schedules and escalation policies attach to.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Group {
    pub id: String,
    pub org_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    pub name: String,
    pub visibility: GroupVisibility,
    pub created_at: i64,
}
