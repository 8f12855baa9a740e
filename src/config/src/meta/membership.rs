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

//! The single membership relation and the permission matrix over it.
//!
//! Every authorization question in the system resolves through
//! `(user, role, object_type, object_id)` facts; there is no other
//! relation table.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    Member,
    Viewer,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Owner => write!(f, "owner"),
            Self::Admin => write!(f, "admin"),
            Self::Member => write!(f, "member"),
            Self::Viewer => write!(f, "viewer"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "owner" => Ok(Self::Owner),
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            "viewer" => Ok(Self::Viewer),
            _ => Err("invalid role"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    Org,
    Project,
    Group,
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Org => write!(f, "org"),
            Self::Project => write!(f, "project"),
            Self::Group => write!(f, "group"),
        }
    }
}

impl std::str::FromStr for ObjectType {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "org" => Ok(Self::Org),
            "project" => Ok(Self::Project),
            "group" => Ok(Self::Group),
            _ => Err("invalid object type"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    View,
    Create,
    Update,
    Delete,
    ManageMembers,
}

impl Role {
    /// Deny-by-default permission matrix.
    ///
    /// Admins may delete projects and groups but never the organization
    /// itself; only owners can.
    pub fn allows(&self, action: Action, object: ObjectType) -> bool {
        match self {
            Self::Owner => true,
            Self::Admin => match action {
                Action::View | Action::Create | Action::Update | Action::ManageMembers => true,
                Action::Delete => object != ObjectType::Org,
            },
            Self::Member => matches!(action, Action::View | Action::Create),
            Self::Viewer => matches!(action, Action::View),
        }
    }
}

/// Effective role on an open project for a user holding only an org
/// membership. Owners act as project admins; everyone else keeps their
/// org role.
pub fn project_role_from_org(org_role: Role) -> Role {
    match org_role {
        Role::Owner => Role::Admin,
        other => other,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Membership {
    pub user_id: String,
    pub role: Role,
    pub object_type: ObjectType,
    pub object_id: String,
    pub org_id: String,
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_allows_everything() {
        for object in [ObjectType::Org, ObjectType::Project, ObjectType::Group] {
            for action in [
                Action::View,
                Action::Create,
                Action::Update,
                Action::Delete,
                Action::ManageMembers,
            ] {
                assert!(Role::Owner.allows(action, object));
            }
        }
    }

    #[test]
    fn test_admin_cannot_delete_org() {
        assert!(!Role::Admin.allows(Action::Delete, ObjectType::Org));
        assert!(Role::Admin.allows(Action::Delete, ObjectType::Project));
        assert!(Role::Admin.allows(Action::Delete, ObjectType::Group));
        assert!(Role::Admin.allows(Action::ManageMembers, ObjectType::Org));
        assert!(Role::Admin.allows(Action::Update, ObjectType::Project));
    }

    #[test]
    fn test_member_view_and_create_only() {
        for object in [ObjectType::Org, ObjectType::Project, ObjectType::Group] {
            assert!(Role::Member.allows(Action::View, object));
            assert!(Role::Member.allows(Action::Create, object));
            assert!(!Role::Member.allows(Action::Update, object));
            assert!(!Role::Member.allows(Action::Delete, object));
            assert!(!Role::Member.allows(Action::ManageMembers, object));
        }
    }

    #[test]
    fn test_viewer_view_only() {
        for object in [ObjectType::Org, ObjectType::Project, ObjectType::Group] {
            assert!(Role::Viewer.allows(Action::View, object));
            assert!(!Role::Viewer.allows(Action::Create, object));
            assert!(!Role::Viewer.allows(Action::Update, object));
            assert!(!Role::Viewer.allows(Action::Delete, object));
            assert!(!Role::Viewer.allows(Action::ManageMembers, object));
        }
    }

    #[test]
    fn test_project_role_inheritance() {
        assert_eq!(project_role_from_org(Role::Owner), Role::Admin);
        assert_eq!(project_role_from_org(Role::Admin), Role::Admin);
        assert_eq!(project_role_from_org(Role::Member), Role::Member);
        assert_eq!(project_role_from_org(Role::Viewer), Role::Viewer);
    }

    #[test]
    fn test_role_parse_roundtrip() {
        for role in [Role::Owner, Role::Admin, Role::Member, Role::Viewer] {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
        assert!("root".parse::<Role>().is_err());
    }
}
