use chrono::{DateTime, Utc};
use rolegate_core::{ProjectId, RoleId, UserId};
use serde::{Deserialize, Serialize};

/// Binding of a user to a system-scope role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemRoleAssignment {
    /// User holding the role.
    pub user_id: UserId,
    /// Assigned role.
    pub role_id: RoleId,
    /// Administrator who created the assignment.
    pub assigned_by: UserId,
    /// Creation timestamp.
    pub assigned_at: DateTime<Utc>,
}

/// Binding of a user to a custom-scope (tenant-level) role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomRoleAssignment {
    /// User holding the role.
    pub user_id: UserId,
    /// Assigned role.
    pub role_id: RoleId,
    /// Administrator who created the assignment.
    pub assigned_by: UserId,
    /// Creation timestamp.
    pub assigned_at: DateTime<Utc>,
}

/// Binding of a user to a project-scope role within one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRoleAssignment {
    /// User holding the role.
    pub user_id: UserId,
    /// Assigned role.
    pub role_id: RoleId,
    /// Project the assignment is valid in.
    pub project_id: ProjectId,
    /// Administrator who created the assignment.
    pub assigned_by: UserId,
    /// Creation timestamp.
    pub assigned_at: DateTime<Utc>,
}
