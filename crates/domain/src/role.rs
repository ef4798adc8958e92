use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use rolegate_core::{AppError, RoleId};
use serde::{Deserialize, Serialize};

use crate::PermissionCode;

/// Scope at which a role can be granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleScope {
    /// Platform-wide grants, always in effect.
    System,
    /// Tenant-level grants layered on top of system grants.
    Custom,
    /// Grants valid only within a specific project context.
    Project,
}

impl RoleScope {
    /// Returns a stable storage value for this scope.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Custom => "custom",
            Self::Project => "project",
        }
    }

    /// Returns all known scopes.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[RoleScope] = &[RoleScope::System, RoleScope::Custom, RoleScope::Project];

        ALL
    }

    /// Returns the resolution precedence rank (`project` > `custom` > `system`).
    #[must_use]
    pub fn precedence(&self) -> u8 {
        match self {
            Self::System => 0,
            Self::Custom => 1,
            Self::Project => 2,
        }
    }
}

impl FromStr for RoleScope {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "system" => Ok(Self::System),
            "custom" => Ok(Self::Custom),
            "project" => Ok(Self::Project),
            _ => Err(AppError::Validation(format!(
                "unknown role scope '{value}', expected one of: system, custom, project"
            ))),
        }
    }
}

impl Display for RoleScope {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.as_str())
    }
}

/// Named, reusable bundle of permissions granted at one scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Stable role identifier.
    pub id: RoleId,
    /// Role name, unique per scope.
    pub name: String,
    /// Scope the role can be assigned at.
    pub scope: RoleScope,
    /// Marks the role as claiming provenance over codes granted by lower layers.
    pub allow_override: bool,
    /// Optional administrator-facing description.
    pub description: Option<String>,
    /// Effective permission grants attached to the role.
    pub permissions: BTreeSet<PermissionCode>,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::RoleScope;

    #[test]
    fn scope_round_trips_through_storage_value() {
        for scope in RoleScope::all() {
            let parsed = RoleScope::from_str(scope.as_str());
            assert_eq!(parsed.ok(), Some(*scope));
        }
    }

    #[test]
    fn scope_rejects_unknown_value() {
        assert!(RoleScope::from_str("tenant").is_err());
    }

    #[test]
    fn project_scope_has_highest_precedence() {
        assert!(RoleScope::Project.precedence() > RoleScope::Custom.precedence());
        assert!(RoleScope::Custom.precedence() > RoleScope::System.precedence());
    }
}
