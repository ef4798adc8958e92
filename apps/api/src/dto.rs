use std::collections::BTreeMap;

use rolegate_domain::{EffectivePermissions, Role};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Incoming payload for role creation.
#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
    pub scope: String,
    #[serde(default)]
    pub allow_override: bool,
    pub description: Option<String>,
}

/// Incoming payload for role updates. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub name: Option<String>,
    pub allow_override: Option<bool>,
    pub description: Option<String>,
}

/// Incoming payload for an atomic permission replace.
#[derive(Debug, Deserialize)]
pub struct SyncPermissionsRequest {
    pub permission_codes: Vec<String>,
}

/// Incoming payload for role assignment and unassignment.
#[derive(Debug, Deserialize)]
pub struct AssignRoleRequest {
    pub user_id: Uuid,
    pub role_id: Uuid,
    pub project_id: Option<Uuid>,
}

/// Query parameters for role listing.
#[derive(Debug, Deserialize)]
pub struct RoleListParams {
    pub scope: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Query parameters for effective-permission resolution.
#[derive(Debug, Deserialize)]
pub struct ResolveParams {
    pub user_id: Uuid,
    pub project_id: Option<Uuid>,
}

/// API representation of a role definition.
#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub role_id: String,
    pub name: String,
    pub scope: String,
    pub allow_override: bool,
    pub description: Option<String>,
    pub permissions: Vec<String>,
}

impl From<Role> for RoleResponse {
    fn from(role: Role) -> Self {
        Self {
            role_id: role.id.to_string(),
            name: role.name,
            scope: role.scope.as_str().to_owned(),
            allow_override: role.allow_override,
            description: role.description,
            permissions: role.permissions.into_iter().map(String::from).collect(),
        }
    }
}

/// API representation of a resolved effective permission set.
#[derive(Debug, Serialize)]
pub struct EffectivePermissionsResponse {
    pub user_id: String,
    pub project_id: Option<String>,
    pub effective_permissions: Vec<String>,
    pub permission_count: usize,
    pub provenance: BTreeMap<String, String>,
}

impl EffectivePermissionsResponse {
    /// Flattens a resolved set into its transport shape.
    pub fn new(
        user_id: Uuid,
        project_id: Option<Uuid>,
        effective: &EffectivePermissions,
    ) -> Self {
        let provenance = effective
            .iter()
            .map(|(code, scope)| (code.as_str().to_owned(), scope.as_str().to_owned()))
            .collect();

        Self {
            user_id: user_id.to_string(),
            project_id: project_id.map(|id| id.to_string()),
            effective_permissions: effective
                .codes()
                .into_iter()
                .map(String::from)
                .collect(),
            permission_count: effective.len(),
            provenance,
        }
    }
}

/// API representation of the permission catalog.
#[derive(Debug, Serialize)]
pub struct PermissionCatalogResponse {
    pub permission_codes: Vec<String>,
}
