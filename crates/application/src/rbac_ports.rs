use std::collections::BTreeSet;

use async_trait::async_trait;
use rolegate_core::{AppResult, NonEmptyString, ProjectId, RoleId, UserId};
use rolegate_domain::{
    CustomRoleAssignment, PermissionCode, ProjectRoleAssignment, RbacEvent, Role, RoleScope,
    SystemRoleAssignment,
};

/// Input payload for role creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRole {
    /// Role name, unique per scope.
    pub name: NonEmptyString,
    /// Scope the role can be assigned at.
    pub scope: RoleScope,
    /// Whether the role claims provenance over lower-layer grants.
    pub allow_override: bool,
    /// Optional administrator-facing description.
    pub description: Option<String>,
}

/// Input payload for role updates. `None` fields are left unchanged;
/// the scope of an existing role is immutable. An existing description can
/// be replaced but not cleared back to `None` through an update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateRole {
    /// New role name.
    pub name: Option<NonEmptyString>,
    /// New override flag.
    pub allow_override: Option<bool>,
    /// New description.
    pub description: Option<String>,
}

/// Query parameters for role listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleListQuery {
    /// Optional scope filter.
    pub scope: Option<RoleScope>,
    /// Maximum rows returned.
    pub limit: usize,
    /// Number of rows skipped for offset pagination.
    pub offset: usize,
}

/// Result of an atomic permission replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Role with the new permission set applied.
    pub role: Role,
    /// Permission set before the replace.
    pub previous: BTreeSet<PermissionCode>,
}

/// Repository port for role definitions and the permission catalog.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Persists a new role, failing with `DuplicateRole` on a `(name, scope)`
    /// collision.
    async fn create_role(&self, role: Role) -> AppResult<Role>;

    /// Finds a role by id.
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>>;

    /// Persists changed name, description and override flag of an existing
    /// role, failing with `DuplicateRole` if a rename collides.
    async fn update_role(&self, role: &Role) -> AppResult<()>;

    /// Lists roles with optional scope filter and offset pagination.
    async fn list_roles(&self, query: RoleListQuery) -> AppResult<Vec<Role>>;

    /// Replaces the role's entire permission set in one transaction.
    ///
    /// Fails with `UnknownPermissions` listing every code missing from the
    /// catalog; on failure nothing is applied. Concurrent readers observe
    /// either the old or the new full set, never a partial one.
    async fn sync_role_permissions(
        &self,
        role_id: RoleId,
        codes: BTreeSet<PermissionCode>,
    ) -> AppResult<SyncOutcome>;

    /// Deletes a role, failing with `RoleInUse` while any of the three
    /// assignment relations references it. The reference check and the
    /// delete are atomic with respect to concurrent assigns.
    async fn delete_role(&self, role_id: RoleId) -> AppResult<Role>;

    /// Lists every code in the permission catalog.
    async fn list_permission_codes(&self) -> AppResult<BTreeSet<PermissionCode>>;
}

/// Repository port for the three assignment relations.
#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// Inserts a system-scope assignment. Returns `false` when the
    /// assignment already existed (idempotent no-op).
    async fn insert_system_assignment(&self, assignment: SystemRoleAssignment)
    -> AppResult<bool>;

    /// Inserts a custom-scope assignment. Returns `false` when the
    /// assignment already existed (idempotent no-op).
    async fn insert_custom_assignment(&self, assignment: CustomRoleAssignment)
    -> AppResult<bool>;

    /// Inserts a project-scope assignment. Returns `false` when the
    /// assignment already existed (idempotent no-op).
    async fn insert_project_assignment(
        &self,
        assignment: ProjectRoleAssignment,
    ) -> AppResult<bool>;

    /// Removes a system-scope assignment. Returns `false` when no such
    /// assignment existed.
    async fn remove_system_assignment(&self, user_id: UserId, role_id: RoleId)
    -> AppResult<bool>;

    /// Removes a custom-scope assignment. Returns `false` when no such
    /// assignment existed.
    async fn remove_custom_assignment(&self, user_id: UserId, role_id: RoleId)
    -> AppResult<bool>;

    /// Removes a project-scope assignment. Returns `false` when no such
    /// assignment existed.
    async fn remove_project_assignment(
        &self,
        user_id: UserId,
        role_id: RoleId,
        project_id: ProjectId,
    ) -> AppResult<bool>;

    /// Lists system-scope roles (with grants) assigned to a user.
    async fn list_system_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<Role>>;

    /// Lists custom-scope roles (with grants) assigned to a user.
    async fn list_custom_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<Role>>;

    /// Lists project-scope roles (with grants) assigned to a user within one
    /// project.
    async fn list_project_roles_for_user(
        &self,
        user_id: UserId,
        project_id: ProjectId,
    ) -> AppResult<Vec<Role>>;
}

/// Publisher port for domain events.
///
/// Injected into the manager at construction so tests can substitute a
/// recording stub and assert exact event sequences. The manager publishes
/// exactly once, synchronously, after each committed write.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes one domain event.
    async fn publish(&self, event: RbacEvent) -> AppResult<()>;
}

/// Port resolving user identities against the surrounding platform.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Returns whether the platform knows the user id.
    async fn user_exists(&self, user_id: UserId) -> AppResult<bool>;
}
