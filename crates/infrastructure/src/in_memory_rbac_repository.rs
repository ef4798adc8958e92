use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use rolegate_application::{AssignmentRepository, RoleListQuery, RoleRepository, SyncOutcome};
use rolegate_core::{AppError, AppResult, ProjectId, RoleId, UserId};
use rolegate_domain::{
    CustomRoleAssignment, PermissionCode, ProjectRoleAssignment, Role, SystemRoleAssignment,
};
use tokio::sync::RwLock;


/// In-memory implementation of the role and assignment ports.
///
/// Used by tests and local development. Writes take the relevant write
/// locks for their whole duration, so readers observe the same
/// all-or-nothing visibility the postgres adapter provides through
/// transactions. Lock order is always catalog, roles, then the three
/// assignment maps.
#[derive(Debug, Default)]
pub struct InMemoryRbacRepository {
    catalog: RwLock<BTreeSet<PermissionCode>>,
    roles: RwLock<HashMap<RoleId, Role>>,
    system_assignments: RwLock<HashMap<(UserId, RoleId), SystemRoleAssignment>>,
    custom_assignments: RwLock<HashMap<(UserId, RoleId), CustomRoleAssignment>>,
    project_assignments: RwLock<HashMap<(UserId, RoleId, ProjectId), ProjectRoleAssignment>>,
}

impl InMemoryRbacRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the permission catalog, standing in for the migration/seed
    /// step that owns catalog writes in production.
    pub async fn register_permissions(
        &self,
        codes: impl IntoIterator<Item = PermissionCode>,
    ) {
        self.catalog.write().await.extend(codes);
    }
}

#[async_trait]
impl RoleRepository for InMemoryRbacRepository {
    async fn create_role(&self, role: Role) -> AppResult<Role> {
        let mut roles = self.roles.write().await;

        if roles
            .values()
            .any(|existing| existing.name == role.name && existing.scope == role.scope)
        {
            return Err(AppError::DuplicateRole {
                name: role.name,
                scope: role.scope.as_str().to_owned(),
            });
        }

        roles.insert(role.id, role.clone());
        Ok(role)
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.roles.read().await.get(&role_id).cloned())
    }

    async fn update_role(&self, role: &Role) -> AppResult<()> {
        let mut roles = self.roles.write().await;

        if !roles.contains_key(&role.id) {
            return Err(AppError::NotFound(format!(
                "role '{}' was not found",
                role.id
            )));
        }

        if roles.values().any(|existing| {
            existing.id != role.id && existing.name == role.name && existing.scope == role.scope
        }) {
            return Err(AppError::DuplicateRole {
                name: role.name.clone(),
                scope: role.scope.as_str().to_owned(),
            });
        }

        roles.insert(role.id, role.clone());
        Ok(())
    }

    async fn list_roles(&self, query: RoleListQuery) -> AppResult<Vec<Role>> {
        let roles = self.roles.read().await;

        let mut values: Vec<Role> = roles
            .values()
            .filter(|role| query.scope.is_none_or(|scope| role.scope == scope))
            .cloned()
            .collect();
        values.sort_by(|left, right| {
            left.name
                .cmp(&right.name)
                .then_with(|| left.scope.cmp(&right.scope))
        });

        Ok(values
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect())
    }

    async fn sync_role_permissions(
        &self,
        role_id: RoleId,
        codes: BTreeSet<PermissionCode>,
    ) -> AppResult<SyncOutcome> {
        let catalog = self.catalog.read().await;
        let mut roles = self.roles.write().await;

        let unknown: Vec<String> = codes
            .iter()
            .filter(|code| !catalog.contains(*code))
            .map(|code| code.as_str().to_owned())
            .collect();

        if !unknown.is_empty() {
            return Err(AppError::UnknownPermissions(unknown));
        }

        let role = roles
            .get_mut(&role_id)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))?;

        let previous = std::mem::replace(&mut role.permissions, codes);

        Ok(SyncOutcome {
            role: role.clone(),
            previous,
        })
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<Role> {
        // Holding the roles write lock across the reference check and the
        // removal closes the check-then-act race with concurrent assigns.
        let mut roles = self.roles.write().await;
        let system_assignments = self.system_assignments.read().await;
        let custom_assignments = self.custom_assignments.read().await;
        let project_assignments = self.project_assignments.read().await;

        if !roles.contains_key(&role_id) {
            return Err(AppError::NotFound(format!(
                "role '{role_id}' was not found"
            )));
        }

        let assignment_count = system_assignments
            .keys()
            .filter(|(_, stored_role_id)| *stored_role_id == role_id)
            .count()
            + custom_assignments
                .keys()
                .filter(|(_, stored_role_id)| *stored_role_id == role_id)
                .count()
            + project_assignments
                .keys()
                .filter(|(_, stored_role_id, _)| *stored_role_id == role_id)
                .count();

        if assignment_count > 0 {
            return Err(AppError::RoleInUse {
                role_id: role_id.to_string(),
                assignment_count: assignment_count as u64,
            });
        }

        roles
            .remove(&role_id)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))
    }

    async fn list_permission_codes(&self) -> AppResult<BTreeSet<PermissionCode>> {
        Ok(self.catalog.read().await.clone())
    }
}

#[async_trait]
impl AssignmentRepository for InMemoryRbacRepository {
    async fn insert_system_assignment(
        &self,
        assignment: SystemRoleAssignment,
    ) -> AppResult<bool> {
        // The roles read lock is held across the insert; `delete_role` takes
        // the write lock, so a deleted role can never gain an assignment.
        let roles = self.roles.read().await;
        if !roles.contains_key(&assignment.role_id) {
            return Err(AppError::NotFound(format!(
                "role '{}' was not found",
                assignment.role_id
            )));
        }

        let mut assignments = self.system_assignments.write().await;
        let key = (assignment.user_id, assignment.role_id);

        if assignments.contains_key(&key) {
            return Ok(false);
        }

        assignments.insert(key, assignment);
        Ok(true)
    }

    async fn insert_custom_assignment(
        &self,
        assignment: CustomRoleAssignment,
    ) -> AppResult<bool> {
        let roles = self.roles.read().await;
        if !roles.contains_key(&assignment.role_id) {
            return Err(AppError::NotFound(format!(
                "role '{}' was not found",
                assignment.role_id
            )));
        }

        let mut assignments = self.custom_assignments.write().await;
        let key = (assignment.user_id, assignment.role_id);

        if assignments.contains_key(&key) {
            return Ok(false);
        }

        assignments.insert(key, assignment);
        Ok(true)
    }

    async fn insert_project_assignment(
        &self,
        assignment: ProjectRoleAssignment,
    ) -> AppResult<bool> {
        let roles = self.roles.read().await;
        if !roles.contains_key(&assignment.role_id) {
            return Err(AppError::NotFound(format!(
                "role '{}' was not found",
                assignment.role_id
            )));
        }

        let mut assignments = self.project_assignments.write().await;
        let key = (
            assignment.user_id,
            assignment.role_id,
            assignment.project_id,
        );

        if assignments.contains_key(&key) {
            return Ok(false);
        }

        assignments.insert(key, assignment);
        Ok(true)
    }

    async fn remove_system_assignment(
        &self,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<bool> {
        Ok(self
            .system_assignments
            .write()
            .await
            .remove(&(user_id, role_id))
            .is_some())
    }

    async fn remove_custom_assignment(
        &self,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<bool> {
        Ok(self
            .custom_assignments
            .write()
            .await
            .remove(&(user_id, role_id))
            .is_some())
    }

    async fn remove_project_assignment(
        &self,
        user_id: UserId,
        role_id: RoleId,
        project_id: ProjectId,
    ) -> AppResult<bool> {
        Ok(self
            .project_assignments
            .write()
            .await
            .remove(&(user_id, role_id, project_id))
            .is_some())
    }

    async fn list_system_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<Role>> {
        let roles = self.roles.read().await;
        let assignments = self.system_assignments.read().await;

        Ok(assignments
            .keys()
            .filter(|(stored_user_id, _)| *stored_user_id == user_id)
            .filter_map(|(_, role_id)| roles.get(role_id).cloned())
            .collect())
    }

    async fn list_custom_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<Role>> {
        let roles = self.roles.read().await;
        let assignments = self.custom_assignments.read().await;

        Ok(assignments
            .keys()
            .filter(|(stored_user_id, _)| *stored_user_id == user_id)
            .filter_map(|(_, role_id)| roles.get(role_id).cloned())
            .collect())
    }

    async fn list_project_roles_for_user(
        &self,
        user_id: UserId,
        project_id: ProjectId,
    ) -> AppResult<Vec<Role>> {
        let roles = self.roles.read().await;
        let assignments = self.project_assignments.read().await;

        Ok(assignments
            .keys()
            .filter(|(stored_user_id, _, stored_project_id)| {
                *stored_user_id == user_id && *stored_project_id == project_id
            })
            .filter_map(|(_, role_id, _)| roles.get(role_id).cloned())
            .collect())
    }
}
