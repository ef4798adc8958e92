use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use rolegate_core::{AppError, AppResult, NonEmptyString, ProjectId, RoleId, UserId};
use rolegate_domain::{
    CustomRoleAssignment, PermissionCode, ProjectRoleAssignment, RbacEvent, Role, RoleScope,
    SystemRoleAssignment,
};
use tokio::sync::Mutex;

use super::RbacManager;
use crate::rbac_ports::{
    AssignmentRepository, EventPublisher, NewRole, RoleListQuery, RoleRepository, SyncOutcome,
    UpdateRole,
};

#[derive(Default)]
struct FakeRoleRepository {
    roles: Mutex<HashMap<RoleId, Role>>,
    catalog: BTreeSet<PermissionCode>,
    in_use: Mutex<HashSet<RoleId>>,
}

#[async_trait]
impl RoleRepository for FakeRoleRepository {
    async fn create_role(&self, role: Role) -> AppResult<Role> {
        let mut roles = self.roles.lock().await;

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
        Ok(self.roles.lock().await.get(&role_id).cloned())
    }

    async fn update_role(&self, role: &Role) -> AppResult<()> {
        let mut roles = self.roles.lock().await;

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
        let roles = self.roles.lock().await;

        let mut values: Vec<Role> = roles
            .values()
            .filter(|role| query.scope.is_none_or(|scope| role.scope == scope))
            .cloned()
            .collect();
        values.sort_by(|left, right| left.name.cmp(&right.name));

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
        let unknown: Vec<String> = codes
            .iter()
            .filter(|code| !self.catalog.contains(*code))
            .map(|code| code.as_str().to_owned())
            .collect();

        if !unknown.is_empty() {
            return Err(AppError::UnknownPermissions(unknown));
        }

        let mut roles = self.roles.lock().await;
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
        if self.in_use.lock().await.contains(&role_id) {
            return Err(AppError::RoleInUse {
                role_id: role_id.to_string(),
                assignment_count: 1,
            });
        }

        self.roles
            .lock()
            .await
            .remove(&role_id)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))
    }

    async fn list_permission_codes(&self) -> AppResult<BTreeSet<PermissionCode>> {
        Ok(self.catalog.clone())
    }
}

#[derive(Default)]
struct FakeAssignmentRepository {
    system: Mutex<HashSet<(UserId, RoleId)>>,
    custom: Mutex<HashSet<(UserId, RoleId)>>,
    project: Mutex<HashSet<(UserId, RoleId, ProjectId)>>,
}

#[async_trait]
impl AssignmentRepository for FakeAssignmentRepository {
    async fn insert_system_assignment(
        &self,
        assignment: SystemRoleAssignment,
    ) -> AppResult<bool> {
        Ok(self
            .system
            .lock()
            .await
            .insert((assignment.user_id, assignment.role_id)))
    }

    async fn insert_custom_assignment(
        &self,
        assignment: CustomRoleAssignment,
    ) -> AppResult<bool> {
        Ok(self
            .custom
            .lock()
            .await
            .insert((assignment.user_id, assignment.role_id)))
    }

    async fn insert_project_assignment(
        &self,
        assignment: ProjectRoleAssignment,
    ) -> AppResult<bool> {
        Ok(self.project.lock().await.insert((
            assignment.user_id,
            assignment.role_id,
            assignment.project_id,
        )))
    }

    async fn remove_system_assignment(
        &self,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<bool> {
        Ok(self.system.lock().await.remove(&(user_id, role_id)))
    }

    async fn remove_custom_assignment(
        &self,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<bool> {
        Ok(self.custom.lock().await.remove(&(user_id, role_id)))
    }

    async fn remove_project_assignment(
        &self,
        user_id: UserId,
        role_id: RoleId,
        project_id: ProjectId,
    ) -> AppResult<bool> {
        Ok(self
            .project
            .lock()
            .await
            .remove(&(user_id, role_id, project_id)))
    }

    async fn list_system_roles_for_user(&self, _user_id: UserId) -> AppResult<Vec<Role>> {
        Ok(Vec::new())
    }

    async fn list_custom_roles_for_user(&self, _user_id: UserId) -> AppResult<Vec<Role>> {
        Ok(Vec::new())
    }

    async fn list_project_roles_for_user(
        &self,
        _user_id: UserId,
        _project_id: ProjectId,
    ) -> AppResult<Vec<Role>> {
        Ok(Vec::new())
    }
}

#[derive(Default)]
struct RecordingEventPublisher {
    events: Mutex<Vec<RbacEvent>>,
}

#[async_trait]
impl EventPublisher for RecordingEventPublisher {
    async fn publish(&self, event: RbacEvent) -> AppResult<()> {
        self.events.lock().await.push(event);
        Ok(())
    }
}

impl RecordingEventPublisher {
    async fn event_names(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .await
            .iter()
            .map(RbacEvent::name)
            .collect()
    }
}

struct Harness {
    manager: RbacManager,
    roles: Arc<FakeRoleRepository>,
    publisher: Arc<RecordingEventPublisher>,
}

fn harness_with_catalog(codes: &[&str]) -> AppResult<Harness> {
    let catalog = codes
        .iter()
        .map(|code| PermissionCode::new(*code))
        .collect::<AppResult<BTreeSet<_>>>()?;

    let roles = Arc::new(FakeRoleRepository {
        catalog,
        ..FakeRoleRepository::default()
    });
    let publisher = Arc::new(RecordingEventPublisher::default());
    let manager = RbacManager::new(
        roles.clone(),
        Arc::new(FakeAssignmentRepository::default()),
        publisher.clone(),
    );

    Ok(Harness {
        manager,
        roles,
        publisher,
    })
}

fn new_role(name: &str, scope: RoleScope) -> AppResult<NewRole> {
    Ok(NewRole {
        name: NonEmptyString::new(name)?,
        scope,
        allow_override: false,
        description: None,
    })
}

#[tokio::test]
async fn create_role_emits_single_event() -> AppResult<()> {
    let harness = harness_with_catalog(&[])?;
    let actor = UserId::new();

    let role = harness
        .manager
        .create_role(actor, new_role("billing-admin", RoleScope::Custom)?)
        .await?;

    assert!(role.permissions.is_empty());
    assert_eq!(
        harness.publisher.event_names().await,
        vec!["rbac.role.created"]
    );
    Ok(())
}

#[tokio::test]
async fn duplicate_name_in_same_scope_is_rejected() -> AppResult<()> {
    let harness = harness_with_catalog(&[])?;
    let actor = UserId::new();

    harness
        .manager
        .create_role(actor, new_role("ops", RoleScope::Custom)?)
        .await?;
    let result = harness
        .manager
        .create_role(actor, new_role("ops", RoleScope::Custom)?)
        .await;

    assert!(matches!(result, Err(AppError::DuplicateRole { .. })));
    assert_eq!(harness.publisher.events.lock().await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn same_name_is_allowed_in_different_scopes() -> AppResult<()> {
    let harness = harness_with_catalog(&[])?;
    let actor = UserId::new();

    harness
        .manager
        .create_role(actor, new_role("ops", RoleScope::System)?)
        .await?;
    let result = harness
        .manager
        .create_role(actor, new_role("ops", RoleScope::Custom)?)
        .await;

    assert!(result.is_ok());
    Ok(())
}

#[tokio::test]
async fn assign_rejects_scope_mismatch_without_event() -> AppResult<()> {
    let harness = harness_with_catalog(&[])?;
    let actor = UserId::new();

    let custom_role = harness
        .manager
        .create_role(actor, new_role("billing-admin", RoleScope::Custom)?)
        .await?;

    let result = harness
        .manager
        .assign_system_role(actor, UserId::new(), custom_role.id)
        .await;

    assert!(matches!(
        result,
        Err(AppError::ScopeMismatch { ref expected, ref actual })
            if expected == "system" && actual == "custom"
    ));
    assert_eq!(
        harness.publisher.event_names().await,
        vec!["rbac.role.created"]
    );
    Ok(())
}

#[tokio::test]
async fn assign_twice_is_noop_with_single_event() -> AppResult<()> {
    let harness = harness_with_catalog(&[])?;
    let actor = UserId::new();
    let user_id = UserId::new();

    let role = harness
        .manager
        .create_role(actor, new_role("operator", RoleScope::System)?)
        .await?;

    harness
        .manager
        .assign_system_role(actor, user_id, role.id)
        .await?;
    harness
        .manager
        .assign_system_role(actor, user_id, role.id)
        .await?;

    assert_eq!(
        harness.publisher.event_names().await,
        vec!["rbac.role.created", "rbac.assignment.created"]
    );
    Ok(())
}

#[tokio::test]
async fn unassign_missing_assignment_is_noop() -> AppResult<()> {
    let harness = harness_with_catalog(&[])?;
    let actor = UserId::new();

    harness
        .manager
        .unassign_custom_role(actor, UserId::new(), RoleId::new())
        .await?;

    assert!(harness.publisher.events.lock().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn assign_unknown_role_fails_not_found() -> AppResult<()> {
    let harness = harness_with_catalog(&[])?;

    let result = harness
        .manager
        .assign_custom_role(UserId::new(), UserId::new(), RoleId::new())
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn sync_lists_every_unknown_code_and_applies_nothing() -> AppResult<()> {
    let harness = harness_with_catalog(&["invoice.view"])?;
    let actor = UserId::new();

    let role = harness
        .manager
        .create_role(actor, new_role("billing-admin", RoleScope::Custom)?)
        .await?;

    let requested = [
        PermissionCode::new("invoice.view")?,
        PermissionCode::new("invoice.edit")?,
        PermissionCode::new("task.delete")?,
    ]
    .into_iter()
    .collect();

    let result = harness
        .manager
        .sync_role_permissions(actor, role.id, requested)
        .await;

    match result {
        Err(AppError::UnknownPermissions(codes)) => {
            assert_eq!(codes, vec!["invoice.edit", "task.delete"]);
        }
        other => panic!("expected UnknownPermissions, got {other:?}"),
    }

    let stored = harness.manager.get_role(role.id).await?;
    assert!(stored.permissions.is_empty());
    assert_eq!(
        harness.publisher.event_names().await,
        vec!["rbac.role.created"]
    );
    Ok(())
}

#[tokio::test]
async fn sync_replaces_full_set_and_reports_before_after() -> AppResult<()> {
    let harness = harness_with_catalog(&["invoice.view", "invoice.edit"])?;
    let actor = UserId::new();

    let role = harness
        .manager
        .create_role(actor, new_role("billing-admin", RoleScope::Custom)?)
        .await?;

    let full: BTreeSet<PermissionCode> = [
        PermissionCode::new("invoice.view")?,
        PermissionCode::new("invoice.edit")?,
    ]
    .into_iter()
    .collect();
    harness
        .manager
        .sync_role_permissions(actor, role.id, full.clone())
        .await?;

    let reduced: BTreeSet<PermissionCode> =
        [PermissionCode::new("invoice.view")?].into_iter().collect();
    let updated = harness
        .manager
        .sync_role_permissions(actor, role.id, reduced.clone())
        .await?;

    assert_eq!(updated.permissions, reduced);

    let events = harness.publisher.events.lock().await;
    match events.last() {
        Some(RbacEvent::RolePermissionsSynced { before, after, .. }) => {
            assert_eq!(before, &full);
            assert_eq!(after, &reduced);
        }
        other => panic!("expected RolePermissionsSynced, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn delete_role_blocked_while_assigned() -> AppResult<()> {
    let harness = harness_with_catalog(&[])?;
    let actor = UserId::new();

    let role = harness
        .manager
        .create_role(actor, new_role("billing-admin", RoleScope::Custom)?)
        .await?;
    harness.roles.in_use.lock().await.insert(role.id);

    let result = harness.manager.delete_role(actor, role.id).await;
    assert!(matches!(result, Err(AppError::RoleInUse { .. })));

    harness.roles.in_use.lock().await.remove(&role.id);
    harness.manager.delete_role(actor, role.id).await?;

    assert_eq!(
        harness.publisher.event_names().await,
        vec!["rbac.role.created", "rbac.role.deleted"]
    );
    Ok(())
}

#[tokio::test]
async fn update_role_reports_before_and_after_state() -> AppResult<()> {
    let harness = harness_with_catalog(&[])?;
    let actor = UserId::new();

    let role = harness
        .manager
        .create_role(actor, new_role("billing-admin", RoleScope::Custom)?)
        .await?;

    let updated = harness
        .manager
        .update_role(
            actor,
            role.id,
            UpdateRole {
                name: None,
                allow_override: Some(true),
                description: Some("billing administrators".to_owned()),
            },
        )
        .await?;

    assert!(updated.allow_override);

    let events = harness.publisher.events.lock().await;
    match events.last() {
        Some(RbacEvent::RoleUpdated { before, after, .. }) => {
            assert!(!before.allow_override);
            assert!(after.allow_override);
        }
        other => panic!("expected RoleUpdated, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn update_with_absent_description_keeps_existing_one() -> AppResult<()> {
    let harness = harness_with_catalog(&[])?;
    let actor = UserId::new();

    let role = harness
        .manager
        .create_role(actor, new_role("billing-admin", RoleScope::Custom)?)
        .await?;
    harness
        .manager
        .update_role(
            actor,
            role.id,
            UpdateRole {
                description: Some("billing administrators".to_owned()),
                ..UpdateRole::default()
            },
        )
        .await?;

    let updated = harness
        .manager
        .update_role(
            actor,
            role.id,
            UpdateRole {
                allow_override: Some(true),
                ..UpdateRole::default()
            },
        )
        .await?;

    assert_eq!(
        updated.description.as_deref(),
        Some("billing administrators")
    );
    Ok(())
}

#[tokio::test]
async fn update_without_changes_emits_nothing() -> AppResult<()> {
    let harness = harness_with_catalog(&[])?;
    let actor = UserId::new();

    let role = harness
        .manager
        .create_role(actor, new_role("billing-admin", RoleScope::Custom)?)
        .await?;

    harness
        .manager
        .update_role(actor, role.id, UpdateRole::default())
        .await?;

    assert_eq!(
        harness.publisher.event_names().await,
        vec!["rbac.role.created"]
    );
    Ok(())
}
