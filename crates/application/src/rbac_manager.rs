use std::sync::Arc;

use rolegate_core::{AppError, AppResult, RoleId};
use rolegate_domain::{Role, RoleScope};

use crate::rbac_ports::{AssignmentRepository, EventPublisher, RoleRepository};

mod assignments;
mod roles;

#[cfg(test)]
mod tests;

/// Orchestration and mutation surface of the RBAC engine.
///
/// The only path through which role and assignment state changes. Every
/// write is validated before it reaches storage, and every committed state
/// change emits exactly one domain event through the injected publisher
/// before the operation returns.
#[derive(Clone)]
pub struct RbacManager {
    roles: Arc<dyn RoleRepository>,
    assignments: Arc<dyn AssignmentRepository>,
    publisher: Arc<dyn EventPublisher>,
}

impl RbacManager {
    /// Creates a manager from repository and publisher implementations.
    #[must_use]
    pub fn new(
        roles: Arc<dyn RoleRepository>,
        assignments: Arc<dyn AssignmentRepository>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            roles,
            assignments,
            publisher,
        }
    }

    /// Loads a role and checks it carries the scope the operation implies.
    async fn require_role_with_scope(
        &self,
        role_id: RoleId,
        expected: RoleScope,
    ) -> AppResult<Role> {
        let role = self
            .roles
            .find_role(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))?;

        if role.scope != expected {
            return Err(AppError::ScopeMismatch {
                expected: expected.as_str().to_owned(),
                actual: role.scope.as_str().to_owned(),
            });
        }

        Ok(role)
    }
}
