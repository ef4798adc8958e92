//! Application services and ports for the Rolegate RBAC engine.

#![forbid(unsafe_code)]

mod rbac_manager;
mod rbac_ports;
mod rbac_resolver;

pub use rbac_manager::RbacManager;
pub use rbac_ports::{
    AssignmentRepository, EventPublisher, NewRole, RoleListQuery, RoleRepository, SyncOutcome,
    UpdateRole, UserDirectory,
};
pub use rbac_resolver::RbacResolver;
