//! Domain entities and invariants for the Rolegate RBAC engine.

#![forbid(unsafe_code)]

mod assignment;
mod effective;
mod event;
mod permission;
mod role;

pub use assignment::{CustomRoleAssignment, ProjectRoleAssignment, SystemRoleAssignment};
pub use effective::EffectivePermissions;
pub use event::RbacEvent;
pub use permission::PermissionCode;
pub use role::{Role, RoleScope};
