use std::collections::BTreeSet;

use rolegate_core::AppResult;
use rolegate_domain::PermissionCode;

pub mod assignments;
pub mod health;
pub mod permissions;
pub mod resolution;
pub mod roles;

fn parse_permission_codes(values: &[String]) -> AppResult<BTreeSet<PermissionCode>> {
    values
        .iter()
        .map(|value| PermissionCode::new(value.as_str()))
        .collect()
}
