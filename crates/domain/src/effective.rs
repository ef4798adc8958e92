use std::collections::{BTreeMap, BTreeSet};

use crate::{PermissionCode, Role, RoleScope};

/// Effective permission set for one `(user, project?)` pair.
///
/// Derived on demand, never persisted or cached by the engine. Grants are
/// monotonic: folding in another role can only add codes, never remove one.
/// Alongside the set itself, each code carries the scope credited with the
/// grant so administrators can see which layer is responsible for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectivePermissions {
    grants: BTreeMap<PermissionCode, RoleScope>,
}

impl EffectivePermissions {
    /// Creates an empty permission set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one role's grants into the set.
    ///
    /// A code not yet present is inserted with the role's scope as its
    /// provenance. A code already granted by a lower-precedence layer keeps
    /// its existing provenance unless the contributing role carries
    /// `allow_override`, in which case the marker moves to the higher scope.
    /// The code set itself only ever grows.
    pub fn apply_role(&mut self, role: &Role) {
        for code in &role.permissions {
            match self.grants.get(code) {
                None => {
                    self.grants.insert(code.clone(), role.scope);
                }
                Some(existing) => {
                    if role.allow_override && role.scope.precedence() > existing.precedence() {
                        self.grants.insert(code.clone(), role.scope);
                    }
                }
            }
        }
    }

    /// Returns whether the set grants the given code.
    #[must_use]
    pub fn contains(&self, code: &PermissionCode) -> bool {
        self.grants.contains_key(code)
    }

    /// Returns the scope credited with granting the code, if granted.
    #[must_use]
    pub fn provenance(&self, code: &PermissionCode) -> Option<RoleScope> {
        self.grants.get(code).copied()
    }

    /// Returns the granted codes as an ordered set.
    #[must_use]
    pub fn codes(&self) -> BTreeSet<PermissionCode> {
        self.grants.keys().cloned().collect()
    }

    /// Iterates over granted codes and their crediting scope.
    pub fn iter(&self) -> impl Iterator<Item = (&PermissionCode, RoleScope)> {
        self.grants.iter().map(|(code, scope)| (code, *scope))
    }

    /// Returns the number of granted codes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.grants.len()
    }

    /// Returns whether no code is granted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}
