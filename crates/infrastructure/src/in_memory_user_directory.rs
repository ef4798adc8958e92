use std::collections::HashSet;

use async_trait::async_trait;
use rolegate_application::UserDirectory;
use rolegate_core::{AppResult, UserId};
use tokio::sync::RwLock;

/// In-memory user directory for tests and local development.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    known: RwLock<HashSet<UserId>>,
}

impl InMemoryUserDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers user ids the directory should resolve.
    pub async fn register_users(&self, users: impl IntoIterator<Item = UserId>) {
        self.known.write().await.extend(users);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn user_exists(&self, user_id: UserId) -> AppResult<bool> {
        Ok(self.known.read().await.contains(&user_id))
    }
}
