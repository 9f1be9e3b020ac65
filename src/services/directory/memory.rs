use std::collections::HashMap;

use async_trait::async_trait;

use crate::services::directory::store::{DirectoryResult, UserDirectory, UserRecord};

/// Fixed, process-local directory (development without a database, tests).
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    users: HashMap<String, UserRecord>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, record: UserRecord) -> Self {
        self.users.insert(record.user_id.clone(), record);
        self
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn get_user(&self, external_id: &str) -> DirectoryResult<Option<UserRecord>> {
        Ok(self.users.get(external_id).cloned())
    }
}
