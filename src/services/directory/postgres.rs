use async_trait::async_trait;
use sqlx::PgPool;

use crate::repos::user_repo::{self, UserRow};
use crate::services::directory::store::{DirectoryResult, UserDirectory, UserRecord};

/// Directory backed by the console's Postgres user table.
#[derive(Debug, Clone)]
pub struct PgUserDirectory {
    db: PgPool,
}

impl PgUserDirectory {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            user_id: row.user_id,
            user_role: row.user_role,
            max_budget: row.max_budget,
            budget_duration: row.budget_duration,
            models: row.models.unwrap_or_default(),
        }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn get_user(&self, external_id: &str) -> DirectoryResult<Option<UserRecord>> {
        let row = user_repo::get(&self.db, external_id).await?;
        Ok(row.map(UserRecord::from))
    }
}
