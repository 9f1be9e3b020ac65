/*
 * Responsibility
 * - Read-only SQLx access to the console's user table
 * - Takes a PgPool; the SSO resolver never writes here
 */
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoResult;

#[derive(Debug, FromRow)]
pub struct UserRow {
    pub user_id: String,
    pub user_role: Option<String>,
    pub max_budget: Option<f64>,
    pub budget_duration: Option<String>,
    pub models: Option<Vec<String>>,
}

pub async fn get(db: &PgPool, user_id: &str) -> RepoResult<Option<UserRow>> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT user_id, user_role, max_budget, budget_duration, models
        FROM "LiteLLM_UserTable"
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}
