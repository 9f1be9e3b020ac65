//! User-directory lookup used by the SSO resolver.
use async_trait::async_trait;
use thiserror::Error;

use crate::repos::error::RepoError;

pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Directory-layer errors.
///
/// Kept apart from `ResolutionError`: the resolver decides how a failed lookup
/// affects the login (it aborts it).
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("directory backend error: {0}")]
    Backend(#[from] RepoError),
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

/// Account state the directory already holds for a user.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub user_id: String,
    pub user_role: Option<String>,
    pub max_budget: Option<f64>,
    pub budget_duration: Option<String>,
    pub models: Vec<String>,
}

impl UserRecord {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            user_role: None,
            max_budget: None,
            budget_duration: None,
            models: Vec::new(),
        }
    }
}

/// Read-only lookup keyed by the IdP's external id.
///
/// Implementations must be shareable across concurrent logins. Retries and
/// timeouts belong to the implementation, not the caller.
#[async_trait]
pub trait UserDirectory: Send + Sync + 'static {
    // Backend name (for logging).
    fn backend_name(&self) -> &'static str;

    // Returns:
    // - Ok(Some(_)) => user exists
    // - Ok(None)    => not found
    // - Err(_)      => transport/backend failure
    async fn get_user(&self, external_id: &str) -> DirectoryResult<Option<UserRecord>>;
}
