use serde::Serialize;
use serde_json::Value;

use crate::services::sso::{budget::BudgetPeriod, role::InternalRole};

/// Verified identity handed over by the OIDC client once the IdP redirect completed.
///
/// `external_id` stays optional here: an absent id is a resolution failure, not a
/// deserialization failure, so the caller gets the same error either way.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityClaims {
    pub external_id: Option<String>,
    pub email: Option<String>,
    pub claims: Value,
}

impl IdentityClaims {
    pub fn new(external_id: impl Into<String>, email: Option<String>, claims: Value) -> Self {
        Self {
            external_id: Some(external_id.into()),
            email,
            claims,
        }
    }

    /// Non-blank external id, if any.
    pub fn external_id(&self) -> Option<&str> {
        self.external_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
    }
}

/// What the session-issuance layer needs to mint a session and upsert the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorizationDecision {
    pub user_id: String,
    pub email: Option<String>,
    pub role: InternalRole,
    /// Empty means "no per-user model override".
    pub allowed_models: Vec<String>,
    pub max_budget: f64,
    pub budget_period: BudgetPeriod,
    /// The directory already holds a record for `user_id`.
    pub existing_user: bool,
}
