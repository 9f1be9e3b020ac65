/*
 * Responsibility
 * - Request/response DTOs of the SSO post-auth hook
 * - Wire names follow the console's user table (user_email, user_role, models, ...)
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::services::sso::{AuthorizationDecision, IdentityClaims, InternalRole};

/// Verified identity posted by the OIDC client after the IdP redirect.
#[derive(Debug, Deserialize)]
pub struct IdentityRecordRequest {
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub claims: Value,
}

impl From<IdentityRecordRequest> for IdentityClaims {
    fn from(req: IdentityRecordRequest) -> Self {
        Self {
            external_id: req.external_id,
            email: req.email,
            claims: req.claims,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DecisionResponse {
    pub user_id: String,
    pub user_email: Option<String>,
    pub user_role: InternalRole,
    pub models: Vec<String>,
    pub max_budget: f64,
    pub budget_duration: String,
    /// When a budget started now would reset. Absent if it overflows the calendar.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_reset_at: Option<DateTime<Utc>>,
    pub existing_user: bool,
}

impl DecisionResponse {
    pub fn from_decision(decision: AuthorizationDecision, now: DateTime<Utc>) -> Self {
        let budget_reset_at = decision.budget_period.next_reset(now);
        Self {
            user_id: decision.user_id,
            user_email: decision.email,
            user_role: decision.role,
            models: decision.allowed_models,
            max_budget: decision.max_budget,
            budget_duration: decision.budget_period.into(),
            budget_reset_at,
            existing_user: decision.existing_user,
        }
    }
}
