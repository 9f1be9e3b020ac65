//! Post-authentication hook: IdP claims -> internal authorization decision.
//!
//! `RoleResolver::resolve` is the only error boundary. Everything below it returns a
//! detailed `ResolveFault`; the boundary logs the fault and hands the caller an
//! opaque `ResolutionError::InternalFailure`.
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, warn};

use crate::services::directory::{DirectoryError, UserDirectory, UserRecord};
use crate::services::sso::{
    budget::BudgetPeriod,
    claims_path::{self, ClaimPath, ClaimPathError},
    role::InternalRole,
    role_mapping::RoleMappingTable,
    types::{AuthorizationDecision, IdentityClaims},
};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("missing identity id")]
    MissingIdentityId,
    #[error("authentication failed")]
    InternalFailure,
}

#[derive(Debug, Error)]
enum ResolveFault {
    #[error("malformed claims: {0}")]
    MalformedClaims(#[from] ClaimPathError),
    #[error("user lookup failed: {0}")]
    Directory(#[from] DirectoryError),
}

/// Static policy loaded once at startup.
#[derive(Debug, Clone)]
pub struct ResolutionPolicy {
    pub role_mapping: RoleMappingTable,
    pub default_role: InternalRole,
    pub default_max_budget: f64,
    pub default_budget_period: BudgetPeriod,
    pub claims_role_path: ClaimPath,
    // Keep the stored per-user budget/models of an existing user.
    pub preserve_user_overrides: bool,
}

impl ResolutionPolicy {
    /// Keycloak realm roles, `viewer` fallback, budget 10 per `1d`.
    pub fn keycloak_default() -> Self {
        Self {
            role_mapping: RoleMappingTable::keycloak_default(),
            default_role: InternalRole::Viewer,
            default_max_budget: 10.0,
            default_budget_period: BudgetPeriod::default(),
            claims_role_path: ClaimPath::keycloak_realm_roles(),
            preserve_user_overrides: true,
        }
    }
}

#[derive(Clone)]
pub struct RoleResolver {
    policy: Arc<ResolutionPolicy>,
    directory: Arc<dyn UserDirectory>,
}

impl std::fmt::Debug for RoleResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleResolver")
            .field("policy", &self.policy)
            .field("directory", &self.directory.backend_name())
            .finish()
    }
}

impl RoleResolver {
    pub fn new(policy: ResolutionPolicy, directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            policy: Arc::new(policy),
            directory,
        }
    }

    /// Resolve a verified identity into an authorization decision.
    ///
    /// Fails with `MissingIdentityId` when the external id is absent or blank, and with
    /// `InternalFailure` for anything else that goes wrong. No partial decision is ever
    /// returned. Dropping the future abandons the directory lookup.
    pub async fn resolve(
        &self,
        claims: IdentityClaims,
    ) -> Result<AuthorizationDecision, ResolutionError> {
        let Some(external_id) = claims.external_id().map(str::to_string) else {
            warn!("sso identity has no external id");
            return Err(ResolutionError::MissingIdentityId);
        };

        self.decide(external_id.clone(), claims)
            .await
            .map_err(|fault| {
                error!(
                    external_id = %external_id,
                    directory = self.directory.backend_name(),
                    error = %fault,
                    "sso role resolution failed"
                );
                ResolutionError::InternalFailure
            })
    }

    async fn decide(
        &self,
        user_id: String,
        claims: IdentityClaims,
    ) -> Result<AuthorizationDecision, ResolveFault> {
        let policy = &*self.policy;

        let idp_roles = claims_path::extract_roles(&claims.claims, &policy.claims_role_path)?;
        let role = match policy.role_mapping.first_match(idp_roles.iter().copied()) {
            Some((idp_role, role)) => {
                debug!(external_id = %user_id, idp_role, %role, "idp role mapped");
                role
            }
            None => {
                debug!(
                    external_id = %user_id,
                    idp_roles = idp_roles.len(),
                    role = %policy.default_role,
                    "no mapped idp role; using default"
                );
                policy.default_role
            }
        };

        let existing = self.directory.get_user(&user_id).await?;

        let mut decision = AuthorizationDecision {
            user_id,
            email: claims.email,
            role,
            allowed_models: Vec::new(),
            max_budget: policy.default_max_budget,
            budget_period: policy.default_budget_period.clone(),
            existing_user: existing.is_some(),
        };

        if let Some(record) = existing
            && policy.preserve_user_overrides
        {
            apply_user_overrides(&mut decision, record);
        }

        Ok(decision)
    }
}

// Role is never taken from the record: the IdP stays authoritative for it.
fn apply_user_overrides(decision: &mut AuthorizationDecision, record: UserRecord) {
    if let Some(stored) = record.user_role.as_deref()
        && stored != decision.role.as_str()
    {
        debug!(
            external_id = %decision.user_id,
            stored_role = stored,
            role = %decision.role,
            "stored role superseded by idp role"
        );
    }

    if !record.models.is_empty() {
        decision.allowed_models = record.models;
    }

    if let Some(budget) = record.max_budget {
        if budget.is_finite() && budget >= 0.0 {
            decision.max_budget = budget;
        } else {
            warn!(external_id = %decision.user_id, budget, "ignoring stored max_budget");
        }
    }

    if let Some(raw) = record.budget_duration.as_deref() {
        match raw.parse::<BudgetPeriod>() {
            Ok(period) => decision.budget_period = period,
            Err(e) => warn!(
                external_id = %decision.user_id,
                budget_duration = raw,
                error = %e,
                "ignoring stored budget_duration"
            ),
        }
    }
}
