/*
 * Responsibility
 * - Load settings from the environment (.env honored)
 * - Validate them up front (startup fails on anything missing or malformed)
 * - Build the immutable SSO resolution policy
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::services::sso::{
    BudgetPeriod, ClaimPath, InternalRole, ResolutionPolicy, RoleMappingTable,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<&str>) -> Self {
        match raw
            .unwrap_or("development")
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
    InvalidValue { key: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
            ConfigError::InvalidValue { key, reason } => {
                write!(f, "invalid configuration: {}: {}", key, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    // None => in-memory directory (development only)
    pub database_url: Option<String>,
    pub database_max_connections: u32,

    pub request_timeout_seconds: u64,

    pub policy: ResolutionPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `var` instead of the process environment.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port: u16 = match var("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(var("APP_ENV").as_deref());

        let database_url = var("DATABASE_URL").filter(|s| !s.trim().is_empty());
        if database_url.is_none() && app_env.is_production() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let database_max_connections = var("DATABASE_MAX_CONNECTIONS")
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(5);

        let request_timeout_seconds = var("REQUEST_TIMEOUT_SECONDS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(30);

        let policy = policy_from_lookup(&var)?;

        Ok(Self {
            addr,
            app_env,
            database_url,
            database_max_connections,
            request_timeout_seconds,
            policy,
        })
    }
}

/// Build the resolution policy from `SSO_*` variables; unset ones fall back to the Keycloak defaults.
pub fn policy_from_lookup(
    var: &impl Fn(&str) -> Option<String>,
) -> Result<ResolutionPolicy, ConfigError> {
    let mut policy = ResolutionPolicy::keycloak_default();

    if let Some(raw) = var("SSO_ROLE_MAPPING") {
        policy.role_mapping =
            RoleMappingTable::parse(&raw).map_err(|e| ConfigError::InvalidValue {
                key: "SSO_ROLE_MAPPING",
                reason: e.to_string(),
            })?;
    }
    if policy.role_mapping.is_empty() {
        return Err(ConfigError::InvalidValue {
            key: "SSO_ROLE_MAPPING",
            reason: "no entries".to_string(),
        });
    }

    if let Some(raw) = var("SSO_DEFAULT_ROLE") {
        policy.default_role = raw
            .parse::<InternalRole>()
            .map_err(|e| ConfigError::InvalidValue {
                key: "SSO_DEFAULT_ROLE",
                reason: e.to_string(),
            })?;
    }

    if let Some(raw) = var("SSO_DEFAULT_MAX_BUDGET") {
        let budget = raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|b| b.is_finite() && *b >= 0.0)
            .ok_or(ConfigError::Invalid("SSO_DEFAULT_MAX_BUDGET"))?;
        policy.default_max_budget = budget;
    }

    if let Some(raw) = var("SSO_DEFAULT_BUDGET_PERIOD") {
        policy.default_budget_period = raw
            .parse::<BudgetPeriod>()
            .map_err(|e| ConfigError::InvalidValue {
                key: "SSO_DEFAULT_BUDGET_PERIOD",
                reason: e.to_string(),
            })?;
    }

    if let Some(raw) = var("SSO_CLAIMS_ROLE_PATH") {
        policy.claims_role_path = raw
            .parse::<ClaimPath>()
            .map_err(|e| ConfigError::InvalidValue {
                key: "SSO_CLAIMS_ROLE_PATH",
                reason: e.to_string(),
            })?;
    }

    if let Some(raw) = var("SSO_PRESERVE_USER_OVERRIDES") {
        policy.preserve_user_overrides =
            parse_bool(&raw).ok_or(ConfigError::Invalid("SSO_PRESERVE_USER_OVERRIDES"))?;
    }

    Ok(policy)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_without_any_variables() {
        let config = Config::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.app_env, AppEnv::Development);
        assert_eq!(config.database_url, None);
        assert_eq!(config.request_timeout_seconds, 30);

        let policy = &config.policy;
        assert_eq!(policy.default_role, InternalRole::Viewer);
        assert_eq!(policy.default_max_budget, 10.0);
        assert_eq!(policy.default_budget_period.as_str(), "1d");
        assert_eq!(policy.claims_role_path.as_str(), "realm_access.roles");
        assert_eq!(policy.role_mapping.get("org-admin"), Some(InternalRole::OrgAdmin));
        assert!(policy.preserve_user_overrides);
    }

    #[test]
    fn production_requires_a_database() {
        let err = Config::from_lookup(lookup(&[("APP_ENV", "prod")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DATABASE_URL"));

        let config = Config::from_lookup(lookup(&[
            ("APP_ENV", "production"),
            ("DATABASE_URL", "postgres://localhost/console"),
        ]))
        .unwrap();
        assert!(config.app_env.is_production());
    }

    #[test]
    fn reads_policy_overrides() {
        let policy = policy_from_lookup(&lookup(&[
            ("SSO_ROLE_MAPPING", "admins=proxy_admin,staff=internal_user"),
            ("SSO_DEFAULT_ROLE", "internal_user_viewer"),
            ("SSO_DEFAULT_MAX_BUDGET", "42.5"),
            ("SSO_DEFAULT_BUDGET_PERIOD", "1 week"),
            ("SSO_CLAIMS_ROLE_PATH", "/resource_access/console/roles"),
            ("SSO_PRESERVE_USER_OVERRIDES", "off"),
        ]))
        .unwrap();

        assert_eq!(policy.role_mapping.len(), 2);
        assert_eq!(policy.role_mapping.get("org-admin"), None);
        assert_eq!(policy.default_role, InternalRole::InternalUserViewer);
        assert_eq!(policy.default_max_budget, 42.5);
        assert_eq!(policy.default_budget_period.as_str(), "1 week");
        assert_eq!(
            policy.claims_role_path.segments(),
            ["resource_access", "console", "roles"]
        );
        assert!(!policy.preserve_user_overrides);
    }

    #[test]
    fn rejects_invalid_policy_values() {
        let cases = [
            ("SSO_ROLE_MAPPING", "admins=superuser"),
            ("SSO_ROLE_MAPPING", " , "),
            ("SSO_DEFAULT_ROLE", "org-admin"),
            ("SSO_DEFAULT_MAX_BUDGET", "-1"),
            ("SSO_DEFAULT_MAX_BUDGET", "inf"),
            ("SSO_DEFAULT_BUDGET_PERIOD", "daily"),
            ("SSO_DEFAULT_BUDGET_PERIOD", "4000000000mo"),
            ("SSO_CLAIMS_ROLE_PATH", "realm_access..roles"),
            ("SSO_PRESERVE_USER_OVERRIDES", "maybe"),
        ];

        for (key, value) in cases {
            let result = policy_from_lookup(&lookup(&[(key, value)]));
            assert!(result.is_err(), "{key}={value} should be rejected");
        }
    }

    #[test]
    fn rejects_unparsable_port() {
        let err = Config::from_lookup(lookup(&[("PORT", "http")])).unwrap_err();
        assert_eq!(err, ConfigError::Invalid("PORT"));
    }
}
