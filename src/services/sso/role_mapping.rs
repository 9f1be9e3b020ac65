use std::collections::HashMap;

use thiserror::Error;

use crate::services::sso::role::{InternalRole, UnknownRole};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoleMappingError {
    #[error("role mapping entry is malformed: {0}")]
    MalformedEntry(String),
    #[error("role mapping is not a JSON object of strings")]
    MalformedJson,
    #[error("idp role '{0}' is mapped twice")]
    Duplicate(String),
    #[error(transparent)]
    UnknownRole(#[from] UnknownRole),
}

/// IdP role name -> internal role. Built once at startup, read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleMappingTable {
    entries: HashMap<String, InternalRole>,
}

impl RoleMappingTable {
    /// Keycloak realm roles as provisioned for the admin console.
    pub fn keycloak_default() -> Self {
        let entries = [
            ("org-admin", InternalRole::OrgAdmin),
            ("internal-user", InternalRole::InternalUser),
            ("internal-user-view-only", InternalRole::InternalUserViewer),
            ("proxy-admin", InternalRole::ProxyAdmin),
            ("proxy-admin-view-only", InternalRole::ProxyAdminViewer),
        ]
        .into_iter()
        .map(|(idp, role)| (idp.to_string(), role))
        .collect();

        Self { entries }
    }

    pub fn from_pairs<I, K>(pairs: I) -> Result<Self, RoleMappingError>
    where
        I: IntoIterator<Item = (K, InternalRole)>,
        K: Into<String>,
    {
        let mut entries = HashMap::new();
        for (idp, role) in pairs {
            let idp = idp.into();
            if entries.insert(idp.clone(), role).is_some() {
                return Err(RoleMappingError::Duplicate(idp));
            }
        }
        Ok(Self { entries })
    }

    /// Parse `idp=internal,idp2=internal2` or a JSON object `{"idp": "internal"}`.
    pub fn parse(raw: &str) -> Result<Self, RoleMappingError> {
        let raw = raw.trim();
        if raw.starts_with('{') {
            let object: HashMap<String, String> =
                serde_json::from_str(raw).map_err(|_| RoleMappingError::MalformedJson)?;
            let pairs = object
                .into_iter()
                .map(|(idp, role)| Ok((idp, role.parse::<InternalRole>()?)))
                .collect::<Result<Vec<_>, RoleMappingError>>()?;
            return Self::from_pairs(pairs);
        }

        let mut pairs = Vec::new();
        for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (idp, role) = entry
                .split_once('=')
                .ok_or_else(|| RoleMappingError::MalformedEntry(entry.to_string()))?;
            let idp = idp.trim();
            if idp.is_empty() {
                return Err(RoleMappingError::MalformedEntry(entry.to_string()));
            }
            pairs.push((idp.to_string(), role.parse::<InternalRole>()?));
        }
        Self::from_pairs(pairs)
    }

    pub fn get(&self, idp_role: &str) -> Option<InternalRole> {
        self.entries.get(idp_role).copied()
    }

    /// First IdP role (in the order given) that has a mapping. Table order plays no part.
    pub fn first_match<'a, I>(&self, idp_roles: I) -> Option<(&'a str, InternalRole)>
    where
        I: IntoIterator<Item = &'a str>,
    {
        idp_roles
            .into_iter()
            .find_map(|name| self.get(name).map(|role| (name, role)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
