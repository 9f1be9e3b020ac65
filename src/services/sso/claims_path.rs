//! Optional-path lookup into a raw IdP claim payload.
//!
//! A path is either dotted (`realm_access.roles`) or an RFC 6901 JSON pointer
//! (`/realm_access/roles`). Missing keys and `null` are "absent", never an error.
//! Stepping into a scalar is an error: the payload does not have the shape the
//! configured path promises, and the caller must not guess a fallback.
use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClaimPathError {
    #[error("claim path is empty")]
    EmptyPath,
    #[error("claim path has an empty segment: {0}")]
    EmptySegment(String),
    #[error("claim payload is not an object")]
    PayloadNotObject,
    #[error("claim at '{at}' is not a container")]
    NotAContainer { at: String },
    #[error("segment '{segment}' is not an array index")]
    NotAnIndex { segment: String },
    #[error("claim at '{at}' is not an array")]
    NotAnArray { at: String },
    #[error("claim at '{at}' has a non-string element at index {index}")]
    NonStringElement { at: String, index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimPath {
    raw: String,
    segments: Vec<String>,
}

impl ClaimPath {
    /// `realm_access.roles`, where Keycloak puts realm roles.
    pub fn keycloak_realm_roles() -> Self {
        Self {
            raw: "realm_access.roles".to_string(),
            segments: vec!["realm_access".to_string(), "roles".to_string()],
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for ClaimPath {
    type Err = ClaimPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw.is_empty() || raw == "/" {
            return Err(ClaimPathError::EmptyPath);
        }

        let segments: Vec<String> = if let Some(pointer) = raw.strip_prefix('/') {
            // RFC 6901: "~1" before "~0" so "~01" decodes to "~1"
            pointer
                .split('/')
                .map(|seg| seg.replace("~1", "/").replace("~0", "~"))
                .collect()
        } else {
            let segments: Vec<String> = raw.split('.').map(str::to_string).collect();
            if segments.iter().any(|seg| seg.is_empty()) {
                return Err(ClaimPathError::EmptySegment(raw.to_string()));
            }
            segments
        };

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }
}

impl fmt::Display for ClaimPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Walk `path` through `map`, checking presence at every level.
pub fn get_path<'a>(
    map: &'a Map<String, Value>,
    path: &ClaimPath,
) -> Result<Option<&'a Value>, ClaimPathError> {
    let mut segments = path.segments.iter();
    let Some(first) = segments.next() else {
        return Err(ClaimPathError::EmptyPath);
    };

    let mut current = match map.get(first) {
        None | Some(Value::Null) => return Ok(None),
        Some(v) => v,
    };
    let mut walked = first.clone();

    for segment in segments {
        let next = match current {
            Value::Object(obj) => obj.get(segment),
            Value::Array(items) => {
                let index: usize = segment.parse().map_err(|_| ClaimPathError::NotAnIndex {
                    segment: segment.clone(),
                })?;
                items.get(index)
            }
            _ => return Err(ClaimPathError::NotAContainer { at: walked }),
        };

        current = match next {
            None | Some(Value::Null) => return Ok(None),
            Some(v) => v,
        };
        walked.push('.');
        walked.push_str(segment);
    }

    Ok(Some(current))
}

/// Role names asserted by the IdP at `path`, in IdP order. Absent path yields an empty list.
pub fn extract_roles<'a>(
    payload: &'a Value,
    path: &ClaimPath,
) -> Result<Vec<&'a str>, ClaimPathError> {
    let map = match payload {
        Value::Object(map) => map,
        Value::Null => return Ok(Vec::new()),
        _ => return Err(ClaimPathError::PayloadNotObject),
    };

    let Some(value) = get_path(map, path)? else {
        return Ok(Vec::new());
    };

    let items = value.as_array().ok_or_else(|| ClaimPathError::NotAnArray {
        at: path.to_string(),
    })?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_str().ok_or_else(|| ClaimPathError::NonStringElement {
                at: path.to_string(),
                index,
            })
        })
        .collect()
}
