//! Declarative policy configuration.
//!
//! ```json
//! {
//!   "policies": {
//!     "admin":  { "allow": ["*"] },
//!     "editor": { "allow": ["read", "edit:isOwner"] }
//!   },
//!   "hierarchy": { "admin": ["editor"] }
//! }
//! ```
//!
//! The same shape can be written in TOML:
//!
//! ```toml
//! [policies.editor]
//! allow = ["read", "edit:isOwner"]
//!
//! [hierarchy]
//! admin = ["editor"]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::rbac::RoleHierarchy;
use crate::{Error, Result};

/// What a single role is allowed to do.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePolicyConfig {
    /// Allow rules: `"*"`, `"action"` or `"action:condition"`.
    #[serde(default)]
    pub allow: Vec<String>,
}

/// Role name → allow rules, plus an optional role hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default)]
    pub policies: BTreeMap<String, RolePolicyConfig>,

    /// Parent role → implied roles. Empty means flat matching.
    #[serde(default)]
    pub hierarchy: RoleHierarchy,
}

impl PolicyConfig {
    /// Load from a file. `.toml` files are read as TOML, anything else as
    /// JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::parse_toml(&content),
            _ => Self::parse_json(&content),
        }
    }

    pub fn parse_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Parse(e.to_string()))
    }

    pub fn parse_toml(toml: &str) -> Result<Self> {
        toml::from_str(toml).map_err(|e| Error::Parse(e.to_string()))
    }

    /// Build from an in-memory JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| Error::Parse(e.to_string()))
    }

    /// Builder for configs assembled in code.
    pub fn with_role<I, T>(mut self, role: impl Into<String>, allow: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.policies
            .entry(role.into())
            .or_default()
            .allow
            .extend(allow.into_iter().map(Into::into));
        self
    }

    pub fn with_hierarchy(mut self, hierarchy: RoleHierarchy) -> Self {
        self.hierarchy = hierarchy;
        self
    }
}
