//! JSON-described subjects and resources.

use std::path::Path;

use policy::{Attributable, Identifiable, Ownable, RoleBearer};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// A subject or resource read from a JSON document.
///
/// ```json
/// { "id": "alice", "roles": ["editor"], "tags": ["eng"],
///   "attributes": { "active": true, "trust_score": 90 } }
/// ```
///
/// Every field is optional. Resources typically set `owner_id` and
/// `collaborators`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Entity {
    #[serde(default)]
    pub id: String,

    #[serde(default, alias = "ownerId")]
    pub owner_id: String,

    #[serde(default)]
    pub roles: Vec<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub collaborators: Vec<String>,

    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl Entity {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|source| Error::Entity {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl RoleBearer for Entity {
    fn roles(&self) -> &[String] {
        &self.roles
    }
}

impl Identifiable for Entity {
    type Id = str;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Ownable for Entity {
    type OwnerId = str;

    fn owner_id(&self) -> &str {
        &self.owner_id
    }
}

impl Attributable for Entity {
    fn attribute(&self, key: &str) -> Option<Value> {
        self.attributes.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_parse_full_entity() {
        let entity: Entity = serde_json::from_value(json!({
            "id": "alice",
            "ownerId": "bob",
            "roles": ["editor"],
            "attributes": { "active": true }
        }))
        .unwrap();

        assert_eq!(entity.id(), "alice");
        assert_eq!(entity.owner_id(), "bob");
        assert_eq!(entity.roles(), ["editor"]);
        assert_eq!(entity.attribute("active"), Some(json!(true)));
        assert_eq!(entity.attribute("missing"), None);
        assert!(entity.tags.is_empty());
    }

    #[test]
    fn test_load_reports_path_on_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"roles": "admin"}}"#).unwrap();

        let err = Entity::load(file.path()).unwrap_err();
        assert!(matches!(err, Error::Entity { ref path, .. } if path == file.path()));
    }

    #[test]
    fn test_load_empty_object() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{}}").unwrap();

        assert_eq!(Entity::load(file.path()).unwrap(), Entity::default());
    }
}
