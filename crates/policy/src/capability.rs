//! Access requests and the capability traits predicates inspect them through.
//!
//! Subjects and resources are arbitrary caller types. Builtin predicates only
//! require the narrow trait they actually use, so a resource that has an owner
//! but no attributes only implements [`Ownable`].

use serde_json::Value;

/// Who wants to do what to which resource.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessRequest<S, R> {
    pub subject: S,
    pub resource: R,
    pub action: String,
}

impl<S, R> AccessRequest<S, R> {
    pub fn new(subject: S, resource: R, action: impl Into<String>) -> Self {
        Self {
            subject,
            resource,
            action: action.into(),
        }
    }
}

/// A subject that carries role names.
pub trait RoleBearer {
    fn roles(&self) -> &[String];
}

/// Something with a stable identity.
pub trait Identifiable {
    type Id: ?Sized;

    fn id(&self) -> &Self::Id;
}

/// A resource that records its owner.
pub trait Ownable {
    type OwnerId: ?Sized;

    fn owner_id(&self) -> &Self::OwnerId;
}

/// Free-form attribute lookup.
///
/// Values are JSON values so that numeric, boolean and string attributes can
/// live side by side. A missing key returns `None`.
pub trait Attributable {
    fn attribute(&self, key: &str) -> Option<Value>;
}
