//! Role and attribute based access-control decisions.
//!
//! Core principle: **a request is denied unless some applicable policy is
//! satisfied.**
//!
//! # Overview
//!
//! - [`Predicate`] is a composable, immutable boolean function. Policies are
//!   built by combining predicates with `and`, `or` and `not`.
//! - The capability traits ([`RoleBearer`], [`Identifiable`], [`Ownable`],
//!   [`Attributable`]) let the builtin predicates inspect your own subject and
//!   resource types.
//! - [`RoleMatcher`] checks role membership, optionally through a
//!   [`RoleHierarchy`] where a parent role implies its children.
//! - [`compile`] turns a [`PolicyConfig`] (role → allow rules) into an
//!   [`Evaluator`], resolving named conditions through a
//!   [`PredicateProvider`] such as [`PredicateRegistry`].
//! - [`Evaluator::evaluate`] matches the request's action against every
//!   policy key and runs the disjunction of the ones that apply.
//!
//! # Actions
//!
//! Actions and policy keys are strings of the form `base` or
//! `base:condition`. A policy applies to a request when:
//!
//! - the key is `*`;
//! - the key equals the requested action;
//! - the key is `base:*` and the bases agree;
//! - the key is a bare `base` and the request is `base:<anything>`;
//! - the key is `base:<cond>` and the request is a bare `base` (unless the
//!   evaluator was built with [`Evaluator::with_strict_conditions`]).
//!
//! # Example
//!
//! ```
//! use policy::{
//!     compile, is_owner, AccessRequest, Identifiable, Ownable, PolicyConfig,
//!     PredicateRegistry, RoleBearer, RoleMatcher,
//! };
//!
//! struct User { id: String, roles: Vec<String> }
//! struct Doc { owner: String }
//!
//! impl RoleBearer for User {
//!     fn roles(&self) -> &[String] { &self.roles }
//! }
//! impl Identifiable for User {
//!     type Id = str;
//!     fn id(&self) -> &str { &self.id }
//! }
//! impl Ownable for Doc {
//!     type OwnerId = str;
//!     fn owner_id(&self) -> &str { &self.owner }
//! }
//!
//! let config = PolicyConfig::parse_json(
//!     r#"{"policies": {"editor": {"allow": ["read", "edit:isOwner"]}}}"#,
//! )?;
//!
//! let mut registry = PredicateRegistry::<User, Doc>::new();
//! registry.register("isOwner", is_owner());
//!
//! let (evaluator, errors) = compile(&config, &RoleMatcher::flat(), &registry);
//! assert!(errors.is_none());
//!
//! let alice = User { id: "alice".into(), roles: vec!["editor".into()] };
//! let doc = Doc { owner: "alice".into() };
//! assert!(evaluator.evaluate(&AccessRequest::new(alice, doc, "edit:isOwner")));
//! # Ok::<(), policy::Error>(())
//! ```

mod action;
mod builtins;
mod capability;
mod compile;
mod config;
mod error;
mod evaluator;
mod predicate;
mod rbac;
mod registry;

pub use action::{Action, MatchRule, WILDCARD};
pub use builtins::{
    RequestPredicate, field_equals, field_not_equals, is_owner, list_intersection,
    resource_matches, subject_attr_equals, subject_attr_greater_than, subject_attr_less_than,
    subject_attr_true, subject_in_resource_list, subject_matches,
};
pub use capability::{AccessRequest, Attributable, Identifiable, Ownable, RoleBearer};
pub use compile::{compile, compile_strict};
pub use config::{PolicyConfig, RolePolicyConfig};
pub use error::{CompileErrors, Error, Result, RuleError};
pub use evaluator::{Decision, Evaluator};
pub use predicate::{Predicate, allow, deny, is};
pub use rbac::{RoleHierarchy, RoleMatcher, has_any_role, has_role};
pub use registry::{PredicateProvider, PredicateRegistry};
