//! Policy table and request evaluation.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, trace};

use crate::action::{Action, MatchRule};
use crate::builtins::RequestPredicate;
use crate::capability::AccessRequest;

/// Result of a decision with the reasoning attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// `policy` is the key whose predicate granted the request.
    Allow { policy: String, rule: MatchRule },
    Deny { reason: String },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow { .. })
    }
}

struct Entry<S, R> {
    colon: Option<usize>,
    predicate: RequestPredicate<S, R>,
}

/// A frozen-after-build table of policy key → predicate.
///
/// Requests are denied unless at least one applicable policy is satisfied.
/// Building takes `&mut self`; once built, the evaluator is `Send + Sync` and
/// can be shared behind an `Arc` for concurrent evaluation.
pub struct Evaluator<S, R> {
    policies: BTreeMap<String, Entry<S, R>>,
    strict_conditions: bool,
}

impl<S, R> Default for Evaluator<S, R> {
    fn default() -> Self {
        Self {
            policies: BTreeMap::new(),
            strict_conditions: false,
        }
    }
}

impl<S, R> fmt::Debug for Evaluator<S, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evaluator")
            .field("policies", &self.policies.keys().collect::<Vec<_>>())
            .field("strict_conditions", &self.strict_conditions)
            .finish()
    }
}

impl<S: 'static, R: 'static> Evaluator<S, R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Never let a bare action (no condition) pick up policies registered
    /// under `action:condition`.
    ///
    /// By default a request for `delete` is checked against a
    /// `delete:isOwner` policy, and the `isOwner` predicate decides. In strict
    /// mode such a request only sees `delete`, `delete:*` and `*`.
    pub fn with_strict_conditions(mut self) -> Self {
        self.strict_conditions = true;
        self
    }

    pub fn strict_conditions(&self) -> bool {
        self.strict_conditions
    }

    /// Register `predicate` under `key`.
    ///
    /// A key that is already present keeps its old predicate and gains the new
    /// one as an alternative.
    pub fn add_policy(&mut self, key: impl Into<String>, predicate: RequestPredicate<S, R>) {
        let key = key.into();
        debug!(key = %key, "registering policy");
        match self.policies.get_mut(&key) {
            Some(entry) => entry.predicate = entry.predicate.or(&predicate),
            None => {
                let colon = key.find(':');
                self.policies.insert(key, Entry { colon, predicate });
            }
        }
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Registered policy keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.policies.keys().map(String::as_str)
    }

    /// Every policy that applies to `action`, with the rule that made it apply.
    pub fn matching<'a>(
        &'a self,
        action: &'a str,
    ) -> impl Iterator<Item = (&'a str, MatchRule, &'a RequestPredicate<S, R>)> + 'a {
        let requested = Action::parse(action);
        self.policies.iter().filter_map(move |(key, entry)| {
            let rule = Action::with_colon(key, entry.colon).matches(&requested)?;
            if self.strict_conditions && rule == MatchRule::ConditionCoversBase {
                return None;
            }
            trace!(policy = %key, action = %requested, %rule, "policy applies");
            Some((key.as_str(), rule, &entry.predicate))
        })
    }

    /// Disjunction of every policy that applies to `action`, or `None` when
    /// nothing applies.
    pub fn policy_for(&self, action: &str) -> Option<RequestPredicate<S, R>> {
        self.matching(action)
            .map(|(_, _, predicate)| predicate.clone())
            .reduce(|combined, predicate| combined.or(&predicate))
    }

    /// Decide a request. Denies when no policy applies.
    pub fn evaluate(&self, request: &AccessRequest<S, R>) -> bool {
        let allowed = self
            .policy_for(&request.action)
            .is_some_and(|combined| combined.satisfied_by(request));
        trace!(action = %request.action, allowed, "evaluated request");
        allowed
    }

    /// Like [`evaluate`](Self::evaluate), but reports which policy granted the
    /// request or why it was denied.
    pub fn decide(&self, request: &AccessRequest<S, R>) -> Decision {
        let mut applicable = 0usize;
        for (key, rule, predicate) in self.matching(&request.action) {
            applicable += 1;
            if predicate.satisfied_by(request) {
                return Decision::Allow {
                    policy: key.to_string(),
                    rule,
                };
            }
        }

        let reason = if applicable == 0 {
            format!("no policy matches action '{}'", request.action)
        } else {
            format!(
                "no matching policy granted '{}' ({applicable} considered)",
                request.action
            )
        };
        Decision::Deny { reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::{Predicate, allow, deny};
    use std::sync::Arc;

    type Req = AccessRequest<&'static str, ()>;

    fn req(subject: &'static str, action: &str) -> Req {
        AccessRequest::new(subject, (), action)
    }

    fn subject_is(name: &'static str) -> RequestPredicate<&'static str, ()> {
        Predicate::new(move |r: &Req| r.subject == name)
    }

    #[test]
    fn test_empty_denies_everything() {
        let evaluator = Evaluator::<&'static str, ()>::new();
        assert!(evaluator.is_empty());
        assert!(!evaluator.evaluate(&req("alice", "read")));
        assert!(!evaluator.evaluate(&req("alice", "*")));
        assert!(!evaluator.evaluate(&req("alice", "")));
        assert_eq!(
            evaluator.decide(&req("alice", "read")),
            Decision::Deny {
                reason: "no policy matches action 'read'".into()
            }
        );
    }

    #[test]
    fn test_add_policy_merges_with_or() {
        let mut evaluator = Evaluator::new();
        evaluator.add_policy("read", subject_is("alice"));
        evaluator.add_policy("read", subject_is("bob"));

        assert_eq!(evaluator.len(), 1);
        assert!(evaluator.evaluate(&req("alice", "read")));
        assert!(evaluator.evaluate(&req("bob", "read")));
        assert!(!evaluator.evaluate(&req("carol", "read")));
    }

    #[test]
    fn test_registration_order_does_not_matter() {
        let grants = [subject_is("alice"), deny(), subject_is("bob")];

        let mut forward = Evaluator::new();
        for p in grants.iter() {
            forward.add_policy("edit", p.clone());
        }
        let mut backward = Evaluator::new();
        for p in grants.iter().rev() {
            backward.add_policy("edit", p.clone());
        }

        for who in ["alice", "bob", "carol"] {
            let r = req(who, "edit");
            assert_eq!(forward.evaluate(&r), backward.evaluate(&r));
        }
    }

    #[test]
    fn test_wildcard_grants_unknown_actions() {
        let mut evaluator = Evaluator::new();
        evaluator.add_policy("*", subject_is("root"));
        evaluator.add_policy("read", deny());

        assert!(evaluator.evaluate(&req("root", "anything:whatever")));
        assert!(evaluator.evaluate(&req("root", "read")));
        assert!(!evaluator.evaluate(&req("alice", "read")));
    }

    #[test]
    fn test_all_matching_policies_contribute() {
        let mut evaluator = Evaluator::new();
        evaluator.add_policy("read", deny());
        evaluator.add_policy("read:*", deny());
        evaluator.add_policy("read:public", allow());

        // "read:public" matches all three keys; only the last one grants.
        assert!(evaluator.evaluate(&req("x", "read:public")));
        // "read:secret" matches "read" and "read:*" only.
        assert!(!evaluator.evaluate(&req("x", "read:secret")));
    }

    #[test]
    fn test_condition_covers_base_and_strict_mode() {
        let mut evaluator = Evaluator::new();
        evaluator.add_policy("delete:isOwner", subject_is("owner"));

        assert!(evaluator.evaluate(&req("owner", "delete")));
        assert!(!evaluator.evaluate(&req("stranger", "delete")));

        let strict = evaluator.with_strict_conditions();
        assert!(strict.strict_conditions());
        assert!(!strict.evaluate(&req("owner", "delete")));
        assert!(strict.evaluate(&req("owner", "delete:isOwner")));
    }

    #[test]
    fn test_policy_for_and_keys() {
        let mut evaluator = Evaluator::new();
        evaluator.add_policy("write", allow());
        evaluator.add_policy("read", subject_is("alice"));

        assert_eq!(evaluator.keys().collect::<Vec<_>>(), ["read", "write"]);
        assert!(evaluator.policy_for("delete").is_none());

        let combined = evaluator.policy_for("read:draft").unwrap();
        assert!(combined.satisfied_by(&req("alice", "read:draft")));
        assert!(!combined.satisfied_by(&req("bob", "read:draft")));
    }

    #[test]
    fn test_decide_reports_policy_and_reason() {
        let mut evaluator = Evaluator::new();
        evaluator.add_policy("read:*", subject_is("alice"));

        assert_eq!(
            evaluator.decide(&req("alice", "read:report")),
            Decision::Allow {
                policy: "read:*".into(),
                rule: MatchRule::AnyCondition
            }
        );

        let denied = evaluator.decide(&req("bob", "read"));
        assert!(!denied.is_allowed());
        assert_eq!(
            denied,
            Decision::Deny {
                reason: "no matching policy granted 'read' (1 considered)".into()
            }
        );
    }

    #[test]
    fn test_shared_across_threads() {
        let mut evaluator = Evaluator::new();
        evaluator.add_policy("read", subject_is("alice"));
        let evaluator = Arc::new(evaluator);

        std::thread::scope(|scope| {
            for _ in 0..4 {
                let evaluator = Arc::clone(&evaluator);
                scope.spawn(move || {
                    for _ in 0..100 {
                        assert!(evaluator.evaluate(&req("alice", "read")));
                        assert!(!evaluator.evaluate(&req("bob", "read")));
                    }
                });
            }
        });
    }
}
