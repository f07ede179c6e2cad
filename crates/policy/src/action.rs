//! `base[:condition]` action strings and the rules for matching them.

use std::fmt;

/// The catch-all policy key and condition.
pub const WILDCARD: &str = "*";

/// An action string split on its first `:`.
///
/// `"edit:isOwner"` has base `"edit"` and condition `"isOwner"`; `"edit"` has
/// an empty condition. Anything after the first colon, further colons
/// included, belongs to the condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Action<'a> {
    raw: &'a str,
    base: &'a str,
    condition: &'a str,
}

impl<'a> Action<'a> {
    pub fn parse(raw: &'a str) -> Self {
        Self::with_colon(raw, raw.find(':'))
    }

    /// Rebuild from a colon position found by an earlier parse.
    pub(crate) fn with_colon(raw: &'a str, colon: Option<usize>) -> Self {
        let (base, condition) = match colon {
            Some(at) => (&raw[..at], &raw[at + 1..]),
            None => (raw, ""),
        };
        Self {
            raw,
            base,
            condition,
        }
    }

    pub fn raw(&self) -> &'a str {
        self.raw
    }

    pub fn base(&self) -> &'a str {
        self.base
    }

    /// Empty when the action carries no condition.
    pub fn condition(&self) -> &'a str {
        self.condition
    }

    /// Which rule, if any, makes a policy stored under `self` apply to a
    /// request for `requested`. Rules are tried in order; the first that
    /// holds is reported.
    pub fn matches(&self, requested: &Action<'_>) -> Option<MatchRule> {
        if self.raw == WILDCARD {
            Some(MatchRule::Global)
        } else if self.raw == requested.raw {
            Some(MatchRule::Exact)
        } else if self.base != requested.base {
            None
        } else if self.condition == WILDCARD {
            Some(MatchRule::AnyCondition)
        } else if self.condition.is_empty() && !requested.condition.is_empty() {
            Some(MatchRule::BaseCoversCondition)
        } else if requested.condition.is_empty() && !self.condition.is_empty() {
            Some(MatchRule::ConditionCoversBase)
        } else {
            None
        }
    }
}

impl fmt::Display for Action<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw)
    }
}

/// Why a policy key applies to a requested action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    /// Key is `*`.
    Global,
    /// Key and action are the same string.
    Exact,
    /// Key is `base:*` and the action has the same base.
    AnyCondition,
    /// Key is a bare `base`; the action is `base:<something>`.
    BaseCoversCondition,
    /// Key is `base:<cond>`; the action is a bare `base`. The condition
    /// predicate still decides.
    ConditionCoversBase,
}

impl fmt::Display for MatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchRule::Global => "global wildcard",
            MatchRule::Exact => "exact",
            MatchRule::AnyCondition => "any condition",
            MatchRule::BaseCoversCondition => "base covers condition",
            MatchRule::ConditionCoversBase => "condition covers base",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(key: &str, requested: &str) -> Option<MatchRule> {
        Action::parse(key).matches(&Action::parse(requested))
    }

    #[test]
    fn test_parse() {
        let a = Action::parse("edit:isOwner");
        assert_eq!((a.base(), a.condition()), ("edit", "isOwner"));

        let a = Action::parse("edit");
        assert_eq!((a.base(), a.condition()), ("edit", ""));
        assert_eq!(a.raw(), "edit");

        let a = Action::parse("a:b:c");
        assert_eq!((a.base(), a.condition()), ("a", "b:c"));

        let a = Action::parse("read:");
        assert_eq!((a.base(), a.condition()), ("read", ""));
    }

    #[test]
    fn test_global_wildcard() {
        assert_eq!(rule("*", "anything:whatever"), Some(MatchRule::Global));
        assert_eq!(rule("*", "read"), Some(MatchRule::Global));
    }

    #[test]
    fn test_exact() {
        assert_eq!(rule("read", "read"), Some(MatchRule::Exact));
        assert_eq!(rule("delete:isOwner", "delete:isOwner"), Some(MatchRule::Exact));
        assert_eq!(rule("read:*", "read:*"), Some(MatchRule::Exact));
    }

    #[test]
    fn test_any_condition() {
        assert_eq!(rule("update:*", "update:title"), Some(MatchRule::AnyCondition));
        assert_eq!(rule("update:*", "update"), Some(MatchRule::AnyCondition));
        assert_eq!(rule("update:*", "delete:title"), None);
    }

    #[test]
    fn test_base_covers_condition() {
        assert_eq!(rule("print", "print:draft"), Some(MatchRule::BaseCoversCondition));
        assert_eq!(rule("print", "printer:draft"), None);
    }

    #[test]
    fn test_condition_covers_base() {
        assert_eq!(rule("delete:isOwner", "delete"), Some(MatchRule::ConditionCoversBase));
        assert_eq!(rule("delete:isOwner", "remove"), None);
    }

    #[test]
    fn test_no_match() {
        // different explicit conditions on the same base
        assert_eq!(rule("deploy:staging", "deploy:production"), None);
        assert_eq!(rule("read", "write"), None);
        assert_eq!(rule("read:*", "write"), None);
    }
}
