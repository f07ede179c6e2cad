//! Role matching, flat and hierarchical.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::builtins::RequestPredicate;
use crate::capability::{AccessRequest, RoleBearer};
use crate::predicate::Predicate;

/// Parent role → roles it implies, interpreted transitively.
///
/// `{"admin": ["editor"], "editor": ["viewer"]}` means an admin satisfies
/// checks for `editor` and `viewer` too.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleHierarchy {
    edges: BTreeMap<String, Vec<String>>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

impl RoleHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_edge<I, C>(mut self, parent: impl Into<String>, children: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        self.insert(parent, children);
        self
    }

    /// Add implied roles for `parent`, keeping any it already had.
    pub fn insert<I, C>(&mut self, parent: impl Into<String>, children: I)
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        self.edges
            .entry(parent.into())
            .or_default()
            .extend(children.into_iter().map(Into::into));
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Roles directly implied by `role`.
    pub fn children(&self, role: &str) -> &[String] {
        self.edges.get(role).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether holding `role` satisfies a check for `target`.
    ///
    /// Walks implied roles depth first with a visited set, so a cyclic
    /// hierarchy still terminates.
    pub fn implies(&self, role: &str, target: &str) -> bool {
        if role == target {
            return true;
        }

        let mut visited = HashSet::new();
        let mut stack = vec![role];
        while let Some(current) = stack.pop() {
            if current == target {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            stack.extend(self.children(current).iter().map(String::as_str));
        }
        false
    }

    /// Return one cycle, as the list of roles walked, if the hierarchy has any.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        let mut marks = HashMap::new();
        let mut path = Vec::new();
        self.edges
            .keys()
            .find_map(|root| self.visit(root, &mut marks, &mut path))
    }

    fn visit<'a>(
        &'a self,
        role: &'a str,
        marks: &mut HashMap<&'a str, Mark>,
        path: &mut Vec<&'a str>,
    ) -> Option<Vec<String>> {
        match marks.get(role) {
            Some(Mark::Done) => return None,
            Some(Mark::Visiting) => {
                let start = path.iter().position(|r| *r == role)?;
                let mut cycle: Vec<String> = path[start..].iter().map(|r| r.to_string()).collect();
                cycle.push(role.to_string());
                return Some(cycle);
            }
            None => {}
        }

        marks.insert(role, Mark::Visiting);
        path.push(role);
        for child in self.children(role) {
            if let Some(cycle) = self.visit(child, marks, path) {
                return Some(cycle);
            }
        }
        path.pop();
        marks.insert(role, Mark::Done);
        None
    }
}

impl<K, V> FromIterator<(K, V)> for RoleHierarchy
where
    K: Into<String>,
    V: IntoIterator,
    V::Item: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut hierarchy = Self::new();
        for (parent, children) in iter {
            hierarchy.insert(parent, children);
        }
        hierarchy
    }
}

impl From<HashMap<String, Vec<String>>> for RoleHierarchy {
    fn from(edges: HashMap<String, Vec<String>>) -> Self {
        edges.into_iter().collect()
    }
}

/// Builds role predicates against an optional hierarchy.
///
/// An empty hierarchy gives flat, exact-name matching. The hierarchy is
/// shared by every predicate the matcher hands out.
#[derive(Debug, Clone, Default)]
pub struct RoleMatcher {
    hierarchy: Arc<RoleHierarchy>,
}

impl RoleMatcher {
    pub fn new(hierarchy: RoleHierarchy) -> Self {
        if let Some(cycle) = hierarchy.find_cycle() {
            warn!(cycle = %cycle.join(" -> "), "role hierarchy contains a cycle");
        }
        Self {
            hierarchy: Arc::new(hierarchy),
        }
    }

    /// Exact role names only.
    pub fn flat() -> Self {
        Self::default()
    }

    pub fn hierarchy(&self) -> &RoleHierarchy {
        &self.hierarchy
    }

    pub fn role_matches(&self, user_role: &str, target_role: &str) -> bool {
        self.hierarchy.implies(user_role, target_role)
    }

    /// Subject holds `target`, directly or through an implying role.
    pub fn has_role<S, R>(&self, target: impl Into<String>) -> RequestPredicate<S, R>
    where
        S: RoleBearer + 'static,
        R: 'static,
    {
        let hierarchy = Arc::clone(&self.hierarchy);
        let target = target.into();
        Predicate::new(move |req: &AccessRequest<S, R>| {
            req.subject
                .roles()
                .iter()
                .any(|role| hierarchy.implies(role, &target))
        })
    }

    /// Subject satisfies [`has_role`](Self::has_role) for at least one target.
    pub fn has_any_role<S, R, I, T>(&self, targets: I) -> RequestPredicate<S, R>
    where
        S: RoleBearer + 'static,
        R: 'static,
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let hierarchy = Arc::clone(&self.hierarchy);
        let targets: Vec<String> = targets.into_iter().map(Into::into).collect();
        Predicate::new(move |req: &AccessRequest<S, R>| {
            req.subject.roles().iter().any(|role| {
                targets
                    .iter()
                    .any(|target| hierarchy.implies(role, target))
            })
        })
    }
}

/// Subject holds exactly `role`. No hierarchy.
pub fn has_role<S, R>(role: impl Into<String>) -> RequestPredicate<S, R>
where
    S: RoleBearer + 'static,
    R: 'static,
{
    let role = role.into();
    Predicate::new(move |req: &AccessRequest<S, R>| req.subject.roles().contains(&role))
}

/// Subject holds at least one of `roles` exactly. No hierarchy.
pub fn has_any_role<S, R, I, T>(roles: I) -> RequestPredicate<S, R>
where
    S: RoleBearer + 'static,
    R: 'static,
    I: IntoIterator<Item = T>,
    T: Into<String>,
{
    let roles: Vec<String> = roles.into_iter().map(Into::into).collect();
    Predicate::new(move |req: &AccessRequest<S, R>| {
        req.subject.roles().iter().any(|role| roles.contains(role))
    })
}
