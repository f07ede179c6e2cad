//! Turn a [`PolicyConfig`] into an [`Evaluator`].

use tracing::{debug, warn};

use crate::action::WILDCARD;
use crate::builtins::RequestPredicate;
use crate::capability::RoleBearer;
use crate::config::PolicyConfig;
use crate::error::{CompileErrors, RuleError};
use crate::evaluator::Evaluator;
use crate::predicate::{allow, deny};
use crate::rbac::RoleMatcher;
use crate::registry::PredicateProvider;
use crate::Result;

/// Compile every allow rule in `config`.
///
/// Each rule becomes `has_role(role) AND condition` and is OR-merged into the
/// evaluator under its policy key. A condition the provider cannot resolve
/// does not stop compilation: that one rule is compiled with a constant deny
/// in place of the condition, and the failure is reported in the returned
/// [`CompileErrors`]. The evaluator is usable either way.
///
/// `config.hierarchy` is not consulted here; role implication comes from
/// `roles`.
pub fn compile<S, R, P>(
    config: &PolicyConfig,
    roles: &RoleMatcher,
    provider: &P,
) -> (Evaluator<S, R>, Option<CompileErrors>)
where
    S: RoleBearer + 'static,
    R: 'static,
    P: PredicateProvider<S, R> + ?Sized,
{
    let mut evaluator = Evaluator::new();
    let mut errors = CompileErrors::default();

    for (role, role_config) in &config.policies {
        for rule in &role_config.allow {
            let (action, condition) = match rule.split_once(':') {
                Some((action, condition)) => (action, Some(condition)),
                None => (rule.as_str(), None),
            };
            let condition_name = condition.unwrap_or(WILDCARD);

            let condition_predicate: RequestPredicate<S, R> = if condition_name == WILDCARD {
                allow()
            } else {
                match provider.lookup(condition_name) {
                    Ok(predicate) => predicate,
                    Err(source) => {
                        warn!(
                            role = %role,
                            rule = %rule,
                            condition = condition_name,
                            "unresolved condition, rule will deny"
                        );
                        errors.push(RuleError {
                            role: role.clone(),
                            rule: rule.clone(),
                            condition: condition_name.to_string(),
                            source: Box::new(source),
                        });
                        deny()
                    }
                }
            };

            let key = policy_key(rule, action, condition);
            debug!(role = %role, rule = %rule, key, "compiled rule");
            evaluator.add_policy(key, roles.has_role(role.as_str()).and(&condition_predicate));
        }
    }

    (evaluator, errors.into_option())
}

/// Like [`compile`], but any unresolved condition is an error.
pub fn compile_strict<S, R, P>(
    config: &PolicyConfig,
    roles: &RoleMatcher,
    provider: &P,
) -> Result<Evaluator<S, R>>
where
    S: RoleBearer + 'static,
    R: 'static,
    P: PredicateProvider<S, R> + ?Sized,
{
    match compile(config, roles, provider) {
        (evaluator, None) => Ok(evaluator),
        (_, Some(errors)) => Err(errors.into()),
    }
}

/// `*` for the catch-all rules, the full rule when a condition was written
/// out, otherwise the bare action.
fn policy_key<'a>(rule: &'a str, action: &'a str, condition: Option<&str>) -> &'a str {
    match condition {
        _ if rule == WILDCARD => WILDCARD,
        None if action == WILDCARD => WILDCARD,
        Some(WILDCARD) if action == WILDCARD => WILDCARD,
        Some(_) => rule,
        None => action,
    }
}
