//! Conditions the CLI can resolve from policy files.

use policy::{
    AccessRequest, CompileErrors, Evaluator, PolicyConfig, Predicate, PredicateRegistry,
    RoleMatcher, compile, is_owner, list_intersection, subject_attr_true,
    subject_in_resource_list,
};

use crate::entity::Entity;

pub type Request = AccessRequest<Entity, Entity>;

/// `isOwner`, `isCollaborator`, `sharesTag` and `isActive`.
pub fn builtin_registry() -> PredicateRegistry<Entity, Entity> {
    // An anonymous subject must not match a resource with no owner.
    let has_id = Predicate::new(|req: &Request| !req.subject.id.is_empty());

    PredicateRegistry::new()
        .with("isOwner", has_id.and(&is_owner()))
        .with(
            "isCollaborator",
            has_id.and(&subject_in_resource_list(
                |s: &Entity| &s.id,
                |r: &Entity| r.collaborators.as_slice(),
            )),
        )
        .with(
            "sharesTag",
            list_intersection(|s: &Entity| s.tags.as_slice(), |r: &Entity| r.tags.as_slice()),
        )
        .with("isActive", subject_attr_true("active"))
}

/// Compile `config` against the builtin conditions and its own hierarchy.
pub fn compile_config(config: &PolicyConfig) -> (Evaluator<Entity, Entity>, Option<CompileErrors>) {
    let roles = RoleMatcher::new(config.hierarchy.clone());
    compile(config, &roles, &builtin_registry())
}
