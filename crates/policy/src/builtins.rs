//! Builtin predicate constructors.
//!
//! Each constructor takes extractor callbacks and/or a literal and returns a
//! [`Predicate`] over [`AccessRequest`]. None of them can fail: a missing or
//! mistyped value simply makes the predicate false.

use serde_json::Value;

use crate::capability::{AccessRequest, Attributable, Identifiable, Ownable};
use crate::predicate::Predicate;

/// Shorthand for a predicate over an access request.
pub type RequestPredicate<S, R> = Predicate<AccessRequest<S, R>>;

/// True when the subject's and the resource's extracted values are equal.
pub fn field_equals<S, R, A, B, FS, FR>(subject_value: FS, resource_value: FR) -> RequestPredicate<S, R>
where
    S: 'static,
    R: 'static,
    A: ?Sized + PartialEq<B>,
    B: ?Sized,
    FS: Fn(&S) -> &A + Send + Sync + 'static,
    FR: Fn(&R) -> &B + Send + Sync + 'static,
{
    Predicate::new(move |req: &AccessRequest<S, R>| {
        subject_value(&req.subject) == resource_value(&req.resource)
    })
}

/// True when the extracted values differ.
pub fn field_not_equals<S, R, A, B, FS, FR>(
    subject_value: FS,
    resource_value: FR,
) -> RequestPredicate<S, R>
where
    S: 'static,
    R: 'static,
    A: ?Sized + PartialEq<B>,
    B: ?Sized,
    FS: Fn(&S) -> &A + Send + Sync + 'static,
    FR: Fn(&R) -> &B + Send + Sync + 'static,
{
    Predicate::new(move |req: &AccessRequest<S, R>| {
        subject_value(&req.subject) != resource_value(&req.resource)
    })
}

/// True when a subject field equals a fixed value.
pub fn subject_matches<S, R, T, Q, F>(extractor: F, target: Q) -> RequestPredicate<S, R>
where
    S: 'static,
    R: 'static,
    T: ?Sized + PartialEq<Q>,
    Q: Send + Sync + 'static,
    F: Fn(&S) -> &T + Send + Sync + 'static,
{
    Predicate::new(move |req: &AccessRequest<S, R>| *extractor(&req.subject) == target)
}

/// True when a resource field equals a fixed value.
pub fn resource_matches<S, R, T, Q, F>(extractor: F, target: Q) -> RequestPredicate<S, R>
where
    S: 'static,
    R: 'static,
    T: ?Sized + PartialEq<Q>,
    Q: Send + Sync + 'static,
    F: Fn(&R) -> &T + Send + Sync + 'static,
{
    Predicate::new(move |req: &AccessRequest<S, R>| *extractor(&req.resource) == target)
}

/// True when the subject's value appears in a list carried by the resource.
pub fn subject_in_resource_list<S, R, T, FS, FR>(
    subject_value: FS,
    resource_list: FR,
) -> RequestPredicate<S, R>
where
    S: 'static,
    R: 'static,
    T: PartialEq,
    FS: Fn(&S) -> &T + Send + Sync + 'static,
    FR: Fn(&R) -> &[T] + Send + Sync + 'static,
{
    Predicate::new(move |req: &AccessRequest<S, R>| {
        resource_list(&req.resource).contains(subject_value(&req.subject))
    })
}

/// True when the two lists share at least one element.
///
/// A plain nested scan; the lists involved (roles, tags, groups) are short.
pub fn list_intersection<S, R, T, FS, FR>(subject_list: FS, resource_list: FR) -> RequestPredicate<S, R>
where
    S: 'static,
    R: 'static,
    T: PartialEq,
    FS: Fn(&S) -> &[T] + Send + Sync + 'static,
    FR: Fn(&R) -> &[T] + Send + Sync + 'static,
{
    Predicate::new(move |req: &AccessRequest<S, R>| {
        let theirs = resource_list(&req.resource);
        subject_list(&req.subject)
            .iter()
            .any(|item| theirs.contains(item))
    })
}

/// True when the subject's id equals the resource's owner id.
pub fn is_owner<S, R>() -> RequestPredicate<S, R>
where
    S: Identifiable + 'static,
    R: Ownable + 'static,
    S::Id: PartialEq<R::OwnerId>,
{
    Predicate::new(|req: &AccessRequest<S, R>| req.subject.id() == req.resource.owner_id())
}

/// True when the subject attribute equals `value`.
///
/// A missing attribute is treated as `null`, so
/// `subject_attr_equals("x", Value::Null)` holds when `x` is absent.
pub fn subject_attr_equals<S, R>(key: impl Into<String>, value: impl Into<Value>) -> RequestPredicate<S, R>
where
    S: Attributable + 'static,
    R: 'static,
{
    let key = key.into();
    let expected = value.into();
    Predicate::new(move |req: &AccessRequest<S, R>| {
        req.subject.attribute(&key).unwrap_or(Value::Null) == expected
    })
}

/// True when the subject attribute is a number greater than `threshold`.
pub fn subject_attr_greater_than<S, R>(key: impl Into<String>, threshold: f64) -> RequestPredicate<S, R>
where
    S: Attributable + 'static,
    R: 'static,
{
    let key = key.into();
    Predicate::new(move |req: &AccessRequest<S, R>| {
        numeric_attr(&req.subject, &key).is_some_and(|v| v > threshold)
    })
}

/// True when the subject attribute is a number less than `threshold`.
pub fn subject_attr_less_than<S, R>(key: impl Into<String>, threshold: f64) -> RequestPredicate<S, R>
where
    S: Attributable + 'static,
    R: 'static,
{
    let key = key.into();
    Predicate::new(move |req: &AccessRequest<S, R>| {
        numeric_attr(&req.subject, &key).is_some_and(|v| v < threshold)
    })
}

/// True when the subject attribute is the boolean `true`.
pub fn subject_attr_true<S, R>(key: impl Into<String>) -> RequestPredicate<S, R>
where
    S: Attributable + 'static,
    R: 'static,
{
    let key = key.into();
    Predicate::new(move |req: &AccessRequest<S, R>| {
        matches!(req.subject.attribute(&key), Some(Value::Bool(true)))
    })
}

fn numeric_attr<S: Attributable>(subject: &S, key: &str) -> Option<f64> {
    subject.attribute(key).as_ref().and_then(Value::as_f64)
}
