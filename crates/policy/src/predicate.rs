//! Composable boolean predicates.

use std::fmt;
use std::sync::Arc;

/// A pure decision function over a value of type `T`.
///
/// Predicates are immutable and cheap to clone. Combinators return new
/// predicates and leave their operands untouched, so the same predicate can
/// take part in any number of compositions.
pub struct Predicate<T> {
    check: Arc<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        Self {
            check: Arc::clone(&self.check),
        }
    }
}

impl<T> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate").finish_non_exhaustive()
    }
}

impl<T: 'static> Predicate<T> {
    /// Wrap a decision function.
    pub fn new(check: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        Self {
            check: Arc::new(check),
        }
    }

    /// Evaluate the predicate.
    pub fn satisfied_by(&self, value: &T) -> bool {
        (self.check)(value)
    }

    /// Both must hold. `other` is not evaluated when `self` is false.
    pub fn and(&self, other: &Predicate<T>) -> Predicate<T> {
        let (left, right) = (self.clone(), other.clone());
        Predicate::new(move |value| left.satisfied_by(value) && right.satisfied_by(value))
    }

    /// Either may hold. `other` is not evaluated when `self` is true.
    pub fn or(&self, other: &Predicate<T>) -> Predicate<T> {
        let (left, right) = (self.clone(), other.clone());
        Predicate::new(move |value| left.satisfied_by(value) || right.satisfied_by(value))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(&self) -> Predicate<T> {
        let inner = self.clone();
        Predicate::new(move |value| !inner.satisfied_by(value))
    }
}

/// Always true.
pub fn allow<T: 'static>() -> Predicate<T> {
    Predicate::new(|_| true)
}

/// Always false.
pub fn deny<T: 'static>() -> Predicate<T> {
    Predicate::new(|_| false)
}

/// Identity wrap, for readability when building policies by hand.
pub fn is<T: 'static>(predicate: Predicate<T>) -> Predicate<T> {
    predicate
}

impl<T: 'static> std::ops::BitAnd for Predicate<T> {
    type Output = Predicate<T>;

    fn bitand(self, rhs: Self) -> Self::Output {
        Predicate::and(&self, &rhs)
    }
}

impl<T: 'static> std::ops::BitOr for Predicate<T> {
    type Output = Predicate<T>;

    fn bitor(self, rhs: Self) -> Self::Output {
        Predicate::or(&self, &rhs)
    }
}

impl<T: 'static> std::ops::Not for Predicate<T> {
    type Output = Predicate<T>;

    fn not(self) -> Self::Output {
        Predicate::not(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn is_even() -> Predicate<i32> {
        Predicate::new(|v: &i32| v % 2 == 0)
    }

    fn is_positive() -> Predicate<i32> {
        Predicate::new(|v: &i32| *v > 0)
    }

    fn counting(result: bool, calls: Arc<AtomicUsize>) -> Predicate<i32> {
        Predicate::new(move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            result
        })
    }

    #[test]
    fn test_satisfied_by() {
        assert!(is_even().satisfied_by(&4));
        assert!(!is_even().satisfied_by(&3));
    }

    #[test]
    fn test_and() {
        let both = is_even().and(&is_positive());
        assert!(both.satisfied_by(&2));
        assert!(!both.satisfied_by(&-2));
        assert!(!both.satisfied_by(&3));
    }

    #[test]
    fn test_or() {
        let either = is_even().or(&is_positive());
        assert!(either.satisfied_by(&-2));
        assert!(either.satisfied_by(&3));
        assert!(!either.satisfied_by(&-3));
    }

    #[test]
    fn test_not() {
        let odd = is_even().not();
        assert!(odd.satisfied_by(&3));
        assert!(!odd.satisfied_by(&4));
    }

    #[test]
    fn test_and_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let p = deny().and(&counting(true, calls.clone()));
        assert!(!p.satisfied_by(&1));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let p = allow().and(&counting(true, calls.clone()));
        assert!(p.satisfied_by(&1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_or_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let p = allow().or(&counting(false, calls.clone()));
        assert!(p.satisfied_by(&1));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_operands_are_not_mutated() {
        let even = is_even();
        let _ = even.and(&deny());
        let _ = even.not();
        assert!(even.satisfied_by(&2));
    }

    #[test]
    fn test_constants_and_identity() {
        assert!(allow::<i32>().satisfied_by(&0));
        assert!(!deny::<i32>().satisfied_by(&0));
        assert!(is(is_even()).satisfied_by(&2));
        assert!(!is(is_even()).satisfied_by(&1));
    }

    #[test]
    fn test_operators() {
        let p = (is_even() & is_positive()) | !allow();
        assert!(p.satisfied_by(&4));
        assert!(!p.satisfied_by(&-4));
    }
}
