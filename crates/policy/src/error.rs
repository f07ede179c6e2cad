//! Policy error types.

use std::fmt;

use thiserror::Error;

/// Policy errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A condition name could not be resolved by a predicate provider.
    #[error("predicate not found: {0}")]
    PredicateNotFound(String),

    /// One or more rules could not be fully compiled.
    #[error(transparent)]
    Compile(#[from] CompileErrors),

    /// The policy configuration has the wrong shape.
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// An I/O error occurred while reading a config file.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A single allow rule whose condition could not be resolved.
///
/// The rule was still compiled, with its condition replaced by a constant
/// deny.
#[derive(Debug, Error)]
#[error("role '{role}': rule '{rule}': failed to get predicate '{condition}': {source}")]
pub struct RuleError {
    pub role: String,
    pub rule: String,
    pub condition: String,
    #[source]
    pub source: Box<Error>,
}

/// Every rule that degraded during a single compilation, in config order.
#[derive(Debug, Default, Error)]
pub struct CompileErrors {
    errors: Vec<RuleError>,
}

impl CompileErrors {
    pub(crate) fn push(&mut self, error: RuleError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RuleError> {
        self.errors.iter()
    }

    /// `None` when nothing failed.
    pub(crate) fn into_option(self) -> Option<Self> {
        if self.is_empty() { None } else { Some(self) }
    }
}

impl fmt::Display for CompileErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a CompileErrors {
    type Item = &'a RuleError;
    type IntoIter = std::slice::Iter<'a, RuleError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}
