//! Permission predicates and sender filters.

use std::fmt;
use std::sync::Arc;

/// Declarative permission requirement attached to a command.
///
/// Named permissions are opaque to the framework; a host-supplied
/// [`PermissionChecker`] decides whether a sender holds one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Permission {
    /// No permission required.
    None,
    /// A single named permission.
    Named(String),
    /// Satisfied when any inner permission is satisfied.
    AnyOf(Vec<Permission>),
    /// Satisfied when every inner permission is satisfied.
    AllOf(Vec<Permission>),
}

impl Permission {
    /// Creates the always-satisfied permission.
    pub fn none() -> Self {
        Self::None
    }

    /// Creates a named permission.
    pub fn of(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Creates a disjunction of permissions.
    pub fn any_of(permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self::AnyOf(permissions.into_iter().collect())
    }

    /// Creates a conjunction of permissions.
    pub fn all_of(permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self::AllOf(permissions.into_iter().collect())
    }

    /// Evaluates the requirement for `sender` using `checker`.
    pub fn test<C>(&self, sender: &C, checker: &PermissionChecker<C>) -> bool {
        match self {
            Self::None => true,
            Self::Named(name) => checker.check(sender, name),
            Self::AnyOf(inner) => inner.iter().any(|p| p.test(sender, checker)),
            Self::AllOf(inner) => inner.iter().all(|p| p.test(sender, checker)),
        }
    }
}

/// Host-supplied decision procedure for named permissions.
pub struct PermissionChecker<C> {
    check: Arc<dyn Fn(&C, &str) -> bool + Send + Sync>,
}

impl<C> PermissionChecker<C> {
    /// Creates a checker from a decision closure.
    pub fn from_fn(check: impl Fn(&C, &str) -> bool + Send + Sync + 'static) -> Self {
        Self {
            check: Arc::new(check),
        }
    }

    /// Creates a checker that grants every named permission.
    pub fn allow_all() -> Self {
        Self::from_fn(|_, _| true)
    }

    /// Creates a checker that denies every named permission.
    pub fn deny_all() -> Self {
        Self::from_fn(|_, _| false)
    }

    /// Returns whether `sender` holds the named permission.
    pub fn check(&self, sender: &C, permission: &str) -> bool {
        (self.check)(sender, permission)
    }
}

impl<C> Clone for PermissionChecker<C> {
    fn clone(&self) -> Self {
        Self {
            check: Arc::clone(&self.check),
        }
    }
}

impl<C> fmt::Debug for PermissionChecker<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermissionChecker").finish_non_exhaustive()
    }
}

/// Predicate restricting which sender values a command accepts.
///
/// Sender narrowing is expressed as an opaque predicate with a label for
/// diagnostics; [`SenderFilter::any`] accepts every sender.
pub struct SenderFilter<C> {
    label: String,
    accept: Arc<dyn Fn(&C) -> bool + Send + Sync>,
}

impl<C> SenderFilter<C> {
    /// Creates the filter that accepts every sender.
    pub fn any() -> Self {
        Self {
            label: "any".to_string(),
            accept: Arc::new(|_| true),
        }
    }

    /// Creates a labeled filter from a predicate.
    pub fn matching(
        label: impl Into<String>,
        accept: impl Fn(&C) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            accept: Arc::new(accept),
        }
    }

    /// Returns whether the filter accepts `sender`.
    pub fn accepts(&self, sender: &C) -> bool {
        (self.accept)(sender)
    }

    /// Returns the diagnostic label.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl<C> Clone for SenderFilter<C> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            accept: Arc::clone(&self.accept),
        }
    }
}

impl<C> fmt::Debug for SenderFilter<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SenderFilter")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}
