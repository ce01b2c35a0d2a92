//! # Request Context
//!
//! Transport-supplied data handed to `incoming` hooks: the session, cookies,
//! headers, the remote address, whatever the host chooses to expose. The bus
//! never looks inside it.
//!
//! The context is owned by the host for the lifetime of one request and is
//! only ever lent to a hook (`&RequestContext`), so an extension cannot keep
//! it beyond the invocation.

use crate::error::ContextError;
use std::{
    any::{Any, TypeId, type_name},
    collections::HashMap,
    fmt,
};

/// A type-keyed bag of per-request values.
///
/// # Example
///
/// ```rust
/// use conduit_core::{RequestContext, SessionToken};
///
/// #[derive(Debug, PartialEq)]
/// struct RemoteAddr(String);
///
/// let context = RequestContext::new()
///     .with(SessionToken::new("s3cr3t"))
///     .with(RemoteAddr("10.0.0.1".into()));
///
/// assert_eq!(context.get::<RemoteAddr>(), Some(&RemoteAddr("10.0.0.1".into())));
/// assert!(context.require::<SessionToken>().is_ok());
/// ```
#[derive(Default)]
pub struct RequestContext {
    entries: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl RequestContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.insert(value);
        self
    }

    /// Store a value, returning the previous value of the same type.
    pub fn insert<T: Send + Sync + 'static>(&mut self, value: T) -> Option<T> {
        self.entries
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|old| old.downcast::<T>().ok())
            .map(|old| *old)
    }

    /// Look up a value by type.
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref::<T>())
    }

    /// Look up a value that must be present.
    pub fn require<T: Send + Sync + 'static>(&self) -> Result<&T, ContextError> {
        self.get::<T>()
            .ok_or(ContextError::Missing(type_name::<T>()))
    }

    /// Remove a value by type.
    pub fn remove<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.entries
            .remove(&TypeId::of::<T>())
            .and_then(|value| value.downcast::<T>().ok())
            .map(|value| *value)
    }

    /// Whether a value of type `T` is stored.
    pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the context is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("entries", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Cookie(&'static str);

    #[test]
    fn test_insert_replaces_same_type() {
        let mut context = RequestContext::new();
        assert_eq!(context.insert(Cookie("a")), None);
        assert_eq!(context.insert(Cookie("b")), Some(Cookie("a")));
        assert_eq!(context.len(), 1);
        assert_eq!(context.get::<Cookie>(), Some(&Cookie("b")));
    }

    #[test]
    fn test_require_missing() {
        let context = RequestContext::new();
        let err = context.require::<Cookie>().unwrap_err();
        assert!(matches!(err, ContextError::Missing(name) if name.ends_with("Cookie")));
    }

    #[test]
    fn test_remove() {
        let mut context = RequestContext::new().with(Cookie("a")).with(7u32);
        assert!(context.contains::<u32>());
        assert_eq!(context.remove::<Cookie>(), Some(Cookie("a")));
        assert!(!context.contains::<Cookie>());
        assert_eq!(context.len(), 1);
    }
}
