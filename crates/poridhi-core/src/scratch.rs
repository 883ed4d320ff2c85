//! Per-request scratch storage.
//!
//! Middleware uses the scratch map to hand values from its request phase to
//! its response phase (a start timestamp, a request id). Entries are keyed by
//! type, so each stage should store its own private type.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

/// Type-keyed storage owned by a single request.
///
/// # Example
///
/// ```
/// use poridhi_core::Scratch;
///
/// #[derive(Debug, PartialEq)]
/// struct Attempt(u32);
///
/// let mut scratch = Scratch::new();
/// scratch.insert(Attempt(1));
///
/// assert_eq!(scratch.get::<Attempt>(), Some(&Attempt(1)));
/// assert_eq!(scratch.remove::<Attempt>(), Some(Attempt(1)));
/// assert!(scratch.is_empty());
/// ```
#[derive(Default)]
pub struct Scratch {
    entries: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Scratch {
    /// Creates an empty scratch map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value, returning the previous value of the same type.
    pub fn insert<T: Send + Sync + 'static>(&mut self, value: T) -> Option<T> {
        self.entries
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|old| old.downcast().ok().map(|boxed| *boxed))
    }

    /// Returns the stored value of type `T`.
    #[must_use]
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Returns the stored value of type `T` mutably.
    pub fn get_mut<T: Send + Sync + 'static>(&mut self) -> Option<&mut T> {
        self.entries
            .get_mut(&TypeId::of::<T>())
            .and_then(|v| v.downcast_mut())
    }

    /// Removes and returns the stored value of type `T`.
    pub fn remove<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.entries
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok().map(|boxed| *boxed))
    }

    /// Returns true if a value of type `T` is stored.
    #[must_use]
    pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    /// Returns the number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Scratch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scratch")
            .field("entries", &self.entries.len())
            .finish()
    }
}
