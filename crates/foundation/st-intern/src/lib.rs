//! Name interning shared by every lowering pass of a module
//!
//! `ThreadedRodeo` is already safe to share, so parallel passes hold clones
//! of the same [`Interner`] and intern without an outer lock.

pub use lasso::Spur as Name;
use lasso::ThreadedRodeo;
use std::fmt;
use std::sync::Arc;

/// Thread-safe string interner
#[derive(Clone)]
pub struct Interner {
    inner: Arc<ThreadedRodeo>,
}

impl Interner {
    /// Create an empty interner
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ThreadedRodeo::new()),
        }
    }

    /// Intern `text`, returning the existing handle if it was seen before
    pub fn intern(&self, text: &str) -> Name {
        self.inner.get_or_intern(text)
    }

    /// Look up an already interned string without inserting it
    pub fn get(&self, text: &str) -> Option<Name> {
        self.inner.get(text)
    }

    /// Text of an interned name
    pub fn resolve(&self, name: Name) -> &str {
        self.inner.resolve(&name)
    }

    /// Text of a name that may come from another interner
    pub fn try_resolve(&self, name: Name) -> Option<&str> {
        self.inner.try_resolve(&name)
    }

    /// Number of distinct names interned so far
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether nothing has been interned yet
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Interner {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Interner")
            .field("names", &self.inner.len())
            .finish()
    }
}
