//! Newtype wrappers for semantic IDs
//!
//! Keeps preview document identifiers from being confused with the other
//! free-form strings (titles, filenames) that travel alongside them.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// Identifies one open preview document. Cache entries are scoped by it.
#[derive(Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct DocumentId(Arc<str>);

impl DocumentId {
    /// Creates a new DocumentId from a string
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation of this document ID
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for DocumentId {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
