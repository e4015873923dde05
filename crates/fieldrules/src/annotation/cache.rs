//! Parsed-annotation cache
//!
//! Annotations belong to a record *type*, so each one is parsed once per
//! `(owner type, field index, annotation kind)` and shared by every later
//! walk over any instance of that type. Entries are never invalidated.

use std::any::TypeId;
use std::sync::Arc;

use dashmap::DashMap;

use super::{ParsedRule, parse_annotation};

/// Which annotation of a field a cache entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
    /// Rules applied to the field value.
    Validate,
    /// Rules applied to every element or map value.
    ValidateElem,
    /// Rules applied to every map key.
    ValidateKey,
}

/// Cache key: owning record type, field position and annotation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnnotationKey {
    pub owner: TypeId,
    pub field: usize,
    pub kind: AnnotationKind,
}

impl AnnotationKey {
    /// Creates a new key.
    #[must_use]
    pub fn new(owner: TypeId, field: usize, kind: AnnotationKind) -> Self {
        Self { owner, field, kind }
    }
}

/// Concurrent, forward-only cache of parsed annotations.
#[derive(Debug, Default)]
pub struct AnnotationCache {
    entries: DashMap<AnnotationKey, Arc<[ParsedRule]>>,
}

impl AnnotationCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached rule list, if present.
    #[must_use]
    pub fn get(&self, key: &AnnotationKey) -> Option<Arc<[ParsedRule]>> {
        self.entries.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Stores a parsed rule list, replacing nothing if already present.
    pub fn put(&self, key: AnnotationKey, parsed: Vec<ParsedRule>) -> Arc<[ParsedRule]> {
        let entry = self.entries.entry(key).or_insert_with(|| Arc::from(parsed));
        Arc::clone(entry.value())
    }

    /// Returns the cached rule list, parsing and storing `raw` on a miss.
    pub fn get_or_parse(&self, key: AnnotationKey, raw: &str) -> Arc<[ParsedRule]> {
        if let Some(hit) = self.get(&key) {
            return hit;
        }
        tracing::trace!(field = key.field, kind = ?key.kind, annotation = raw, "annotation cache miss");
        self.put(key, parse_annotation(raw))
    }

    /// Returns the number of cached annotations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
