//! Cache key definitions.

use std::fmt;

use crate::domain::filters::FilterSpec;

/// Identifies one cached product list. Two filter sets map to the same key
/// exactly when they are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn for_filters(filters: &FilterSpec) -> Self {
        Self(filters.canonical())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&FilterSpec> for CacheKey {
    fn from(filters: &FilterSpec) -> Self {
        Self::for_filters(filters)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
