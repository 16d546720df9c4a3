//! Catalog filter specification and its canonical serialization.
//!
//! A [`FilterSpec`] identifies exactly one catalog query. Its canonical form
//! (`page=..&page_size=..&min_rating=..&ordering=..`) is both the cache key
//! and the query string sent over the wire, so field order is fixed.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_MIN_RATING: f64 = 0.0;
pub const MAX_MIN_RATING: f64 = 5.0;
pub const DEFAULT_ORDERING: &str = "-created_at";

/// Field a catalog query sorts on, resolved from the ordering string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Name,
    Price,
    CreatedAt,
    Image,
    AvgRating,
    /// A name that matches no projected field. Every row compares equal.
    Unknown,
}

impl SortField {
    fn resolve(name: &str) -> Self {
        match name {
            "id" => Self::Id,
            "name" => Self::Name,
            "price" => Self::Price,
            "created_at" => Self::CreatedAt,
            "image" => Self::Image,
            "rating" | "avg_rating" => Self::AvgRating,
            _ => Self::Unknown,
        }
    }
}

/// Ordering string such as `-price` or `rating`.
///
/// The raw field name is kept verbatim so the wire form round-trips.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct SortOrder {
    field: String,
    descending: bool,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::default();
        }
        match trimmed.strip_prefix('-') {
            Some(field) => Self {
                field: field.to_string(),
                descending: true,
            },
            None => Self {
                field: trimmed.to_string(),
                descending: false,
            },
        }
    }

    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }

    pub fn field_name(&self) -> &str {
        &self.field
    }

    pub fn field(&self) -> SortField {
        SortField::resolve(&self.field)
    }

    pub fn is_descending(&self) -> bool {
        self.descending
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::descending("created_at")
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            write!(f, "-{}", self.field)
        } else {
            f.write_str(&self.field)
        }
    }
}

impl From<String> for SortOrder {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<SortOrder> for String {
    fn from(value: SortOrder) -> Self {
        value.to_string()
    }
}

/// The canonical set of parameters of one catalog query.
///
/// Equality and hashing go through [`FilterSpec::canonical`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterSpec {
    page: u32,
    page_size: u32,
    min_rating: f64,
    ordering: SortOrder,
}

impl FilterSpec {
    /// First page, no rating floor, newest first.
    pub fn new(page_size: u32) -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: page_size.max(1),
            min_rating: DEFAULT_MIN_RATING,
            ordering: SortOrder::default(),
        }
    }

    /// Build a spec from loosely typed parameters, substituting defaults for
    /// anything missing or malformed.
    pub fn from_params(
        page: Option<&str>,
        page_size: Option<&str>,
        min_rating: Option<&str>,
        ordering: Option<&str>,
        default_page_size: u32,
    ) -> Self {
        let mut spec = Self::new(default_page_size);
        if let Some(page) = page.and_then(|raw| raw.trim().parse::<u32>().ok()) {
            spec = spec.with_page(page);
        }
        if let Some(size) = page_size.and_then(|raw| raw.trim().parse::<u32>().ok()) {
            spec = spec.with_page_size_or(size, default_page_size);
        }
        if let Some(rating) = min_rating.and_then(|raw| raw.trim().parse::<f64>().ok()) {
            spec = spec.with_min_rating(rating);
        }
        if let Some(ordering) = ordering {
            spec = spec.with_ordering(SortOrder::parse(ordering));
        }
        spec
    }

    /// Set the 1-indexed page; zero is treated as the first page.
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(DEFAULT_PAGE);
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn with_page_size_or(mut self, page_size: u32, fallback: u32) -> Self {
        self.page_size = if page_size == 0 {
            fallback.max(1)
        } else {
            page_size
        };
        self
    }

    /// Set the rating floor, clamped to `[0, 5]`; non-finite input resets it.
    pub fn with_min_rating(mut self, min_rating: f64) -> Self {
        let clamped = if min_rating.is_finite() {
            min_rating.clamp(DEFAULT_MIN_RATING, MAX_MIN_RATING)
        } else {
            DEFAULT_MIN_RATING
        };
        // -0.0 would otherwise leak into the canonical form as "-0".
        self.min_rating = if clamped == 0.0 {
            DEFAULT_MIN_RATING
        } else {
            clamped
        };
        self
    }

    pub fn with_ordering(mut self, ordering: SortOrder) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn min_rating(&self) -> f64 {
        self.min_rating
    }

    pub fn ordering(&self) -> &SortOrder {
        &self.ordering
    }

    /// Deterministic serialization used for cache keys and query strings.
    pub fn canonical(&self) -> String {
        format!(
            "page={}&page_size={}&min_rating={}&ordering={}",
            self.page, self.page_size, self.min_rating, self.ordering
        )
    }

    /// Query parameters in canonical order, ready for a URL builder.
    pub fn query_pairs(&self) -> [(&'static str, String); 4] {
        [
            ("page", self.page.to_string()),
            ("page_size", self.page_size.to_string()),
            ("min_rating", self.min_rating.to_string()),
            ("ordering", self.ordering.to_string()),
        ]
    }
}

impl PartialEq for FilterSpec {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for FilterSpec {}

impl Hash for FilterSpec {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}
