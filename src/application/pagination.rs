//! Offset pagination over an already filtered and sorted row set.

use serde::{Deserialize, Serialize};

use crate::domain::product::ProductSummary;

/// One page of results plus the size of the full matching set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultPage<T = ProductSummary> {
    pub count: u64,
    pub results: Vec<T>,
}

impl<T> ResultPage<T> {
    pub fn empty() -> Self {
        Self {
            count: 0,
            results: Vec::new(),
        }
    }

    pub fn new(count: u64, results: Vec<T>) -> Self {
        Self { count, results }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

impl<T> Default for ResultPage<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Slice `rows` into the 1-indexed `page` of `page_size` rows.
///
/// `count` is always the full row count. A page past the end is empty rather
/// than an error. Page 0 is read as page 1 and a zero page size yields an
/// empty page.
pub fn paginate<T>(rows: Vec<T>, page: u32, page_size: u32) -> ResultPage<T> {
    let count = rows.len() as u64;
    let size = page_size as usize;
    let start = (page.max(1) as usize - 1).saturating_mul(size);
    let results = rows.into_iter().skip(start).take(size).collect();
    ResultPage { count, results }
}
