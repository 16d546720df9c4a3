//! Vetrina: the product catalog core of a storefront.
//!
//! Product listings are filtered, sorted and paginated by the query service,
//! cached with stale-while-revalidate semantics, and orchestrated by the
//! products pipeline that owns the visible state.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
