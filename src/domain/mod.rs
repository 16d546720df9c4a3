//! Domain layer types and invariants.

pub mod error;
pub mod filters;
pub mod product;
pub mod seed;
