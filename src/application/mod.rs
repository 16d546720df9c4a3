//! Application services layer.

pub mod error;
pub mod pagination;
pub mod pipeline;
pub mod query;
pub mod repos;
