//! Infrastructure adapters and runtime bootstrap.

pub mod error;
pub mod http;
pub mod memory;
pub mod remote;
pub mod telemetry;
pub mod wire;
