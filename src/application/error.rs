use thiserror::Error;

use crate::{config::LoadError, domain::error::DomainError, infra::error::InfraError};

pub const PRODUCT_NOT_FOUND: &str = "Product not found";

/// Failures of a catalog query, propagated unchanged by the query service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("{message}")]
    NotFound { message: String },
    #[error("transport failure{}: {message}", status_suffix(.status))]
    Transport {
        status: Option<u16>,
        message: String,
    },
    /// Reserved: malformed filters are normalised rather than rejected.
    #[error("invalid query: {0}")]
    Validation(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status
        .map(|code| format!(" (status {code})"))
        .unwrap_or_default()
}

impl QueryError {
    pub fn product_not_found() -> Self {
        Self::NotFound {
            message: PRODUCT_NOT_FOUND.to_string(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Transport {
            status,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Config(#[from] LoadError),
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}
