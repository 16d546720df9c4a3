use std::error::Error as StdError;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use vetrina_api_types::ErrorBody;

use crate::application::error::QueryError;

/// Diagnostics attached to a failing response for the logging middleware.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = vec![error.to_string()];
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    report: ErrorReport,
}

impl ApiError {
    pub fn new(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            status,
            message: message.into(),
            report: ErrorReport::from_message(source, status, detail),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn from_query(source: &'static str, error: QueryError) -> Self {
        match &error {
            QueryError::NotFound { message } => {
                let message = message.clone();
                Self {
                    status: StatusCode::NOT_FOUND,
                    report: ErrorReport::from_error(source, StatusCode::NOT_FOUND, &error),
                    message,
                }
            }
            QueryError::Transport { .. } => Self {
                status: StatusCode::BAD_GATEWAY,
                message: "Catalog unavailable".to_string(),
                report: ErrorReport::from_error(source, StatusCode::BAD_GATEWAY, &error),
            },
            QueryError::Validation(message) => {
                let message = message.clone();
                Self {
                    status: StatusCode::BAD_REQUEST,
                    report: ErrorReport::from_error(source, StatusCode::BAD_REQUEST, &error),
                    message,
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(ErrorBody::new(self.message))).into_response();
        self.report.attach(&mut response);
        response
    }
}
