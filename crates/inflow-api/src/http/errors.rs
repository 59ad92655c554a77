//! API error wrapper rendering the `{"error": "..."}` body shape.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Structured API error carrying the response status and a human-readable
/// message that echoes the underlying cause.
#[derive(Debug)]
pub(crate) struct ApiError {
    pub(crate) status: StatusCode,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub(crate) fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// Render an error and its source chain as a single `: `-joined string, so
/// responses echo the underlying cause the way the callers expect.
pub(crate) fn describe(err: &dyn std::error::Error) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn describe_joins_the_source_chain() {
        let err = inflow_fsops::FsOpsError::Io {
            operation: "destination.create",
            path: "/tmp/out.bin".into(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };
        let rendered = describe(&err);
        assert!(rendered.starts_with("fsops io failure"));
        assert!(rendered.contains("permission denied"));
    }

    #[test]
    fn constructors_set_expected_status() {
        assert_eq!(
            ApiError::bad_request("missing").status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::internal("broken").status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
