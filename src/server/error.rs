use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::BeinError;

impl BeinError {
    /// Status the API answers with for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            BeinError::InvalidUrl(_) | BeinError::InvalidWeek(_) => StatusCode::BAD_REQUEST,
            BeinError::VideoNotFound { .. } => StatusCode::NOT_FOUND,
            BeinError::ClientBuild(_)
            | BeinError::Http { .. }
            | BeinError::UnexpectedStatus { .. }
            | BeinError::ResponseBody { .. }
            | BeinError::Selector(_)
            | BeinError::DataBlobNotFound { .. }
            | BeinError::MalformedData { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message sent to API callers. Upstream and internal failures get a
    /// fixed text; the full error only goes to the log.
    pub fn public_message(&self) -> String {
        match self {
            BeinError::Http { .. }
            | BeinError::UnexpectedStatus { .. }
            | BeinError::ResponseBody { .. } => "failed to fetch the upstream page".to_string(),
            BeinError::DataBlobNotFound { .. } | BeinError::MalformedData { .. } => {
                "upstream page structure changed".to_string()
            }
            BeinError::ClientBuild(_) | BeinError::Selector(_) => "internal error".to_string(),
            BeinError::InvalidUrl(_)
            | BeinError::InvalidWeek(_)
            | BeinError::VideoNotFound { .. } => self.to_string(),
        }
    }
}

impl IntoResponse for BeinError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, %status, "request rejected");
        }

        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}
