/**
 * Error Conversion
 *
 * `IntoResponse` for `BackendError`, so handlers can return it directly.
 *
 * # Response Format
 *
 * Conflicts carry the authoritative row:
 * ```json
 * {"error": "Conflict detected", "currentVersion": 4, "currentTask": {...}}
 * ```
 *
 * Everything else:
 * ```json
 * {"error": "Error message", "status": 400}
 * ```
 */

use axum::{
    response::{IntoResponse, Response},
    Json,
};

use crate::backend::error::types::BackendError;
use crate::shared::conflict::ConflictReport;

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        match self {
            BackendError::Conflict(current) => {
                (status, Json(ConflictReport::new(*current))).into_response()
            }
            other => {
                let body = serde_json::json!({
                    "error": other.message(),
                    "status": status.as_u16(),
                });
                (status, Json(body)).into_response()
            }
        }
    }
}
