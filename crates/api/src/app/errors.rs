use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use adminhub_infra::{StoreError, VisibilityError};

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::Unavailable(msg) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", msg)
        }
        other @ (StoreError::Query { .. } | StoreError::Decode { .. }) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", other.to_string())
        }
    }
}

pub fn visibility_error_to_response(err: VisibilityError) -> axum::response::Response {
    match err {
        VisibilityError::Load(e) => store_error_to_response(e),
        VisibilityError::Save(msg) => json_error(StatusCode::BAD_GATEWAY, "save_failed", msg),
        VisibilityError::Invalid(e) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string())
        }
    }
}

pub fn bad_request(code: &'static str, message: impl Into<String>) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, code, message)
}
