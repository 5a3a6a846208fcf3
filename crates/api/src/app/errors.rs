use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use tally_core::DomainError;

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let status = match &err {
        DomainError::UnknownMember { .. }
        | DomainError::Validation(_)
        | DomainError::InvalidId(_) => StatusCode::BAD_REQUEST,
        DomainError::ShareMismatch { .. }
        | DomainError::BalanceConservation { .. }
        | DomainError::Overflow(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    json_error(status, err.code(), err.to_string())
}

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
