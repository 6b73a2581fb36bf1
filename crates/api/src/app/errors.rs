//! Failure responses.
//!
//! Devices get no detail about why a check-in was refused: every failure is
//! `401 Unauthorized` with an empty body. The cause goes to the log instead.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use checkin_infra::command_dispatcher::DispatchError;

pub fn unauthorized() -> Response {
    StatusCode::UNAUTHORIZED.into_response()
}

pub fn dispatch_error_to_response(err: DispatchError) -> Response {
    if err.is_internal() {
        tracing::error!(error = %err, archived = err.was_archived(), "check-in failed");
    } else {
        tracing::info!(error = %err, "check-in rejected");
    }
    unauthorized()
}
