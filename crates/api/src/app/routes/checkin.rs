use axum::body::{to_bytes, Body};
use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use checkin_core::CheckinCommand;

use crate::app::dto::CheckinRequest;
use crate::app::errors::{dispatch_error_to_response, unauthorized};
use crate::app::services::SharedCheckinService;

/// Largest check-in body accepted, in bytes.
pub const MAX_CHECKIN_BODY: usize = 10_000;

/// `PUT /mdm/checkin`
///
/// Body is a property list (XML or binary). The dispatcher is synchronous
/// and does blocking IO, so it runs on the blocking pool.
pub async fn checkin(
    Extension(service): Extension<SharedCheckinService>,
    body: Body,
) -> Response {
    let bytes = match to_bytes(body, MAX_CHECKIN_BODY).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::info!(error = %err, limit = MAX_CHECKIN_BODY, "check-in body unreadable");
            return unauthorized();
        }
    };

    let request = match CheckinRequest::from_plist(&bytes) {
        Ok(request) => request,
        Err(err) => {
            tracing::info!(error = %err, "check-in body is not a valid property list");
            return unauthorized();
        }
    };

    let command = CheckinCommand::from(request);
    tracing::debug!(message_type = %command.message_type, udid = %command.udid, "check-in received");

    match tokio::task::spawn_blocking(move || service.dispatch(command)).await {
        Ok(Ok(())) => StatusCode::OK.into_response(),
        Ok(Err(err)) => dispatch_error_to_response(err),
        Err(err) => {
            tracing::error!(error = %err, "check-in task failed");
            unauthorized()
        }
    }
}
