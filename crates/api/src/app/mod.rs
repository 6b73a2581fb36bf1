//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: infrastructure wiring (archive, publisher, dispatcher)
//! - `routes/`: HTTP handlers
//! - `dto.rs`: property-list request body and mapping to commands
//! - `errors.rs`: failure responses

use axum::{
    routing::{get, put},
    Extension, Router,
};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::SharedCheckinService;

/// Build the HTTP router around an already wired check-in service.
pub fn build_app(service: SharedCheckinService) -> Router {
    Router::new()
        .route("/mdm/checkin", put(routes::checkin::checkin))
        .route("/health", get(routes::system::health))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::log_requests))
                .layer(Extension(service)),
        )
}
