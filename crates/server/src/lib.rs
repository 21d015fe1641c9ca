//! Issue Tracker REST API Server Library
//!
//! Provides the HTTP surface of the issue tracker: project-scoped issue
//! create/list/update/delete under `/api`, plus health and project listing.

pub mod extract;
pub mod routes;

use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracker::{IssueService, IssueStore};

// Re-export for convenience
pub use routes::create_routes;

/// Build the full application: API routes nested under `/api`, optional
/// permissive CORS, and per-request tracing.
pub fn build_app<S: IssueStore + 'static>(
    service: Arc<IssueService<S>>,
    cors: bool,
) -> Router {
    let mut app = Router::new().nest("/api", create_routes(service));

    if cors {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    app.layer(TraceLayer::new_for_http())
}
