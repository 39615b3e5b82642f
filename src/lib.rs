use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    response::Redirect,
};

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Remote education API client, its mock, and typed endpoint wrappers.
pub mod api;
pub mod config;
// Route guard: the access decision and the middleware enforcing it.
pub mod guard;
pub mod handlers;
pub mod models;
pub mod render;
// Client-held session triple and the `Role` enum.
pub mod session;

// Module for routing segregation (Public, Teacher, Student, Admin).
pub mod routes;
use routes::{admin, public, student, teacher};

// --- Public Re-exports ---

pub use api::{ApiState, HttpEduApi, MockEduApi};
pub use config::AppConfig;
pub use session::{Role, Session};

/// AppState
///
/// Implements the **Unified State Pattern**. The single, thread-safe, immutable
/// container shared by every request: the remote API client and the loaded
/// configuration. The portal keeps no other server-side state.
#[derive(Clone)]
pub struct AppState {
    /// Remote API Layer: the only way any handler reaches the education service.
    pub api: ApiState,
    /// Configuration: The loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// Handlers pull only the component they need out of the shared AppState.

impl FromRef<AppState> for ApiState {
    fn from_ref(app_state: &AppState) -> ApiState {
        app_state.api.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the portal's routing structure, applies global and scoped
/// middleware, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Public Routes: No guard applied.
        .merge(public::public_routes())
        // Role Routes: each subtree carries its own guard layer (see routes/).
        .nest("/teacher", teacher::teacher_routes())
        .nest("/student", student::student_routes())
        .nest("/admin", admin::admin_routes())
        // Anything outside the known subtrees goes to the login page.
        .fallback(|| async { Redirect::to(guard::LOGIN_PATH) })
        // Apply the Unified State to all routes.
        .with_state(state);

    // 3. Observability and Correlation Layers (Applied outermost/first)
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID Generation: a unique UUID for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request Tracing: wraps the request/response lifecycle in a span
                // carrying the generated request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID Propagation: returns the x-request-id header to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Helper used by `TraceLayer` to build the request span. It includes the
/// `x-request-id` header (if present) alongside the HTTP method and path. The
/// query string is left out because it can carry user-entered text.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        path = %request.uri().path(),
        req_id = %request_id,
    )
}
