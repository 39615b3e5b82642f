use crate::{AppState, handlers::public};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints reachable without a session. These are the only pages a signed-out
/// browser ever sees; every blocked navigation ends on `/login`.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /
        // No landing page of its own; forwards to the login form.
        .route("/", get(public::root))
        // GET/POST /login
        // Credential form and the token exchange behind it.
        .route("/login", get(public::login_page).post(public::login))
        // GET/POST /register
        .route("/register", get(public::register_page).post(public::register))
        // GET|POST /logout
        // Clears the session cookies. Layouts submit it as a form; the GET form
        // keeps plain links working.
        .route("/logout", get(public::logout).post(public::logout))
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(public::health))
}
