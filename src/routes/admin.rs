use crate::{
    AppState,
    guard::{self, ADMIN_ROLES},
    handlers::admin,
    session::Role,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    response::Redirect,
    routing::{get, post},
};

/// Largest document the library upload form accepts.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Admin Router Module
///
/// Moderation and oversight: users, courseware sharing and editing, and the
/// public document library. Nested under `/admin`.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::dashboard))
        .route("/dashboard", get(admin::dashboard))
        // --- Users ---
        // GET /admin/users?role=student|teacher|admin
        .route("/users", get(admin::users))
        .route("/users/{uid}/delete", post(admin::delete_user))
        // --- Coursewares ---
        .route("/coursewares", get(admin::coursewares))
        .route("/coursewares/{cid}/share", post(admin::share_courseware))
        .route(
            "/coursewares/{cid}/edit",
            get(admin::edit_courseware).post(admin::update_courseware),
        )
        .route("/coursewares/{cid}/pdf", get(admin::courseware_pdf))
        // --- Public Document Library ---
        // The upload route lifts the default 2 MB body cap.
        .route(
            "/public_docs",
            get(admin::public_docs)
                .post(admin::upload_public_doc)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/public_docs/{id}/delete", post(admin::delete_public_doc))
        // Unknown sub-paths land on the overview.
        .fallback(|| async { Redirect::to(Role::Admin.default_page()) })
        // A known path requested with the wrong method goes the same way.
        .method_not_allowed_fallback(|| async { Redirect::to(Role::Admin.default_page()) })
        .layer(middleware::from_fn_with_state(ADMIN_ROLES, guard::require_roles))
}
