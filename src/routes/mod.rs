pub mod applications;
pub mod extract;
pub mod health;
pub mod projects;
pub mod reviews;
pub mod users;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::error::Result;
use crate::middleware::{
    auth::require_auth,
    cors::cors_layer,
    rate_limit::{rps_middleware, RateLimiter},
};
use crate::AppState;

/// Upload limit plus room for the other form fields.
pub const MAX_BODY_BYTES: usize = 6 * 1024 * 1024;

/// Builds the full application router.
pub fn router(state: AppState) -> Result<Router> {
    let cors = cors_layer(&state.config.allowed_origin)?;

    let auth_api = Router::new()
        .route("/api/users/register", post(users::register))
        .route("/api/users/login", post(users::login))
        .layer(from_fn_with_state(
            RateLimiter::new(state.config.auth_rps),
            rps_middleware,
        ));

    let protected_api = Router::new()
        .route("/api/users/me", get(users::me).put(users::update_me))
        .route(
            "/api/users/:id",
            get(users::get_user).delete(users::delete_user),
        )
        .route("/api/users/:id/block", patch(users::toggle_block))
        .route(
            "/api/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/api/projects/:id",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route("/api/applications", post(applications::create_application))
        .route(
            "/api/applications/student",
            get(applications::list_student_applications),
        )
        .route(
            "/api/applications/project/:projectId",
            get(applications::list_project_applications),
        )
        .route(
            "/api/applications/:id",
            get(applications::get_application).delete(applications::delete_application),
        )
        .route(
            "/api/applications/:id/status",
            patch(applications::update_application_status),
        )
        .route("/api/reviews", post(reviews::create_review))
        .route(
            "/api/reviews/:id",
            get(reviews::get_review)
                .put(reviews::update_review)
                .delete(reviews::delete_review),
        )
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    tracing::info!(dir = %state.storage.root().display(), "serving uploads");
    let uploads = ServeDir::new(state.storage.root());

    let app = Router::new()
        .route("/health", get(health::health))
        .merge(auth_api)
        .merge(protected_api)
        .nest_service("/uploads", uploads)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    Ok(app)
}
