pub mod chat;
pub mod middleware;
pub mod protocol;
pub mod rest;
pub mod state;

use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderName, HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ApiError;
use middleware::{require_account, require_faculty, PROFILE_HEADER, USER_EMAIL_HEADER};
use rest::*;
use state::AppState;

/// Builds the complete application: API routes, CORS and the Swagger UI.
pub fn create_router(app_state: Arc<AppState>) -> Result<Router, ApiError> {
    let origin = app_state
        .config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| ApiError::Internal(format!("invalid CORS origin: {}", e)))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            CONTENT_TYPE,
            ACCEPT,
            HeaderName::from_static(USER_EMAIL_HEADER),
            HeaderName::from_static(PROFILE_HEADER),
        ]);

    // Public routes (no account required)
    let public_routes = Router::new()
        .route("/resources", get(list_resources_handler))
        .route("/pyqs", get(list_pyqs_handler))
        .route("/pyqs/facets", get(pyq_facets_handler))
        .route("/labels", get(labels_handler))
        .route("/bookmarks", get(list_bookmarks_handler))
        .route("/bookmarks/{id}", post(toggle_bookmark_handler))
        .route("/submissions/approved", get(approved_submissions_handler))
        // POST takes a resource id; GET and DELETE take the preview id it returned.
        .route(
            "/previews/{id}",
            post(open_preview_handler)
                .get(preview_status_handler)
                .delete(close_preview_handler),
        )
        .route("/chat", post(chat::chat_handler))
        .route("/admin/seed-users", post(seed_users_handler));

    // Any signed-in account
    let account_routes = Router::new()
        .route("/submissions", post(create_submission_handler))
        .route("/submissions/mine", get(my_submissions_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_account,
        ));

    // Teachers and admins
    let faculty_routes = Router::new()
        .route("/submissions", get(list_submissions_handler))
        .route("/submissions/stats", get(submission_stats_handler))
        .route("/submissions/{id}/approve", post(approve_submission_handler))
        .route("/submissions/{id}/reject", post(reject_submission_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_faculty,
        ));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(account_routes)
        .merge(faculty_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state);

    Ok(Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())))
}
