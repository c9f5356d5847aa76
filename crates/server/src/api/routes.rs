use axum::{
    http::HeaderName,
    middleware,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::middleware::{metrics_middleware, session_middleware, SESSION_HEADER};
use super::{handlers, session, tickets};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let session_layer = middleware::from_fn_with_state(Arc::clone(&state), session_middleware);

    // Routes that act on a session; other routes never create one
    let session_routes = Router::new()
        // Tickets
        .route(
            "/tickets",
            post(tickets::create_ticket).get(tickets::list_tickets),
        )
        .route(
            "/tickets/{id}",
            patch(tickets::update_status).delete(tickets::delete_ticket),
        )
        // Session
        .route("/session/login", post(session::login))
        .route("/session/logout", post(session::logout))
        .route_layer(session_layer.clone());

    // Ending a session must not start one, so DELETE skips the middleware
    let session_root = get(session::get_session)
        .route_layer(session_layer)
        .delete(session::end_session);

    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/options", get(handlers::options))
        .route("/session", session_root)
        .merge(session_routes);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static(SESSION_HEADER)]);

    Router::new()
        .route("/metrics", get(handlers::metrics))
        .nest("/api/v1", api_routes)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
