use axum::{Router, middleware, routing::get};
use tower_http::trace::TraceLayer;

use crate::{
    cors::{OriginPolicy, reject_disallowed_origin},
    handlers::{create_movie, delete_movie, get_movie, healthcheck, list_movies, update_movie},
    state::AppState,
};

/// Router with the default origin allow-list.
pub fn build_router(state: AppState) -> Router {
    build_router_with_policy(state, OriginPolicy::default())
}

pub fn build_router_with_policy(state: AppState, policy: OriginPolicy) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/movies", get(list_movies).post(create_movie))
        .route(
            "/movies/:id",
            get(get_movie).patch(update_movie).delete(delete_movie),
        )
        .layer(policy.cors_layer())
        .layer(middleware::from_fn_with_state(
            policy,
            reject_disallowed_origin,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
