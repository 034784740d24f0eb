//! Session-gated admin routes.

mod metrics;
mod posts;

use axum::{
    Router, middleware as axum_middleware,
    routing::get,
};

use super::HttpState;
use super::auth::require_admin;

pub fn build_admin_router(state: HttpState) -> Router<HttpState> {
    Router::new()
        .route(
            "/api/admin/posts",
            get(posts::list_posts).post(posts::create_post),
        )
        .route(
            "/api/admin/posts/{id}",
            get(posts::get_post)
                .patch(posts::update_post)
                .delete(posts::delete_post),
        )
        .route(
            "/api/admin/metrics",
            get(metrics::show_metrics).post(metrics::run_action),
        )
        .route_layer(axum_middleware::from_fn_with_state(state, require_admin))
}
