use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer, Config};
use crate::handlers::{
    create_ticket, garage_stats, get_ticket, health_check, process_exit, recent_activities,
    route_not_found,
};
use crate::state::AppState;

pub fn create_routes(state: AppState, config: &Config) -> Router {
    let api = Router::new()
        .route("/status", get(health_check))
        .route("/garage/stats", get(garage_stats))
        .route("/tickets", post(create_ticket))
        .route("/tickets/:ticket_number", get(get_ticket))
        .route("/tickets/:ticket_number/exit", put(process_exit))
        .route("/activities", get(recent_activities));

    Router::new()
        .nest("/api", api)
        .fallback(route_not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer(config.production))
        .layer(create_cors_layer(config.cors_allowed_origins.as_deref()))
}
