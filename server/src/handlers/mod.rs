use axum::response::Response;
use serde::Serialize;

use crate::utils::error::AppError;
use crate::utils::response::ok;

pub mod garage;
pub mod tickets;

pub use garage::{garage_stats, recent_activities};
pub use tickets::{create_ticket, get_ticket, process_exit};

#[derive(Serialize)]
struct StatusPayload {
    status: &'static str,
}

pub async fn health_check() -> Response {
    ok(StatusPayload { status: "ok" })
}

pub async fn route_not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}
