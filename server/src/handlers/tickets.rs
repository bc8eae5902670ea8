use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;

use crate::models::{CreateTicketRequest, ExitTicketRequest, TicketResponse};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, ok};

pub async fn create_ticket(
    State(state): State<AppState>,
    payload: Result<Json<CreateTicketRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload?;
    let ticket = state
        .tickets
        .enter(&request.license_plate, &request.vehicle_type)
        .await?;
    Ok(created(TicketResponse::from(ticket)))
}

pub async fn get_ticket(
    State(state): State<AppState>,
    Path(ticket_number): Path<String>,
) -> Result<Response, AppError> {
    let ticket = state.tickets.get_by_number(&ticket_number).await?;
    Ok(ok(TicketResponse::from(ticket)))
}

pub async fn process_exit(
    State(state): State<AppState>,
    Path(ticket_number): Path<String>,
    payload: Result<Json<ExitTicketRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload?;
    let ticket = state
        .tickets
        .exit(&ticket_number, &request.payment_method)
        .await?;
    Ok(ok(TicketResponse::from(ticket)))
}
