use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::Response;
use serde::Deserialize;

use crate::models::{ActivityResponse, GarageStatsResponse};
use crate::services::occupancy::DEFAULT_ACTIVITY_LIMIT;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::ok;

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<u32>,
}

pub async fn garage_stats(State(state): State<AppState>) -> Result<Response, AppError> {
    let stats = state.occupancy.get_stats().await?;
    Ok(ok(GarageStatsResponse::from(stats)))
}

pub async fn recent_activities(
    State(state): State<AppState>,
    query: Result<Query<ActivityQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query?;
    let activities: Vec<ActivityResponse> = state
        .occupancy
        .list_recent_activity(query.limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT))
        .await?
        .into_iter()
        .map(ActivityResponse::from)
        .collect();
    Ok(ok(activities))
}
