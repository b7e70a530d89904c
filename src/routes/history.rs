//! Validation history routes.

use axum::{
    extract::{Query, State},
    Json,
};

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::models::history::HistoryEntry;
use crate::models::page::{Page, PageQuery};
use crate::services::history as history_service;
use crate::AppState;

/// GET /api/v1/history - global history for admins, own history for staff.
pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<Page<HistoryEntry>>>, AppError> {
    let result = history_service::list_for(state.repo.as_ref(), &user, &query).await?;
    Ok(ApiResponse::success(result))
}
