use axum::{extract::State, Json};

use crate::dashboard::aggregate::{build_dashboard, DashboardReport};
use crate::errors::AppError;
use crate::state::AppState;

/// GET /api/v1/dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
) -> Result<Json<DashboardReport>, AppError> {
    let sessions = state.sessions.snapshot().await;
    Ok(Json(build_dashboard(&state.reference, &sessions)))
}
