use axum::{extract::State, Json};

use crate::models::{JobPosting, Occupation};
use crate::state::AppState;

/// GET /api/v1/occupations
pub async fn handle_list_occupations(State(state): State<AppState>) -> Json<Vec<Occupation>> {
    Json(state.reference.occupations.clone())
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(State(state): State<AppState>) -> Json<Vec<JobPosting>> {
    Json(state.reference.job_postings.clone())
}
