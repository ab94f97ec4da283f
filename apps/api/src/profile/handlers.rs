//! Axum route handlers for CV intake and talent sessions.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::profile::cv_parser::{extract_cv_text, parse_cv_data, ParsedCv};
use crate::profile::map_profile;
use crate::session::{SessionSummary, TalentProfile, TalentSession};
use crate::state::AppState;

/// Multipart field carrying the CV file.
const CV_FIELD: &str = "cv";

/// POST /api/v1/profile/extract
pub async fn handle_extract_cv(mut multipart: Multipart) -> Result<Json<ParsedCv>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(CV_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;

        let text = extract_cv_text(&filename, content_type.as_deref(), &bytes)?;
        info!("Extracted {} characters from '{filename}'", text.len());
        return Ok(Json(parse_cv_data(&text)));
    }
    Err(AppError::Validation(format!(
        "Multipart field '{CV_FIELD}' is required"
    )))
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
    Json(profile): Json<TalentProfile>,
) -> Result<(StatusCode, Json<SessionSummary>), AppError> {
    profile.validate()?;
    let (profile_text, mapping) = map_profile(&state.matcher, &profile.cv_text)?;
    info!(
        "Talent {} mapped to {} ({:.3})",
        profile.email, mapping.occupation_id, mapping.match_score
    );

    let session = TalentSession::new(profile, profile_text, mapping);
    let summary = SessionSummary::from(&session);
    state.sessions.insert(session).await;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSummary>, AppError> {
    let session = state.sessions.get(id).await?;
    Ok(Json(SessionSummary::from(&session)))
}

/// PUT /api/v1/sessions/:id/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(profile): Json<TalentProfile>,
) -> Result<Json<SessionSummary>, AppError> {
    profile.validate()?;
    let (profile_text, mapping) = map_profile(&state.matcher, &profile.cv_text)?;
    let summary = state
        .sessions
        .update(id, |s| {
            s.remap(profile, profile_text, mapping);
            SessionSummary::from(&*s)
        })
        .await?;
    info!("Session {id} re-mapped to {}", summary.mapping.occupation_id);
    Ok(Json(summary))
}
