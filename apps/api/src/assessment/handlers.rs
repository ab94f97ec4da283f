//! Axum route handlers for the assessment step.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::assessment::models::{Answers, AssessmentResult, PublicQuestion};
use crate::assessment::scoring::validate_assessment;
use crate::errors::AppError;
use crate::session::CompletedAssessment;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AssessmentQuestionsResponse {
    pub occupation_id: String,
    pub occupation_name: String,
    pub questions: Vec<PublicQuestion>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitAnswersRequest {
    pub answers: Answers,
}

/// POST /api/v1/sessions/:id/assessment
pub async fn handle_generate_assessment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AssessmentQuestionsResponse>, AppError> {
    let session = state.sessions.get(id).await?;
    let mapping = session.mapping.clone();

    let questions = match session.questions {
        Some(questions) => questions,
        None => {
            let occupation = state
                .reference
                .find_occupation(&mapping.occupation_id)
                .ok_or_else(|| {
                    AppError::NotFound(format!("Occupation {} not found", mapping.occupation_id))
                })?;
            let questions = state
                .question_generator
                .generate(occupation, state.config.question_count)
                .await?;

            state
                .sessions
                .update(id, |s| {
                    // The profile may have been re-mapped while the LLM was working.
                    if s.mapping.occupation_id != mapping.occupation_id {
                        warn!("Session {id} changed occupation during generation; questions discarded");
                        return Err(AppError::Conflict(
                            "Profile was re-mapped while questions were generated; retry"
                                .to_string(),
                        ));
                    }
                    // An overlapping request stored its set first; answers are scored against it.
                    if let Some(existing) = &s.questions {
                        debug!("Session {id}: questions already stored, discarding duplicate set");
                        return Ok(existing.clone());
                    }
                    info!("Session {id}: {} questions ready", questions.len());
                    s.questions = Some(questions.clone());
                    Ok(questions)
                })
                .await??
        }
    };

    Ok(Json(AssessmentQuestionsResponse {
        occupation_id: mapping.occupation_id,
        occupation_name: mapping.occupation_name,
        questions: questions.iter().map(PublicQuestion::from).collect(),
    }))
}

/// POST /api/v1/sessions/:id/assessment/submit
pub async fn handle_submit_assessment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SubmitAnswersRequest>,
) -> Result<Json<AssessmentResult>, AppError> {
    let result = state
        .sessions
        .update(id, |s| {
            let questions = s.questions.as_deref().ok_or_else(|| {
                AppError::Conflict("Generate the assessment before submitting answers".to_string())
            })?;
            let result = validate_assessment(&req.answers, questions);
            s.assessment = Some(CompletedAssessment {
                result: result.clone(),
                completed_at: Utc::now(),
            });
            Ok::<_, AppError>(result)
        })
        .await??;

    info!(
        "Session {id}: scored {} ({:?}), {}/{} correct",
        result.score, result.level, result.correct, result.total
    );
    Ok(Json(result))
}
