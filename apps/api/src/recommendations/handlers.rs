//! Axum route handlers for recommendations and the career chat.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::recommendations::chat::{career_reply, welcome_message, ChatMessage, ChatRole};
use crate::recommendations::engine::{get_recommendations, Recommendations};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub history: Vec<ChatMessage>,
}

/// GET /api/v1/sessions/:id/recommendations
pub async fn handle_recommendations(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Recommendations>, AppError> {
    let session = state.sessions.get(id).await?;
    if session.assessment.is_none() {
        return Err(AppError::Conflict(
            "Complete the assessment before requesting recommendations".to_string(),
        ));
    }

    let recommendations = get_recommendations(
        &state.reference.job_postings,
        &session.mapping.skill_gap,
        &session.profile_text,
        &mut rand::thread_rng(),
    );
    info!(
        "Session {id}: {} jobs, {} trainings recommended",
        recommendations.jobs.len(),
        recommendations.trainings.len()
    );
    Ok(Json(recommendations))
}

/// POST /api/v1/sessions/:id/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let message = req.message.trim().to_string();
    if message.is_empty() {
        return Err(AppError::Validation("Message must not be empty".to_string()));
    }

    let question = ChatMessage::new(ChatRole::User, message.clone());
    let mut context = state.sessions.get(id).await?.chat_history;
    context.push(question.clone());

    // Both turns are recorded together once the reply arrives.
    let reply = career_reply(&state.llm, &message, &context).await?;

    let history = state
        .sessions
        .update(id, |s| {
            s.chat_history.push(question);
            s.chat_history
                .push(ChatMessage::new(ChatRole::Ai, reply.clone()));
            s.chat_history.clone()
        })
        .await?;
    debug!("Session {id}: chat history at {} messages", history.len());

    Ok(Json(ChatResponse { reply, history }))
}

/// DELETE /api/v1/sessions/:id/chat
pub async fn handle_reset_chat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ChatMessage>>, AppError> {
    let history = state
        .sessions
        .update(id, |s| {
            s.chat_history = vec![welcome_message()];
            s.chat_history.clone()
        })
        .await?;
    Ok(Json(history))
}
