//! In-memory talent sessions. Nothing here is persisted; a restart clears all
//! sessions.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::assessment::models::{AssessmentResult, Question};
use crate::errors::AppError;
use crate::recommendations::chat::{welcome_message, ChatMessage};

/// Form input for the profile step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TalentProfile {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub linkedin: String,
    pub cv_text: String,
}

impl TalentProfile {
    /// Email, name and CV text are mandatory.
    pub fn validate(&self) -> Result<(), AppError> {
        let missing: Vec<&str> = [
            ("email", &self.email),
            ("name", &self.name),
            ("cv_text", &self.cv_text),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(k, _)| k)
        .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "Required fields are empty: {}",
                missing.join(", ")
            )))
        }
    }
}

/// Outcome of mapping a profile to a PON TIK occupation.
#[derive(Debug, Clone, Serialize)]
pub struct OccupationMapping {
    pub occupation_id: String,
    pub occupation_name: String,
    pub match_score: f64,
    pub skill_gap: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletedAssessment {
    #[serde(flatten)]
    pub result: AssessmentResult,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct TalentSession {
    pub id: Uuid,
    pub profile: TalentProfile,
    /// Extracted entity text used for matching and job ranking.
    pub profile_text: String,
    pub mapping: OccupationMapping,
    pub questions: Option<Vec<Question>>,
    pub assessment: Option<CompletedAssessment>,
    pub chat_history: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TalentSession {
    pub fn new(profile: TalentProfile, profile_text: String, mapping: OccupationMapping) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            profile,
            profile_text,
            mapping,
            questions: None,
            assessment: None,
            chat_history: vec![welcome_message()],
            created_at: now,
            updated_at: now,
        }
    }

    /// The email doubles as the talent id.
    pub fn talent_id(&self) -> &str {
        &self.profile.email
    }

    /// Replaces the profile and mapping; questions and results belong to the
    /// old occupation and are discarded.
    pub fn remap(&mut self, profile: TalentProfile, profile_text: String, mapping: OccupationMapping) {
        self.profile = profile;
        self.profile_text = profile_text;
        self.mapping = mapping;
        self.questions = None;
        self.assessment = None;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Summary returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub talent_id: String,
    pub name: String,
    pub location: String,
    pub linkedin: String,
    #[serde(flatten)]
    pub mapping: OccupationMapping,
    pub questions_ready: bool,
    pub assessment: Option<CompletedAssessment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&TalentSession> for SessionSummary {
    fn from(s: &TalentSession) -> Self {
        Self {
            session_id: s.id,
            talent_id: s.talent_id().to_string(),
            name: s.profile.name.clone(),
            location: s.profile.location.clone(),
            linkedin: s.profile.linkedin.clone(),
            mapping: s.mapping.clone(),
            questions_ready: s.questions.is_some(),
            assessment: s.assessment.clone(),
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, TalentSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, session: TalentSession) -> Uuid {
        let id = session.id;
        self.inner.write().await.insert(id, session);
        id
    }

    pub async fn get(&self, id: Uuid) -> Result<TalentSession, AppError> {
        self.inner
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    /// Applies `f` to the session under the write lock.
    pub async fn update<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut TalentSession) -> R,
    ) -> Result<R, AppError> {
        let mut sessions = self.inner.write().await;
        let session = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;
        let out = f(session);
        session.touch();
        Ok(out)
    }

    pub async fn snapshot(&self) -> Vec<TalentSession> {
        self.inner.read().await.values().cloned().collect()
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {id} not found"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> TalentProfile {
        TalentProfile {
            email: "sari@mail.id".into(),
            name: "Sari".into(),
            location: "Bandung".into(),
            linkedin: String::new(),
            cv_text: "python sql".into(),
        }
    }

    fn mapping(id: &str) -> OccupationMapping {
        OccupationMapping {
            occupation_id: id.into(),
            occupation_name: "Data Analyst".into(),
            match_score: 0.5,
            skill_gap: "Tableau".into(),
        }
    }

    #[test]
    fn test_profile_validation_lists_missing_fields() {
        let mut p = profile();
        p.email = " ".into();
        p.cv_text = String::new();
        let err = p.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: Required fields are empty: email, cv_text"
        );
        assert!(profile().validate().is_ok());
    }

    #[tokio::test]
    async fn test_store_roundtrip_and_update() {
        let store = SessionStore::new();
        let id = store
            .insert(TalentSession::new(profile(), "python".into(), mapping("OK01")))
            .await;

        let session = store.get(id).await.unwrap();
        assert_eq!(session.talent_id(), "sari@mail.id");
        assert_eq!(session.chat_history.len(), 1);

        store
            .update(id, |s| s.questions = Some(vec![]))
            .await
            .unwrap();
        assert!(store.get(id).await.unwrap().questions.is_some());
    }

    #[test]
    fn test_remap_clears_assessment_state() {
        let mut session = TalentSession::new(profile(), "python".into(), mapping("OK01"));
        session.questions = Some(vec![]);
        session.remap(profile(), "docker".into(), mapping("OK02"));
        assert!(session.questions.is_none());
        assert_eq!(session.mapping.occupation_id, "OK02");
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let store = SessionStore::new();
        let err = store.get(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
