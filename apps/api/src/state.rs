use std::sync::Arc;

use crate::assessment::generator::QuestionGenerator;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::profile::matcher::OccupationMatcher;
use crate::session::SessionStore;
use crate::workbook::reference::ReferenceData;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Workbook contents, read once at startup.
    pub reference: Arc<ReferenceData>,
    /// TF-IDF model fitted over the occupation table.
    pub matcher: Arc<OccupationMatcher>,
    pub sessions: SessionStore,
    /// Pluggable question source. Default: GeminiQuestionGenerator.
    pub question_generator: Arc<dyn QuestionGenerator>,
    pub llm: LlmClient,
    pub config: Config,
}
