use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Number of answer options every question must carry.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// A validated multiple-choice question. Wire names match the JSON the LLM
/// is asked to produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(rename = "teks")]
    pub text: String,
    #[serde(rename = "opsi")]
    pub options: Vec<String>,
    #[serde(rename = "jawaban_benar")]
    pub correct_answer: String,
}

/// What the talent sees: the question without its answer.
#[derive(Debug, Clone, Serialize)]
pub struct PublicQuestion {
    pub id: String,
    #[serde(rename = "teks")]
    pub text: String,
    #[serde(rename = "opsi")]
    pub options: Vec<String>,
}

impl From<&Question> for PublicQuestion {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id.clone(),
            text: q.text.clone(),
            options: q.options.clone(),
        }
    }
}

/// Answers keyed by question id.
pub type Answers = HashMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProficiencyLevel {
    Pemula,
    Menengah,
    Mahir,
    Ahli,
    #[serde(rename = "N/A")]
    Unrated,
}

impl ProficiencyLevel {
    pub fn from_score(score: u32) -> Self {
        match score {
            85.. => Self::Ahli,
            70..=84 => Self::Mahir,
            50..=69 => Self::Menengah,
            _ => Self::Pemula,
        }
    }
}

/// Per-question outcome shown after submission.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerDetail {
    pub question_id: String,
    #[serde(rename = "teks")]
    pub text: String,
    pub answer: Option<String>,
    pub correct_answer: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssessmentResult {
    pub score: u32,
    pub level: ProficiencyLevel,
    pub correct: usize,
    pub total: usize,
    pub details: Vec<AnswerDetail>,
}
