//! Question generation behind a pluggable trait held in `AppState`.
//!
//! Default: `GeminiQuestionGenerator`. LLM output is repaired with
//! `sanitize_json_response` and then normalized to exactly N valid questions.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::assessment::models::{Question, OPTIONS_PER_QUESTION};
use crate::assessment::prompts::question_prompt;
use crate::errors::AppError;
use crate::llm_client::{strip_json_fences, GenerationOptions, LlmClient};
use crate::models::Occupation;

const GENERATION_OPTIONS: GenerationOptions = GenerationOptions {
    temperature: 0.4,
    max_output_tokens: 8192,
    json_output: true,
};

static CONTROL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x00-\x1F\x7F-\x{9F}]").expect("valid control regex"));
static ADJACENT_OBJECTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\}\s*\{").expect("valid object regex"));
static ARRAY_THEN_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\]\s*""#).expect("valid array regex"));

/// Swap backends without touching handlers. Carried in `AppState` as
/// `Arc<dyn QuestionGenerator>`.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    async fn generate(&self, occupation: &Occupation, count: usize)
        -> Result<Vec<Question>, AppError>;
}

pub struct GeminiQuestionGenerator {
    llm: LlmClient,
}

impl GeminiQuestionGenerator {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl QuestionGenerator for GeminiQuestionGenerator {
    async fn generate(
        &self,
        occupation: &Occupation,
        count: usize,
    ) -> Result<Vec<Question>, AppError> {
        info!(
            "Requesting {count} questions for occupation {} ({})",
            occupation.id, occupation.name
        );
        let prompt = question_prompt(occupation, count);
        let raw = self
            .llm
            .generate(&prompt, GENERATION_OPTIONS)
            .await
            .map_err(|e| AppError::Llm(format!("Question generation failed: {e}")))?;

        let cleaned = sanitize_json_response(strip_json_fences(&raw));
        let value: Value = serde_json::from_str(&cleaned).map_err(|e| {
            let preview: String = cleaned.chars().take(500).collect();
            warn!("LLM returned invalid JSON: {e}. Response: {preview}");
            AppError::Llm(format!("LLM returned invalid JSON: {e}"))
        })?;

        let questions = normalize_questions(value, count, &occupation.name)?;
        info!("Generated {} questions", questions.len());
        Ok(questions)
    }
}

/// Repairs common defects in LLM-emitted JSON: invalid backslash escapes,
/// control characters and missing commas between adjacent objects/arrays.
pub fn sanitize_json_response(text: &str) -> String {
    let mut unescaped = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.peek() {
                Some('n' | 't' | 'r' | '"' | '\\' | '/' | 'b' | 'f' | 'u' | 'U') => {
                    unescaped.push(c);
                    if let Some(next) = chars.next() {
                        unescaped.push(next);
                    }
                }
                _ => {} // drop the stray backslash
            }
        } else {
            unescaped.push(c);
        }
    }

    let text = CONTROL_CHARS.replace_all(&unescaped, "");
    let text = ADJACENT_OBJECTS.replace_all(&text, "},{");
    let text = ARRAY_THEN_KEY.replace_all(&text, "],\"");
    text.trim().to_string()
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    id: Option<Value>,
    teks: Option<String>,
    opsi: Option<Vec<String>>,
    jawaban_benar: Option<String>,
}

/// Accepts `{"questions": [...]}` or a bare list, pads or truncates to
/// `count`, validates every question and renumbers ids `q1..qN`.
pub fn normalize_questions(
    value: Value,
    count: usize,
    occupation_name: &str,
) -> Result<Vec<Question>, AppError> {
    let items = match value {
        Value::Object(mut map) => match map.remove("questions") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(AppError::Llm(
                    "LLM response has no 'questions' list".to_string(),
                ))
            }
        },
        Value::Array(items) => items,
        _ => return Err(AppError::Llm("Unrecognised question format".to_string())),
    };

    let mut raw: Vec<RawQuestion> = items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value(item)
                .map_err(|e| AppError::Llm(format!("Question {} is malformed: {e}", i + 1)))
        })
        .collect::<Result<_, _>>()?;

    if raw.len() != count {
        warn!("LLM produced {} questions instead of {count}", raw.len());
        while raw.len() < count {
            raw.push(filler_question(occupation_name));
        }
        raw.truncate(count);
    }

    raw.into_iter()
        .enumerate()
        .map(|(i, q)| validate_question(i, q))
        .collect()
}

fn validate_question(index: usize, q: RawQuestion) -> Result<Question, AppError> {
    let number = index + 1;
    let (Some(_), Some(text), Some(options), Some(correct_answer)) =
        (q.id, q.teks, q.opsi, q.jawaban_benar)
    else {
        return Err(AppError::Llm(format!("Question {number} is incomplete")));
    };
    if options.len() != OPTIONS_PER_QUESTION {
        return Err(AppError::Llm(format!(
            "Question {number} has {} options instead of {OPTIONS_PER_QUESTION}",
            options.len()
        )));
    }
    if !options.contains(&correct_answer) {
        return Err(AppError::Llm(format!(
            "Question {number}: correct answer is not one of the options"
        )));
    }
    Ok(Question {
        id: format!("q{number}"),
        text,
        options,
        correct_answer,
    })
}

fn filler_question(occupation_name: &str) -> RawQuestion {
    RawQuestion {
        id: Some(Value::String("filler".to_string())),
        teks: Some(format!(
            "[Soal tambahan] Bagaimana menangani situasi darurat sebagai {occupation_name}?"
        )),
        opsi: Some(
            ["Eskalasi", "Konsultasi", "Dokumentasi", "Trial"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        ),
        jawaban_benar: Some("Konsultasi".to_string()),
    }
}
