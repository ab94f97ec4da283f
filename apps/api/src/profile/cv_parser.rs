//! CV text extraction and regex field parsing.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::errors::AppError;
use crate::models::Occupation;

/// Shown when the occupation lists no keywords to compare against.
pub const DEFAULT_SKILL_GAP: &str = "Cloud Computing, CI/CD, Agile";
const MAX_GAP_SKILLS: usize = 3;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w.-]+@[\w.-]+\.\w+").expect("valid email regex"));
static LINKEDIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)linkedin\.com/in/([\w-]+)").expect("valid linkedin regex")
});
static CITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(Jakarta|Bandung|Surabaya|Yogyakarta|Jogja|Medan|Semarang|Makassar)")
        .expect("valid city regex")
});
static LONG_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w{4,}\b").expect("valid word regex"));

/// Fields pre-filled from an uploaded CV.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedCv {
    pub email: String,
    pub name: String,
    pub linkedin: String,
    pub location: String,
    pub full_text: String,
}

pub fn parse_cv_data(cv_text: &str) -> ParsedCv {
    let email = EMAIL
        .find(cv_text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    let linkedin = LINKEDIN
        .captures(cv_text)
        .and_then(|c| c.get(1))
        .map(|handle| format!("https://www.linkedin.com/in/{}", handle.as_str()))
        .unwrap_or_default();

    // First line is usually the name, unless it looks like contact details.
    let first_line = cv_text.lines().next().unwrap_or("").trim();
    let name = if !first_line.is_empty()
        && !first_line.contains('@')
        && first_line.split_whitespace().count() < 5
    {
        title_case(first_line)
    } else {
        String::new()
    };

    let location = CITY
        .find(cv_text)
        .map(|m| match title_case(m.as_str()).as_str() {
            "Jogja" => "Yogyakarta".to_string(),
            other => other.to_string(),
        })
        .unwrap_or_default();

    ParsedCv {
        email,
        name,
        linkedin,
        location,
        full_text: cv_text.to_string(),
    }
}

/// Distinct lowercase words of four or more characters, sorted and joined.
pub fn extract_profile_entities(raw_cv: &str) -> String {
    let lower = raw_cv.to_lowercase();
    let words: BTreeSet<&str> = LONG_WORD.find_iter(&lower).map(|m| m.as_str()).collect();
    words.into_iter().collect::<Vec<_>>().join(" ")
}

/// Occupation keywords that do not appear in the CV, at most three.
pub fn derive_skill_gap(occupation: &Occupation, cv_text: &str) -> String {
    let keywords = occupation.keyword_list();
    if keywords.is_empty() {
        return DEFAULT_SKILL_GAP.to_string();
    }
    let cv_lower = cv_text.to_lowercase();
    keywords
        .into_iter()
        .filter(|k| !cv_lower.contains(&k.to_lowercase()))
        .take(MAX_GAP_SKILLS)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Extracts plain text from an uploaded CV. PDF and plain text only.
pub fn extract_cv_text(
    filename: &str,
    content_type: Option<&str>,
    bytes: &[u8],
) -> Result<String, AppError> {
    let lower = filename.to_lowercase();
    let is_pdf = content_type == Some("application/pdf") || lower.ends_with(".pdf");
    let is_text = content_type.is_some_and(|c| c.starts_with("text/")) || lower.ends_with(".txt");

    if is_pdf {
        pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| AppError::UnprocessableEntity(format!("Unable to read PDF: {e}")))
    } else if is_text {
        String::from_utf8(bytes.to_vec())
            .map_err(|_| AppError::Validation("Text CV must be UTF-8 encoded".to_string()))
    } else {
        Err(AppError::UnsupportedMediaType(format!(
            "'{filename}' is not a PDF or TXT file"
        )))
    }
}

/// Upper-cases the first letter after any non-letter and lower-cases the rest.
/// Spacing and punctuation are kept as written.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut after_letter = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if after_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            after_letter = true;
        } else {
            out.push(c);
            after_letter = false;
        }
    }
    out
}
