use anyhow::{Context, Result};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-flash-latest";

/// Application configuration loaded from environment variables.
/// Startup fails if `GEMINI_API_KEY` is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub workbook_path: String,
    pub sheets: SheetNames,
    /// Zero-based row holding the column names. The reference workbook keeps a
    /// title on the first row, so the header sits on the second.
    pub header_row: usize,
    pub question_count: usize,
    pub port: u16,
    pub rust_log: String,
}

/// Sheet names inside the reference workbook.
#[derive(Debug, Clone)]
pub struct SheetNames {
    pub occupations: String,
    pub job_postings: String,
    pub assessments: String,
    pub talents: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            occupations: "PON_TIK".to_string(),
            job_postings: "Lowongan_Kerja".to_string(),
            assessments: "Hasil_Asesmen".to_string(),
            talents: "Profil_Talenta".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = SheetNames::default();

        Ok(Config {
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            gemini_base_url: env_or("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL),
            gemini_model: env_or("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
            workbook_path: env_or("WORKBOOK_PATH", "data/DTP_Database.xlsx"),
            sheets: SheetNames {
                occupations: env_or("SHEET_PON", &defaults.occupations),
                job_postings: env_or("SHEET_LOWONGAN", &defaults.job_postings),
                assessments: env_or("SHEET_HASIL", &defaults.assessments),
                talents: env_or("SHEET_TALENTA", &defaults.talents),
            },
            header_row: env_or("HEADER_ROW", "1")
                .parse::<usize>()
                .context("HEADER_ROW must be a non-negative integer")?,
            question_count: parse_question_count(&env_or("QUESTION_COUNT", "5"))?,
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_question_count(raw: &str) -> Result<usize> {
    let count = raw
        .parse::<usize>()
        .context("QUESTION_COUNT must be a positive integer")?;
    anyhow::ensure!(count > 0, "QUESTION_COUNT must be at least 1");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sheet_names() {
        let sheets = SheetNames::default();
        assert_eq!(sheets.occupations, "PON_TIK");
        assert_eq!(sheets.job_postings, "Lowongan_Kerja");
        assert_eq!(sheets.assessments, "Hasil_Asesmen");
        assert_eq!(sheets.talents, "Profil_Talenta");
    }

    #[test]
    fn test_question_count_rejects_zero() {
        assert!(parse_question_count("0").is_err());
        assert!(parse_question_count("abc").is_err());
        assert_eq!(parse_question_count("5").unwrap(), 5);
    }
}
