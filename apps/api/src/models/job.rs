use serde::{Deserialize, Serialize};

/// A job posting from the `Lowongan_Kerja` sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    #[serde(rename = "Posisi")]
    pub position: String,
    #[serde(rename = "Perusahaan")]
    pub company: String,
    #[serde(rename = "Lokasi")]
    pub location: String,
    #[serde(rename = "Keterampilan_Dibutuhkan")]
    pub required_skills: String,
    #[serde(rename = "Deskripsi_Pekerjaan")]
    pub description: String,
}

impl JobPosting {
    pub fn new(
        position: &str,
        company: &str,
        location: &str,
        required_skills: &str,
        description: &str,
    ) -> Self {
        Self {
            position: position.to_string(),
            company: company.to_string(),
            location: location.to_string(),
            required_skills: required_skills.to_string(),
            description: description.to_string(),
        }
    }

    /// Document used when ranking postings against a talent profile.
    pub fn corpus_text(&self) -> String {
        format!(
            "{} {} {}",
            self.position, self.required_skills, self.description
        )
    }
}
