use serde::{Deserialize, Serialize};

/// A registered talent from the `Profil_Talenta` sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TalentRecord {
    pub email: String,
    pub name: String,
    pub location: String,
}

/// A historical assessment outcome from the `Hasil_Asesmen` sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub email: String,
    pub occupation_id: String,
    /// `None` when the cell is blank or not a number.
    pub score: Option<f64>,
    pub level: String,
    /// Comma-separated skill names.
    pub skill_gap: String,
}
