use serde::{Deserialize, Serialize};

/// A PON TIK occupation row. Field names on the wire follow the sheet columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occupation {
    #[serde(rename = "OkupasiID")]
    pub id: String,
    #[serde(rename = "Okupasi")]
    pub name: String,
    #[serde(rename = "Unit_Kompetensi")]
    pub competency_unit: String,
    /// Free text used for matching; usually a comma-separated keyword list.
    #[serde(rename = "Kuk_Keywords")]
    pub keywords: String,
}

impl Occupation {
    /// Document fed to the TF-IDF matcher: name, competency unit and keywords.
    pub fn corpus_text(&self) -> String {
        format!("{} {} {}", self.name, self.competency_unit, self.keywords)
    }

    /// Keywords split on commas and semicolons, trimmed, empties dropped.
    pub fn keyword_list(&self) -> Vec<&str> {
        self.keywords
            .split([',', ';'])
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .collect()
    }
}
