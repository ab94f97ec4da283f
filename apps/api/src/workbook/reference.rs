use std::path::Path;

use tracing::{info, warn};

use crate::config::Config;
use crate::models::{AssessmentRecord, JobPosting, Occupation, TalentRecord};
use crate::workbook::{load_sheet, SheetTable, WorkbookError};

const OCCUPATION_COLUMNS: &[&str] = &["Okupasi", "Unit_Kompetensi", "Kuk_Keywords"];
const JOB_COLUMNS: &[&str] = &[
    "Posisi",
    "Perusahaan",
    "Keterampilan_Dibutuhkan",
    "Deskripsi_Pekerjaan",
];

/// All reference data, loaded once at startup and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    pub occupations: Vec<Occupation>,
    pub job_postings: Vec<JobPosting>,
    pub talents: Vec<TalentRecord>,
    pub assessments: Vec<AssessmentRecord>,
}

impl ReferenceData {
    /// Loads the occupation sheet (required) and the job, talent and
    /// assessment sheets (optional; absent sheets yield no records).
    pub fn load(config: &Config) -> Result<Self, WorkbookError> {
        let path = Path::new(&config.workbook_path);
        let header_row = config.header_row;

        let occupations = occupations_from_table(&load_sheet(
            path,
            &config.sheets.occupations,
            header_row,
        )?)?;

        let job_postings = load_optional(path, &config.sheets.job_postings, header_row)?
            .map(|t| job_postings_from_table(&t))
            .transpose()?
            .unwrap_or_default();

        let talents = load_optional(path, &config.sheets.talents, header_row)?
            .map(|t| talents_from_table(&t))
            .unwrap_or_default();

        let assessments = load_optional(path, &config.sheets.assessments, header_row)?
            .map(|t| assessments_from_table(&t))
            .unwrap_or_default();

        info!(
            "Reference data ready: {} occupations, {} job postings, {} talents, {} assessment records",
            occupations.len(),
            job_postings.len(),
            talents.len(),
            assessments.len()
        );

        Ok(Self {
            occupations,
            job_postings,
            talents,
            assessments,
        })
    }

    pub fn find_occupation(&self, occupation_id: &str) -> Option<&Occupation> {
        self.occupations.iter().find(|o| o.id == occupation_id)
    }
}

fn load_optional(
    path: &Path,
    sheet: &str,
    header_row: usize,
) -> Result<Option<SheetTable>, WorkbookError> {
    match load_sheet(path, sheet, header_row) {
        Ok(table) => Ok(Some(table)),
        Err(WorkbookError::SheetNotFound { sheet, available }) => {
            warn!("Optional sheet '{sheet}' not found (available: {available:?}); continuing without it");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

pub fn occupations_from_table(table: &SheetTable) -> Result<Vec<Occupation>, WorkbookError> {
    table.require_columns(OCCUPATION_COLUMNS)?;
    let occupations: Vec<Occupation> = table
        .records()
        .map(|r| Occupation {
            id: r.get_or("OkupasiID", "N/A"),
            name: r.get_or("Okupasi", "N/A"),
            competency_unit: r.get_or("Unit_Kompetensi", ""),
            keywords: r.get_or("Kuk_Keywords", ""),
        })
        .collect();
    if occupations.is_empty() {
        return Err(WorkbookError::EmptySheet(table.name.clone()));
    }
    Ok(occupations)
}

pub fn job_postings_from_table(table: &SheetTable) -> Result<Vec<JobPosting>, WorkbookError> {
    table.require_columns(JOB_COLUMNS)?;
    Ok(table
        .records()
        .map(|r| JobPosting {
            position: r.get_or("Posisi", ""),
            company: r.get_or("Perusahaan", ""),
            location: r.get_or("Lokasi", "N/A"),
            required_skills: r.get_or("Keterampilan_Dibutuhkan", ""),
            description: r.get_or("Deskripsi_Pekerjaan", ""),
        })
        .collect())
}

/// Column names vary between workbook revisions, so the first present
/// candidate is used.
fn first_of(record: &crate::workbook::Record<'_>, candidates: &[&str]) -> String {
    candidates
        .iter()
        .find_map(|c| record.get(c))
        .unwrap_or("")
        .to_string()
}

pub fn talents_from_table(table: &SheetTable) -> Vec<TalentRecord> {
    table
        .records()
        .map(|r| TalentRecord {
            email: first_of(&r, &["Email", "TalentID"]),
            name: first_of(&r, &["Nama", "Nama_Lengkap"]),
            location: first_of(&r, &["Lokasi"]),
        })
        .filter(|t| !t.email.is_empty() || !t.name.is_empty())
        .collect()
}

pub fn assessments_from_table(table: &SheetTable) -> Vec<AssessmentRecord> {
    table
        .records()
        .map(|r| AssessmentRecord {
            email: first_of(&r, &["Email", "TalentID"]),
            occupation_id: first_of(&r, &["OkupasiID"]),
            score: first_of(&r, &["Skor", "Skor_Asesmen"]).parse::<f64>().ok(),
            level: first_of(&r, &["Level"]),
            skill_gap: first_of(&r, &["Skill_Gap", "Gap_Keterampilan"]),
        })
        .filter(|a| !a.occupation_id.is_empty())
        .collect()
}
