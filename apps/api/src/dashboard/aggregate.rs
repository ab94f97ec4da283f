use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::models::{AssessmentRecord, TalentRecord};
use crate::session::TalentSession;
use crate::workbook::reference::ReferenceData;

pub const TOP_SKILL_GAPS: usize = 4;

/// Approximate city centres for the map view.
const CITY_COORDINATES: &[(&str, f64, f64)] = &[
    ("Jakarta", -6.2088, 106.8456),
    ("Bandung", -6.9175, 107.6191),
    ("Surabaya", -7.2575, 112.7521),
    ("Yogyakarta", -7.7956, 110.3695),
    ("Medan", 3.5952, 98.6722),
    ("Semarang", -6.9667, 110.4167),
    ("Makassar", -5.1477, 119.4327),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountEntry {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationEntry {
    pub location: String,
    pub count: usize,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardMetrics {
    pub total_talents: usize,
    pub occupation_count: usize,
    pub completed_assessments: usize,
    /// Mean of numeric scores, one decimal; `None` without any scores.
    pub average_score: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub metrics: DashboardMetrics,
    pub occupation_distribution: Vec<CountEntry>,
    pub locations: Vec<LocationEntry>,
    pub top_skill_gaps: Vec<CountEntry>,
}

pub fn build_dashboard(reference: &ReferenceData, sessions: &[TalentSession]) -> DashboardReport {
    let assessments: Vec<AssessmentRecord> = reference
        .assessments
        .iter()
        .cloned()
        .chain(sessions.iter().filter_map(session_assessment))
        .collect();
    let talents = merge_talents(&reference.talents, sessions);

    let occupation_names = assessments.iter().map(|a| {
        reference
            .find_occupation(&a.occupation_id)
            .map(|o| o.name.clone())
            .unwrap_or_else(|| a.occupation_id.clone())
    });

    let skill_gaps = assessments.iter().flat_map(|a| {
        a.skill_gap
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    });
    let mut top_skill_gaps = ranked_counts(skill_gaps);
    top_skill_gaps.truncate(TOP_SKILL_GAPS);

    DashboardReport {
        metrics: DashboardMetrics {
            total_talents: talents.len(),
            occupation_count: reference.occupations.len(),
            completed_assessments: assessments.len(),
            average_score: average_score(&assessments),
        },
        occupation_distribution: ranked_counts(occupation_names),
        locations: location_spread(&talents),
        top_skill_gaps,
    }
}

fn session_assessment(session: &TalentSession) -> Option<AssessmentRecord> {
    let done = session.assessment.as_ref()?;
    Some(AssessmentRecord {
        email: session.talent_id().to_string(),
        occupation_id: session.mapping.occupation_id.clone(),
        score: Some(f64::from(done.result.score)),
        level: serde_json::to_value(done.result.level)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default(),
        skill_gap: session.mapping.skill_gap.clone(),
    })
}

/// Workbook talents plus session talents; the first entry per email wins.
fn merge_talents(records: &[TalentRecord], sessions: &[TalentSession]) -> Vec<TalentRecord> {
    let mut seen = HashSet::new();
    records
        .iter()
        .cloned()
        .chain(sessions.iter().map(|s| TalentRecord {
            email: s.profile.email.clone(),
            name: s.profile.name.clone(),
            location: s.profile.location.clone(),
        }))
        .filter(|t| seen.insert(t.email.trim().to_lowercase()))
        .collect()
}

/// Counts labels, most frequent first; ties sorted by label.
fn ranked_counts(labels: impl Iterator<Item = String>) -> Vec<CountEntry> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for label in labels {
        *counts.entry(label).or_default() += 1;
    }
    let mut entries: Vec<CountEntry> = counts
        .into_iter()
        .map(|(label, count)| CountEntry { label, count })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    entries
}

fn location_spread(talents: &[TalentRecord]) -> Vec<LocationEntry> {
    let locations = talents
        .iter()
        .map(|t| t.location.trim())
        .filter(|l| !l.is_empty() && *l != "N/A")
        .map(str::to_string);

    ranked_counts(locations)
        .into_iter()
        .map(|entry| {
            let coordinates = CITY_COORDINATES
                .iter()
                .find(|(city, _, _)| city.eq_ignore_ascii_case(&entry.label));
            LocationEntry {
                latitude: coordinates.map(|c| c.1),
                longitude: coordinates.map(|c| c.2),
                location: entry.label,
                count: entry.count,
            }
        })
        .collect()
}

fn average_score(assessments: &[AssessmentRecord]) -> Option<f64> {
    let scores: Vec<f64> = assessments.iter().filter_map(|a| a.score).collect();
    if scores.is_empty() {
        return None;
    }
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    Some((mean * 10.0).round() / 10.0)
}
