//! Job and training recommendations.
//!
//! Jobs are content-based when the workbook has postings (TF-IDF similarity
//! to the profile text); otherwise a random sample of built-in postings.
//! Trainings matching the skill gap come first, then random catalog entries.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::models::JobPosting;
use crate::profile::matcher::{cosine_similarity, TfidfVectorizer, MAX_FEATURES};

pub const JOB_RECOMMENDATIONS: usize = 2;
pub const TRAINING_RECOMMENDATIONS: usize = 3;

struct Training {
    title: &'static str,
    keywords: &'static [&'static str],
}

const TRAINING_CATALOG: &[Training] = &[
    Training {
        title: "Pelatihan Cloud Computing (AWS/GCP Fundamentals)",
        keywords: &["cloud", "aws", "gcp", "azure"],
    },
    Training {
        title: "Kursus CI/CD Pipelines untuk DevOps",
        keywords: &["ci/cd", "devops", "pipeline", "docker", "kubernetes"],
    },
    Training {
        title: "Workshop Manajemen Proyek Agile",
        keywords: &["agile", "scrum", "proyek", "project"],
    },
    Training {
        title: "Bootcamp Machine Learning Intermediate",
        keywords: &["machine learning", "tensorflow", "ai", "model"],
    },
    Training {
        title: "Sertifikasi Data Engineering Professional",
        keywords: &["data", "sql", "etl", "python"],
    },
];

fn sample_postings() -> Vec<JobPosting> {
    vec![
        JobPosting::new(
            "Data Analyst",
            "Tech Innovate",
            "Jakarta",
            "Python, SQL, Power BI",
            "Menganalisis data untuk mendukung keputusan bisnis.",
        ),
        JobPosting::new(
            "Machine Learning Engineer",
            "AI Labs",
            "Bandung",
            "Python, TensorFlow, AWS",
            "Membangun model AI untuk produksi.",
        ),
        JobPosting::new(
            "DevOps Engineer",
            "CloudTech",
            "Jakarta",
            "Docker, Kubernetes, CI/CD",
            "Mengelola infrastruktur cloud dan automation.",
        ),
    ]
}

#[derive(Debug, Clone, Serialize)]
pub struct JobRecommendation {
    #[serde(flatten)]
    pub posting: JobPosting,
    /// Similarity to the profile; `None` for sampled postings.
    pub match_score: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendations {
    pub jobs: Vec<JobRecommendation>,
    pub trainings: Vec<String>,
    pub skill_gap: String,
}

pub fn get_recommendations<R: Rng + ?Sized>(
    postings: &[JobPosting],
    skill_gap: &str,
    profile_text: &str,
    rng: &mut R,
) -> Recommendations {
    let jobs = if postings.is_empty() {
        sample_jobs(rng)
    } else {
        rank_jobs(postings, profile_text)
    };
    Recommendations {
        jobs,
        trainings: recommend_trainings(skill_gap, rng),
        skill_gap: skill_gap.to_string(),
    }
}

fn sample_jobs<R: Rng + ?Sized>(rng: &mut R) -> Vec<JobRecommendation> {
    sample_postings()
        .choose_multiple(rng, JOB_RECOMMENDATIONS)
        .cloned()
        .map(|posting| JobRecommendation {
            posting,
            match_score: None,
        })
        .collect()
}

/// Top postings by similarity; ties keep workbook order.
pub fn rank_jobs(postings: &[JobPosting], profile_text: &str) -> Vec<JobRecommendation> {
    let corpus: Vec<String> = postings.iter().map(JobPosting::corpus_text).collect();
    let (vectorizer, vectors) = TfidfVectorizer::fit_transform(&corpus, MAX_FEATURES);
    let query = vectorizer.transform(profile_text);

    let mut scored: Vec<(usize, f64)> = vectors
        .iter()
        .map(|v| cosine_similarity(&query, v))
        .enumerate()
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    debug!("Ranked {} postings against profile", scored.len());

    scored
        .into_iter()
        .take(JOB_RECOMMENDATIONS)
        .map(|(i, score)| JobRecommendation {
            posting: postings[i].clone(),
            match_score: Some(score),
        })
        .collect()
}

/// Gap-matching trainings first, then random fill up to the limit.
pub fn recommend_trainings<R: Rng + ?Sized>(skill_gap: &str, rng: &mut R) -> Vec<String> {
    let gap = skill_gap.to_lowercase();
    let gap_skills: Vec<Vec<&str>> = gap
        .split(',')
        .map(words)
        .filter(|w| !w.is_empty())
        .collect();

    let (mut matched, mut rest): (Vec<&Training>, Vec<&Training>) = TRAINING_CATALOG
        .iter()
        .partition(|t| covers_gap(t, &gap_skills));

    matched.truncate(TRAINING_RECOMMENDATIONS);
    rest.shuffle(rng);
    let fill = TRAINING_RECOMMENDATIONS - matched.len();
    matched
        .into_iter()
        .chain(rest.into_iter().take(fill))
        .map(|t| t.title.to_string())
        .collect()
}

/// True when a keyword and a gap skill share a whole-word phrase, in either
/// direction ("cloud" covers "cloud computing" but "ai" does not cover "email").
fn covers_gap(training: &Training, gap_skills: &[Vec<&str>]) -> bool {
    training.keywords.iter().any(|keyword| {
        let keyword = words(keyword);
        gap_skills
            .iter()
            .any(|gap| contains_phrase(gap, &keyword) || contains_phrase(&keyword, gap))
    })
}

// '/' stays inside words so "ci/cd" is one token.
fn words(text: &str) -> Vec<&str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '/'))
        .filter(|w| !w.is_empty())
        .collect()
}

fn contains_phrase(haystack: &[&str], needle: &[&str]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|w| w == needle)
}
