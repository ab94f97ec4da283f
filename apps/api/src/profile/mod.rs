// Talent profile intake: CV extraction, field parsing and occupation mapping.

pub mod cv_parser;
pub mod handlers;
pub mod matcher;
pub mod stop_words;

use crate::errors::AppError;
use crate::profile::cv_parser::{derive_skill_gap, extract_profile_entities};
use crate::profile::matcher::OccupationMatcher;
use crate::session::OccupationMapping;

/// Maps CV text to its closest occupation. Returns the entity text used for
/// matching together with the mapping.
pub fn map_profile(
    matcher: &OccupationMatcher,
    cv_text: &str,
) -> Result<(String, OccupationMapping), AppError> {
    let profile_text = extract_profile_entities(cv_text);
    let best = matcher.best_match(&profile_text);
    let occupation = matcher.occupation(best.index).ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!("matched occupation index {} out of range", best.index))
    })?;

    let mapping = OccupationMapping {
        occupation_id: best.occupation_id,
        occupation_name: best.occupation_name,
        match_score: best.score,
        skill_gap: derive_skill_gap(occupation, cv_text),
    };
    Ok((profile_text, mapping))
}
