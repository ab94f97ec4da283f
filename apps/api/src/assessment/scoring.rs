use tracing::{info, warn};

use crate::assessment::models::{
    AnswerDetail, Answers, AssessmentResult, ProficiencyLevel, Question,
};

/// Scores answers by exact comparison after trimming surrounding whitespace.
///
/// A question with a blank id or blank correct answer cannot be scored; it is
/// skipped but still counts towards the total.
pub fn validate_assessment(answers: &Answers, questions: &[Question]) -> AssessmentResult {
    if questions.is_empty() {
        return AssessmentResult {
            score: 0,
            level: ProficiencyLevel::Unrated,
            correct: 0,
            total: 0,
            details: vec![],
        };
    }

    let total = questions.len();
    let mut correct = 0;
    let mut details = Vec::with_capacity(total);

    for q in questions {
        let expected = q.correct_answer.trim();
        if q.id.trim().is_empty() || expected.is_empty() {
            warn!("Question '{}' has no id or correct answer; skipped", q.text);
            continue;
        }

        let answer = answers.get(&q.id).map(|a| a.trim().to_string());
        let is_correct = answer.as_deref().is_some_and(|a| a == expected);
        if is_correct {
            correct += 1;
        }
        details.push(AnswerDetail {
            question_id: q.id.clone(),
            text: q.text.clone(),
            answer,
            correct_answer: q.correct_answer.clone(),
            is_correct,
        });
    }

    // Integer division truncates.
    let score = (correct * 100 / total) as u32;
    let level = ProficiencyLevel::from_score(score);

    info!("Assessment scored: {correct}/{total} correct, score {score}, level {level:?}");

    AssessmentResult {
        score,
        level,
        correct,
        total,
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str, answer: &str) -> Question {
        Question {
            id: id.to_string(),
            text: format!("Soal {id}"),
            options: vec![answer.to_string(), "B".into(), "C".into(), "D".into()],
            correct_answer: answer.to_string(),
        }
    }

    fn answers(pairs: &[(&str, &str)]) -> Answers {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_all_correct() {
        let qs = vec![question("q1", "A"), question("q2", "A")];
        let result = validate_assessment(&answers(&[("q1", "A"), ("q2", " A ")]), &qs);
        assert_eq!(result.score, 100);
        assert_eq!(result.level, ProficiencyLevel::Ahli);
        assert_eq!(result.correct, 2);
    }

    #[test]
    fn test_score_truncates() {
        let qs = vec![question("q1", "A"), question("q2", "A"), question("q3", "A")];
        let result = validate_assessment(&answers(&[("q1", "A"), ("q2", "A")]), &qs);
        // 2/3 * 100 = 66.67 -> 66
        assert_eq!(result.score, 66);
        assert_eq!(result.level, ProficiencyLevel::Menengah);
        assert_eq!(result.details[2].answer, None);
    }

    #[test]
    fn test_comparison_is_case_sensitive() {
        let qs = vec![question("q1", "Matplotlib")];
        let result = validate_assessment(&answers(&[("q1", "matplotlib")]), &qs);
        assert_eq!(result.score, 0);
        assert_eq!(result.level, ProficiencyLevel::Pemula);
    }

    #[test]
    fn test_unscorable_question_counts_in_total() {
        let qs = vec![question("q1", "A"), question("q2", "")];
        let result = validate_assessment(&answers(&[("q1", "A"), ("q2", "")]), &qs);
        assert_eq!(result.total, 2);
        assert_eq!(result.score, 50);
        assert_eq!(result.details.len(), 1);
    }

    #[test]
    fn test_no_questions() {
        let result = validate_assessment(&Answers::new(), &[]);
        assert_eq!(result.score, 0);
        assert_eq!(result.level, ProficiencyLevel::Unrated);
    }
}
