//! Questionnaire scoring.
//!
//! [`calculate_scores`] is the pure aggregation step. [`QuestionnaireSession`]
//! sits in front of it and decides which answers are scored at all.

mod session;

use std::collections::BTreeMap;

use crate::models::PersonalityQuestion;

pub use session::*;

pub const MIN_ANSWER: i32 = 1;
pub const MAX_ANSWER: i32 = 5;
/// Answer substituted for unanswered questions in a scored group.
pub const NEUTRAL_ANSWER: i32 = 3;

/// Likert value after reverse keying, or `None` when the answer is out of range.
pub fn keyed_score(question: &PersonalityQuestion, answer: i32) -> Option<i32> {
    if !(MIN_ANSWER..=MAX_ANSWER).contains(&answer) {
        return None;
    }
    Some(if question.is_reverse_keyed {
        MIN_ANSWER + MAX_ANSWER - answer
    } else {
        answer
    })
}

/// Aggregate Likert answers into per-trait scores in `[0, 1]`.
///
/// Each trait's summed score is rescaled between the lowest and highest sums
/// possible for the number of questions answered, so traits with different
/// question counts land on the same scale. Answers outside `1..=5` are
/// skipped, and a trait with no usable answers is absent from the result
/// rather than reported as neutral.
pub fn calculate_scores<'a, I>(answers: I) -> BTreeMap<String, f64>
where
    I: IntoIterator<Item = (&'a PersonalityQuestion, i32)>,
{
    let mut totals: BTreeMap<&'a str, (i32, i32)> = BTreeMap::new();

    for (question, answer) in answers {
        let Some(score) = keyed_score(question, answer) else {
            continue;
        };
        let entry = totals.entry(question.trait_id.as_str()).or_insert((0, 0));
        entry.0 += score;
        entry.1 += 1;
    }

    totals
        .into_iter()
        .filter(|&(_, (_, count))| count > 0)
        .map(|(trait_id, (sum, count))| {
            let min = f64::from(MIN_ANSWER * count);
            let max = f64::from(MAX_ANSWER * count);
            let normalized = ((f64::from(sum) - min) / (max - min)).clamp(0.0, 1.0);
            (trait_id.to_string(), normalized)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(key: &str, trait_id: &str, reverse: bool) -> PersonalityQuestion {
        PersonalityQuestion::new(key, trait_id, reverse)
    }

    #[test]
    fn test_mixed_keying_example() {
        let q1 = q("Q1", "Warmth", false);
        let q2 = q("Q2", "Warmth", true);
        let scores = calculate_scores([(&q1, 4), (&q2, 2)]);
        assert_eq!(scores.get("Warmth"), Some(&0.75));
    }

    #[test]
    fn test_extremes_and_midpoint() {
        let qs: Vec<_> = (0..3).map(|i| q(&format!("Q{}", i), "Reserve", false)).collect();
        for (answer, expected) in [(1, 0.0), (3, 0.5), (5, 1.0)] {
            let scores = calculate_scores(qs.iter().map(|question| (question, answer)));
            assert_eq!(scores.get("Reserve"), Some(&expected));
        }
    }

    #[test]
    fn test_reverse_keying_mirrors_forward() {
        let forward = q("F", "Anxiety", false);
        let reverse = q("R", "Anxiety", true);
        for k in MIN_ANSWER..=MAX_ANSWER {
            assert_eq!(
                calculate_scores([(&reverse, k)]),
                calculate_scores([(&forward, 6 - k)])
            );
        }
    }

    #[test]
    fn test_out_of_range_answers_are_ignored() {
        let a = q("A", "Warmth", false);
        let b = q("B", "Warmth", false);
        let c = q("C", "Distrust", false);
        let scores = calculate_scores([(&a, 5), (&b, 0), (&c, 9)]);
        assert_eq!(scores.get("Warmth"), Some(&1.0));
        assert!(!scores.contains_key("Distrust"));
    }

    #[test]
    fn test_empty_input_yields_empty_map() {
        assert!(calculate_scores(std::iter::empty::<(&PersonalityQuestion, i32)>()).is_empty());
    }
}
