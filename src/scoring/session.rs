use std::collections::BTreeMap;

use serde::Serialize;

use super::{calculate_scores, MAX_ANSWER, MIN_ANSWER, NEUTRAL_ANSWER};
use crate::models::{find_trait, Character, PersonalityQuestion, QuestionBank};

/// One question with the answer given so far (`0` = unanswered).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionState {
    pub question: PersonalityQuestion,
    pub answer: i32,
}

impl QuestionState {
    pub fn is_answered(&self) -> bool {
        (MIN_ANSWER..=MAX_ANSWER).contains(&self.answer)
    }
}

/// The questions feeding a single trait, shown as one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionGroup {
    pub trait_id: String,
    pub title: String,
    pub questions: Vec<QuestionState>,
    pub include_in_calculation: bool,
}

impl QuestionGroup {
    pub fn has_any_answer(&self) -> bool {
        self.questions.iter().any(QuestionState::is_answered)
    }
}

/// Result of [`QuestionnaireSession::next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Now showing the group at this index.
    Moved(usize),
    /// Already on the last group; the caller should submit.
    Finished,
}

/// What a completed questionnaire hands back to the character.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct QuestionnaireOutcome {
    /// Trait id to score, only for traits that were scored.
    pub scores: BTreeMap<String, f64>,
    /// Every given answer, keyed by question resource key.
    pub answers: BTreeMap<String, i32>,
    /// Trait ids of groups the user left out of the calculation.
    pub exclusions: Vec<String>,
}

impl QuestionnaireOutcome {
    /// Merge scores into the character's positions and replace its stored
    /// questionnaire state. Positions of unscored traits are kept.
    pub fn apply_to(self, character: &mut Character) {
        character.apply_scores(&self.scores);
        character.questionnaire_answers = self.answers;
        character.questionnaire_exclusions = self.exclusions;
    }
}

/// An in-progress questionnaire for one character.
///
/// Questions are grouped by trait in bank order. The session owns the policy
/// of which answers reach [`calculate_scores`]:
///
/// - a group with no answers is not scored;
/// - a group the user excluded is not scored;
/// - in any other group, unanswered questions count as [`NEUTRAL_ANSWER`].
#[derive(Debug, Clone)]
pub struct QuestionnaireSession {
    groups: Vec<QuestionGroup>,
    current: usize,
}

impl QuestionnaireSession {
    /// Start a blank questionnaire.
    pub fn new(bank: &QuestionBank) -> Self {
        Self::with_state(bank, &BTreeMap::new(), &[])
    }

    /// Resume from the answers and exclusions stored on a character.
    pub fn for_character(bank: &QuestionBank, character: &Character) -> Self {
        Self::with_state(
            bank,
            &character.questionnaire_answers,
            &character.questionnaire_exclusions,
        )
    }

    /// Build groups and pre-fill them.
    ///
    /// Stored answers may be keyed by resource key or, in older files, by the
    /// question text. Exclusions may hold a trait id or, in older files, the
    /// trait's display name.
    pub fn with_state(
        bank: &QuestionBank,
        answers: &BTreeMap<String, i32>,
        exclusions: &[String],
    ) -> Self {
        let mut groups: Vec<QuestionGroup> = Vec::new();

        for question in bank.questions() {
            let answer = answers
                .get(&question.resource_key)
                .or_else(|| answers.get(&question.text))
                .copied()
                .filter(|a| (MIN_ANSWER..=MAX_ANSWER).contains(a))
                .unwrap_or(0);
            let state = QuestionState {
                question: question.clone(),
                answer,
            };

            match groups.iter_mut().find(|g| g.trait_id == question.trait_id) {
                Some(group) => group.questions.push(state),
                None => {
                    let title = find_trait(&question.trait_id)
                        .map(|t| t.name.to_string())
                        .unwrap_or_else(|| question.trait_id.clone());
                    let excluded = exclusions
                        .iter()
                        .any(|e| *e == question.trait_id || *e == title);
                    groups.push(QuestionGroup {
                        trait_id: question.trait_id.clone(),
                        title,
                        questions: vec![state],
                        include_in_calculation: !excluded,
                    });
                }
            }
        }

        Self { groups, current: 0 }
    }

    pub fn groups(&self) -> &[QuestionGroup] {
        &self.groups
    }

    pub fn total_groups(&self) -> usize {
        self.groups.len()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_group(&self) -> Option<&QuestionGroup> {
        self.groups.get(self.current)
    }

    pub fn is_first_page(&self) -> bool {
        self.current == 0
    }

    pub fn is_last_page(&self) -> bool {
        self.current + 1 >= self.groups.len()
    }

    /// Percentage of groups reached, counting the current one.
    pub fn progress(&self) -> f64 {
        if self.groups.is_empty() {
            return 0.0;
        }
        (self.current + 1) as f64 / self.groups.len() as f64 * 100.0
    }

    pub fn next(&mut self) -> Step {
        if self.current + 1 < self.groups.len() {
            self.current += 1;
            Step::Moved(self.current)
        } else {
            Step::Finished
        }
    }

    /// Leave the current group as it is and move on.
    pub fn skip_group(&mut self) -> Step {
        self.next()
    }

    pub fn previous(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.current -= 1;
        true
    }

    /// Record an answer (`0` clears it). Returns `false` for an unknown
    /// question or a value outside `0..=5`.
    pub fn answer(&mut self, resource_key: &str, value: i32) -> bool {
        if value != 0 && !(MIN_ANSWER..=MAX_ANSWER).contains(&value) {
            return false;
        }
        let Some(state) = self
            .groups
            .iter_mut()
            .flat_map(|g| g.questions.iter_mut())
            .find(|s| s.question.resource_key == resource_key)
        else {
            return false;
        };
        state.answer = value;
        true
    }

    /// Include or exclude a trait's group. Returns `false` for an unknown trait.
    pub fn set_included(&mut self, trait_id: &str, include: bool) -> bool {
        match self.groups.iter_mut().find(|g| g.trait_id == trait_id) {
            Some(group) => {
                group.include_in_calculation = include;
                true
            }
            None => false,
        }
    }

    /// Apply the scoring policy and compute the outcome.
    pub fn submit(&self) -> QuestionnaireOutcome {
        let mut answers = BTreeMap::new();
        let mut exclusions = Vec::new();
        let mut to_score: Vec<(&PersonalityQuestion, i32)> = Vec::new();

        for group in &self.groups {
            if !group.include_in_calculation {
                exclusions.push(group.trait_id.clone());
            }
            let scored = group.include_in_calculation && group.has_any_answer();

            for state in &group.questions {
                if state.is_answered() {
                    answers.insert(state.question.resource_key.clone(), state.answer);
                }
                if scored {
                    let effective = if state.is_answered() {
                        state.answer
                    } else {
                        NEUTRAL_ANSWER
                    };
                    to_score.push((&state.question, effective));
                }
            }
        }

        let scores = calculate_scores(to_score);
        tracing::debug!(
            scored_traits = scores.len(),
            answers = answers.len(),
            excluded = exclusions.len(),
            "questionnaire submitted"
        );

        QuestionnaireOutcome {
            scores,
            answers,
            exclusions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank() -> QuestionBank {
        QuestionBank::new(vec![
            PersonalityQuestion::new("W1", "Warmth", false),
            PersonalityQuestion::new("W2", "Warmth", true),
            PersonalityQuestion::new("D1", "Distrust", false),
            PersonalityQuestion::new("A1", "Anxiety", false),
        ])
    }

    #[test]
    fn test_groups_follow_bank_order() {
        let session = QuestionnaireSession::new(&bank());
        let ids: Vec<_> = session.groups().iter().map(|g| g.trait_id.as_str()).collect();
        assert_eq!(ids, vec!["Warmth", "Distrust", "Anxiety"]);
        assert_eq!(session.groups()[0].questions.len(), 2);
    }

    #[test]
    fn test_navigation() {
        let mut session = QuestionnaireSession::new(&bank());
        assert!(session.is_first_page());
        assert!(!session.previous());
        assert_eq!(session.next(), Step::Moved(1));
        assert_eq!(session.skip_group(), Step::Moved(2));
        assert!(session.is_last_page());
        assert_eq!(session.progress(), 100.0);
        assert_eq!(session.next(), Step::Finished);
        assert!(session.previous());
        assert_eq!(session.current_index(), 1);
    }

    #[test]
    fn test_unanswered_in_answered_group_counts_as_neutral() {
        let mut session = QuestionnaireSession::new(&bank());
        assert!(session.answer("W1", 5));
        let outcome = session.submit();

        // 5 and a neutral 3 reverse-keyed to 3: (8 - 2) / 8
        assert_eq!(outcome.scores.get("Warmth"), Some(&0.75));
        assert!(!outcome.scores.contains_key("Distrust"));
        assert_eq!(outcome.answers.len(), 1);
    }

    #[test]
    fn test_excluded_group_is_not_scored_but_answers_are_kept() {
        let mut session = QuestionnaireSession::new(&bank());
        session.answer("D1", 4);
        assert!(session.set_included("Distrust", false));
        let outcome = session.submit();

        assert!(outcome.scores.is_empty());
        assert_eq!(outcome.answers.get("D1"), Some(&4));
        assert_eq!(outcome.exclusions, vec!["Distrust".to_string()]);
    }

    #[test]
    fn test_rejects_invalid_answers() {
        let mut session = QuestionnaireSession::new(&bank());
        assert!(!session.answer("W1", 6));
        assert!(!session.answer("nope", 3));
        assert!(session.answer("W1", 0));
    }

    #[test]
    fn test_resumes_from_legacy_state() {
        let mut stored = BTreeMap::new();
        stored.insert("A1".to_string(), 2);
        let mut character = Character::default();
        character.questionnaire_answers = stored;
        character.questionnaire_exclusions = vec!["Warmth".to_string()];

        let session = QuestionnaireSession::for_character(&bank(), &character);
        assert!(!session.groups()[0].include_in_calculation);
        assert_eq!(session.groups()[2].questions[0].answer, 2);
    }

    #[test]
    fn test_outcome_merges_into_character() {
        let mut character = Character::default();
        character.set_trait_position("Distrust", 0.9);

        let mut session = QuestionnaireSession::new(&bank());
        session.answer("W1", 1);
        session.answer("W2", 5);
        session.submit().apply_to(&mut character);

        assert_eq!(character.trait_positions.get("Warmth"), Some(&0.0));
        assert_eq!(character.trait_positions.get("Distrust"), Some(&0.9));
        assert!(character.has_questionnaire());
    }
}
