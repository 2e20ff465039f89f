use std::collections::HashMap;

use serde::{Deserialize, Serialize};

const QUESTIONS_JSON: &str = include_str!("../../data/questions.json");
const QUESTION_TEXT_JSON: &str = include_str!("../../data/question_text.en.json");

/// A Likert questionnaire item.
///
/// `resource_key` is the stable identity of the question; `text` is looked
/// up from the string table when the bank is loaded and is never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PersonalityQuestion {
    #[serde(skip)]
    pub text: String,
    #[serde(alias = "resourceKey")]
    pub resource_key: String,
    #[serde(alias = "traitId")]
    pub trait_id: String,
    /// Answer is inverted (`6 - answer`) before scoring.
    #[serde(default, alias = "isReverseKeyed")]
    pub is_reverse_keyed: bool,
}

impl PersonalityQuestion {
    pub fn new(resource_key: impl Into<String>, trait_id: impl Into<String>, reverse: bool) -> Self {
        let resource_key = resource_key.into();
        Self {
            text: resource_key.clone(),
            resource_key,
            trait_id: trait_id.into(),
            is_reverse_keyed: reverse,
        }
    }
}

/// The question catalog, in presentation order.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    questions: Vec<PersonalityQuestion>,
}

impl QuestionBank {
    pub fn new(questions: Vec<PersonalityQuestion>) -> Self {
        Self { questions }
    }

    /// Load the bundled questions, resolving their text from the bundled
    /// English string table. A key with no text falls back to the key itself.
    pub fn embedded() -> Self {
        let questions = match serde_json::from_str::<Vec<PersonalityQuestion>>(QUESTIONS_JSON) {
            Ok(questions) => questions,
            Err(e) => {
                tracing::warn!("bundled question bank is unreadable: {}", e);
                return Self::default();
            }
        };
        let strings: HashMap<String, String> =
            serde_json::from_str(QUESTION_TEXT_JSON).unwrap_or_else(|e| {
                tracing::warn!("bundled question text is unreadable: {}", e);
                HashMap::new()
            });
        Self::with_text(questions, &strings)
    }

    /// Attach display text from a resource-key lookup table.
    pub fn with_text(mut questions: Vec<PersonalityQuestion>, strings: &HashMap<String, String>) -> Self {
        for question in &mut questions {
            question.text = strings
                .get(&question.resource_key)
                .cloned()
                .unwrap_or_else(|| question.resource_key.clone());
        }
        Self { questions }
    }

    pub fn questions(&self) -> &[PersonalityQuestion] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Find a question by resource key, or by its display text for answers
    /// saved before keys were stable.
    pub fn find(&self, key_or_text: &str) -> Option<&PersonalityQuestion> {
        self.questions
            .iter()
            .find(|q| q.resource_key == key_or_text)
            .or_else(|| self.questions.iter().find(|q| q.text == key_or_text))
    }
}
