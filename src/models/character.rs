use std::collections::BTreeMap;

use serde::{de, Deserialize, Deserializer, Serialize};

use super::palette::DEFAULT_COLOR;
use super::traits::Trait;

/// Neutral position used when a character has never been placed on a trait.
pub const DEFAULT_POSITION: f64 = 0.5;

/// Bubble size, which doubles as the character's importance tier.
///
/// Each size forms its own group in the roster, and `display_order` is only
/// meaningful within one group.
///
/// - `Large`: Main characters
/// - `Medium`: Supporting characters
/// - `Small`: Background characters
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum BubbleSize {
    Small,
    Medium,
    #[default]
    Large,
}

impl BubbleSize {
    /// Groups in the order they are listed.
    pub const GROUPS: [BubbleSize; 3] = [Self::Large, Self::Medium, Self::Small];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "Small",
            Self::Medium => "Medium",
            Self::Large => "Large",
        }
    }

    /// Roster heading for the group.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Small => "Background",
            Self::Medium => "Supporting",
            Self::Large => "Main",
        }
    }

    /// Accepts size names and group labels, case-insensitively.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "small" | "background" => Some(Self::Small),
            "medium" | "supporting" => Some(Self::Medium),
            "large" | "main" => Some(Self::Large),
            _ => None,
        }
    }

    /// Integer encoding written by older project files.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Small),
            1 => Some(Self::Medium),
            2 => Some(Self::Large),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BubbleSizeRepr {
    Code(i64),
    Name(String),
}

impl<'de> Deserialize<'de> for BubbleSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match BubbleSizeRepr::deserialize(deserializer)? {
            BubbleSizeRepr::Code(code) => Self::from_code(code)
                .ok_or_else(|| de::Error::custom(format!("invalid bubble size code {}", code))),
            BubbleSizeRepr::Name(name) => Self::from_str(&name)
                .ok_or_else(|| de::Error::custom(format!("invalid bubble size '{}'", name))),
        }
    }
}

/// Read an explicit `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Clamp a position into `[0, 1]`. NaN collapses to the neutral default.
pub fn clamp_position(value: f64) -> f64 {
    if value.is_nan() {
        DEFAULT_POSITION
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// A character placed on the trait map.
///
/// Field names follow the PascalCase layout of existing project files;
/// camelCase spellings are accepted on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Character {
    #[serde(alias = "name")]
    pub name: String,
    #[serde(alias = "colorHex")]
    pub color_hex: String,
    #[serde(alias = "size")]
    pub size: BubbleSize,
    /// Locked characters ignore direct manipulation on the trait lines.
    #[serde(alias = "isLocked")]
    pub is_locked: bool,
    #[serde(alias = "isVisible")]
    pub is_visible: bool,
    /// Position within the character's size group, `0..N-1`.
    #[serde(alias = "displayOrder")]
    pub display_order: usize,
    /// Trait id (or, in old files, trait display name) to position in `[0, 1]`.
    /// Absent keys are filled lazily by [`Character::trait_position`].
    #[serde(alias = "traitPositions", deserialize_with = "null_as_default")]
    pub trait_positions: BTreeMap<String, f64>,
    /// Question resource key to Likert answer (1-5).
    #[serde(alias = "questionnaireAnswers", deserialize_with = "null_as_default")]
    pub questionnaire_answers: BTreeMap<String, i32>,
    /// Trait ids the user excluded from automatic scoring.
    #[serde(alias = "questionnaireExclusions", deserialize_with = "null_as_default")]
    pub questionnaire_exclusions: Vec<String>,
}

impl Default for Character {
    fn default() -> Self {
        Self {
            name: String::new(),
            color_hex: DEFAULT_COLOR.to_string(),
            size: BubbleSize::Large,
            is_locked: false,
            is_visible: true,
            display_order: 0,
            trait_positions: BTreeMap::new(),
            questionnaire_answers: BTreeMap::new(),
            questionnaire_exclusions: Vec::new(),
        }
    }
}

impl Character {
    pub fn new(name: impl Into<String>, color_hex: impl Into<String>, size: BubbleSize) -> Self {
        Self {
            name: name.into(),
            color_hex: color_hex.into(),
            size,
            ..Self::default()
        }
    }

    /// Current position on `t`, migrating or default-filling the map.
    ///
    /// This is a mutating read: a legacy entry keyed by the trait's display
    /// name is moved under the trait id, and a missing entry is filled with
    /// [`DEFAULT_POSITION`]. Once either has happened, later calls take the
    /// plain id lookup path.
    pub fn trait_position(&mut self, t: &Trait) -> f64 {
        if let Some(&value) = self.trait_positions.get(t.id) {
            return value;
        }

        if !t.name.is_empty() {
            if let Some(legacy) = self.trait_positions.remove(t.name) {
                let value = clamp_position(legacy);
                tracing::debug!(
                    character = %self.name,
                    trait_id = t.id,
                    "migrated legacy trait position key '{}'",
                    t.name
                );
                self.trait_positions.insert(t.id.to_string(), value);
                return value;
            }
        }

        *self
            .trait_positions
            .entry(t.id.to_string())
            .or_insert(DEFAULT_POSITION)
    }

    /// Read-only variant of [`Character::trait_position`] for rendering.
    /// Resolves the same way but never touches the map.
    pub fn peek_trait_position(&self, t: &Trait) -> f64 {
        self.trait_positions
            .get(t.id)
            .or_else(|| {
                (!t.name.is_empty())
                    .then(|| self.trait_positions.get(t.name))
                    .flatten()
            })
            .copied()
            .map(clamp_position)
            .unwrap_or(DEFAULT_POSITION)
    }

    /// Store a position under `trait_id`, clamped into `[0, 1]`.
    /// Returns the stored value.
    pub fn set_trait_position(&mut self, trait_id: &str, value: f64) -> f64 {
        let value = clamp_position(value);
        self.trait_positions.insert(trait_id.to_string(), value);
        value
    }

    /// Move the bubble on a trait line as a user would by dragging it.
    /// Returns `false` and leaves the map untouched when the character is locked.
    pub fn drag_trait_position(&mut self, t: &Trait, value: f64) -> bool {
        if self.is_locked {
            return false;
        }
        if t.name != t.id {
            self.trait_positions.remove(t.name);
        }
        self.set_trait_position(t.id, value);
        true
    }

    /// Merge a trait-id to score map; traits missing from `scores` keep
    /// their current positions.
    pub fn apply_scores(&mut self, scores: &BTreeMap<String, f64>) {
        for (trait_id, &score) in scores {
            self.set_trait_position(trait_id, score);
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.name == name {
            return false;
        }
        self.name = name;
        true
    }

    pub fn set_color_hex(&mut self, color_hex: impl Into<String>) -> bool {
        let color_hex = color_hex.into();
        if self.color_hex == color_hex {
            return false;
        }
        self.color_hex = color_hex;
        true
    }

    pub fn set_locked(&mut self, locked: bool) -> bool {
        let changed = self.is_locked != locked;
        self.is_locked = locked;
        changed
    }

    pub fn set_visible(&mut self, visible: bool) -> bool {
        let changed = self.is_visible != visible;
        self.is_visible = visible;
        changed
    }

    /// Flip the lock and return the new state.
    pub fn toggle_locked(&mut self) -> bool {
        self.is_locked = !self.is_locked;
        self.is_locked
    }

    /// Flip visibility and return the new state.
    pub fn toggle_visible(&mut self) -> bool {
        self.is_visible = !self.is_visible;
        self.is_visible
    }

    /// Whether the questionnaire has been taken before.
    pub fn has_questionnaire(&self) -> bool {
        !self.questionnaire_answers.is_empty()
    }

    /// Clamp every stored position. Used after loading untrusted files.
    pub(crate) fn clamp_positions(&mut self) {
        for value in self.trait_positions.values_mut() {
            *value = clamp_position(*value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::find_trait;

    fn warmth() -> &'static Trait {
        find_trait("Warmth").expect("catalog trait")
    }

    #[test]
    fn test_size_accepts_labels_and_codes() {
        assert_eq!(BubbleSize::from_str("Supporting"), Some(BubbleSize::Medium));
        assert_eq!(BubbleSize::from_str("LARGE"), Some(BubbleSize::Large));
        assert_eq!(BubbleSize::from_code(0), Some(BubbleSize::Small));
        assert_eq!(BubbleSize::from_code(3), None);
    }

    #[test]
    fn test_size_deserializes_from_both_encodings() {
        let from_code: BubbleSize = serde_json::from_str("1").unwrap();
        let from_name: BubbleSize = serde_json::from_str("\"Small\"").unwrap();
        assert_eq!(from_code, BubbleSize::Medium);
        assert_eq!(from_name, BubbleSize::Small);
        assert!(serde_json::from_str::<BubbleSize>("7").is_err());
        assert_eq!(serde_json::to_string(&BubbleSize::Large).unwrap(), "\"Large\"");
    }

    #[test]
    fn test_set_trait_position_clamps() {
        let mut c = Character::default();
        assert_eq!(c.set_trait_position("Warmth", 1.7), 1.0);
        assert_eq!(c.set_trait_position("Warmth", -0.2), 0.0);
        assert_eq!(c.set_trait_position("Warmth", f64::NAN), DEFAULT_POSITION);
    }

    #[test]
    fn test_locked_character_ignores_drag() {
        let mut c = Character::default();
        c.set_trait_position("Warmth", 0.2);
        c.set_locked(true);

        assert!(!c.drag_trait_position(warmth(), 0.9));
        assert_eq!(c.trait_positions.get("Warmth"), Some(&0.2));

        c.set_locked(false);
        assert!(c.drag_trait_position(warmth(), 0.9));
        assert_eq!(c.trait_positions.get("Warmth"), Some(&0.9));
    }

    #[test]
    fn test_peek_does_not_mutate() {
        let mut c = Character::default();
        c.trait_positions.insert("Emotional Stability".to_string(), 0.3);
        let t = find_trait("EmotionalStability").unwrap();

        assert_eq!(c.peek_trait_position(t), 0.3);
        assert_eq!(c.peek_trait_position(warmth()), DEFAULT_POSITION);
        assert_eq!(c.trait_positions.len(), 1);
    }

    #[test]
    fn test_setters_report_changes() {
        let mut c = Character::new("Ada", "#BF4C4C", BubbleSize::Medium);
        assert!(!c.set_name("Ada"));
        assert!(c.set_name("Ada Byron"));
        assert!(c.set_visible(false));
        assert!(!c.set_visible(false));
        assert!(c.toggle_visible());
    }
}
