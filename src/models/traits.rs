use serde::Serialize;

/// A personality dimension characters are placed on.
///
/// The `id` is the stable key used in [`Character::trait_positions`] and in
/// project notes. The remaining fields are display text; `name` in
/// particular was used as the storage key by older project files, which is
/// why the position resolver still looks it up.
///
/// [`Character::trait_positions`]: super::Character::trait_positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Trait {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub low_label: &'static str,
    pub high_label: &'static str,
}

impl Trait {
    pub const fn new(
        id: &'static str,
        name: &'static str,
        description: &'static str,
        low_label: &'static str,
        high_label: &'static str,
    ) -> Self {
        Self {
            id,
            name,
            description,
            low_label,
            high_label,
        }
    }
}

pub const TRAIT_COUNT: usize = 16;

static CATALOG: [Trait; TRAIT_COUNT] = [
    Trait::new(
        "Warmth",
        "Warmth",
        "How readily the character shows care and attention to others.",
        "Reserved",
        "Warm",
    ),
    Trait::new(
        "Intellect",
        "Intellect",
        "Appetite for abstract reasoning and problem solving.",
        "Concrete",
        "Abstract",
    ),
    Trait::new(
        "EmotionalStability",
        "Emotional Stability",
        "How evenly the character handles pressure and setbacks.",
        "Reactive",
        "Stable",
    ),
    Trait::new(
        "Assertiveness",
        "Assertiveness",
        "Tendency to push their own will on people and events.",
        "Deferential",
        "Dominant",
    ),
    Trait::new(
        "Gregariousness",
        "Gregariousness",
        "Energy and spontaneity in company.",
        "Serious",
        "Lively",
    ),
    Trait::new(
        "Dutifulness",
        "Dutifulness",
        "Respect for rules, obligations and conventions.",
        "Expedient",
        "Rule-conscious",
    ),
    Trait::new(
        "SocialConfidence",
        "Social Confidence",
        "Boldness when facing strangers, crowds and attention.",
        "Shy",
        "Bold",
    ),
    Trait::new(
        "Sensitivity",
        "Sensitivity",
        "Whether feelings or practicality guide their judgement.",
        "Utilitarian",
        "Sensitive",
    ),
    Trait::new(
        "Distrust",
        "Distrust",
        "Suspicion of other people's motives.",
        "Trusting",
        "Vigilant",
    ),
    Trait::new(
        "Imagination",
        "Imagination",
        "Attention to inner ideas over the immediate world.",
        "Grounded",
        "Abstracted",
    ),
    Trait::new(
        "Reserve",
        "Reserve",
        "How much of themselves they keep hidden.",
        "Forthright",
        "Private",
    ),
    Trait::new(
        "Anxiety",
        "Anxiety",
        "Proneness to worry, doubt and self-blame.",
        "Self-assured",
        "Apprehensive",
    ),
    Trait::new(
        "Complexity",
        "Complexity",
        "Openness to change and unconventional thinking.",
        "Traditional",
        "Open to change",
    ),
    Trait::new(
        "Introversion",
        "Introversion",
        "Preference for solitude and self-reliance over groups.",
        "Group-oriented",
        "Self-reliant",
    ),
    Trait::new(
        "Orderliness",
        "Orderliness",
        "Need for structure, precision and self-control.",
        "Flexible",
        "Perfectionist",
    ),
    Trait::new(
        "Emotionality",
        "Emotionality",
        "Inner restlessness and intensity of feeling.",
        "Relaxed",
        "Tense",
    ),
];

/// All traits in display order.
pub fn all_traits() -> &'static [Trait] {
    &CATALOG
}

/// Look up a trait by its stable id.
pub fn find_trait(id: &str) -> Option<&'static Trait> {
    CATALOG.iter().find(|t| t.id == id)
}

/// Resolve user input to a trait: exact id first, then a case-insensitive
/// match on id or display name.
pub fn lookup_trait(key: &str) -> Option<&'static Trait> {
    find_trait(key).or_else(|| {
        CATALOG
            .iter()
            .find(|t| t.id.eq_ignore_ascii_case(key) || t.name.eq_ignore_ascii_case(key))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_has_sixteen_unique_ids() {
        let ids: HashSet<_> = all_traits().iter().map(|t| t.id).collect();
        assert_eq!(ids.len(), TRAIT_COUNT);
    }

    #[test]
    fn test_catalog_order_is_stable() {
        let first = all_traits().first().map(|t| t.id);
        let last = all_traits().last().map(|t| t.id);
        assert_eq!(first, Some("Warmth"));
        assert_eq!(last, Some("Emotionality"));
    }

    #[test]
    fn test_lookup_by_display_name() {
        let t = lookup_trait("social confidence").expect("trait");
        assert_eq!(t.id, "SocialConfidence");
        assert!(lookup_trait("Charisma").is_none());
    }
}
