use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::character::{null_as_default, BubbleSize, Character};
use crate::ordering;

/// Format version written by [`crate::store::save`]. Files without a
/// version field predate it and are treated as version 1.
pub const FORMAT_VERSION: u32 = 2;

pub const DEFAULT_PROJECT_NAME: &str = "Untitled Project";
pub const DEFAULT_LANGUAGE: &str = "en";

fn legacy_format_version() -> u32 {
    1
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

/// A character map: the characters placed on the trait lines plus free-text
/// notes per trait.
///
/// Projects are replaced wholesale on load; nothing here merges two
/// projects together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Project {
    #[serde(default = "legacy_format_version", alias = "formatVersion")]
    pub format_version: u32,
    #[serde(default, alias = "name")]
    pub name: String,
    /// List order carries no meaning; see `display_order` on each character.
    #[serde(default, alias = "characters", deserialize_with = "null_as_default")]
    pub characters: Vec<Character>,
    /// Trait id to note text.
    #[serde(default, alias = "traitNotes", deserialize_with = "null_as_default")]
    pub trait_notes: BTreeMap<String, String>,
    /// Advisory language code of the session that last saved the file.
    #[serde(default = "default_language", alias = "selectedLanguage")]
    pub selected_language: String,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            format_version: FORMAT_VERSION,
            name: String::new(),
            characters: Vec::new(),
            trait_notes: BTreeMap::new(),
            selected_language: default_language(),
        }
    }
}

impl Project {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Suggested file stem when saving for the first time.
    pub fn default_file_name(&self) -> &str {
        if self.name.trim().is_empty() {
            DEFAULT_PROJECT_NAME
        } else {
            &self.name
        }
    }

    pub fn has_characters(&self) -> bool {
        !self.characters.is_empty()
    }

    /// Add a character at the end of its size group and return its index.
    ///
    /// A blank name is replaced with the first free `Character N`.
    pub fn add_character(&mut self, mut character: Character) -> usize {
        if character.name.trim().is_empty() {
            character.name = self.next_default_name();
        }
        character.display_order = ordering::group_indices(&self.characters, character.size).len();
        tracing::debug!(
            name = %character.name,
            size = character.size.as_str(),
            order = character.display_order,
            "adding character"
        );
        self.characters.push(character);
        self.characters.len() - 1
    }

    fn next_default_name(&self) -> String {
        let taken: HashSet<String> = self
            .characters
            .iter()
            .map(|c| c.name.to_lowercase())
            .collect();
        (1..)
            .map(|n| format!("Character {}", n))
            .find(|name| !taken.contains(&name.to_lowercase()))
            .unwrap_or_else(|| "Character".to_string())
    }

    /// Remove a character and close the gap it leaves in its group.
    pub fn remove_character(&mut self, index: usize) -> Option<Character> {
        if index >= self.characters.len() {
            return None;
        }
        let removed = self.characters.remove(index);
        ordering::renumber_group(&mut self.characters, removed.size);
        Some(removed)
    }

    /// Move a character to another group, placing it last there.
    /// Returns `false` when the index is invalid or the size is unchanged.
    pub fn set_character_size(&mut self, index: usize, size: BubbleSize) -> bool {
        let Some(old) = self.characters.get(index).map(|c| c.size) else {
            return false;
        };
        if old == size {
            return false;
        }
        let order = ordering::group_indices(&self.characters, size).len();
        let character = &mut self.characters[index];
        character.size = size;
        character.display_order = order;
        ordering::renumber_group(&mut self.characters, old);
        true
    }

    /// See [`ordering::reorder`].
    pub fn reorder(&mut self, dropped: usize, target: usize, insert_after: bool) -> bool {
        ordering::reorder(&mut self.characters, dropped, target, insert_after)
    }

    /// See [`ordering::move_to_end`].
    pub fn move_to_end(&mut self, dropped: usize) -> bool {
        ordering::move_to_end(&mut self.characters, dropped)
    }

    /// Characters of one group in display order.
    pub fn group(&self, size: BubbleSize) -> Vec<&Character> {
        ordering::group_indices(&self.characters, size)
            .into_iter()
            .map(|i| &self.characters[i])
            .collect()
    }

    /// Index of the first character whose name matches, ignoring case.
    pub fn find_character(&self, name: &str) -> Option<usize> {
        self.characters
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn note(&self, trait_id: &str) -> Option<&str> {
        self.trait_notes.get(trait_id).map(String::as_str)
    }

    /// Store a note for a trait. An empty note removes the entry.
    /// Returns whether the stored text changed.
    pub fn set_note(&mut self, trait_id: &str, text: impl Into<String>) -> bool {
        let text = text.into();
        if text.is_empty() {
            return self.trait_notes.remove(trait_id).is_some();
        }
        match self.trait_notes.get(trait_id) {
            Some(existing) if *existing == text => false,
            _ => {
                self.trait_notes.insert(trait_id.to_string(), text);
                true
            }
        }
    }

    /// Whether any note has visible text.
    pub fn has_notes(&self) -> bool {
        self.trait_notes.values().any(|n| !n.trim().is_empty())
    }

    /// Run the position resolver for every character and catalog trait so
    /// legacy name keys are migrated before the project is written out.
    pub fn resolve_all_positions(&mut self) {
        for character in &mut self.characters {
            for t in super::all_traits() {
                character.trait_position(t);
            }
        }
    }

    /// Repair invariants that a hand-edited or old file may break.
    pub(crate) fn repair(&mut self) {
        for character in &mut self.characters {
            character.clamp_positions();
        }
        if !ordering::is_contiguous(&self.characters) {
            tracing::debug!("renumbering display order per size group");
            ordering::normalize_display_order(&mut self.characters);
        }
    }
}
