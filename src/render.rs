//! Plain-text views of a project for terminal output and notes export.

use crate::models::{all_traits, palette_name, BubbleSize, Character, Project, Trait};

const LOCKED: char = '🔒';
const HIDDEN: char = '◌';
const VISIBLE: char = '●';

/// Width of the track drawn for each trait line.
pub const LINE_WIDTH: usize = 41;

fn status_symbol(character: &Character) -> char {
    if character.is_visible {
        VISIBLE
    } else {
        HIDDEN
    }
}

/// Render the roster, one section per non-empty group.
///
/// Example output:
/// ```text
/// Main
/// ├── ● Ada (#BF4C4C Red)
/// └── ◌ Ben (#123456) 🔒
/// Background
/// └── ● Cy (#808080 Gray)
/// ```
pub fn render_roster(project: &Project) -> String {
    let mut output = String::new();
    for size in BubbleSize::GROUPS {
        let group = project.group(size);
        if group.is_empty() {
            continue;
        }
        output.push_str(size.label());
        output.push('\n');
        for (i, character) in group.iter().enumerate() {
            let branch = if i == group.len() - 1 { "└── " } else { "├── " };
            output.push_str(branch);
            output.push(status_symbol(character));
            output.push(' ');
            output.push_str(&character.name);
            output.push_str(" (");
            output.push_str(&character.color_hex);
            if let Some(name) = palette_name(&character.color_hex) {
                output.push(' ');
                output.push_str(name);
            }
            output.push(')');
            if character.is_locked {
                output.push(' ');
                output.push(LOCKED);
            }
            output.push('\n');
        }
    }
    output
}

/// Column on a track of `width` cells for a position in `[0, 1]`.
fn column(position: f64, width: usize) -> usize {
    let last = width.saturating_sub(1) as f64;
    (position.clamp(0.0, 1.0) * last).round() as usize
}

/// One trait line with the initials of visible characters at their positions.
/// Characters landing on the same cell share it with `*`.
pub fn render_trait_line(t: &Trait, characters: &[&Character]) -> String {
    let mut track = vec!['─'; LINE_WIDTH];
    for character in characters.iter().filter(|c| c.is_visible) {
        let col = column(character.peek_trait_position(t), LINE_WIDTH);
        let mark = character
            .name
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('?');
        track[col] = if track[col] == '─' { mark } else { '*' };
    }
    let track: String = track.into_iter().collect();
    format!("{}\n  {} ├{}┤ {}\n", t.name, t.low_label, track, t.high_label)
}

/// Every trait line in catalog order, listing background characters first and
/// main characters last. Collisions are starred whatever the group.
pub fn render_trait_lines(project: &Project) -> String {
    let mut characters: Vec<&Character> = Vec::new();
    for size in BubbleSize::GROUPS.iter().rev() {
        characters.extend(project.group(*size));
    }
    all_traits()
        .iter()
        .map(|t| render_trait_line(t, &characters))
        .collect()
}

/// Notes export text: a header, then each non-blank note under its trait
/// name in catalog order.
pub fn render_notes(project: &Project) -> String {
    let mut output = format!("Notes for Project: {}\n", project.name);
    output.push_str(&"-".repeat(30));
    output.push_str("\n\n");

    for t in all_traits() {
        let Some(note) = project.note(t.id).filter(|n| !n.trim().is_empty()) else {
            continue;
        };
        output.push_str(&format!("[{}]\n{}\n\n", t.name, note));
        output.push_str(&"-".repeat(20));
        output.push_str("\n\n");
    }
    output
}
