//! Display-order maintenance for size groups.
//!
//! Characters are addressed by their index in the project's character list.
//! Every operation here only rewrites `display_order` inside one group and
//! leaves it as the contiguous sequence `0..N-1`.

use crate::models::{BubbleSize, Character};

/// Indices of the characters in `size`'s group, ordered by `display_order`.
/// Ties keep list order.
pub fn group_indices(characters: &[Character], size: BubbleSize) -> Vec<usize> {
    let mut indices: Vec<usize> = characters
        .iter()
        .enumerate()
        .filter(|(_, c)| c.size == size)
        .map(|(i, _)| i)
        .collect();
    indices.sort_by_key(|&i| characters[i].display_order);
    indices
}

fn assign_order(characters: &mut [Character], order: &[usize]) {
    for (position, &index) in order.iter().enumerate() {
        characters[index].display_order = position;
    }
}

/// Move `dropped` next to `target` within their shared group.
///
/// The dropped character lands before the target, or after it when
/// `insert_after` is set. If the target cannot be found in the group once the
/// dropped character is taken out (including dropping onto itself or an index
/// past the end), the dropped character goes to the end of the group.
///
/// Returns `false` without touching anything when `dropped` is out of range
/// or the two characters belong to different groups.
pub fn reorder(
    characters: &mut [Character],
    dropped: usize,
    target: usize,
    insert_after: bool,
) -> bool {
    let Some(size) = characters.get(dropped).map(|c| c.size) else {
        return false;
    };
    if let Some(target_character) = characters.get(target) {
        if target_character.size != size {
            tracing::debug!(dropped, target, "ignoring reorder across size groups");
            return false;
        }
    }

    let mut group = group_indices(characters, size);
    group.retain(|&i| i != dropped);

    match group.iter().position(|&i| i == target) {
        Some(at) => {
            let at = if insert_after { at + 1 } else { at };
            group.insert(at, dropped);
        }
        None => group.push(dropped),
    }

    assign_order(characters, &group);
    true
}

/// Move `dropped` to the end of its own group, as when it is released
/// outside every list item.
pub fn move_to_end(characters: &mut [Character], dropped: usize) -> bool {
    let Some(size) = characters.get(dropped).map(|c| c.size) else {
        return false;
    };
    let mut group = group_indices(characters, size);
    group.retain(|&i| i != dropped);
    group.push(dropped);
    assign_order(characters, &group);
    true
}

/// Close gaps and duplicates in one group while keeping its relative order.
pub fn renumber_group(characters: &mut [Character], size: BubbleSize) {
    let group = group_indices(characters, size);
    assign_order(characters, &group);
}

/// Renumber every group. Older files numbered characters across the whole
/// project rather than per group.
pub fn normalize_display_order(characters: &mut [Character]) {
    for size in BubbleSize::GROUPS {
        renumber_group(characters, size);
    }
}

/// Whether every group's orders are exactly `0..N-1`.
pub fn is_contiguous(characters: &[Character]) -> bool {
    BubbleSize::GROUPS.iter().all(|&size| {
        group_indices(characters, size)
            .iter()
            .enumerate()
            .all(|(position, &i)| characters[i].display_order == position)
    })
}
