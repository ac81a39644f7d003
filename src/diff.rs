//! Symbol diff engine.
//!
//! Compares the pre-edit and post-edit symbol trees of a single file and
//! classifies what the edit meant: a rename, a deletion, an addition, or a
//! body change. Classification is purely positional; no source text is
//! inspected here.

use serde::Serialize;

use crate::symbol::{NodeId, SymbolTree};

/// Geometry of a ranged replacement, derived from the requested span and the
/// line count of the replacement text. Used to correlate pre/post symbol
/// positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditGeometry {
    /// Last line occupied by the new content after the edit.
    pub new_content_end_line: u32,
    /// Net change in the file's line count.
    pub lines_delta: i64,
}

impl EditGeometry {
    pub fn from_edit(start_line: u32, end_line: u32, new_content: &str) -> Self {
        let new_lines = line_count(new_content);
        Self {
            new_content_end_line: start_line + new_lines - 1,
            lines_delta: i64::from(new_lines) - i64::from(end_line - start_line + 1),
        }
    }
}

/// Line count of replacement text. A replacement is never zero lines, so the
/// empty string counts as one.
pub fn line_count(text: &str) -> u32 {
    text.split('\n').count() as u32
}

/// The classified meaning of one physical symbol edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DetectedIntent {
    Rename {
        /// Qualified pre-edit name.
        symbol: String,
        new_name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },
    Delete {
        symbol: String,
    },
    Add {
        symbol: String,
    },
    BodyChange {
        symbol: String,
    },
}

impl DetectedIntent {
    pub fn is_rename(&self) -> bool {
        matches!(self, DetectedIntent::Rename { .. })
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, DetectedIntent::Delete { .. })
    }
}

/// Diff two symbol snapshots around an edit of `[start_line, end_line]`.
///
/// Old-tree symbols whose identifier sits inside the edited span are
/// candidates for removal or rename; new-tree symbols inside the adjusted
/// span are candidates for addition or rename. Candidates are paired
/// greedily, same kind first, nearest delta-adjusted position winning ties.
/// Each candidate contributes at most one intent.
pub fn diff_symbol_trees(
    old: &SymbolTree,
    new: &SymbolTree,
    start_line: u32,
    end_line: u32,
    geometry: EditGeometry,
) -> Vec<DetectedIntent> {
    let old_candidates: Vec<NodeId> = old
        .ids()
        .filter(|&id| {
            let line = old.node(id).selection.line;
            line >= start_line && line <= end_line
        })
        .collect();
    let new_candidates: Vec<NodeId> = new
        .ids()
        .filter(|&id| {
            let line = new.node(id).selection.line;
            line >= start_line && line <= geometry.new_content_end_line
        })
        .collect();

    let pairs = match_candidates(old, &old_candidates, new, &new_candidates, geometry);

    let mut intents = Vec::new();
    let mut matched_new = vec![false; new_candidates.len()];

    for (slot, &old_id) in old_candidates.iter().enumerate() {
        let old_node = old.node(old_id);
        match pairs[slot] {
            Some(new_slot) => {
                matched_new[new_slot] = true;
                let new_node = new.node(new_candidates[new_slot]);
                if old_node.name != new_node.name {
                    let details = if old_node.kind == new_node.kind {
                        Some(old_node.kind.label().to_string())
                    } else {
                        None
                    };
                    intents.push(DetectedIntent::Rename {
                        symbol: old.qualified_name(old_id),
                        new_name: new_node.name.clone(),
                        details,
                    });
                } else if old_node.range.height() != new_node.range.height() {
                    intents.push(DetectedIntent::BodyChange {
                        symbol: old.qualified_name(old_id),
                    });
                }
            }
            None => intents.push(DetectedIntent::Delete {
                symbol: old.qualified_name(old_id),
            }),
        }
    }

    for (new_slot, &new_id) in new_candidates.iter().enumerate() {
        if !matched_new[new_slot] {
            intents.push(DetectedIntent::Add {
                symbol: new.qualified_name(new_id),
            });
        }
    }

    intents
}

/// Pair old candidates with new candidates.
///
/// Round one pairs symbols of the same kind by smallest adjusted-position
/// distance. Round two sweeps up kind changes: leftovers that kept their
/// name pair up regardless of kind. Anything still unpaired is a delete or
/// an add.
fn match_candidates(
    old: &SymbolTree,
    old_candidates: &[NodeId],
    new: &SymbolTree,
    new_candidates: &[NodeId],
    geometry: EditGeometry,
) -> Vec<Option<usize>> {
    let mut assignment: Vec<Option<usize>> = vec![None; old_candidates.len()];
    let mut new_taken = vec![false; new_candidates.len()];

    let mut scored: Vec<(u32, usize, usize)> = Vec::new();
    for (old_slot, &old_id) in old_candidates.iter().enumerate() {
        let old_node = old.node(old_id);
        let adjusted = adjust_line(old_node.selection.line, geometry.lines_delta);
        for (new_slot, &new_id) in new_candidates.iter().enumerate() {
            let new_node = new.node(new_id);
            if new_node.kind != old_node.kind {
                continue;
            }
            let distance = new_node.selection.line.abs_diff(adjusted);
            scored.push((distance, old_slot, new_slot));
        }
    }
    scored.sort_by_key(|&(distance, old_slot, new_slot)| (distance, old_slot, new_slot));

    for (_, old_slot, new_slot) in scored {
        if assignment[old_slot].is_none() && !new_taken[new_slot] {
            assignment[old_slot] = Some(new_slot);
            new_taken[new_slot] = true;
        }
    }

    // Kind changed but the name survived: treat as the same symbol.
    for (old_slot, &old_id) in old_candidates.iter().enumerate() {
        if assignment[old_slot].is_some() {
            continue;
        }
        let old_name = &old.node(old_id).name;
        for (new_slot, &new_id) in new_candidates.iter().enumerate() {
            if !new_taken[new_slot] && &new.node(new_id).name == old_name {
                assignment[old_slot] = Some(new_slot);
                new_taken[new_slot] = true;
                break;
            }
        }
    }

    assignment
}

fn adjust_line(line: u32, delta: i64) -> u32 {
    let adjusted = i64::from(line) + delta;
    adjusted.max(1) as u32
}
