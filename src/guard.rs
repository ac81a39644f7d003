//! Reference guard for symbol deletions.
//!
//! Before a delete is allowed through, every reference to the symbol is
//! checked against the edited file's own path. A reference living in any
//! other file blocks the delete. When the reference lookup itself fails the
//! delete is allowed: provider outages must not make the editor unusable.

use tracing::{debug, warn};

use crate::lsp::{LanguageService, Reference};
use crate::symbol::SymbolTree;

/// Verdict on whether a detected delete may proceed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteVerdict {
    Allowed,
    Blocked {
        symbol: String,
        /// Count of individual references outside the edited file.
        reference_count: usize,
        /// Affected files, deduplicated in first-seen order.
        files: Vec<String>,
    },
}

/// Check whether deleting `symbol_name` would strand references elsewhere.
///
/// The symbol is resolved by exact top-level name in the pre-edit snapshot;
/// the file must still hold its pre-edit content when this runs so the
/// reference query sees the original identifier.
pub async fn check_delete_safety(
    service: &dyn LanguageService,
    file: &str,
    tree: &SymbolTree,
    symbol_name: &str,
) -> DeleteVerdict {
    let Some(id) = tree.resolve_top_level(symbol_name) else {
        debug!(symbol = symbol_name, "delete guard: symbol not in snapshot, allowing");
        return DeleteVerdict::Allowed;
    };

    let position = tree.node(id).selection;
    let references = match service
        .find_references(file, position.line, position.column)
        .await
    {
        Ok(references) => references,
        Err(error) => {
            // Fail-open: availability over safety on provider outages.
            warn!(symbol = symbol_name, %error, "reference lookup failed, allowing delete");
            return DeleteVerdict::Allowed;
        }
    };

    let (reference_count, files) = external_references(&references, file);
    if reference_count == 0 {
        DeleteVerdict::Allowed
    } else {
        DeleteVerdict::Blocked {
            symbol: symbol_name.to_string(),
            reference_count,
            files,
        }
    }
}

/// Count references outside the edited file and collect their paths.
fn external_references(references: &[Reference], edited_file: &str) -> (usize, Vec<String>) {
    let own = normalize_path(edited_file);
    let mut count = 0;
    let mut files = Vec::new();
    for reference in references {
        let normalized = normalize_path(&reference.file);
        if !same_file(&normalized, &own) {
            count += 1;
            if !files.contains(&reference.file) {
                files.push(reference.file.clone());
            }
        }
    }
    (count, files)
}

/// Forward slashes throughout; case-folded where the host filesystem
/// compares paths case-insensitively.
fn normalize_path(path: &str) -> String {
    let forward = path.replace('\\', "/");
    if cfg!(any(windows, target_os = "macos")) {
        forward.to_lowercase()
    } else {
        forward
    }
}

/// Whether two normalized paths plausibly name the same file: equal, or one
/// is a path-segment suffix of the other (relative vs. absolute spellings of
/// the same location).
fn same_file(a: &str, b: &str) -> bool {
    a == b || a.ends_with(&format!("/{b}")) || b.ends_with(&format!("/{a}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(file: &str) -> Reference {
        Reference {
            file: file.into(),
            line: 1,
            column: 1,
        }
    }

    #[test]
    fn same_file_spellings_are_internal() {
        let refs = vec![
            reference("/work/src/app.ts"),
            reference("src/app.ts"),
            reference("src\\app.ts"),
        ];
        let (count, files) = external_references(&refs, "/work/src/app.ts");
        assert_eq!(count, 0);
        assert!(files.is_empty());
    }

    #[test]
    fn references_in_other_files_are_external() {
        let refs = vec![
            reference("/work/src/app.ts"),
            reference("/work/src/other.ts"),
            reference("/work/src/other.ts"),
            reference("/work/lib/util.ts"),
        ];
        let (count, files) = external_references(&refs, "/work/src/app.ts");
        assert_eq!(count, 3);
        assert_eq!(files, vec!["/work/src/other.ts", "/work/lib/util.ts"]);
    }

    #[test]
    fn suffix_match_requires_segment_boundary() {
        // "app.ts" must not swallow "my_app.ts".
        let refs = vec![reference("/work/src/my_app.ts")];
        let (count, _) = external_references(&refs, "app.ts");
        assert_eq!(count, 1);
    }

    #[test]
    fn relative_edited_path_matches_absolute_reference() {
        let refs = vec![reference("/work/src/app.ts")];
        let (count, _) = external_references(&refs, "src/app.ts");
        assert_eq!(count, 0);
    }
}
