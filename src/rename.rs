//! Rename propagation.
//!
//! When the diff engine detects that an edit renamed a symbol, the rename is
//! replayed through the language service so every other occurrence in the
//! workspace follows along. Propagation is an enhancement: if it fails, the
//! body edit still proceeds and only the blast-radius record is lost.

use serde::Serialize;
use tracing::debug;

use crate::lsp::LanguageService;
use crate::symbol::SymbolTree;

/// Blast radius of one successfully propagated rename, as reported by the
/// rename capability itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PropagatedChange {
    Rename {
        files_affected: Vec<String>,
        total_edits: u32,
    },
}

/// Replay a detected rename through the language service.
///
/// `old_qualified` may be dotted (`Parent.child`); it is resolved by
/// recursive descent over the pre-edit snapshot, and the rename is invoked
/// at the resolved identifier position. The file must still hold its
/// pre-edit content. Failure is swallowed: `None` means no propagation
/// happened, not that the edit must stop.
pub async fn propagate_rename(
    service: &dyn LanguageService,
    file: &str,
    tree: &SymbolTree,
    old_qualified: &str,
    new_name: &str,
) -> Option<PropagatedChange> {
    let Some(id) = tree.resolve_qualified(old_qualified) else {
        debug!(symbol = old_qualified, "rename propagation: symbol not resolvable, skipping");
        return None;
    };

    let position = tree.node(id).selection;
    match service
        .execute_rename(file, position.line, position.column, new_name)
        .await
    {
        Ok(outcome) if outcome.success => Some(PropagatedChange::Rename {
            files_affected: outcome.files_affected,
            total_edits: outcome.total_edits,
        }),
        Ok(_) => {
            debug!(symbol = old_qualified, "rename capability reported no-op");
            None
        }
        Err(error) => {
            debug!(symbol = old_qualified, %error, "rename propagation failed, continuing");
            None
        }
    }
}

/// Qualified name of the symbol after the rename: the old dotted path with
/// its final segment replaced.
pub(crate) fn renamed_qualified_name(old_qualified: &str, new_name: &str) -> String {
    match old_qualified.rsplit_once('.') {
        Some((parents, _)) => format!("{parents}.{new_name}"),
        None => new_name.to_string(),
    }
}
