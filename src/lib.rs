//! Edit Sentinel: a symbol-aware edit safety layer.
//!
//! Applies a proposed ranged edit to a single source file while classifying
//! what the edit meant, blocking deletes that would strand references in
//! other files, propagating detected renames through the workspace, and
//! attempting a bounded number of automatic repairs of any diagnostics the
//! edit introduced.
//!
//! # Architecture
//!
//! This crate does no parsing of its own. Symbol outlines, reference search,
//! rename execution, diagnostics, and quick fixes all come from a host
//! language service behind the [`LanguageService`] capability trait; the
//! orchestrator sequences a five-phase protocol over that trait:
//!
//! 1. snapshot the pre-edit outline and text,
//! 2. tentatively apply the edit,
//! 3. diff the before/after outlines into [`DetectedIntent`]s,
//! 4. for renames and deletes, revert, guard, propagate, and re-apply,
//! 5. finalize with a bounded auto-fix pass and a diagnostics snapshot.
//!
//! # Safety behavior
//!
//! - A delete with references in another file blocks the edit and leaves
//!   the file untouched.
//! - A detected rename is replayed workspace-wide before the body edit
//!   lands; propagation failure never stops the edit.
//! - Every failure path resolves to a [`FileEditResult`] with
//!   `success: false` and a readable summary; the entry point never errors.
//!
//! # Example
//!
//! ```no_run
//! use edit_sentinel::{execute_edit_with_safety_layer, LanguageService};
//!
//! async fn edit(service: &dyn LanguageService) {
//!     let result = execute_edit_with_safety_layer(
//!         service,
//!         "src/app.ts",
//!         10,
//!         14,
//!         "function renamed() {\n  return 2;\n}",
//!     )
//!     .await;
//!     println!("{}", result.summary);
//! }
//! ```

pub mod autofix;
pub mod diff;
pub mod guard;
pub mod lsp;
pub mod orchestrator;
pub mod rename;
pub mod settings;
pub mod symbol;

// Re-exports
pub use autofix::{AutoFix, AutofixOutcome, RemainingError};
pub use diff::{diff_symbol_trees, line_count, DetectedIntent, EditGeometry};
pub use guard::{check_delete_safety, DeleteVerdict};
pub use lsp::{
    AppliedAction, CodeAction, Diagnostic, EditApplyError, LanguageService, Reference,
    RenameOutcome, ServiceError, Severity,
};
pub use orchestrator::{execute_edit_with_safety_layer, EditOrchestrator, FileEditResult};
pub use rename::{propagate_rename, PropagatedChange};
pub use settings::SafetyConfig;
pub use symbol::{LineRange, NodeId, Position, SymbolKind, SymbolNode, SymbolTree};
