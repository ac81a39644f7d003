//! The edit orchestrator.
//!
//! Sequences the five-phase protocol around a single ranged edit:
//! snapshot, tentative apply, classify, guard + propagate, finalize.
//! Every branch normalizes to a [`FileEditResult`]; nothing here panics or
//! returns an error to the caller.
//!
//! Failure taxonomy:
//! - fatal: the initial apply, a blocked unsafe delete, or the re-apply
//!   after rename propagation;
//! - degraded: missing snapshots, reference-lookup outages, and individual
//!   rename or fix failures; the protocol continues with reduced safety;
//! - salvage: a failed revert leaves the tentative edit in place and the
//!   result reports what was detected rather than pretending nothing
//!   happened.

use serde::Serialize;
use tracing::{debug, warn};

use crate::autofix::{run_autofix_pass, AutoFix, AutofixOutcome, RemainingError};
use crate::diff::{diff_symbol_trees, DetectedIntent, EditGeometry};
use crate::guard::{check_delete_safety, DeleteVerdict};
use crate::lsp::{LanguageService, Severity};
use crate::rename::{propagate_rename, renamed_qualified_name, PropagatedChange};
use crate::settings::SafetyConfig;
use crate::symbol::SymbolTree;

/// The sole observable output of an edit: applied or not, what the edit
/// meant, what was propagated or repaired, and what diagnostics remain.
#[derive(Debug, Serialize)]
pub struct FileEditResult {
    pub success: bool,
    pub file: String,
    pub detected_intents: Vec<DetectedIntent>,
    pub propagated: Vec<PropagatedChange>,
    pub auto_fixed: Vec<AutoFix>,
    pub remaining_errors: Vec<RemainingError>,
    pub summary: String,
}

impl FileEditResult {
    fn failure(file: &str, summary: String) -> Self {
        Self {
            success: false,
            file: file.to_string(),
            detected_intents: Vec::new(),
            propagated: Vec::new(),
            auto_fixed: Vec::new(),
            remaining_errors: Vec::new(),
            summary,
        }
    }
}

/// Outcome of the guard + propagate phase.
enum SafetyOutcome {
    /// Terminal: blocked delete or fatal re-apply failure.
    Abort(Box<FileEditResult>),
    /// Safety phases finished (or were salvaged); finalize with these.
    Proceed {
        intents: Vec<DetectedIntent>,
        propagated: Vec<PropagatedChange>,
    },
}

/// Applies one edit to one file with the full safety protocol.
///
/// One orchestrator instance may serve many sequential edits; concurrent
/// edits to the *same* file must be serialized by the caller.
pub struct EditOrchestrator<'a> {
    service: &'a dyn LanguageService,
    config: SafetyConfig,
}

impl<'a> EditOrchestrator<'a> {
    pub fn new(service: &'a dyn LanguageService, config: SafetyConfig) -> Self {
        Self { service, config }
    }

    /// Replace `[start_line, end_line]` of `file` with `new_content`,
    /// running intent classification, delete guarding, rename propagation,
    /// and bounded auto-fix around the edit. Never errors: every failure
    /// path resolves to `success: false` with a readable summary.
    pub async fn execute(
        &self,
        file: &str,
        start_line: u32,
        end_line: u32,
        new_content: &str,
    ) -> FileEditResult {
        // Phase 1: best-effort snapshots. Either may fail; each failure
        // just disables the safety feature that depends on it.
        let pre_tree = match self.service.get_symbols(file).await {
            Ok(tree) => Some(tree),
            Err(error) => {
                warn!(file, %error, "no symbol snapshot; intent classification disabled");
                None
            }
        };
        let old_text = match self.service.read_range(file, start_line, end_line).await {
            Ok(text) => Some(text),
            Err(error) => {
                warn!(file, %error, "pre-edit text unreadable; revert and delete guard disabled");
                None
            }
        };

        // Phase 2: tentative apply. Fatal on failure.
        if let Err(error) = self
            .service
            .apply_edit(file, start_line, end_line, new_content)
            .await
        {
            return FileEditResult::failure(file, format!("Edit failed: {error}"));
        }

        let geometry = EditGeometry::from_edit(start_line, end_line, new_content);

        // Phase 3: classify against the post-edit outline.
        let mut all_intents = Vec::new();
        let snapshot_tree = match pre_tree {
            Some(old_tree) => {
                match self.service.get_symbols(file).await {
                    Ok(new_tree) => {
                        all_intents = diff_symbol_trees(
                            &old_tree, &new_tree, start_line, end_line, geometry,
                        );
                    }
                    Err(error) => {
                        debug!(file, %error, "post-edit symbols unavailable; no intents");
                    }
                }
                Some(old_tree)
            }
            None => None,
        };

        let has_rename = all_intents.iter().any(DetectedIntent::is_rename);
        let has_delete = all_intents.iter().any(DetectedIntent::is_delete);

        // Phase 4: guard + propagate, only when something rename- or
        // delete-shaped was detected and the pre-edit text is available to
        // revert to.
        let safety_inputs = if has_rename || has_delete {
            match (&old_text, &snapshot_tree) {
                (Some(text), Some(tree)) => Some((text.as_str(), tree)),
                _ => None,
            }
        } else {
            None
        };

        let (intents, propagated) = match safety_inputs {
            Some((text, tree)) => {
                let outcome = self
                    .guard_and_propagate(
                        file,
                        start_line,
                        end_line,
                        geometry.new_content_end_line,
                        new_content,
                        text,
                        tree,
                        all_intents,
                    )
                    .await;
                match outcome {
                    SafetyOutcome::Abort(result) => return *result,
                    SafetyOutcome::Proceed {
                        intents,
                        propagated,
                    } => (intents, propagated),
                }
            }
            None => {
                if has_delete {
                    // Known gap: without a pre-edit text snapshot the delete
                    // cannot be guarded, so it passes through unchecked.
                    warn!(file, "delete detected without pre-edit snapshot; reference guard skipped");
                }
                (all_intents, Vec::new())
            }
        };

        // Phase 5: finalize.
        let autofix = run_autofix_pass(self.service, file, start_line, has_delete, &self.config)
            .await;
        let summary = render_summary(&intents, &propagated, &autofix);

        FileEditResult {
            success: true,
            file: file.to_string(),
            detected_intents: intents,
            propagated,
            auto_fixed: autofix.fixed,
            remaining_errors: autofix.remaining,
            summary,
        }
    }

    /// Revert, guard deletes, propagate renames, re-apply the body edit.
    ///
    /// Runs while the file can be restored to its pre-edit content so the
    /// reference and rename queries see the original symbols.
    #[allow(clippy::too_many_arguments)]
    async fn guard_and_propagate(
        &self,
        file: &str,
        start_line: u32,
        end_line: u32,
        tentative_end_line: u32,
        new_content: &str,
        old_text: &str,
        tree: &SymbolTree,
        intents: Vec<DetectedIntent>,
    ) -> SafetyOutcome {
        // Put the original text back before asking the language service
        // about the original symbols.
        if let Err(error) = self
            .service
            .apply_edit(file, start_line, tentative_end_line, old_text)
            .await
        {
            // Salvage: the tentative edit exists and cannot be undone.
            // Report it with everything detected, minus the safety steps.
            warn!(file, %error, "revert failed; keeping tentative edit without guard or propagation");
            return SafetyOutcome::Proceed {
                intents,
                propagated: Vec::new(),
            };
        }

        // Guard every delete; the first unsafe one blocks the whole edit
        // and leaves the file in its reverted, pre-edit state.
        let delete_symbols: Vec<String> = intents
            .iter()
            .filter_map(|intent| match intent {
                DetectedIntent::Delete { symbol } => Some(symbol.clone()),
                _ => None,
            })
            .collect();
        for symbol in &delete_symbols {
            let verdict = check_delete_safety(self.service, file, tree, symbol).await;
            if let DeleteVerdict::Blocked {
                symbol,
                reference_count,
                files,
            } = verdict
            {
                let summary = render_blocked_summary(
                    &symbol,
                    reference_count,
                    &files,
                    self.config.max_blocked_files_listed,
                );
                return SafetyOutcome::Abort(Box::new(FileEditResult {
                    success: false,
                    file: file.to_string(),
                    detected_intents: intents,
                    propagated: Vec::new(),
                    auto_fixed: Vec::new(),
                    remaining_errors: Vec::new(),
                    summary,
                }));
            }
        }

        // Propagate renames against the original content.
        let mut propagated = Vec::new();
        let mut renamed_target = None;
        for intent in &intents {
            if let DetectedIntent::Rename {
                symbol, new_name, ..
            } = intent
            {
                if let Some(change) =
                    propagate_rename(self.service, file, tree, symbol, new_name).await
                {
                    propagated.push(change);
                    renamed_target = Some(renamed_qualified_name(symbol, new_name));
                }
            }
        }

        // Propagation rewrote the identifier in place, which may have moved
        // the symbol. Re-resolve the target range before the body re-apply;
        // on lookup failure fall back to the originally requested span.
        let (mut edit_start, mut edit_end) = (start_line, end_line);
        if let Some(target) = renamed_target {
            match self.service.get_symbols(file).await {
                Ok(refreshed) => {
                    if let Some(id) = refreshed.resolve_qualified(&target) {
                        let range = refreshed.node(id).range;
                        edit_start = range.start_line;
                        edit_end = range.end_line;
                    } else {
                        debug!(file, symbol = target.as_str(), "renamed symbol not found; using original span");
                    }
                }
                Err(error) => {
                    debug!(file, %error, "post-rename outline unavailable; using original span");
                }
            }
        }

        // Re-apply the body edit. Fatal on failure: renames may already be
        // propagated, so the caller gets everything collected so far.
        if let Err(error) = self
            .service
            .apply_edit(file, edit_start, edit_end, new_content)
            .await
        {
            return SafetyOutcome::Abort(Box::new(FileEditResult {
                success: false,
                file: file.to_string(),
                detected_intents: intents,
                propagated,
                auto_fixed: Vec::new(),
                remaining_errors: Vec::new(),
                summary: format!("Edit failed on re-apply after rename: {error}"),
            }));
        }

        SafetyOutcome::Proceed { intents, propagated }
    }
}

/// One-shot convenience entry point with default configuration.
pub async fn execute_edit_with_safety_layer(
    service: &dyn LanguageService,
    file: &str,
    start_line: u32,
    end_line: u32,
    new_content: &str,
) -> FileEditResult {
    EditOrchestrator::new(service, SafetyConfig::default())
        .execute(file, start_line, end_line, new_content)
        .await
}

fn render_blocked_summary(
    symbol: &str,
    reference_count: usize,
    files: &[String],
    max_listed: usize,
) -> String {
    let mut listed = files
        .iter()
        .take(max_listed)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if files.len() > max_listed {
        listed.push_str(&format!(" (+{} more)", files.len() - max_listed));
    }
    format!(
        "Blocked: Cannot delete '{symbol}' — it has {reference_count} reference(s) in {} \
         other file(s): {listed}. Resolve or remove these references first.",
        files.len()
    )
}

fn render_summary(
    intents: &[DetectedIntent],
    propagated: &[PropagatedChange],
    autofix: &AutofixOutcome,
) -> String {
    let mut fragments = Vec::new();

    if !intents.is_empty() {
        let described = intents
            .iter()
            .map(describe_intent)
            .collect::<Vec<_>>()
            .join(", ");
        fragments.push(format!("Detected {described}"));
    }

    if !propagated.is_empty() {
        let mut files = 0;
        let mut edits = 0;
        for change in propagated {
            match change {
                PropagatedChange::Rename {
                    files_affected,
                    total_edits,
                } => {
                    files += files_affected.len();
                    edits += *total_edits as usize;
                }
            }
        }
        fragments.push(format!(
            "Propagated rename across {files} file(s) with {edits} edit(s)"
        ));
    }

    if !autofix.fixed.is_empty() {
        fragments.push(format!("Auto-fixed {} issue(s)", autofix.fixed.len()));
    }

    let errors = autofix
        .remaining
        .iter()
        .filter(|r| r.severity == Severity::Error)
        .count();
    let warnings = autofix
        .remaining
        .iter()
        .filter(|r| r.severity == Severity::Warning)
        .count();
    if errors > 0 {
        fragments.push(format!("{errors} error(s) remain"));
    }
    if warnings > 0 {
        fragments.push(format!("{warnings} warning(s) remain"));
    }

    if fragments.is_empty() {
        "Edit applied, no issues detected".to_string()
    } else {
        format!("{}.", fragments.join(". "))
    }
}

fn describe_intent(intent: &DetectedIntent) -> String {
    match intent {
        DetectedIntent::Rename {
            symbol,
            new_name,
            details,
        } => match details {
            Some(kind) => format!("rename of {kind} '{symbol}' to '{new_name}'"),
            None => format!("rename of '{symbol}' to '{new_name}'"),
        },
        DetectedIntent::Delete { symbol } => format!("deletion of '{symbol}'"),
        DetectedIntent::Add { symbol } => format!("addition of '{symbol}'"),
        DetectedIntent::BodyChange { symbol } => format!("body change in '{symbol}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocked_summary_matches_expected_shape() {
        let summary =
            render_blocked_summary("level15", 1, &["other.ts".to_string()], 5);
        assert_eq!(
            summary,
            "Blocked: Cannot delete 'level15' — it has 1 reference(s) in 1 other file(s): \
             other.ts. Resolve or remove these references first."
        );
    }

    #[test]
    fn blocked_summary_lists_at_most_five_files() {
        let files: Vec<String> = (1..=7).map(|i| format!("f{i}.ts")).collect();
        let summary = render_blocked_summary("sym", 9, &files, 5);
        assert!(summary.contains("f1.ts, f2.ts, f3.ts, f4.ts, f5.ts (+2 more)"));
        assert!(summary.contains("9 reference(s) in 7 other file(s)"));
        assert!(!summary.contains("f6.ts"));
    }

    #[test]
    fn clean_edit_summary_is_fixed_message() {
        let summary = render_summary(&[], &[], &AutofixOutcome::default());
        assert_eq!(summary, "Edit applied, no issues detected");
    }

    #[test]
    fn summary_joins_nonempty_fragments() {
        let intents = vec![DetectedIntent::Rename {
            symbol: "foo".into(),
            new_name: "bar".into(),
            details: None,
        }];
        let propagated = vec![PropagatedChange::Rename {
            files_affected: vec!["a.ts".into(), "b.ts".into()],
            total_edits: 3,
        }];
        let autofix = AutofixOutcome {
            fixed: vec![AutoFix {
                file: "x.ts".into(),
                fix: "Add import".into(),
            }],
            remaining: vec![RemainingError {
                file: "x.ts".into(),
                line: 4,
                message: "unused".into(),
                severity: Severity::Warning,
            }],
        };

        let summary = render_summary(&intents, &propagated, &autofix);
        assert_eq!(
            summary,
            "Detected rename of 'foo' to 'bar'. \
             Propagated rename across 2 file(s) with 3 edit(s). \
             Auto-fixed 1 issue(s). 1 warning(s) remain."
        );
    }
}
