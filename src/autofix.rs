//! Bounded automatic repair of post-edit diagnostics.
//!
//! After the edit is finalized the file may carry fresh errors. This pass
//! applies at most a handful of host-preferred quick fixes, then snapshots
//! whatever diagnostics remain. Every per-error failure is swallowed; a
//! broken fix pipeline degrades to "no fixes", never to a failed edit.

use serde::Serialize;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::lsp::{LanguageService, Severity};
use crate::settings::SafetyConfig;

/// One successfully applied quick fix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutoFix {
    pub file: String,
    pub fix: String,
}

/// A diagnostic still present after the fix pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemainingError {
    pub file: String,
    pub line: u32,
    pub message: String,
    pub severity: Severity,
}

/// What the fix pass accomplished and what it left behind.
#[derive(Debug, Default)]
pub struct AutofixOutcome {
    pub fixed: Vec<AutoFix>,
    pub remaining: Vec<RemainingError>,
}

/// Run the auto-fix loop against `file`.
///
/// `edit_had_delete` enables the harmful-fix policy: spelling-correction
/// fixes are rejected after a deletion, because they tend to "repair" a
/// now-dangling reference by pointing it at a similarly spelled symbol,
/// silently reinterpreting an intentional delete as a typo.
pub async fn run_autofix_pass(
    service: &dyn LanguageService,
    file: &str,
    edit_start_line: u32,
    edit_had_delete: bool,
    config: &SafetyConfig,
) -> AutofixOutcome {
    // Surface a diff preview; purely cosmetic, never load-bearing.
    if let Err(error) = service.show_edit_diff(file, edit_start_line).await {
        debug!(%error, "diff preview unavailable");
    }

    // Give the diagnostics engine time to catch up with the edit.
    sleep(config.diagnostics_settle).await;

    let diagnostics = match service.get_diagnostics(file).await {
        Ok(diagnostics) => diagnostics,
        Err(error) => {
            warn!(%error, "diagnostics unavailable, skipping auto-fix");
            Vec::new()
        }
    };

    let mut fixed = Vec::new();
    for diagnostic in diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
    {
        if fixed.len() >= config.max_auto_fixes {
            break;
        }

        let actions = match service
            .get_code_actions(file, diagnostic.line, diagnostic.end_line)
            .await
        {
            Ok(actions) => actions,
            Err(error) => {
                debug!(line = diagnostic.line, %error, "code action lookup failed");
                continue;
            }
        };

        let Some(preferred) = actions.iter().find(|action| action.is_preferred) else {
            continue;
        };

        if edit_had_delete && is_spelling_fix(&preferred.title) {
            debug!(
                line = diagnostic.line,
                title = preferred.title.as_str(),
                "rejecting spelling fix after a deletion"
            );
            continue;
        }

        match service
            .apply_code_action(file, diagnostic.line, diagnostic.end_line, preferred.index)
            .await
        {
            Ok(applied) if applied.success => {
                fixed.push(AutoFix {
                    file: file.to_string(),
                    fix: applied.title.unwrap_or_else(|| preferred.title.clone()),
                });
            }
            Ok(_) => {}
            Err(error) => {
                debug!(line = diagnostic.line, %error, "quick fix application failed");
            }
        }
    }

    // Second settle: the applied fixes themselves need to propagate before
    // the final snapshot means anything.
    sleep(config.post_fix_settle).await;

    let remaining = match service.get_diagnostics(file).await {
        Ok(diagnostics) => diagnostics
            .into_iter()
            .map(|d| RemainingError {
                file: file.to_string(),
                line: d.line,
                message: d.message,
                severity: d.severity,
            })
            .collect(),
        Err(error) => {
            debug!(%error, "final diagnostics snapshot unavailable");
            Vec::new()
        }
    };

    AutofixOutcome { fixed, remaining }
}

/// Whether a quick-fix title looks like a spelling correction.
fn is_spelling_fix(title: &str) -> bool {
    let lowered = title.to_lowercase();
    lowered.contains("change spelling") || lowered.contains("did you mean")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spelling_fix_titles_are_recognized() {
        assert!(is_spelling_fix("Change spelling to 'foo'"));
        assert!(is_spelling_fix("Did you mean 'level14'?"));
        assert!(is_spelling_fix("a module exists; did you mean `other`?"));
    }

    #[test]
    fn ordinary_fix_titles_pass() {
        assert!(!is_spelling_fix("Add missing import"));
        assert!(!is_spelling_fix("Remove unused variable"));
        assert!(!is_spelling_fix("Implement missing members"));
    }
}
