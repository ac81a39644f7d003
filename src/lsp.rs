//! Language service capability interface.
//!
//! The safety layer never parses source itself. Symbol outlines, reference
//! search, rename execution, diagnostics, and quick fixes all come from an
//! external language service reached through the [`LanguageService`] trait;
//! the host editor sits behind that service. Implementations are expected to
//! be I/O-bound, so every operation is async.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::symbol::SymbolTree;

/// A non-fatal language service failure. Callers decide per call site
/// whether this disables a safety feature or is ignored outright.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("capability unavailable: {0}")]
    Unavailable(String),

    #[error("language service request failed: {0}")]
    RequestFailed(String),
}

/// Failure to apply a ranged text replacement. Unlike [`ServiceError`] this
/// is fatal to the edit protocol wherever it occurs.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct EditApplyError {
    pub message: String,
}

impl EditApplyError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A single occurrence of a symbol's identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

/// Diagnostic severity, reduced to the two levels the safety layer acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One diagnostic reported against the edited file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub line: u32,
    pub end_line: u32,
    pub message: String,
    pub severity: Severity,
}

/// A quick fix offered at a diagnostic's range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeAction {
    pub title: String,
    /// Host-side index used to apply this action.
    pub index: usize,
    pub is_preferred: bool,
}

/// Outcome of applying a code action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedAction {
    pub success: bool,
    pub title: Option<String>,
}

/// The language service's own report of a workspace rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameOutcome {
    pub success: bool,
    pub files_affected: Vec<String>,
    pub total_edits: u32,
}

/// Capability interface to the host language service.
///
/// Lines and columns are 1-based; line ranges are inclusive on both ends.
/// The trait is object-safe so orchestration code can hold a
/// `&dyn LanguageService` without caring which host backs it.
#[async_trait]
pub trait LanguageService: Send + Sync {
    /// Snapshot the file's symbol outline.
    async fn get_symbols(&self, file: &str) -> Result<SymbolTree, ServiceError>;

    /// Read the literal text currently occupying `[start_line, end_line]`.
    async fn read_range(
        &self,
        file: &str,
        start_line: u32,
        end_line: u32,
    ) -> Result<String, ServiceError>;

    /// Replace `[start_line, end_line]` with `text`.
    async fn apply_edit(
        &self,
        file: &str,
        start_line: u32,
        end_line: u32,
        text: &str,
    ) -> Result<(), EditApplyError>;

    /// Find every reference to the identifier at the given position.
    async fn find_references(
        &self,
        file: &str,
        line: u32,
        column: u32,
    ) -> Result<Vec<Reference>, ServiceError>;

    /// Rename the identifier at the given position across the workspace.
    async fn execute_rename(
        &self,
        file: &str,
        line: u32,
        column: u32,
        new_name: &str,
    ) -> Result<RenameOutcome, ServiceError>;

    /// Current diagnostics for the file.
    async fn get_diagnostics(&self, file: &str) -> Result<Vec<Diagnostic>, ServiceError>;

    /// Quick fixes available over `[start_line, end_line]`.
    async fn get_code_actions(
        &self,
        file: &str,
        start_line: u32,
        end_line: u32,
    ) -> Result<Vec<CodeAction>, ServiceError>;

    /// Apply one of the actions previously returned for the same range.
    async fn apply_code_action(
        &self,
        file: &str,
        start_line: u32,
        end_line: u32,
        action_index: usize,
    ) -> Result<AppliedAction, ServiceError>;

    /// Ask the host to surface a diff preview. Best-effort; callers ignore
    /// the result.
    async fn show_edit_diff(&self, file: &str, start_line: u32) -> Result<(), ServiceError>;
}
