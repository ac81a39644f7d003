//! Injectable timing and bound configuration.

use std::time::Duration;

/// Tunables for the edit safety layer.
///
/// The two settle delays exist because diagnostics engines lag behind text
/// changes; tests inject [`SafetyConfig::immediate`] to make the state
/// machine deterministic.
#[derive(Debug, Clone)]
pub struct SafetyConfig {
    /// Wait after the edit is finalized before the first diagnostics fetch.
    pub diagnostics_settle: Duration,
    /// Wait after the fix loop before the final diagnostics snapshot.
    pub post_fix_settle: Duration,
    /// Total successful quick fixes allowed per edit, across all errors.
    pub max_auto_fixes: usize,
    /// Affected file paths listed in a blocked-delete summary before the
    /// overflow marker.
    pub max_blocked_files_listed: usize,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            diagnostics_settle: Duration::from_millis(800),
            post_fix_settle: Duration::from_millis(300),
            max_auto_fixes: 5,
            max_blocked_files_listed: 5,
        }
    }
}

impl SafetyConfig {
    /// Zero-delay configuration for tests.
    pub fn immediate() -> Self {
        Self {
            diagnostics_settle: Duration::ZERO,
            post_fix_settle: Duration::ZERO,
            ..Self::default()
        }
    }
}
