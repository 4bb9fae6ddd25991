//! Rendering of failed remote calls as assistant turns.
//!
//! The adapter never decides what an error turn says; it hands the error to
//! an [`ErrorTurnFormatter`]. Swapping the formatter changes what end users
//! see without touching the turn flow.

use bedchat_types::llm::LlmError;

/// Fixed opening line of every error turn.
pub const APOLOGY: &str = "My apologies, but I encountered an unexpected error.";

/// Turns a remote-call failure into the text of an assistant turn.
pub trait ErrorTurnFormatter: Send + Sync {
    fn format(&self, error: &LlmError) -> String;
}

/// Apology followed by the raw error text.
///
/// Diagnostic detail reaches the end user as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerbatimErrorFormatter;

impl ErrorTurnFormatter for VerbatimErrorFormatter {
    fn format(&self, error: &LlmError) -> String {
        format!("{APOLOGY}\n\n{error}")
    }
}

/// Apology only; the error itself stays in the logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericErrorFormatter;

impl ErrorTurnFormatter for GenericErrorFormatter {
    fn format(&self, _error: &LlmError) -> String {
        format!("{APOLOGY} Please try again.")
    }
}
