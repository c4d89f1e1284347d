//! Accumulating verification outcome.
//!
//! Verifiers run every algebraic check to completion and collect the failures
//! instead of returning on the first broken equation. The result is a monoid:
//! the identity is "verified, no errors" and combination is the conjunction of
//! the outcomes with the error lists appended in order.

/// Outcome of a verification. The error list is empty if and only if the
/// verification succeeded; the list order follows the order of the checks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationResult {
    error_messages: Vec<String>,
}

impl VerificationResult {
    /// A successful verification with no errors.
    pub fn verified() -> Self {
        VerificationResult {
            error_messages: Vec::new(),
        }
    }

    /// A failed verification with a single error message.
    pub fn failure(message: impl Into<String>) -> Self {
        VerificationResult {
            error_messages: vec![message.into()],
        }
    }

    /// Records the outcome of one check: a passing check contributes nothing,
    /// a failing check appends its message.
    pub fn check(&mut self, passed: bool, message: impl Into<String>) {
        if !passed {
            self.error_messages.push(message.into());
        }
    }

    pub fn is_verified(&self) -> bool {
        self.error_messages.is_empty()
    }

    pub fn error_messages(&self) -> &[String] {
        &self.error_messages
    }

    /// Combines two outcomes, appending the other result's errors after this
    /// result's errors.
    pub fn and(mut self, other: VerificationResult) -> VerificationResult {
        self.error_messages.extend(other.error_messages);
        self
    }

    /// Prefixes every error message with a context label, so that failures of
    /// sub-arguments remain attributable after combination.
    pub fn with_context(mut self, context: &str) -> VerificationResult {
        for message in &mut self.error_messages {
            *message = format!("{context}: {message}");
        }
        self
    }
}

impl Default for VerificationResult {
    fn default() -> Self {
        VerificationResult::verified()
    }
}
