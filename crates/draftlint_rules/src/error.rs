//! Error types for rule execution.

use thiserror::Error;

/// Errors that can occur while running a rule.
#[derive(Debug, Error)]
pub enum RuleError {
    /// A rule emitted a finding for an element it was not asked to check.
    #[error("Rule '{rule}' reported on element outside its recheck set: {key}")]
    ContractViolation { rule: String, key: String },
}

impl RuleError {
    /// Creates a contract violation error.
    pub fn contract_violation(rule: impl Into<String>, key: impl Into<String>) -> Self {
        Self::ContractViolation {
            rule: rule.into(),
            key: key.into(),
        }
    }
}
