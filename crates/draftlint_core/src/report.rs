//! Analysis results.

use serde::Serialize;

use draftlint_cache::DiagnosticRecord;

use crate::ReviewOutcome;

/// How one rule's recheck set was planned and served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RulePlan {
    /// Rule id.
    pub rule: String,
    /// Elements rechecked by the rule body.
    pub targets: usize,
    /// Start of the rechecked suffix, for order-dependent rules.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_index: Option<usize>,
    /// Findings computed in this run.
    pub fresh: usize,
    /// Findings replayed from cache.
    pub replayed: usize,
}

/// Results of the deterministic rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicReport {
    /// Findings, grouped by rule in registration order.
    pub diagnostics: Vec<DiagnosticRecord>,
    /// Per-rule plan summary.
    pub rules: Vec<RulePlan>,
    /// Whether a usable cached snapshot was found.
    pub cache_hit: bool,
}

impl LogicReport {
    /// Elements rechecked across all rules.
    pub fn rechecked(&self) -> usize {
        self.rules.iter().map(|plan| plan.targets).sum()
    }

    /// Findings replayed across all rules.
    pub fn replayed(&self) -> usize {
        self.rules.iter().map(|plan| plan.replayed).sum()
    }

    /// Plan summary of one rule.
    pub fn plan_for(&self, rule: &str) -> Option<&RulePlan> {
        self.rules.iter().find(|plan| plan.rule == rule)
    }
}

/// Results of the model-backed review.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewReport {
    /// Replayed findings followed by fresh ones.
    pub diagnostics: Vec<DiagnosticRecord>,
    /// Sentences planned for review.
    pub targets: usize,
    /// Sentences actually reviewed.
    pub processed: usize,
    /// Sentences the reviewer skipped.
    pub skipped: usize,
    /// Findings replayed from cache.
    pub replayed: usize,
    /// How the queue ended.
    pub outcome: ReviewOutcome,
}

/// Result of one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Elements in the analyzed document.
    pub elements: usize,
    /// Deterministic rule results, if any rule is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logic: Option<LogicReport>,
    /// Review results, if a reviewer took part.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<ReviewReport>,
    /// Snapshot writes that failed. Results are still valid in memory.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub persist_failures: Vec<String>,
}

impl AnalysisReport {
    /// All findings: deterministic first, then review.
    pub fn diagnostics(&self) -> impl Iterator<Item = &DiagnosticRecord> {
        self.logic
            .iter()
            .flat_map(|logic| logic.diagnostics.iter())
            .chain(self.review.iter().flat_map(|review| review.diagnostics.iter()))
    }

    /// Number of findings across families.
    pub fn diagnostic_count(&self) -> usize {
        self.diagnostics().count()
    }

    /// Elements rechecked across families.
    pub fn rechecked(&self) -> usize {
        self.logic.as_ref().map_or(0, LogicReport::rechecked)
            + self.review.as_ref().map_or(0, |review| review.processed)
    }

    /// Findings replayed from cache across families.
    pub fn replayed(&self) -> usize {
        self.logic.as_ref().map_or(0, LogicReport::replayed)
            + self.review.as_ref().map_or(0, |review| review.replayed)
    }

    /// Returns false if the review queue did not finish.
    pub fn is_complete(&self) -> bool {
        self.review
            .as_ref()
            .is_none_or(|review| review.outcome.is_completed())
    }
}
