//! Incremental analysis engine.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use draftlint_ast::{Element, sort_document_order, splice_file};
use draftlint_cache::{
    Baseline, CacheError, DiagnosticFamily, DiagnosticRecord, DiagnosticSnapshot, ElementKey,
    ElementSnapshot, FsBackend, IdentifiedDocument, SnapshotBackend, SnapshotFamily,
    SnapshotStore, classify, family_baseline, identify, merge, plan,
    plan::plan_content_addressed, replay,
};
use draftlint_rules::{Rule, RuleSet, run_rule};

use crate::{
    AnalysisReport, CancelFlag, LinterConfig, LinterError, LogicReport, ReviewError,
    ReviewOutcome, ReviewReport, Reviewer, RulePlan,
};

/// Called with the review family's published diagnostics after every
/// reviewed element.
pub type ReviewProgress = Arc<dyn Fn(&[DiagnosticRecord]) + Send + Sync>;

/// Per-run options.
#[derive(Clone)]
pub struct AnalyzeOptions {
    /// Checked between reviewed elements.
    pub cancel: CancelFlag,
    /// Whether the review family runs, when a reviewer is configured.
    pub review: bool,
    /// Receives incremental review results.
    pub on_review_progress: Option<ReviewProgress>,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            cancel: CancelFlag::new(),
            review: true,
            on_review_progress: None,
        }
    }
}

impl AnalyzeOptions {
    /// Uses `cancel` as the cancellation flag.
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Enables or disables the review family.
    pub fn with_review(mut self, review: bool) -> Self {
        self.review = review;
        self
    }

    /// Registers a review progress callback.
    pub fn on_review_progress(
        mut self,
        callback: impl Fn(&[DiagnosticRecord]) + Send + Sync + 'static,
    ) -> Self {
        self.on_review_progress = Some(Arc::new(callback));
        self
    }
}

/// A cached diagnostic snapshot together with the elements it covers.
struct Cached {
    snapshot: DiagnosticSnapshot,
    baseline: Baseline,
}

/// The incremental analyzer.
///
/// Runs the deterministic rules and the optional reviewer over an element
/// sequence, reusing every cached finding whose element is unaffected by
/// the edits since the previous run.
pub struct Analyzer<B: SnapshotBackend> {
    /// Linter configuration.
    config: LinterConfig,
    /// Signature of the settings that shape rule output.
    logic_signature: String,
    /// Deterministic rules.
    rules: RuleSet,
    /// Snapshot storage.
    store: SnapshotStore<B>,
    /// Model-backed reviewer.
    reviewer: Option<Box<dyn Reviewer>>,
}

impl Analyzer<FsBackend> {
    /// Creates an analyzer storing snapshots under the workspace's cache
    /// directory.
    pub fn for_workspace(config: LinterConfig, workspace: impl AsRef<Path>) -> Self {
        let store = SnapshotStore::new(FsBackend::new(config.cache_path(workspace)));
        Self::new(config, store)
    }
}

impl<B: SnapshotBackend> Analyzer<B> {
    /// Creates an analyzer with the configured built-in rules.
    pub fn new(config: LinterConfig, store: SnapshotStore<B>) -> Self {
        let rules = config.rule_set();
        let logic_signature = config.logic_signature(&rules.ids());
        Self {
            config,
            logic_signature,
            rules,
            store,
            reviewer: None,
        }
    }

    /// Replaces the rule set.
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.logic_signature = self.config.logic_signature(&rules.ids());
        self.rules = rules;
        self
    }

    /// Adds a reviewer.
    pub fn with_reviewer(mut self, reviewer: impl Reviewer + 'static) -> Self {
        self.reviewer = Some(Box::new(reviewer));
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &LinterConfig {
        &self.config
    }

    /// Returns the rules.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Returns the snapshot store.
    pub fn store(&self) -> &SnapshotStore<B> {
        &self.store
    }

    /// Analyzes a full element sequence.
    pub fn analyze(
        &self,
        mut elements: Vec<Element>,
        options: &AnalyzeOptions,
    ) -> Result<AnalysisReport, LinterError> {
        if let Some(element) = elements.iter().find(|e| e.file_path.is_empty()) {
            return Err(LinterError::input(format!(
                "{} element at {:?} has no file path",
                element.kind, element.range.start
            )));
        }

        sort_document_order(&mut elements);
        let doc = identify(elements);

        let mut report = AnalysisReport {
            elements: doc.len(),
            ..AnalysisReport::default()
        };

        let element_baseline = self.store.load_elements();
        if element_baseline.is_none() {
            debug!("No usable element snapshot, cold start");
        }
        self.persist(
            &mut report.persist_failures,
            "promote element snapshot",
            self.store.promote(SnapshotFamily::Elements),
        );
        self.persist(
            &mut report.persist_failures,
            "save element snapshot",
            self.store.save_elements(&ElementSnapshot::from_document(&doc)),
        );

        if !self.rules.is_empty() {
            let logic = self.run_logic(&doc, element_baseline.as_ref(), &mut report)?;
            report.logic = Some(logic);
        }

        if let Some(reviewer) = self.reviewer.as_deref()
            && options.review
        {
            let review = self.run_review(reviewer, &doc, options, &mut report);
            report.review = Some(review);
        }

        info!(
            "Analyzed {} elements: {} diagnostics ({} rechecked, {} replayed)",
            report.elements,
            report.diagnostic_count(),
            report.rechecked(),
            report.replayed()
        );

        Ok(report)
    }

    /// Analyzes after an edit confined to one file.
    ///
    /// `file_elements` replaces that file's elements in the sequence stored
    /// by the previous run; every other file is taken as unchanged.
    pub fn analyze_file(
        &self,
        file_path: &str,
        file_elements: Vec<Element>,
        options: &AnalyzeOptions,
    ) -> Result<AnalysisReport, LinterError> {
        if let Some(stray) = file_elements.iter().find(|e| e.file_path != file_path) {
            return Err(LinterError::input(format!(
                "Element from {} passed for {}",
                stray.file_path, file_path
            )));
        }

        let others = match self.store.load_elements() {
            Some(snapshot) => snapshot.to_elements(),
            None => {
                debug!("No element snapshot, analyzing {} alone", file_path);
                Vec::new()
            }
        };

        self.analyze(splice_file(others, file_path, file_elements), options)
    }

    /// Removes all stored snapshots.
    pub fn clear_cache(&self) -> Result<(), LinterError> {
        self.store.clear()?;
        Ok(())
    }

    fn run_logic(
        &self,
        doc: &IdentifiedDocument,
        elements: Option<&ElementSnapshot>,
        report: &mut AnalysisReport,
    ) -> Result<LogicReport, LinterError> {
        let family = DiagnosticFamily::Logic;
        let cached = self.load_family(family, elements, &self.logic_signature);
        self.persist(
            &mut report.persist_failures,
            "promote logic snapshot",
            self.store.promote(SnapshotFamily::Diagnostics(family)),
        );

        let changes = cached.as_ref().map(|c| classify(doc, &c.baseline));
        let snapshot = cached.as_ref().map(|c| &c.snapshot);
        let rules: Vec<&dyn Rule> = self.rules.iter().collect();

        let results: Vec<_> = rules
            .par_iter()
            .map(|rule| {
                let targets = plan(rule.policy(), doc, changes.as_ref());
                let fresh = run_rule(*rule, doc, &targets)?;
                let fresh_count = fresh.len();
                let cached_records = snapshot
                    .into_iter()
                    .flat_map(|snapshot| snapshot.records_for(rule.id()));
                let diagnostics = merge(fresh, cached_records, targets.keys(), doc);

                let summary = RulePlan {
                    rule: rule.id().to_string(),
                    targets: targets.len(),
                    start_index: targets.start_index(),
                    fresh: fresh_count,
                    replayed: diagnostics.len() - fresh_count,
                };
                Ok::<_, LinterError>((summary, diagnostics))
            })
            .collect();

        let mut logic = LogicReport {
            cache_hit: cached.is_some(),
            ..LogicReport::default()
        };
        for result in results {
            let (summary, diagnostics) = result?;
            debug!(
                "Rule '{}': {} rechecked, {} fresh, {} replayed",
                summary.rule, summary.targets, summary.fresh, summary.replayed
            );
            logic.rules.push(summary);
            logic.diagnostics.extend(diagnostics);
        }

        let snapshot = DiagnosticSnapshot::new(
            logic.diagnostics.clone(),
            doc.key_set(),
            Some(self.logic_signature.clone()),
        );
        self.persist(
            &mut report.persist_failures,
            "save logic snapshot",
            self.store.save_diagnostics(family, &snapshot),
        );

        Ok(logic)
    }

    fn run_review(
        &self,
        reviewer: &dyn Reviewer,
        doc: &IdentifiedDocument,
        options: &AnalyzeOptions,
        report: &mut AnalysisReport,
    ) -> ReviewReport {
        let family = DiagnosticFamily::Review;
        let signature = reviewer.signature();
        // Only the signature gates reuse; covered keys live in the snapshot.
        let cached = self
            .store
            .load_diagnostics(family)
            .filter(|snapshot| {
                let matches = snapshot.matches_signature(Some(&signature));
                if !matches {
                    debug!("{} snapshot was produced with other settings", family);
                }
                matches
            });
        self.persist(
            &mut report.persist_failures,
            "promote review snapshot",
            self.store.promote(SnapshotFamily::Diagnostics(family)),
        );

        let targets = plan_content_addressed(doc, cached.as_ref().map(|c| &c.baseline_keys));
        let mut diagnostics = match &cached {
            Some(snapshot) => replay(&snapshot.diagnostics, targets.keys(), doc),
            None => Vec::new(),
        };
        let mut covered: BTreeSet<ElementKey> = doc
            .sentences()
            .map(|(key, _)| key)
            .filter(|key| !targets.contains(key))
            .cloned()
            .collect();

        let mut review = ReviewReport {
            targets: targets.len(),
            replayed: diagnostics.len(),
            ..ReviewReport::default()
        };
        debug!(
            "Review: {} sentences to review, {} findings replayed",
            review.targets, review.replayed
        );

        // Replayed state goes to disk before the first reviewer call.
        self.save_review(&diagnostics, &covered, &signature, report);

        for (key, element) in doc.sentences().filter(|(key, _)| targets.contains(key)) {
            if options.cancel.is_cancelled() {
                info!("Review cancelled after {} sentences", review.processed);
                review.outcome = ReviewOutcome::Cancelled;
                break;
            }

            match reviewer.review(key, element) {
                Ok(records) => {
                    if let Some(stray) = records.iter().find(|r| &r.element_key != key) {
                        let reason = format!(
                            "Reviewer returned a finding for {} while reviewing {}",
                            stray.element_key, key
                        );
                        warn!("{}", reason);
                        review.outcome = ReviewOutcome::Halted(reason);
                        break;
                    }
                    diagnostics.extend(records);
                    covered.insert(key.clone());
                    review.processed += 1;
                }
                Err(ReviewError::Skipped(reason)) => {
                    debug!("Review of {} skipped: {}", key, reason);
                    review.skipped += 1;
                    continue;
                }
                Err(ReviewError::Fatal(reason)) => {
                    warn!(
                        "Reviewer failed, {} sentences left unreviewed: {}",
                        review.targets - review.processed - review.skipped,
                        reason
                    );
                    review.outcome = ReviewOutcome::Halted(reason);
                    break;
                }
            }

            self.save_review(&diagnostics, &covered, &signature, report);
            if let Some(callback) = &options.on_review_progress {
                callback(&diagnostics);
            }
        }

        review.diagnostics = diagnostics;
        review
    }

    fn save_review(
        &self,
        diagnostics: &[DiagnosticRecord],
        covered: &BTreeSet<ElementKey>,
        signature: &str,
        report: &mut AnalysisReport,
    ) {
        let snapshot = DiagnosticSnapshot::new(
            diagnostics.to_vec(),
            covered.clone(),
            Some(signature.to_string()),
        );
        self.persist(
            &mut report.persist_failures,
            "save review snapshot",
            self.store.save_diagnostics(DiagnosticFamily::Review, &snapshot),
        );
    }

    /// Loads a family's current snapshot if it can serve as a baseline.
    fn load_family(
        &self,
        family: DiagnosticFamily,
        elements: Option<&ElementSnapshot>,
        signature: &str,
    ) -> Option<Cached> {
        let snapshot = self.store.load_diagnostics(family)?;

        if !snapshot.matches_signature(Some(signature)) {
            debug!("{} snapshot was produced with other settings", family);
            return None;
        }

        let Some(elements) = elements else {
            debug!("{} snapshot has no element snapshot to diff against", family);
            return None;
        };

        let baseline = family_baseline(elements, &snapshot.baseline_keys)?;
        Some(Cached { snapshot, baseline })
    }

    fn persist(&self, failures: &mut Vec<String>, what: &str, result: Result<(), CacheError>) {
        if let Err(e) = result {
            warn!("Failed to {}: {}", what, e);
            failures.push(format!("{}: {}", what, e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use draftlint_ast::{ElementKind, Range};
    use draftlint_cache::MemoryBackend;
    use pretty_assertions::assert_eq;

    fn sentence(text: &str, line: u32) -> Element {
        Element::new(
            ElementKind::Sentence,
            text,
            "main.tex",
            Range::from_coords(line, 0, line, text.len() as u32),
        )
    }

    fn analyzer() -> Analyzer<MemoryBackend> {
        Analyzer::new(LinterConfig::new(), SnapshotStore::new(MemoryBackend::new()))
    }

    #[test]
    fn test_rejects_elements_without_file() {
        let mut element = sentence("Text.", 0);
        element.file_path.clear();

        let err = analyzer()
            .analyze(vec![element], &AnalyzeOptions::default())
            .unwrap_err();

        assert!(matches!(err, LinterError::Input(_)));
    }

    #[test]
    fn test_analyze_file_rejects_foreign_elements() {
        let err = analyzer()
            .analyze_file("other.tex", vec![sentence("Text.", 0)], &AnalyzeOptions::default())
            .unwrap_err();

        assert!(matches!(err, LinterError::Input(_)));
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let analyzer = analyzer();
        let options = AnalyzeOptions::default();

        let first = analyzer
            .analyze(vec![sentence("b", 1), sentence("a", 0)], &options)
            .unwrap();
        let second = analyzer
            .analyze(vec![sentence("a", 0), sentence("b", 1)], &options)
            .unwrap();

        assert_eq!(second.rechecked(), 0);
        assert_eq!(
            first.diagnostics().collect::<Vec<_>>(),
            second.diagnostics().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_no_rules_skips_logic_family() {
        let analyzer = analyzer().with_rules(RuleSet::new());

        let report = analyzer
            .analyze(vec![sentence("a", 0)], &AnalyzeOptions::default())
            .unwrap();

        assert!(report.logic.is_none());
        assert!(
            analyzer
                .store()
                .load_diagnostics(DiagnosticFamily::Logic)
                .is_none()
        );
    }

    #[test]
    fn test_clear_cache_forces_cold_start() {
        let analyzer = analyzer();
        let options = AnalyzeOptions::default();
        analyzer.analyze(vec![sentence("a", 0)], &options).unwrap();

        analyzer.clear_cache().unwrap();
        let report = analyzer.analyze(vec![sentence("a", 0)], &options).unwrap();

        assert!(!report.logic.unwrap().cache_hit);
        assert_eq!(analyzer.rules().len(), 4);
        assert!(analyzer.config().cache);
    }

    #[test]
    fn test_reviewer_and_debounce_changes_keep_logic_snapshot() {
        let backend = Arc::new(MemoryBackend::new());
        let elements = vec![sentence("a", 0), sentence("b", 1)];

        Analyzer::new(LinterConfig::new(), SnapshotStore::new(backend.clone()))
            .analyze(elements.clone(), &AnalyzeOptions::default())
            .unwrap();

        let mut config = LinterConfig::new();
        config.debounce_ms = 20;
        config.reviewer = Some(crate::ReviewerConfig {
            provider: "local".to_string(),
            model: Some("m2".to_string()),
            mode: None,
        });
        let report = Analyzer::new(config, SnapshotStore::new(backend))
            .analyze(elements, &AnalyzeOptions::default())
            .unwrap();

        let logic = report.logic.unwrap();
        assert!(logic.cache_hit);
        assert_eq!(logic.plan_for("punctuation").unwrap().targets, 0);
        assert_eq!(logic.plan_for("punctuation").unwrap().replayed, 2);
    }

    #[test]
    fn test_replacing_rules_invalidates_logic_snapshot() {
        let backend = Arc::new(MemoryBackend::new());
        let elements = vec![sentence("a", 0)];

        Analyzer::new(LinterConfig::new(), SnapshotStore::new(backend.clone()))
            .analyze(elements.clone(), &AnalyzeOptions::default())
            .unwrap();

        let mut only_punctuation = LinterConfig::new().rule_set();
        only_punctuation.retain(|id| id == "punctuation");
        let report = Analyzer::new(LinterConfig::new(), SnapshotStore::new(backend))
            .with_rules(only_punctuation)
            .analyze(elements, &AnalyzeOptions::default())
            .unwrap();

        assert!(!report.logic.unwrap().cache_hit);
    }

    #[test]
    fn test_config_change_invalidates_logic_snapshot() {
        let backend = Arc::new(MemoryBackend::new());
        let elements = vec![sentence("a", 0)];

        Analyzer::new(LinterConfig::new(), SnapshotStore::new(backend.clone()))
            .analyze(elements.clone(), &AnalyzeOptions::default())
            .unwrap();

        let mut config = LinterConfig::new();
        config.min_section_sentences = 4;
        let report = Analyzer::new(config, SnapshotStore::new(backend))
            .analyze(elements, &AnalyzeOptions::default())
            .unwrap();

        let logic = report.logic.unwrap();
        assert!(!logic.cache_hit);
        assert_eq!(logic.plan_for("punctuation").unwrap().targets, 1);
    }
}
