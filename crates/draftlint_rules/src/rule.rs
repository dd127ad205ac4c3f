//! Rule trait and registry.

use draftlint_cache::{DiagnosticRecord, IdentifiedDocument, RecheckPolicy, RecheckSet};
use tracing::debug;

use crate::RuleError;
use crate::rules::{Abbreviation, Caption, Punctuation, SectionDensity};

/// A deterministic check.
///
/// `check` receives the whole ordered document but must only report
/// findings for elements in `targets`: everything else is replayed from
/// cache by the caller.
pub trait Rule: Send + Sync {
    /// Unique rule identifier, used as the diagnostic `code`.
    fn id(&self) -> &'static str;

    /// Human-readable description.
    fn description(&self) -> &'static str;

    /// How far an edit's influence on this rule reaches.
    fn policy(&self) -> RecheckPolicy;

    /// Computes findings for the target elements.
    fn check(&self, doc: &IdentifiedDocument, targets: &RecheckSet) -> Vec<DiagnosticRecord>;
}

/// Options for the built-in rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinOptions {
    /// Minimum number of sentences a section must contain.
    pub min_section_sentences: usize,
}

impl Default for BuiltinOptions {
    fn default() -> Self {
        Self {
            min_section_sentences: 2,
        }
    }
}

/// The rules taking part in an analysis.
#[derive(Default)]
pub struct RuleSet {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set with every built-in rule.
    pub fn builtin(options: &BuiltinOptions) -> Self {
        let mut set = Self::new();
        set.register(Box::new(Punctuation));
        set.register(Box::new(Caption));
        set.register(Box::new(SectionDensity::new(options.min_section_sentences)));
        set.register(Box::new(Abbreviation));
        set
    }

    /// Adds a rule, replacing any rule with the same id.
    pub fn register(&mut self, rule: Box<dyn Rule>) {
        self.rules.retain(|existing| existing.id() != rule.id());
        self.rules.push(rule);
    }

    /// Keeps only rules for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.rules.retain(|rule| keep(rule.id()));
    }

    /// Looks up a rule.
    pub fn get(&self, id: &str) -> Option<&dyn Rule> {
        self.rules
            .iter()
            .find(|rule| rule.id() == id)
            .map(|rule| rule.as_ref())
    }

    /// Registered rules in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|rule| rule.as_ref())
    }

    /// Registered rule ids.
    pub fn ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.id()).collect()
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no rule is registered.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Runs a rule and verifies it stayed within its targets.
///
/// A rule reporting on an element it was not given would leave a stale
/// duplicate next to the replayed cache entry, so this is an error rather
/// than something to filter out.
pub fn run_rule(
    rule: &dyn Rule,
    doc: &IdentifiedDocument,
    targets: &RecheckSet,
) -> Result<Vec<DiagnosticRecord>, RuleError> {
    if targets.is_empty() {
        return Ok(Vec::new());
    }

    let records = rule.check(doc, targets);

    if let Some(stray) = records
        .iter()
        .find(|record| !targets.contains(&record.element_key) || record.code != rule.id())
    {
        return Err(RuleError::contract_violation(
            rule.id(),
            stray.element_key.to_string(),
        ));
    }

    debug!(
        "Rule '{}' checked {} targets, {} findings",
        rule.id(),
        targets.len(),
        records.len()
    );

    Ok(records)
}
