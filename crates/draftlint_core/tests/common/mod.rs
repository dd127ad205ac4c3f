#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use draftlint_ast::{Element, ElementKind, Range};
use draftlint_cache::{DiagnosticRecord, ElementKey, MemoryBackend, SnapshotStore};
use draftlint_core::{
    AnalysisReport, Analyzer, CancelFlag, LinterConfig, ReviewError, Reviewer, RulePlan,
};

pub fn el(kind: ElementKind, file: &str, line: u32, text: &str) -> Element {
    Element::new(
        kind,
        text,
        file,
        Range::from_coords(line, 0, line, text.chars().count() as u32),
    )
}

pub fn sentence(file: &str, line: u32, text: &str) -> Element {
    el(ElementKind::Sentence, file, line, text)
}

pub fn section(file: &str, line: u32, title: &str) -> Element {
    el(ElementKind::Section, file, line, title)
}

/// One sentence per line, starting at line 0.
pub fn lines(file: &str, texts: &[&str]) -> Vec<Element> {
    texts
        .iter()
        .enumerate()
        .map(|(line, text)| sentence(file, line as u32, text))
        .collect()
}

pub fn memory_analyzer() -> Analyzer<MemoryBackend> {
    Analyzer::new(LinterConfig::new(), SnapshotStore::new(MemoryBackend::new()))
}

pub fn shared_analyzer(backend: &Arc<MemoryBackend>) -> Analyzer<Arc<MemoryBackend>> {
    Analyzer::new(LinterConfig::new(), SnapshotStore::new(Arc::clone(backend)))
}

pub fn records<'a>(report: &'a AnalysisReport, code: &str) -> Vec<&'a DiagnosticRecord> {
    report.diagnostics().filter(|r| r.code == code).collect()
}

pub fn rule_plan<'a>(report: &'a AnalysisReport, rule: &str) -> &'a RulePlan {
    report
        .logic
        .as_ref()
        .and_then(|logic| logic.plan_for(rule))
        .unwrap_or_else(|| panic!("no plan for rule {rule}"))
}

/// Flags every sentence containing "bad" and records what it was asked to
/// review.
#[derive(Clone)]
pub struct FakeReviewer {
    pub signature: String,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail_on: Option<String>,
    pub skip_on: Option<String>,
    pub cancel_after: Option<(usize, CancelFlag)>,
}

impl FakeReviewer {
    pub fn new(signature: &str) -> Self {
        Self {
            signature: signature.to_string(),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_on: None,
            skip_on: None,
            cancel_after: None,
        }
    }

    pub fn failing_on(mut self, content: &str) -> Self {
        self.fail_on = Some(content.to_string());
        self
    }

    pub fn skipping(mut self, content: &str) -> Self {
        self.skip_on = Some(content.to_string());
        self
    }

    pub fn cancelling_after(mut self, calls: usize, cancel: CancelFlag) -> Self {
        self.cancel_after = Some((calls, cancel));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Reviewer for FakeReviewer {
    fn signature(&self) -> String {
        self.signature.clone()
    }

    fn review(
        &self,
        key: &ElementKey,
        element: &Element,
    ) -> Result<Vec<DiagnosticRecord>, ReviewError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(element.content.clone());

        if let Some((after, cancel)) = &self.cancel_after
            && calls.len() >= *after
        {
            cancel.cancel();
        }
        if self.fail_on.as_deref() == Some(element.content.as_str()) {
            return Err(ReviewError::fatal("quota exceeded"));
        }
        if self.skip_on.as_deref() == Some(element.content.as_str()) {
            return Err(ReviewError::skipped("empty response"));
        }

        if element.content.contains("bad") {
            Ok(vec![
                DiagnosticRecord::new(key, element, "review", "Reads poorly.").with_source("fake"),
            ])
        } else {
            Ok(Vec::new())
        }
    }
}
