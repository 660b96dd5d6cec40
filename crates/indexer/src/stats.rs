use serde::{Deserialize, Serialize};

/// Counters for one analysis pass, logged at `info` when the pass completes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub projects: usize,
    /// Documents parsed during this pass.
    pub documents_analyzed: usize,
    /// Documents whose cached result was reused unchanged.
    pub documents_reused: usize,
    pub documents_failed: usize,
    /// Generated or excluded documents.
    pub documents_skipped: usize,
    pub elapsed_ms: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl AnalysisReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_failure(&mut self, error: String) {
        self.documents_failed += 1;
        self.errors.push(error);
    }

    pub fn absorb(&mut self, other: &AnalysisReport) {
        self.projects += other.projects;
        self.documents_analyzed += other.documents_analyzed;
        self.documents_reused += other.documents_reused;
        self.documents_failed += other.documents_failed;
        self.documents_skipped += other.documents_skipped;
        self.errors.extend(other.errors.iter().cloned());
    }
}
