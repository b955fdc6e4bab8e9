//! Counters for affinity engine operations

/// Metrics collected while scoring relationships
///
/// Tracks computed and fallback results alongside score persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineMetrics {
    /// Breakdowns computed from interaction history
    pub computed: usize,

    /// Degenerate results returned because a repository call failed
    pub fallbacks: usize,

    /// Totals written back to the repository
    pub persisted: usize,

    /// Totals that could not be written back
    pub persist_failures: usize,

    /// Computations where the relationship record was absent
    pub missing_relationships: usize,

    /// Batch rescore passes completed
    pub rescore_runs: usize,
}

impl EngineMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful computation
    pub fn record_computed(&mut self) {
        self.computed += 1;
    }

    /// Record a degenerate fallback
    pub fn record_fallback(&mut self) {
        self.fallbacks += 1;
    }

    /// Record a persisted total
    pub fn record_persisted(&mut self) {
        self.persisted += 1;
    }

    /// Record a failed write-back
    pub fn record_persist_failure(&mut self) {
        self.persist_failures += 1;
    }

    /// Record a computation without a relationship record
    pub fn record_missing_relationship(&mut self) {
        self.missing_relationships += 1;
    }

    /// Record a completed batch rescore
    pub fn record_rescore_run(&mut self) {
        self.rescore_runs += 1;
    }

    /// Total evaluations, computed or fallback
    pub fn total_evaluations(&self) -> usize {
        self.computed + self.fallbacks
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let lines = [
            "Affinity Engine Metrics".to_string(),
            "=======================".to_string(),
            format!("Evaluations: {}", self.total_evaluations()),
            format!("  Computed: {}", self.computed),
            format!("  Fallbacks: {}", self.fallbacks),
            format!("  Missing relationships: {}", self.missing_relationships),
            format!("Scores persisted: {}", self.persisted),
            format!("Persist failures: {}", self.persist_failures),
            format!("Rescore runs: {}", self.rescore_runs),
        ];
        lines.join("\n")
    }
}
