/// Lifecycle of one enrichment run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Reading,
    Enriching { completed: usize, total: usize },
    Writing { rows: usize },
    Done { rows: usize },
    Failed(String),
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done { .. } | PipelineState::Failed(_))
    }
}
