pub mod dataset;
pub mod engine;
pub mod state;

pub use dataset::{Dataset, Row};
pub use engine::{CsvPipeline, RunSummary};
pub use state::PipelineState;
