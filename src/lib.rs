pub mod adapter;
pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod llm;
pub mod search;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{ConfigError, PipelineError};
pub use generator::pipeline::{AnalysisOptions, AnalysisPipeline};
pub use generator::workflow::launch;
pub use types::report::Report;
