use thiserror::Error;

/// Fatal pipeline errors. Soft failures and structural skips are not errors:
/// the passive sources report them as [`crate::modules::passive::SourceYield`]
/// values and the orchestrator absorbs them locally.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required external tool binary is absent. Aborts the run.
    #[error("required tool '{tool}' not found on this system (install it and re-run)")]
    DependencyMissing { tool: String },

    /// Invalid CLI or environment input, rejected before any stage runs.
    #[error("configuration error: {0}")]
    Config(String),
}
