pub mod context;
pub mod executor;
pub mod sequence;

pub use context::*;
pub use executor::{StepExecutor, StepExecutorBuilder, WorkflowStep};
pub use sequence::SequenceGenerator;

/// Stable step names shared with external configuration.
pub mod steps {
    pub const DSO_CREATE_GRID_SAFETY_ANALYSIS: &str = "DSO_CREATE_GRID_SAFETY_ANALYSIS";
    pub const DSO_MONITOR_GRID: &str = "DSO_MONITOR_GRID";
}
