// Pipeline module
// sort -> plan -> execute -> aggregate

pub mod executor;
pub mod extension;
pub mod planner;
pub mod results;
pub mod tee;

pub use crate::error::PipelineError;
pub use executor::{ExecutorConfig, PipelineRequest, PipelineResponse, ProcessChainExecutor};
pub use extension::{Action, Extension, sort_extensions};
pub use planner::{Invocation, plan_chain};
pub use results::{
    ChainBreak, OutputMismatch, StageResult, aggregate, pointer_extensions, verify_chain,
    verify_output,
};
