//! Clean/smudge extension pipelines.
//!
//! An extension is an external filter program. A pipeline runs the configured
//! extensions in priority order, pipes the content through each of them and
//! records a SHA-256 fingerprint on every stage boundary.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod util;

pub use error::{ConfigError, PipelineError, PipelineResult};
pub use pipeline::{
    Action, Extension, PipelineRequest, PipelineResponse, ProcessChainExecutor, StageResult,
};
pub use util::hash::Fingerprint;
