/// Centralized error handling for lfs-ext
pub mod config;
pub mod pipeline;

pub use config::{ConfigError, ConfigResult};
pub use pipeline::{PipelineError, PipelineResult};
