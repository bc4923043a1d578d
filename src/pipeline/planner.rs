use super::extension::{Action, Extension};
use crate::config::constants::FILE_NAME_TOKEN;
use crate::error::{PipelineError, PipelineResult};
use tracing::debug;

/// A resolved extension command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Extension name, used in results and errors
    pub name: String,
    pub program: String,
    pub args: Vec<String>,
}

/// Resolve the command line of every extension for `action`.
///
/// Commands are split on whitespace; quoting is not supported, so an argument
/// cannot contain spaces. Every `%f` in an argument is replaced by `file_name`.
pub fn plan_chain(
    action: Action,
    file_name: &str,
    extensions: &[Extension],
) -> PipelineResult<Vec<Invocation>> {
    extensions
        .iter()
        .map(|ext| {
            let mut pieces = ext.command(action).split_whitespace();
            let program = pieces.next().ok_or_else(|| {
                PipelineError::configuration_error(format!(
                    "extension '{}' has an empty {} command",
                    ext.name, action
                ))
            })?;
            let args: Vec<String> = pieces
                .map(|arg| arg.replace(FILE_NAME_TOKEN, file_name))
                .collect();

            debug!("Planned {} stage '{}': {} {:?}", action, ext.name, program, args);

            Ok(Invocation {
                name: ext.name.clone(),
                program: program.to_string(),
                args,
            })
        })
        .collect()
}
