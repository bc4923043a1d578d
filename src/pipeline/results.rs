use super::extension::Extension;
use crate::util::hash::Fingerprint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fingerprints recorded for one stage of a completed pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageResult {
    pub name: String,
    pub input_fingerprint: Fingerprint,
    pub output_fingerprint: Fingerprint,
}

/// A boundary where the recorded fingerprints do not line up
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Fingerprint chain broken at stage {index} ('{name}'): expected input {expected}, recorded {actual}")]
pub struct ChainBreak {
    pub index: usize,
    pub name: String,
    pub expected: Fingerprint,
    pub actual: Fingerprint,
}

/// Final content that is not what the last stage recorded
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Output does not match the fingerprint chain: expected {expected}, found {actual}")]
pub struct OutputMismatch {
    pub expected: Fingerprint,
    pub actual: Fingerprint,
}

/// Thread stage output fingerprints into per-stage results.
///
/// Stage 0 takes `input` as its input fingerprint; every later stage takes the
/// output fingerprint of the stage before it. Only pass stages that exited
/// successfully.
pub fn aggregate(input: Fingerprint, stages: Vec<(String, Fingerprint)>) -> Vec<StageResult> {
    let mut oid = input;
    stages
        .into_iter()
        .map(|(name, output)| {
            let result = StageResult {
                name,
                input_fingerprint: oid,
                output_fingerprint: output,
            };
            oid = output;
            result
        })
        .collect()
}

/// Check that `results` forms an unbroken chain starting at `original`
pub fn verify_chain(original: &Fingerprint, results: &[StageResult]) -> Result<(), ChainBreak> {
    let mut expected = *original;
    for (index, result) in results.iter().enumerate() {
        if result.input_fingerprint != expected {
            return Err(ChainBreak {
                index,
                name: result.name.clone(),
                expected,
                actual: result.input_fingerprint,
            });
        }
        expected = result.output_fingerprint;
    }
    Ok(())
}

/// Check that `output` is what the last stage of `results` produced.
///
/// An empty chain passes content through unchanged, so `original` is
/// expected then.
pub fn verify_output(
    original: &Fingerprint,
    results: &[StageResult],
    output: &Fingerprint,
) -> Result<(), OutputMismatch> {
    let expected = results
        .last()
        .map_or(*original, |result| result.output_fingerprint);
    if expected != *output {
        return Err(OutputMismatch {
            expected,
            actual: *output,
        });
    }
    Ok(())
}

/// Render pointer file extension lines, `ext-<priority>-<name> sha256:<oid>`.
///
/// `extensions` must be the sorted sequence the results were produced from.
pub fn pointer_extensions(extensions: &[Extension], results: &[StageResult]) -> Vec<String> {
    extensions
        .iter()
        .zip(results)
        .map(|(ext, result)| {
            format!(
                "ext-{}-{} sha256:{}",
                ext.priority, result.name, result.input_fingerprint
            )
        })
        .collect()
}
