// Unit tests for error handling
use lfs_ext::{ConfigError, PipelineError};
use std::io;

#[test]
fn test_error_from_io() {
    let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed");
    let err: PipelineError = io_err.into();

    assert!(matches!(err, PipelineError::StreamError(_)));
    assert!(err.to_string().contains("Stream error"));
}

#[test]
fn test_extension_failure() {
    let err = PipelineError::extension_failure("foo", "bad input (exit status: 1)");
    assert_eq!(err.failed_extension(), Some("foo"));
    assert_eq!(
        err.to_string(),
        "Extension 'foo' failed with: bad input (exit status: 1)"
    );
}

#[test]
fn test_wiring_error() {
    let err = PipelineError::wiring_error("no stdout pipe");
    assert!(matches!(err, PipelineError::WiringError(_)));
    assert_eq!(err.failed_extension(), None);
    assert_eq!(err.to_string(), "Pipeline wiring error: no stdout pipe");
}

#[test]
fn test_config_invalid_entry() {
    let err = ConfigError::invalid_entry("lfs.extension.foo", "missing value");
    assert_eq!(
        err.to_string(),
        "Invalid extension entry 'lfs.extension.foo': missing value"
    );
}
