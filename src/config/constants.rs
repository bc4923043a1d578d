//! Constants for lfs-ext

/// Token replaced by the current file name in extension arguments
pub const FILE_NAME_TOKEN: &str = "%f";

/// Default extension declaration file, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = ".lfsextensions.json";

/// Prefix of extension keys in `git config --list` output
pub const GIT_EXTENSION_PREFIX: &str = "lfs.extension.";

/// Chunk size used when teeing a stream into a hasher and a sink
pub const COPY_BUFFER_SIZE: usize = 32 * 1024;

/// Prefix of pipeline output temp files
pub const TEMP_FILE_PREFIX: &str = "lfs-ext-";

/// Directory, under the system temp dir, holding log files
pub const LOG_DIR: &str = "lfs-ext/logs";
