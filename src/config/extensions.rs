/// Extension declarations
use super::constants::GIT_EXTENSION_PREFIX;
use crate::error::{ConfigError, ConfigResult, PipelineResult};
use crate::pipeline::{Action, Extension, sort_extensions};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

/// Declared extensions keyed by name, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtensionConfig {
    #[serde(default)]
    pub extensions: IndexMap<String, Extension>,
}

impl ExtensionConfig {
    /// Parse a JSON declaration:
    ///
    /// ```json
    /// { "extensions": { "foo": { "clean": "foo-clean %f", "smudge": "foo-smudge %f", "priority": 0 } } }
    /// ```
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let mut config: Self = serde_json::from_str(json)?;
        for (name, ext) in config.extensions.iter_mut() {
            ext.name = name.clone();
        }
        Ok(config)
    }

    /// Load a JSON declaration file
    pub async fn load(path: &Path) -> ConfigResult<Self> {
        debug!("Loading extensions from {:?}", path);
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json_str(&content)
    }

    /// Parse `git config --list` output, picking up
    /// `lfs.extension.<name>.{clean,smudge,priority}` entries.
    pub fn from_git_config(listing: &str) -> ConfigResult<Self> {
        let mut extensions: IndexMap<String, Extension> = IndexMap::new();

        for line in listing.lines() {
            let Some(rest) = line.strip_prefix(GIT_EXTENSION_PREFIX) else {
                continue;
            };
            let (key, value) = rest
                .split_once('=')
                .ok_or_else(|| ConfigError::invalid_entry(line, "missing value"))?;
            let (name, field) = key
                .rsplit_once('.')
                .ok_or_else(|| ConfigError::invalid_entry(line, "missing extension name"))?;

            let ext = extensions
                .entry(name.to_string())
                .or_insert_with(|| Extension::new(name, "", "", 0));

            match field {
                "clean" => ext.clean = value.to_string(),
                "smudge" => ext.smudge = value.to_string(),
                "priority" => {
                    ext.priority = value.trim().parse().map_err(|e| {
                        ConfigError::invalid_entry(line, format!("bad priority: {}", e))
                    })?;
                }
                other => debug!("Ignoring unknown extension key '{}' for '{}'", other, name),
            }
        }

        Ok(Self { extensions })
    }

    /// Read extensions from the git configuration visible in `working_dir`
    pub async fn from_git(working_dir: Option<&Path>) -> ConfigResult<Self> {
        let mut cmd = Command::new("git");
        cmd.args(["config", "--list"]);
        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        }

        let output = cmd
            .output()
            .await
            .map_err(|e| ConfigError::Git(format!("failed to run git: {}", e)))?;
        if !output.status.success() {
            return Err(ConfigError::Git(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        Self::from_git_config(&String::from_utf8_lossy(&output.stdout))
    }

    /// Extensions in stage order
    pub fn sorted(&self) -> PipelineResult<Vec<Extension>> {
        sort_extensions(&self.extensions)
    }

    /// Extensions in the order they run for `action`.
    ///
    /// Smudge undoes clean, so it runs the chain backwards.
    pub fn stages(&self, action: Action) -> PipelineResult<Vec<Extension>> {
        let mut extensions = self.sorted()?;
        if action == Action::Smudge {
            extensions.reverse();
        }
        Ok(extensions)
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}
