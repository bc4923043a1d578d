use crate::error::{PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// An external filter program pair run during clean and smudge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extension {
    #[serde(default)]
    pub name: String,
    pub clean: String,
    pub smudge: String,
    #[serde(default)]
    pub priority: i32,
}

impl Extension {
    pub fn new(
        name: impl Into<String>,
        clean: impl Into<String>,
        smudge: impl Into<String>,
        priority: i32,
    ) -> Self {
        Self {
            name: name.into(),
            clean: clean.into(),
            smudge: smudge.into(),
            priority,
        }
    }

    /// Command line run for the given action
    pub fn command(&self, action: Action) -> &str {
        match action {
            Action::Clean => &self.clean,
            Action::Smudge => &self.smudge,
        }
    }
}

/// Direction of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Working tree to storage
    Clean,
    /// Storage to working tree
    Smudge,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Clean => "clean",
            Action::Smudge => "smudge",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "clean" => Ok(Action::Clean),
            "smudge" => Ok(Action::Smudge),
            other => Err(PipelineError::invalid_action(other)),
        }
    }
}

/// Sort named extensions ascending by priority.
///
/// Ties are rejected rather than broken: two extensions sharing a priority
/// would make the stage order depend on map iteration order.
pub fn sort_extensions<'a, I>(extensions: I) -> PipelineResult<Vec<Extension>>
where
    I: IntoIterator<Item = (&'a String, &'a Extension)>,
{
    let mut by_priority: BTreeMap<i32, (&'a String, &'a Extension)> = BTreeMap::new();

    for (name, ext) in extensions {
        if let Some((other, _)) = by_priority.insert(ext.priority, (name, ext)) {
            let (first, second) = if other <= name {
                (other, name)
            } else {
                (name, other)
            };
            return Err(PipelineError::configuration_error(format!(
                "duplicate priority {} on {} and {}",
                ext.priority, first, second
            )));
        }
    }

    Ok(by_priority.into_values().map(|(_, ext)| ext.clone()).collect())
}
