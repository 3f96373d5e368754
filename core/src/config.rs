use crate::{
    error::{PipelineError, PipelineResult},
    types::CellSize,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_STATE_FILE:   &str = "factorio_state_changes.json";
pub const DEFAULT_ACTIONS_FILE: &str = "player_actions.json";
pub const DEFAULT_SCREENSHOT_PREFIX: &str = "state_";
pub const DEFAULT_CELL_SIZE: CellSize = 32;

/// What the example builder does when an aligned screenshot has vanished
/// between alignment and build.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MissingAssetPolicy {
    /// Yield the error and end the pass.
    #[default]
    Abort,
    /// Log, count, and continue with the next example.
    Skip,
}

/// How two screenshot files claiming the same tick are resolved.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// The lexicographically greatest path wins.
    #[default]
    GreatestPath,
    /// Fail the screenshot scan.
    Reject,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub data_dir:              PathBuf,
    pub state_file:            PathBuf,
    pub actions_file:          PathBuf,
    /// Defaults to `data_dir` when absent.
    pub screenshot_dir:        Option<PathBuf>,
    pub screenshot_prefix:     String,
    pub screenshot_extensions: Vec<String>,
    pub cell_size:             CellSize,
    pub on_missing_asset:      MissingAssetPolicy,
    pub on_collision:          CollisionPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir:              PathBuf::from("."),
            state_file:            PathBuf::from(DEFAULT_STATE_FILE),
            actions_file:          PathBuf::from(DEFAULT_ACTIONS_FILE),
            screenshot_dir:        None,
            screenshot_prefix:     DEFAULT_SCREENSHOT_PREFIX.to_string(),
            screenshot_extensions: vec!["jpg".to_string()],
            cell_size:             DEFAULT_CELL_SIZE,
            on_missing_asset:      MissingAssetPolicy::default(),
            on_collision:          CollisionPolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Defaults for the standard layout: both logs and all screenshots in `dir`.
    pub fn for_data_dir(dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: dir.into(), ..Self::default() }
    }

    /// Load from a JSON file. A relative `data_dir` is resolved against the
    /// directory containing the file.
    pub fn load(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::io(path, e))?;
        let mut config: PipelineConfig = serde_json::from_str(&content)
            .map_err(|e| PipelineError::Config {
                path:   path.to_path_buf(),
                reason: e.to_string(),
            })?;

        if config.data_dir.is_relative() {
            if let Some(parent) = path.parent() {
                config.data_dir = parent.join(&config.data_dir);
            }
        }
        config.validate_at(path)?;
        Ok(config)
    }

    pub fn validate(&self) -> PipelineResult<()> {
        self.validate_at(Path::new("<inline>"))
    }

    fn validate_at(&self, origin: &Path) -> PipelineResult<()> {
        let reject = |reason: &str| {
            Err(PipelineError::Config {
                path:   origin.to_path_buf(),
                reason: reason.to_string(),
            })
        };
        if self.cell_size == 0 {
            return reject("cell_size must be positive");
        }
        if self.screenshot_prefix.is_empty() {
            return reject("screenshot_prefix must not be empty");
        }
        if self.screenshot_extensions.is_empty() {
            return reject("screenshot_extensions must list at least one extension");
        }
        Ok(())
    }

    pub fn state_path(&self) -> PathBuf {
        self.data_dir.join(&self.state_file)
    }

    pub fn actions_path(&self) -> PathBuf {
        self.data_dir.join(&self.actions_file)
    }

    pub fn screenshot_path(&self) -> PathBuf {
        match &self.screenshot_dir {
            Some(dir) => self.data_dir.join(dir),
            None      => self.data_dir.clone(),
        }
    }
}
