//! The pipeline facade — load, align, build.
//!
//! RULES:
//!   - Every call re-reads the input files. Nothing is cached between
//!     calls or across runs.
//!   - Stages run strictly in order: loaders, aligner, builder.

use crate::{
    align::{align_streams, AlignmentStats},
    builder::{ExampleBuilder, TrainingExamples},
    config::PipelineConfig,
    error::PipelineResult,
    loader::{self, ScreenshotIndex, ScreenshotPattern},
    record::{ActionEvent, AlignedExample, StateSnapshot},
};

/// The three input streams as loaded from disk.
#[derive(Debug, Clone)]
pub struct LoadedLogs {
    pub states:      Vec<StateSnapshot>,
    pub actions:     Vec<ActionEvent>,
    pub screenshots: ScreenshotIndex,
}

#[derive(Debug, Clone)]
pub struct Alignment {
    pub examples: Vec<AlignedExample>,
    pub stats:    AlignmentStats,
}

pub struct Pipeline {
    config:  PipelineConfig,
    builder: ExampleBuilder,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> PipelineResult<Self> {
        let builder = ExampleBuilder::new(config.cell_size, config.on_missing_asset)?;
        config.validate()?;
        Ok(Self { config, builder })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn load(&self) -> PipelineResult<LoadedLogs> {
        let pattern = ScreenshotPattern::new(
            &self.config.screenshot_prefix,
            &self.config.screenshot_extensions,
        );
        Ok(LoadedLogs {
            states:      loader::load_state_changes(self.config.state_path())?,
            actions:     loader::load_actions(self.config.actions_path())?,
            screenshots: loader::load_screenshots(
                self.config.screenshot_path(),
                &pattern,
                self.config.on_collision,
            )?,
        })
    }

    pub fn align(&self) -> PipelineResult<Alignment> {
        let logs = self.load()?;
        let (examples, stats) = align_streams(logs.states, &logs.actions, &logs.screenshots);
        Ok(Alignment { examples, stats })
    }

    /// Lazy training examples for the current contents of the data dir.
    pub fn training_examples(&self) -> PipelineResult<TrainingExamples> {
        let alignment = self.align()?;
        Ok(self.build(alignment.examples))
    }

    pub fn build(&self, examples: Vec<AlignedExample>) -> TrainingExamples {
        self.builder.build(examples)
    }
}
