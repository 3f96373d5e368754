//! Example builder — aligned examples to `(state, grid, actions)` tuples.
//!
//! The output is lazy: one screenshot is decoded per `next()`. After an
//! error is yielded the sequence is exhausted; a rerun starts over from
//! the first example.

use crate::{
    config::MissingAssetPolicy,
    error::{PipelineError, PipelineResult},
    grid::{self, GridTensor},
    record::{ActionEvent, AlignedExample, StateSnapshot},
    types::{CellSize, Tick},
};
use std::iter::FusedIterator;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct TrainingExample {
    pub state:           StateSnapshot,
    pub grid:            GridTensor,
    pub actions:         Vec<ActionEvent>,
    pub screenshot_path: PathBuf,
}

impl TrainingExample {
    pub fn tick(&self) -> Tick {
        self.state.tick
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ExampleBuilder {
    cell_size:  CellSize,
    on_missing: MissingAssetPolicy,
}

impl ExampleBuilder {
    /// Fails with `InvalidGeometry` for a zero cell size, before any
    /// image is opened.
    pub fn new(cell_size: CellSize, on_missing: MissingAssetPolicy) -> PipelineResult<Self> {
        if cell_size == 0 {
            return Err(PipelineError::InvalidGeometry { cell_size, image: None });
        }
        Ok(Self { cell_size, on_missing })
    }

    pub fn cell_size(&self) -> CellSize {
        self.cell_size
    }

    pub fn on_missing(&self) -> MissingAssetPolicy {
        self.on_missing
    }

    pub fn build(&self, aligned: Vec<AlignedExample>) -> TrainingExamples {
        TrainingExamples {
            pending:  aligned.into_iter(),
            builder:  *self,
            skipped:  0,
            finished: false,
        }
    }

    /// Decode and partition one example's screenshot.
    pub fn materialize(&self, aligned: AlignedExample) -> PipelineResult<TrainingExample> {
        let AlignedExample { tick, state, screenshot_path, actions } = aligned;
        if !screenshot_path.is_file() {
            return Err(PipelineError::MissingAsset { tick, path: screenshot_path });
        }

        let image = image::open(&screenshot_path)?;
        let grid = grid::partition_image(&image, self.cell_size)?;
        log::debug!(
            "tick={tick} grid={:?} actions={}",
            grid.dim(),
            actions.len()
        );

        Ok(TrainingExample { state, grid, actions, screenshot_path })
    }
}

/// Lazy sequence of training examples.
pub struct TrainingExamples {
    pending:  std::vec::IntoIter<AlignedExample>,
    builder:  ExampleBuilder,
    skipped:  usize,
    finished: bool,
}

impl TrainingExamples {
    /// Examples dropped under `MissingAssetPolicy::Skip` so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Aligned examples not yet consumed.
    pub fn remaining(&self) -> usize {
        if self.finished { 0 } else { self.pending.len() }
    }
}

impl Iterator for TrainingExamples {
    type Item = PipelineResult<TrainingExample>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            let aligned = self.pending.next()?;
            match self.builder.materialize(aligned) {
                Ok(example) => return Some(Ok(example)),
                Err(PipelineError::MissingAsset { tick, path })
                    if self.builder.on_missing == MissingAssetPolicy::Skip =>
                {
                    log::warn!("tick={tick} screenshot {} is gone; skipping", path.display());
                    self.skipped += 1;
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

impl FusedIterator for TrainingExamples {}
