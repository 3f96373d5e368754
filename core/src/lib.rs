//! tickgrid-core: tick-aligned training examples from simulation logs.
//!
//! Three logs go in (state snapshots, player actions, screenshots); one
//! ordered sequence of `(state, grid, actions)` examples comes out.

pub mod align;
pub mod builder;
pub mod config;
pub mod error;
pub mod grid;
pub mod loader;
pub mod pipeline;
pub mod record;
pub mod types;

pub use align::{align_streams, AlignmentStats};
pub use builder::{ExampleBuilder, TrainingExample, TrainingExamples};
pub use config::{CollisionPolicy, MissingAssetPolicy, PipelineConfig};
pub use error::{PipelineError, PipelineResult};
pub use grid::GridTensor;
pub use pipeline::{Alignment, LoadedLogs, Pipeline};
