//! Shared primitive types used across the entire pipeline.

/// A simulation tick. The join key across all three logs.
pub type Tick = i64;

/// Edge length of one square grid cell, in pixels.
pub type CellSize = usize;
