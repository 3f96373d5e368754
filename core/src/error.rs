use crate::types::{CellSize, Tick};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Malformed record at {}:{line}: {source}", .path.display())]
    MalformedRecord {
        path:   PathBuf,
        line:   usize,
        #[source]
        source: serde_json::Error,
    },

    /// `image` is `(height, width)`; `None` when no image is involved yet.
    #[error("Invalid geometry: {}", describe_geometry(.cell_size, .image))]
    InvalidGeometry {
        cell_size: CellSize,
        image:     Option<(usize, usize)>,
    },

    #[error("Missing screenshot for tick {tick}: {}", .path.display())]
    MissingAsset { tick: Tick, path: PathBuf },

    #[error("Screenshot collision at tick {tick}: {} and {}", .first.display(), .second.display())]
    ScreenshotCollision {
        tick:   Tick,
        first:  PathBuf,
        second: PathBuf,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("Invalid config {}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

fn describe_geometry(cell_size: &CellSize, image: &Option<(usize, usize)>) -> String {
    match (*cell_size, *image) {
        (0, None)         => "cell size must be positive".to_string(),
        (0, Some((h, w))) => format!("cell size must be positive ({h}x{w} image)"),
        (_, Some((h, w))) => format!("{h}x{w} image is smaller than one {cell_size}px cell"),
        (_, None)         => format!("{cell_size}px cells rejected"),
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
