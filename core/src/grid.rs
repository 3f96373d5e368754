//! Grid partitioner — a raster image as a grid of fixed-size cells.
//!
//! Layout: `[row_cell][col_cell][row_in_cell][col_in_cell][channel]`.
//! Trailing rows/columns that don't fill a whole cell are cropped from
//! the bottom/right edge. Images are never padded or resized.

use crate::{
    error::{PipelineError, PipelineResult},
    types::CellSize,
};
use image::DynamicImage;
use ndarray::{s, Array3, Array5, ArrayView3};

/// `(grid_height, grid_width, cell_height, cell_width, channels)`.
pub type GridTensor = Array5<u8>;

/// Number of whole cells that fit in each direction.
/// Rejects a zero cell size and any image smaller than one cell.
pub fn grid_dims(height: usize, width: usize, cell_size: CellSize) -> PipelineResult<(usize, usize)> {
    let invalid = || PipelineError::InvalidGeometry { cell_size, image: Some((height, width)) };
    if cell_size == 0 {
        return Err(invalid());
    }
    let (gh, gw) = (height / cell_size, width / cell_size);
    if gh == 0 || gw == 0 {
        return Err(invalid());
    }
    Ok((gh, gw))
}

/// Split an `(height, width, channels)` image into cells.
pub fn partition(image: ArrayView3<'_, u8>, cell_size: CellSize) -> PipelineResult<GridTensor> {
    let (height, width, channels) = image.dim();
    let (gh, gw) = grid_dims(height, width, cell_size)?;
    let (crop_h, crop_w) = (gh * cell_size, gw * cell_size);

    if crop_h != height || crop_w != width {
        log::debug!("cropping {height}x{width} to {crop_h}x{crop_w} for {cell_size}px cells");
    }

    let cropped = image
        .slice(s![..crop_h, ..crop_w, ..])
        .as_standard_layout()
        .into_owned();

    let grid = cropped
        .into_shape_with_order((gh, cell_size, gw, cell_size, channels))?
        .permuted_axes([0, 2, 1, 3, 4]);

    Ok(grid.as_standard_layout().into_owned())
}

/// Inverse of [`partition`]: lay the cells back out row-major.
pub fn reassemble(grid: &GridTensor) -> PipelineResult<Array3<u8>> {
    let (gh, gw, ch, cw, channels) = grid.dim();
    let image = grid
        .view()
        .permuted_axes([0, 2, 1, 3, 4])
        .as_standard_layout()
        .into_owned()
        .into_shape_with_order((gh * ch, gw * cw, channels))?;
    Ok(image)
}

/// Decoded pixels as `(height, width, channels)`.
///
/// 8-bit gray, gray+alpha, RGB and RGBA keep their channel count; any
/// other pixel format is converted to RGB8, or RGBA8 if it carries alpha.
pub fn image_to_array(image: &DynamicImage) -> PipelineResult<Array3<u8>> {
    let (w, h) = (image.width() as usize, image.height() as usize);
    let (channels, raw) = match image {
        DynamicImage::ImageLuma8(buf)  => (1, buf.as_raw().clone()),
        DynamicImage::ImageLumaA8(buf) => (2, buf.as_raw().clone()),
        DynamicImage::ImageRgb8(buf)   => (3, buf.as_raw().clone()),
        DynamicImage::ImageRgba8(buf)  => (4, buf.as_raw().clone()),
        other if other.color().has_alpha() => (4, other.to_rgba8().into_raw()),
        other => (3, other.to_rgb8().into_raw()),
    };
    Ok(Array3::from_shape_vec((h, w, channels), raw)?)
}

/// Partition an already-decoded image.
pub fn partition_image(image: &DynamicImage, cell_size: CellSize) -> PipelineResult<GridTensor> {
    // Reject the geometry before converting any pixels.
    grid_dims(image.height() as usize, image.width() as usize, cell_size)?;
    let pixels = image_to_array(image)?;
    partition(pixels.view(), cell_size)
}
