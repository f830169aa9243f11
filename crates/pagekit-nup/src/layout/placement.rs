//! Page placement within grid cells
//!
//! A placed page is uniformly scaled to fit its cell (aspect ratio
//! preserved, no distortion) and centered on both axes.

use super::{Grid, SheetGeometry, cell_origin};

/// Final position of one source page on the output sheet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellPlacement {
    /// Bottom-left x of the scaled page in sheet coordinates (points)
    pub x: f32,
    /// Bottom-left y of the scaled page (points)
    pub y: f32,
    /// Scaled page width (points)
    pub width: f32,
    /// Scaled page height (points)
    pub height: f32,
    /// Uniform scale factor applied to the source page
    pub scale: f32,
}

/// Uniform scale fitting a `page_width` × `page_height` page into a cell.
pub fn fit_scale(cell_width: f32, cell_height: f32, page_width: f32, page_height: f32) -> f32 {
    (cell_width / page_width).min(cell_height / page_height)
}

/// Place the page at chunk position `index` into its grid cell: fit-scale,
/// then center within the cell.
pub fn place_in_cell(
    geometry: &SheetGeometry,
    grid: &Grid,
    index: usize,
    page_width: f32,
    page_height: f32,
) -> CellPlacement {
    let (cell_x, cell_y) = cell_origin(geometry, grid, index);

    let scale = fit_scale(geometry.cell_width, geometry.cell_height, page_width, page_height);
    let width = page_width * scale;
    let height = page_height * scale;

    CellPlacement {
        x: cell_x + (geometry.cell_width - width) / 2.0,
        y: cell_y + (geometry.cell_height - height) / 2.0,
        width,
        height,
        scale,
    }
}
