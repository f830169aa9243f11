//! Grid factorization and sheet geometry
//!
//! The grid maps each pages-per-sheet value onto fixed columns × rows;
//! sheet geometry is resolved once per job from the options and the first
//! source page, then reused for every cell on every sheet.

use crate::constants::{GUTTER_PT, MARGIN_PT};
use crate::options::NUpOptions;
use crate::types::{NUpError, Orientation, PagesPerSheet, Result};

/// Grid shape for one output sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub columns: usize,
    pub rows: usize,
}

impl Grid {
    /// Fixed factorization: 2 → 2×1, 4 → 2×2, 9 → 3×3, 16 → 4×4.
    pub fn of(pages_per_sheet: PagesPerSheet) -> Self {
        let (columns, rows) = match pages_per_sheet {
            PagesPerSheet::Two => (2, 1),
            PagesPerSheet::Four => (2, 2),
            PagesPerSheet::Nine => (3, 3),
            PagesPerSheet::Sixteen => (4, 4),
        };
        Self { columns, rows }
    }

    pub fn cell_count(&self) -> usize {
        self.columns * self.rows
    }
}

/// Sheet-level geometry, computed once per job
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetGeometry {
    /// Output page width in points (orientation already applied)
    pub page_width: f32,
    /// Output page height in points
    pub page_height: f32,
    /// Outer margin in points
    pub margin: f32,
    /// Spacing between adjacent cells in points
    pub gutter: f32,
    /// Width of each grid cell in points
    pub cell_width: f32,
    /// Height of each grid cell in points
    pub cell_height: f32,
}

/// Resolve `auto` orientation from the first source page.
///
/// Landscape is chosen only when the first page is wider than tall AND the
/// grid itself is wider than tall; later pages never influence the
/// decision.
pub fn resolve_orientation(
    requested: Orientation,
    grid: &Grid,
    first_page: (f32, f32),
) -> Orientation {
    match requested {
        Orientation::Auto => {
            let (width, height) = first_page;
            if width > height && grid.columns > grid.rows {
                Orientation::Landscape
            } else {
                Orientation::Portrait
            }
        }
        fixed => fixed,
    }
}

/// Resolve the full sheet geometry for a job.
///
/// `first_page` is the (width, height) of the first source page in points,
/// consulted only when orientation is `auto`.
pub fn resolve_sheet_geometry(
    options: &NUpOptions,
    first_page: (f32, f32),
) -> Result<SheetGeometry> {
    let grid = Grid::of(options.pages_per_sheet);
    let (mut page_width, mut page_height) = options.paper_size.dimensions_pt();

    let orientation = resolve_orientation(options.orientation, &grid, first_page);
    if orientation == Orientation::Landscape && page_width < page_height {
        std::mem::swap(&mut page_width, &mut page_height);
    }

    let (margin, gutter) = if options.use_margins {
        (MARGIN_PT, GUTTER_PT)
    } else {
        (0.0, 0.0)
    };

    let (cell_width, cell_height) = cell_size(page_width, page_height, margin, gutter, &grid)?;

    Ok(SheetGeometry {
        page_width,
        page_height,
        margin,
        gutter,
        cell_width,
        cell_height,
    })
}

/// Cell dimensions from the usable area. Margins or gutters that consume
/// the page are a processing failure, never silently clamped.
pub(crate) fn cell_size(
    page_width: f32,
    page_height: f32,
    margin: f32,
    gutter: f32,
    grid: &Grid,
) -> Result<(f32, f32)> {
    let usable_width = page_width - margin * 2.0;
    let usable_height = page_height - margin * 2.0;

    let cell_width = (usable_width - gutter * (grid.columns as f32 - 1.0)) / grid.columns as f32;
    let cell_height = (usable_height - gutter * (grid.rows as f32 - 1.0)) / grid.rows as f32;

    if cell_width <= 0.0 || cell_height <= 0.0 {
        return Err(NUpError::Geometry(format!(
            "margins and gutters leave no room for a {}x{} grid on a {page_width}x{page_height}pt sheet",
            grid.columns, grid.rows
        )));
    }

    Ok((cell_width, cell_height))
}

/// Bottom-left corner of the cell holding the page at `index` within its
/// chunk. Placement order is row-major with row 0 nearest the top edge.
pub fn cell_origin(geometry: &SheetGeometry, grid: &Grid, index: usize) -> (f32, f32) {
    let row = index / grid.columns;
    let col = index % grid.columns;

    let x = geometry.margin + col as f32 * (geometry.cell_width + geometry.gutter);
    let y = geometry.page_height
        - geometry.margin
        - (row as f32 + 1.0) * geometry.cell_height
        - row as f32 * geometry.gutter;

    (x, y)
}
