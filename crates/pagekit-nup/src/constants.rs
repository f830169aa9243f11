//! Shared constants for N-Up composition

/// Outer sheet margin when margins are enabled (points)
pub const MARGIN_PT: f32 = 36.0;

/// Spacing between adjacent grid cells when margins are enabled (points)
pub const GUTTER_PT: f32 = 10.0;

/// Stroke width of the optional border around each placed page (points)
pub const BORDER_WIDTH_PT: f32 = 1.0;

/// MIME type of the serialized output
pub const PDF_MIME: &str = "application/pdf";

/// Default page width in points (US Letter), used when a source page has
/// no readable MediaBox
pub const DEFAULT_PAGE_WIDTH_PT: f32 = 612.0;

/// Default page height in points (US Letter)
pub const DEFAULT_PAGE_HEIGHT_PT: f32 = 792.0;

pub const DEFAULT_PAGE_DIMENSIONS: (f32, f32) = (DEFAULT_PAGE_WIDTH_PT, DEFAULT_PAGE_HEIGHT_PT);

// Progress milestones. Setup reports fixed percentages; composition
// interpolates from COMPOSE across COMPOSE_SPAN, staying under SAVE until
// serialization begins.
pub const PROGRESS_PREPARE: f32 = 5.0;
pub const PROGRESS_LOAD: f32 = 10.0;
pub const PROGRESS_LOADED: f32 = 20.0;
pub const PROGRESS_COMPOSE: f32 = 30.0;
pub const PROGRESS_COMPOSE_SPAN: f32 = 60.0;
pub const PROGRESS_SAVE: f32 = 90.0;
pub const PROGRESS_DONE: f32 = 100.0;
