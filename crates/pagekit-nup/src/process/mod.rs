//! N-Up process orchestration
//!
//! Drives the pipeline through its sequential stages: validate the input,
//! load the source, resolve the sheet geometry, composite the sheets, and
//! serialize the result. Every failure is converted into the typed error
//! taxonomy at this boundary; cancellation is a distinct terminal outcome.

mod io;
mod sheet;

use crate::constants::*;
use crate::layout::{Grid, resolve_sheet_geometry};
use crate::options::NUpOptions;
use crate::progress::{CancelFlag, ProgressSink};
use crate::render::page_dimensions;
use crate::types::*;
use lopdf::ObjectId;
use sheet::{Composed, compose_document};

/// Run the N-Up pipeline over a single source document.
///
/// Exactly one input file is required. Progress is reported through
/// `progress` with monotonically non-decreasing percentages; `cancel` is
/// polled at every suspension-safe point and, once observed, yields
/// [`NUpOutcome::Cancelled`] without further drawing.
pub async fn process(
    mut files: Vec<SourceFile>,
    options: &NUpOptions,
    progress: ProgressSink,
    cancel: CancelFlag,
) -> Result<NUpOutcome> {
    if files.len() != 1 {
        return Err(NUpError::InvalidOptions(format!(
            "exactly 1 PDF file is required, received {}",
            files.len()
        )));
    }
    let file = files.remove(0);

    progress.report(PROGRESS_PREPARE, "Preparing PDF engine...");
    if cancel.is_cancelled() {
        return Ok(NUpOutcome::Cancelled);
    }

    progress.report(PROGRESS_LOAD, "Loading source PDF...");
    let source = io::load_document(file.bytes).await?;

    let page_ids: Vec<ObjectId> = source.get_pages().values().copied().collect();
    let original_page_count = page_ids.len();
    if original_page_count == 0 {
        return Err(NUpError::NoPages);
    }
    log::debug!("loaded source PDF with {original_page_count} pages");

    progress.report(
        PROGRESS_LOADED,
        &format!("Source PDF has {original_page_count} pages."),
    );
    if cancel.is_cancelled() {
        return Ok(NUpOutcome::Cancelled);
    }

    let first_page = page_dimensions(&source, page_ids[0])?;
    let geometry = resolve_sheet_geometry(options, first_page)?;
    let grid = Grid::of(options.pages_per_sheet);
    let pages_per_sheet = options.pages_per_sheet.count();
    let output_sheet_count = original_page_count.div_ceil(pages_per_sheet);
    log::debug!(
        "layout: {}x{} grid, {output_sheet_count} sheets of {}x{}pt",
        grid.columns,
        grid.rows,
        geometry.page_width,
        geometry.page_height
    );

    progress.report(PROGRESS_COMPOSE, "Creating N-Up layout...");

    let border = options.add_border.then(|| options.border_rgb());
    let compose_progress = progress.clone();
    let compose_cancel = cancel.clone();
    let composed = tokio::task::spawn_blocking(move || {
        compose_document(
            &source,
            &page_ids,
            &geometry,
            &grid,
            border,
            &compose_progress,
            &compose_cancel,
        )
    })
    .await??;

    let output = match composed {
        Composed::Document(doc) => doc,
        Composed::Cancelled => return Ok(NUpOutcome::Cancelled),
    };

    progress.report(PROGRESS_SAVE, "Saving PDF...");
    let bytes = io::serialize_document(output).await?;

    progress.report(PROGRESS_DONE, "Complete!");

    Ok(NUpOutcome::Complete(NUpArtifact {
        bytes,
        mime: PDF_MIME,
        filename: derive_filename(&file.name, pages_per_sheet),
        metadata: NUpMetadata {
            original_page_count,
            output_sheet_count,
            pages_per_sheet,
        },
    }))
}

/// Output filename: input stem plus `_{n}-up.pdf`.
pub fn derive_filename(original_name: &str, pages_per_sheet: usize) -> String {
    let stem = match original_name.rfind('.') {
        Some(dot) => &original_name[..dot],
        None => original_name,
    };
    format!("{stem}_{pages_per_sheet}-up.pdf")
}
