//! Sheet composition
//!
//! Consumes the ordered source pages in chunks of the grid's cell count
//! and renders each chunk onto one freshly created output sheet. The
//! output document is exclusively owned here until serialization; sheets
//! are appended strictly in order.

use crate::constants::{BORDER_WIDTH_PT, PROGRESS_COMPOSE, PROGRESS_COMPOSE_SPAN};
use crate::layout::{Grid, SheetGeometry, place_in_cell};
use crate::progress::{CancelFlag, ProgressSink};
use crate::render::{embed_page, page_dimensions};
use crate::types::{Result, Rgb};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

/// Result of the composition loop: a finished document, or an early stop
/// because the cancel flag was observed before a sheet began.
pub(crate) enum Composed {
    Document(Document),
    Cancelled,
}

/// Compose every output sheet. Polls the cancel flag before each sheet
/// and reports linear progress across the sheet count.
pub(crate) fn compose_document(
    source: &Document,
    page_ids: &[ObjectId],
    geometry: &SheetGeometry,
    grid: &Grid,
    border: Option<Rgb>,
    progress: &ProgressSink,
    cancel: &CancelFlag,
) -> Result<Composed> {
    let mut output = Document::with_version("1.7");
    let pages_tree_id = output.new_object_id();

    let chunk_len = grid.cell_count();
    let total_sheets = page_ids.len().div_ceil(chunk_len);
    let progress_per_sheet = PROGRESS_COMPOSE_SPAN / total_sheets as f32;

    let mut page_refs = Vec::with_capacity(total_sheets);
    let mut xobject_cache: HashMap<ObjectId, ObjectId> = HashMap::new();

    for (sheet_index, chunk) in page_ids.chunks(chunk_len).enumerate() {
        if cancel.is_cancelled() {
            return Ok(Composed::Cancelled);
        }

        progress.report(
            PROGRESS_COMPOSE + sheet_index as f32 * progress_per_sheet,
            &format!("Processing sheet {} of {}...", sheet_index + 1, total_sheets),
        );

        let sheet_id = compose_sheet(
            &mut output,
            source,
            chunk,
            geometry,
            grid,
            border,
            pages_tree_id,
            &mut xobject_cache,
        )?;
        page_refs.push(Object::Reference(sheet_id));
    }

    let count = page_refs.len() as i64;
    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(page_refs)),
        ("Count", Object::Integer(count)),
    ]);
    output
        .objects
        .insert(pages_tree_id, Object::Dictionary(pages_dict));

    let catalog_id = output.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_tree_id)),
    ]));
    output.trailer.set("Root", catalog_id);

    Ok(Composed::Document(output))
}

/// Render one chunk of source pages onto a new output sheet.
#[allow(clippy::too_many_arguments)]
fn compose_sheet(
    output: &mut Document,
    source: &Document,
    chunk: &[ObjectId],
    geometry: &SheetGeometry,
    grid: &Grid,
    border: Option<Rgb>,
    parent_pages_id: ObjectId,
    xobject_cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<ObjectId> {
    let mut page_dict = Dictionary::new();
    page_dict.set("Type", Object::Name(b"Page".to_vec()));
    page_dict.set("Parent", Object::Reference(parent_pages_id));
    page_dict.set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(geometry.page_width),
            Object::Real(geometry.page_height),
        ]),
    );

    let mut content_ops = Vec::new();
    let mut xobjects = Dictionary::new();

    for (slot, &source_page_id) in chunk.iter().enumerate() {
        let (source_width, source_height) = page_dimensions(source, source_page_id)?;
        let placement = place_in_cell(geometry, grid, slot, source_width, source_height);

        let xobject_name = format!("P{slot}");
        let xobject_id = embed_page(output, source, source_page_id, xobject_cache)?;
        xobjects.set(xobject_name.as_bytes(), Object::Reference(xobject_id));

        content_ops.push(format!(
            "q {} 0 0 {} {} {} cm /{} Do Q\n",
            placement.scale, placement.scale, placement.x, placement.y, xobject_name
        ));

        if let Some(rgb) = border {
            // Outline bounds the scaled page, not the cell
            content_ops.push(format!(
                "q {} {} {} RG {} w {} {} {} {} re S Q\n",
                rgb.r,
                rgb.g,
                rgb.b,
                BORDER_WIDTH_PT,
                placement.x,
                placement.y,
                placement.width,
                placement.height
            ));
        }
    }

    let mut resources = Dictionary::new();
    resources.set("XObject", Object::Dictionary(xobjects));

    let content = content_ops.join("");
    let content_id = output.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

    page_dict.set("Contents", Object::Reference(content_id));
    page_dict.set("Resources", Object::Dictionary(resources));

    Ok(output.add_object(page_dict))
}
