//! Contents page composition
//!
//! Renders outline entries as text lines with right-aligned page numbers
//! and link annotations, then splices the new pages in ahead of the
//! existing page tree.

use crate::outline::OutlineEntry;
use crate::{Result, TocError, TocOptions};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};

const PAGE_MARGIN_PT: f32 = 72.0;
/// Approximate character width ratio for the base-14 fonts
const CHAR_WIDTH_RATIO: f32 = 0.5;
const LINE_SPACING: f32 = 1.8;
const INDENT_PER_LEVEL: f32 = 1.5;

/// Insert contents pages at the front of the document. Returns the number
/// of pages added.
pub(crate) fn insert_toc_pages(
    doc: &mut Document,
    entries: &[OutlineEntry],
    options: &TocOptions,
) -> Result<usize> {
    let first_page_id = doc
        .get_pages()
        .values()
        .next()
        .copied()
        .ok_or(TocError::NoPages)?;
    let (page_width, page_height) = page_size(doc, first_page_id);

    let catalog_id = doc.trailer.get(b"Root")?.as_reference()?;
    let pages_root_id = doc
        .get_dictionary(catalog_id)?
        .get(b"Pages")?
        .as_reference()?;

    let mut font = Dictionary::new();
    font.set("Type", Object::Name(b"Font".to_vec()));
    font.set("Subtype", Object::Name(b"Type1".to_vec()));
    font.set("BaseFont", Object::Name(options.font.base_font().to_vec()));
    let font_id = doc.add_object(font);

    let font_size = options.font_size;
    let title_size = font_size * 1.5;
    let line_height = font_size * LINE_SPACING;
    let top = page_height - PAGE_MARGIN_PT;

    let mut toc_page_ids = Vec::new();
    let mut ops = String::new();
    let mut annots: Vec<Object> = Vec::new();

    // Heading appears on the first contents page only
    ops.push_str(&text_op(
        title_size,
        PAGE_MARGIN_PT,
        top - title_size,
        &options.title,
    ));
    let mut cursor_y = top - title_size - line_height;

    for entry in entries {
        if cursor_y < PAGE_MARGIN_PT {
            flush_page(
                doc,
                &mut ops,
                &mut annots,
                font_id,
                pages_root_id,
                page_width,
                page_height,
                &mut toc_page_ids,
            );
            cursor_y = top - line_height;
        }

        let x = PAGE_MARGIN_PT + entry.depth as f32 * font_size * INDENT_PER_LEVEL;
        ops.push_str(&text_op(font_size, x, cursor_y, &entry.title));

        if let Some(page_index) = entry.page_index {
            let label = (page_index + 1).to_string();
            let label_x =
                page_width - PAGE_MARGIN_PT - label.len() as f32 * font_size * CHAR_WIDTH_RATIO;
            ops.push_str(&text_op(font_size, label_x, cursor_y, &label));
        }

        if let Some(page_id) = entry.page_id {
            let annot = link_annotation(
                x,
                cursor_y,
                page_width - PAGE_MARGIN_PT,
                cursor_y + font_size,
                page_id,
            );
            annots.push(Object::Reference(doc.add_object(annot)));
        }

        cursor_y -= line_height;
    }

    flush_page(
        doc,
        &mut ops,
        &mut annots,
        font_id,
        pages_root_id,
        page_width,
        page_height,
        &mut toc_page_ids,
    );

    prepend_pages(doc, pages_root_id, &toc_page_ids)?;

    if options.add_bookmark {
        add_toc_bookmark(doc, catalog_id, toc_page_ids[0], &options.title)?;
    }

    Ok(toc_page_ids.len())
}

fn text_op(size: f32, x: f32, y: f32, text: &str) -> String {
    format!("BT /F1 {size} Tf {x} {y} Td ({}) Tj ET\n", escape_text(text))
}

/// Escape a string for a PDF literal: backslash-escape delimiters, reduce
/// anything outside printable ASCII to '?'.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            ' '..='~' => out.push(ch),
            _ => out.push('?'),
        }
    }
    out
}

fn link_annotation(x1: f32, y1: f32, x2: f32, y2: f32, target_page: ObjectId) -> Dictionary {
    let mut annot = Dictionary::new();
    annot.set("Type", Object::Name(b"Annot".to_vec()));
    annot.set("Subtype", Object::Name(b"Link".to_vec()));
    annot.set(
        "Rect",
        Object::Array(vec![
            Object::Real(x1),
            Object::Real(y1),
            Object::Real(x2),
            Object::Real(y2),
        ]),
    );
    annot.set(
        "Border",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(0),
        ]),
    );
    annot.set(
        "Dest",
        Object::Array(vec![
            Object::Reference(target_page),
            Object::Name(b"Fit".to_vec()),
        ]),
    );
    annot
}

/// Turn the accumulated ops and annotations into one contents page.
#[allow(clippy::too_many_arguments)]
fn flush_page(
    doc: &mut Document,
    ops: &mut String,
    annots: &mut Vec<Object>,
    font_id: ObjectId,
    pages_root_id: ObjectId,
    page_width: f32,
    page_height: f32,
    toc_page_ids: &mut Vec<ObjectId>,
) {
    let content = std::mem::take(ops);
    let annots = std::mem::take(annots);

    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

    let mut fonts = Dictionary::new();
    fonts.set("F1", Object::Reference(font_id));
    let mut resources = Dictionary::new();
    resources.set("Font", Object::Dictionary(fonts));

    let mut page = Dictionary::new();
    page.set("Type", Object::Name(b"Page".to_vec()));
    page.set("Parent", Object::Reference(pages_root_id));
    page.set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(page_width),
            Object::Real(page_height),
        ]),
    );
    page.set("Contents", Object::Reference(content_id));
    page.set("Resources", Object::Dictionary(resources));
    if !annots.is_empty() {
        page.set("Annots", Object::Array(annots));
    }

    toc_page_ids.push(doc.add_object(page));
}

/// Splice the new pages in ahead of the existing Kids array.
fn prepend_pages(doc: &mut Document, pages_root_id: ObjectId, new_pages: &[ObjectId]) -> Result<()> {
    let kids = {
        let pages_dict = doc.get_dictionary(pages_root_id)?;
        match pages_dict.get(b"Kids") {
            Ok(Object::Array(kids)) => kids.clone(),
            _ => return Err(TocError::Malformed("Pages Kids array not found".to_string())),
        }
    };

    let total = doc.get_pages().len() + new_pages.len();

    let mut new_kids: Vec<Object> = new_pages.iter().map(|&id| Object::Reference(id)).collect();
    new_kids.extend(kids);

    let mut updated = doc.get_dictionary(pages_root_id)?.clone();
    updated.set("Kids", Object::Array(new_kids));
    updated.set("Count", Object::Integer(total as i64));
    doc.objects
        .insert(pages_root_id, Object::Dictionary(updated));

    Ok(())
}

/// Hook a bookmark for the contents page in as the first outline item.
fn add_toc_bookmark(
    doc: &mut Document,
    catalog_id: ObjectId,
    toc_page_id: ObjectId,
    title: &str,
) -> Result<()> {
    let outlines_id = doc
        .get_dictionary(catalog_id)?
        .get(b"Outlines")?
        .as_reference()?;
    let old_first = doc
        .get_dictionary(outlines_id)?
        .get(b"First")
        .and_then(|o| o.as_reference())
        .ok();

    let mut item = Dictionary::new();
    item.set(
        "Title",
        Object::String(title.as_bytes().to_vec(), StringFormat::Literal),
    );
    item.set("Parent", Object::Reference(outlines_id));
    item.set(
        "Dest",
        Object::Array(vec![
            Object::Reference(toc_page_id),
            Object::Name(b"Fit".to_vec()),
        ]),
    );
    if let Some(first) = old_first {
        item.set("Next", Object::Reference(first));
    }
    let item_id = doc.add_object(item);

    if let Some(first) = old_first {
        if let Ok(first_dict) = doc.get_object_mut(first).and_then(|o| o.as_dict_mut()) {
            first_dict.set("Prev", Object::Reference(item_id));
        }
    }

    let outlines = doc.get_object_mut(outlines_id)?.as_dict_mut()?;
    outlines.set("First", Object::Reference(item_id));
    let count = outlines.get(b"Count").and_then(|o| o.as_i64()).unwrap_or(0);
    outlines.set("Count", Object::Integer(count + 1));

    Ok(())
}

fn page_size(doc: &Document, page_id: ObjectId) -> (f32, f32) {
    let fallback = (612.0, 792.0);
    let Ok(page) = doc.get_dictionary(page_id) else {
        return fallback;
    };
    match page.get(b"MediaBox").and_then(|obj| obj.as_array()) {
        Ok(media_box) if media_box.len() >= 4 => {
            let number = |obj: &Object| match obj {
                Object::Integer(v) => Some(*v as f32),
                Object::Real(v) => Some(*v),
                _ => None,
            };
            (
                number(&media_box[2]).unwrap_or(fallback.0),
                number(&media_box[3]).unwrap_or(fallback.1),
            )
        }
        _ => fallback,
    }
}
