//! Outline tree traversal
//!
//! Walks the catalog's /Outlines tree in document order, collecting one
//! entry per bookmark with its nesting depth and target page. Destinations
//! may appear directly (/Dest) or through a GoTo action (/A → /D); named
//! destinations are kept as entries without a page target.

use crate::Result;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashMap;

/// One bookmark in document order
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineEntry {
    pub title: String,
    /// Zero-based index of the target page, when resolvable
    pub page_index: Option<usize>,
    /// Target page's object id, for building link destinations
    pub page_id: Option<ObjectId>,
    /// Nesting depth; top-level bookmarks are 0
    pub depth: usize,
}

/// Read every bookmark from the document outline. An absent or empty
/// /Outlines tree yields an empty list.
pub fn read_outline(doc: &Document) -> Result<Vec<OutlineEntry>> {
    let catalog_id = doc.trailer.get(b"Root")?.as_reference()?;
    let catalog = doc.get_dictionary(catalog_id)?;

    let outlines_id = match catalog.get(b"Outlines").and_then(|o| o.as_reference()) {
        Ok(id) => id,
        Err(_) => return Ok(Vec::new()),
    };
    let outlines = match doc.get_dictionary(outlines_id) {
        Ok(dict) => dict,
        Err(_) => return Ok(Vec::new()),
    };

    // Page id → zero-based index, for destination resolution
    let page_indices: HashMap<ObjectId, usize> = doc
        .get_pages()
        .values()
        .enumerate()
        .map(|(index, &id)| (id, index))
        .collect();

    let mut entries = Vec::new();
    if let Ok(first) = outlines.get(b"First").and_then(|o| o.as_reference()) {
        walk_siblings(doc, first, 0, &page_indices, &mut entries)?;
    }
    Ok(entries)
}

fn walk_siblings(
    doc: &Document,
    first: ObjectId,
    depth: usize,
    page_indices: &HashMap<ObjectId, usize>,
    entries: &mut Vec<OutlineEntry>,
) -> Result<()> {
    let mut cursor = Some(first);

    while let Some(item_id) = cursor {
        let item = doc.get_dictionary(item_id)?;

        let title = item
            .get(b"Title")
            .ok()
            .and_then(|obj| match obj {
                Object::String(bytes, _) => Some(decode_text(bytes)),
                _ => None,
            })
            .unwrap_or_default();

        let page_id = destination_page(doc, item);
        entries.push(OutlineEntry {
            title,
            page_index: page_id.and_then(|id| page_indices.get(&id).copied()),
            page_id,
            depth,
        });

        if let Ok(child) = item.get(b"First").and_then(|o| o.as_reference()) {
            walk_siblings(doc, child, depth + 1, page_indices, entries)?;
        }

        cursor = item.get(b"Next").and_then(|o| o.as_reference()).ok();
    }

    Ok(())
}

/// Resolve a bookmark's target page reference from /Dest or a GoTo /A.
fn destination_page(doc: &Document, item: &Dictionary) -> Option<ObjectId> {
    if let Ok(dest) = item.get(b"Dest") {
        return dest_array_page(doc, dest);
    }

    let action = item.get(b"A").ok()?;
    let action = resolve_dict(doc, action)?;
    if action.get(b"S").and_then(|o| o.as_name()).ok()? != b"GoTo" {
        return None;
    }
    dest_array_page(doc, action.get(b"D").ok()?)
}

fn dest_array_page(doc: &Document, dest: &Object) -> Option<ObjectId> {
    let dest = match dest {
        Object::Reference(id) => doc.get_object(*id).ok()?,
        other => other,
    };
    match dest {
        Object::Array(items) => match items.first()? {
            Object::Reference(page_id) => Some(*page_id),
            _ => None,
        },
        // Named destinations are left unresolved
        _ => None,
    }
}

fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok()?.as_dict().ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

/// Decode a PDF text string: UTF-16BE with BOM, otherwise Latin-1.
pub(crate) fn decode_text(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        bytes.iter().map(|&b| b as char).collect()
    }
}
