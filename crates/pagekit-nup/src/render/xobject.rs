//! Source page embedding
//!
//! A source page is embedded by wrapping its content stream in a Form
//! XObject whose BBox is the page's MediaBox, deep-copying the page's
//! resource dictionary into the output document. Copied objects are
//! cached by source ObjectId so resources shared between pages (fonts,
//! images) land in the output exactly once.

use crate::constants::DEFAULT_PAGE_DIMENSIONS;
use crate::types::Result;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

/// Embed a source page into `output` as a Form XObject, returning the new
/// object's id.
pub(crate) fn embed_page(
    output: &mut Document,
    source: &Document,
    page_id: ObjectId,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<ObjectId> {
    let page_dict = source.get_dictionary(page_id)?;

    let media_box = page_dict
        .get(b"MediaBox")
        .and_then(|obj| obj.as_array())
        .ok()
        .cloned()
        .unwrap_or_else(default_media_box);

    let content = page_content(source, page_dict)?;

    let mut xobject_dict = Dictionary::new();
    xobject_dict.set("Type", Object::Name(b"XObject".to_vec()));
    xobject_dict.set("Subtype", Object::Name(b"Form".to_vec()));
    xobject_dict.set("BBox", Object::Array(media_box));
    xobject_dict.set("FormType", Object::Integer(1));

    if let Ok(resources) = page_dict.get(b"Resources") {
        xobject_dict.set("Resources", copy_object_deep(output, source, resources, cache)?);
    }

    Ok(output.add_object(Stream::new(xobject_dict, content)))
}

fn default_media_box() -> Vec<Object> {
    vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Real(DEFAULT_PAGE_DIMENSIONS.0),
        Object::Real(DEFAULT_PAGE_DIMENSIONS.1),
    ]
}

/// Collect a page's content stream bytes, concatenating an array of
/// streams in order. A page without content is a blank page.
fn page_content(doc: &Document, page_dict: &Dictionary) -> Result<Vec<u8>> {
    let contents = match page_dict.get(b"Contents") {
        Ok(contents) => contents,
        Err(_) => return Ok(Vec::new()),
    };

    match contents {
        Object::Reference(id) => stream_content(doc, *id),
        Object::Array(refs) => {
            let mut combined = Vec::new();
            for obj in refs {
                if let Object::Reference(id) = obj {
                    combined.extend_from_slice(&stream_content(doc, *id)?);
                    combined.push(b'\n');
                }
            }
            Ok(combined)
        }
        _ => Ok(Vec::new()),
    }
}

fn stream_content(doc: &Document, id: ObjectId) -> Result<Vec<u8>> {
    match doc.get_object(id)?.as_stream() {
        Ok(stream) => Ok(stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone())),
        Err(_) => Ok(Vec::new()),
    }
}

/// Deep copy an object graph from `source` into `output`, rewriting
/// indirect references through the cache.
fn copy_object_deep(
    output: &mut Document,
    source: &Document,
    obj: &Object,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Object> {
    match obj {
        Object::Reference(id) => {
            if let Some(&copied_id) = cache.get(id) {
                return Ok(Object::Reference(copied_id));
            }

            let referenced = source.get_object(*id)?;
            let copied = copy_object_deep(output, source, referenced, cache)?;
            let copied_id = output.add_object(copied);
            cache.insert(*id, copied_id);

            Ok(Object::Reference(copied_id))
        }
        Object::Dictionary(dict) => {
            let mut copied = Dictionary::new();
            for (key, value) in dict.iter() {
                copied.set(key.clone(), copy_object_deep(output, source, value, cache)?);
            }
            Ok(Object::Dictionary(copied))
        }
        Object::Array(items) => {
            let copied: Result<Vec<_>> = items
                .iter()
                .map(|item| copy_object_deep(output, source, item, cache))
                .collect();
            Ok(Object::Array(copied?))
        }
        Object::Stream(stream) => {
            let mut dict = Dictionary::new();
            for (key, value) in stream.dict.iter() {
                dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
            }
            Ok(Object::Stream(Stream {
                dict,
                content: stream.content.clone(),
                allows_compression: stream.allows_compression,
                start_position: None,
            }))
        }
        _ => Ok(obj.clone()),
    }
}

/// Intrinsic (width, height) of a source page in points, from its
/// MediaBox; unreadable boxes fall back to US Letter.
pub(crate) fn page_dimensions(doc: &Document, page_id: ObjectId) -> Result<(f32, f32)> {
    let page_dict = doc.get_dictionary(page_id)?;

    match page_dict.get(b"MediaBox").and_then(|obj| obj.as_array()) {
        Ok(media_box) if media_box.len() >= 4 => {
            let width = as_number(&media_box[2]).unwrap_or(DEFAULT_PAGE_DIMENSIONS.0);
            let height = as_number(&media_box[3]).unwrap_or(DEFAULT_PAGE_DIMENSIONS.1);
            Ok((width, height))
        }
        _ => Ok(DEFAULT_PAGE_DIMENSIONS),
    }
}

fn as_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(value) => Some(*value as f32),
        Object::Real(value) => Some(*value),
        _ => None,
    }
}
