//! PDF engine bindings for page embedding
//!
//! Source pages become Form XObjects that can be placed on output sheets
//! with arbitrary scale and position without re-parsing.

mod xobject;

pub(crate) use xobject::{embed_page, page_dimensions};
