//! Table-of-contents generation from PDF bookmarks
//!
//! Reads the document's outline tree and inserts human-readable, clickable
//! contents pages at the front of the document. Generation runs on a
//! dedicated worker task that is torn down after each job.

mod compose;
mod outline;
mod worker;

pub use outline::OutlineEntry;
pub use worker::{TocWorker, generate_table_of_contents};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TocError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("The document has no bookmarks to index")]
    NoBookmarks,
    #[error("No pages in document")]
    NoPages,
    #[error("Malformed document: {0}")]
    Malformed(String),
    #[error("TOC worker is no longer running")]
    WorkerClosed,
}

pub type Result<T> = std::result::Result<T, TocError>;

/// Font family for the contents pages (base-14 fonts only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TocFont {
    Times,
    #[default]
    Helvetica,
    Courier,
}

impl TocFont {
    pub(crate) fn base_font(self) -> &'static [u8] {
        match self {
            TocFont::Times => b"Times-Roman",
            TocFont::Helvetica => b"Helvetica",
            TocFont::Courier => b"Courier",
        }
    }
}

/// Table-of-contents options
#[derive(Debug, Clone, PartialEq)]
pub struct TocOptions {
    /// Heading drawn above the entries
    pub title: String,
    /// Entry font size in points
    pub font_size: f32,
    pub font: TocFont,
    /// Also add a bookmark pointing at the contents page
    pub add_bookmark: bool,
}

impl Default for TocOptions {
    fn default() -> Self {
        Self {
            title: "Table of Contents".to_string(),
            font_size: 12.0,
            font: TocFont::Helvetica,
            add_bookmark: true,
        }
    }
}

/// Synchronous generation path used by the worker: parse, read bookmarks,
/// insert contents pages, serialize.
pub(crate) fn generate_sync(bytes: &[u8], options: &TocOptions) -> Result<Vec<u8>> {
    let mut doc = lopdf::Document::load_mem(bytes)?;

    let entries = outline::read_outline(&doc)?;
    if entries.is_empty() {
        return Err(TocError::NoBookmarks);
    }
    log::debug!("building contents for {} bookmark entries", entries.len());

    compose::insert_toc_pages(&mut doc, &entries, options)?;

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}
