//! Document loading and serialization

use crate::types::{NUpError, Result};
use lopdf::Document;

/// Parse a source document from raw bytes.
///
/// An encrypted source is classified as [`NUpError::SourceEncrypted`]
/// whether the engine rejects it outright or loads it with its encryption
/// flag set; other parse failures surface as PDF errors.
pub(crate) async fn load_document(bytes: Vec<u8>) -> Result<Document> {
    let loaded = tokio::task::spawn_blocking(move || Document::load_mem(&bytes)).await?;

    let doc = match loaded {
        Ok(doc) => doc,
        Err(err) => return Err(classify_load_error(err)),
    };

    if doc.is_encrypted() {
        return Err(NUpError::SourceEncrypted);
    }

    Ok(doc)
}

fn classify_load_error(err: lopdf::Error) -> NUpError {
    // The engine reports encrypted sources either as an encryption error
    // or as a failed empty-password decryption attempt
    let message = err.to_string().to_ascii_lowercase();
    if message.contains("crypt") || message.contains("password") {
        NUpError::SourceEncrypted
    } else {
        NUpError::Pdf(err)
    }
}

/// Serialize the output document to bytes.
pub(crate) async fn serialize_document(mut doc: Document) -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || {
        let mut writer = Vec::new();
        doc.save_to(&mut writer)?;
        Ok::<_, NUpError>(writer)
    })
    .await?
}
