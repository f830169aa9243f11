//! Document conversion resource handle
//!
//! The conversion engine itself is an external collaborator behind
//! [`ConversionBackend`]; this crate owns its lifecycle. A [`Converter`]
//! is an explicitly constructed, explicitly initialized handle: the first
//! `initialize` call drives the backend up while concurrent callers await
//! that same in-flight initialization instead of duplicating it, and
//! `destroy` returns the handle to its uninitialized state.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, OnceCell};

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Converter not initialized")]
    NotInitialized,
    #[error("Conversion engine failed to initialize: {0}")]
    InitFailed(String),
    #[error("Conversion failed: {0}")]
    ConversionFailed(String),
}

pub type Result<T> = std::result::Result<T, ConvertError>;

/// Engine lifecycle phases surfaced through the progress callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertPhase {
    Loading,
    Initializing,
    Converting,
    Ready,
    Complete,
}

pub type ProgressFn<'a> = &'a mut (dyn FnMut(ConvertPhase, f32, &str) + Send);

/// A converted document: raw bytes plus the output MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converted {
    pub bytes: Vec<u8>,
    pub mime: String,
}

/// The external conversion engine, interfaces only.
pub trait ConversionBackend: Send + Sync {
    /// Bring the engine up. Called at most once per handle generation.
    fn initialize(&self) -> impl Future<Output = Result<()>> + Send;

    /// Convert one document between formats.
    fn convert(
        &self,
        input: &[u8],
        input_format: &str,
        output_format: &str,
    ) -> impl Future<Output = Result<Converted>> + Send;

    /// Release engine resources.
    fn shutdown(&self) -> impl Future<Output = ()> + Send;
}

struct ConverterState<B> {
    backend: B,
    // Replaced wholesale by destroy(); get_or_try_init gives one in-flight
    // initialization that concurrent callers share.
    ready: Mutex<Arc<OnceCell<()>>>,
}

/// Handle to a conversion engine.
pub struct Converter<B: ConversionBackend> {
    state: Arc<ConverterState<B>>,
}

impl<B: ConversionBackend> Clone for Converter<B> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<B: ConversionBackend> Converter<B> {
    pub fn new(backend: B) -> Self {
        Self {
            state: Arc::new(ConverterState {
                backend,
                ready: Mutex::new(Arc::new(OnceCell::new())),
            }),
        }
    }

    /// Initialize the engine. Idempotent: repeat calls return immediately
    /// once the engine is up, and callers racing the first call await the
    /// same initialization.
    pub async fn initialize(&self, progress: Option<ProgressFn<'_>>) -> Result<()> {
        let cell = self.state.ready.lock().await.clone();

        if cell.initialized() {
            return Ok(());
        }

        if let Some(progress) = progress {
            progress(ConvertPhase::Loading, 0.0, "Loading conversion engine...");
            let result = cell
                .get_or_try_init(|| self.state.backend.initialize())
                .await;
            match result {
                Ok(_) => {
                    progress(ConvertPhase::Ready, 100.0, "Conversion engine ready!");
                    Ok(())
                }
                Err(err) => Err(err),
            }
        } else {
            cell.get_or_try_init(|| self.state.backend.initialize())
                .await
                .map(|_| ())
        }
    }

    pub async fn is_ready(&self) -> bool {
        self.state.ready.lock().await.initialized()
    }

    /// Convert a named file. The input format is derived from the file
    /// extension, lowercased.
    pub async fn convert(
        &self,
        filename: &str,
        bytes: &[u8],
        output_format: &str,
    ) -> Result<Converted> {
        if !self.is_ready().await {
            return Err(ConvertError::NotInitialized);
        }

        let input_format = input_format_of(filename);
        log::debug!("converting {filename} ({input_format} -> {output_format})");
        self.state
            .backend
            .convert(bytes, &input_format, output_format)
            .await
    }

    pub async fn convert_to_pdf(&self, filename: &str, bytes: &[u8]) -> Result<Converted> {
        self.convert(filename, bytes, "pdf").await
    }

    /// Shut the engine down and return to the uninitialized state. A later
    /// `initialize` brings it up again from scratch.
    pub async fn destroy(&self) {
        let mut cell = self.state.ready.lock().await;
        if cell.initialized() {
            self.state.backend.shutdown().await;
        }
        *cell = Arc::new(OnceCell::new());
    }
}

fn input_format_of(filename: &str) -> String {
    filename
        .rsplit('.')
        .next()
        .filter(|ext| *ext != filename)
        .unwrap_or("")
        .to_ascii_lowercase()
}
